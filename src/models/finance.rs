// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::lenient;
use crate::models::document::DocumentFile;

// =============================================================================
//  DESPESAS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    #[serde(rename = "Under Review")]
    UnderReview,
}

impl ExpenseStatus {
    pub fn label(self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "Pending",
            ExpenseStatus::Approved => "Approved",
            ExpenseStatus::Rejected => "Rejected",
            ExpenseStatus::UnderReview => "Under Review",
        }
    }
}

/// Andamento do pagamento de uma despesa aprovada.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ExpensePaymentStatus {
    #[default]
    Pending,
    #[serde(rename = "Ready for Payment")]
    ReadyForPayment,
    Paid,
}

impl ExpensePaymentStatus {
    pub fn label(self) -> &'static str {
        match self {
            ExpensePaymentStatus::Pending => "Pending",
            ExpensePaymentStatus::ReadyForPayment => "Ready for Payment",
            ExpensePaymentStatus::Paid => "Paid",
        }
    }
}

/// Aprovador atribuído pelo valor da despesa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approver {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
}

pub const MARKET_MASTER: Approver = Approver {
    id: "MM-001",
    name: "Juan Dela Cruz",
    role: "Market Master",
};

pub const MANAGER: Approver = Approver {
    id: "MGR-001",
    name: "Maria Santos",
    role: "Manager",
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalHistoryEntry {
    #[serde(default)]
    #[schema(example = "Submitted")]
    pub action: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,

    #[serde(default, deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>, example = "2025-02-14")]
    pub expense_date: Option<NaiveDate>,

    #[serde(default)]
    #[schema(example = "Utilities")]
    pub expense_category: String,

    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub expense_amount: Decimal,

    #[serde(default)]
    pub expense_description: String,

    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub charged_to: String,
    #[serde(default)]
    pub supplier_id: String,
    #[serde(default)]
    pub project_code: String,
    #[serde(default = "default_priority")]
    pub priority: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_exchange_rate", deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub exchange_rate: Decimal,

    #[serde(default, deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub approval_status: ExpenseStatus,

    #[serde(default)]
    pub payment_status: ExpensePaymentStatus,

    #[serde(default)]
    pub current_approver: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_assigned_approver: Option<String>,

    #[serde(default)]
    pub submitted_by: String,

    #[serde(default)]
    pub approval_history: Vec<ApprovalHistoryEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_request_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub check_request_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub check_release_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<DocumentFile>,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_priority() -> String {
    "Medium".to_string()
}

fn default_currency() -> String {
    "PhP".to_string()
}

fn default_exchange_rate() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateExpensePayload {
    #[schema(example = "2025-02-14")]
    pub expense_date: String,
    pub expense_category: String,
    #[serde(deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>)]
    pub expense_amount: Option<Decimal>,
    pub expense_description: String,
    pub payment_method: String,
    pub charged_to: String,
    pub supplier_id: String,
    pub project_code: String,
    pub priority: Option<String>,
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>)]
    pub exchange_rate: Option<Decimal>,
    pub due_date: String,
    /// Aprovador escolhido manualmente; vazio usa a regra por valor.
    pub approver: Option<String>,
    pub receipt: Option<DocumentFile>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseDecisionPayload {
    pub note: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ReasonPayload {
    #[schema(example = "Duplicate entry")]
    pub reason: String,
}

// =============================================================================
//  CHEQUES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CheckRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Released,
}

impl CheckRequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            CheckRequestStatus::Pending => "Pending",
            CheckRequestStatus::Approved => "Approved",
            CheckRequestStatus::Rejected => "Rejected",
            CheckRequestStatus::Released => "Released",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub payee: String,

    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub amount: Decimal,

    #[serde(default)]
    pub purpose: String,

    #[serde(default)]
    pub status: CheckRequestStatus,

    /// Despesa de origem, quando gerado pelo fluxo de despesas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckRelease {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub request_id: String,

    #[serde(default, deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>)]
    pub release_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::string")]
    #[schema(example = "000123")]
    pub check_no: String,

    #[serde(default)]
    pub payee: String,

    #[serde(default)]
    pub released_by: String,

    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCheckRequestPayload {
    pub payee: String,
    #[serde(deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    pub purpose: String,
}

/// Liberação de cheque junto com a despesa atualizada, quando houver.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleasedCheck {
    pub request: CheckRequest,
    pub release: CheckRelease,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense: Option<Expense>,
}
