// src/models/lease.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::lenient;
use crate::models::document::LeaseDocuments;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LeaseStatus {
    #[default]
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    Rejected,
    Active,
}

impl LeaseStatus {
    pub fn label(self) -> &'static str {
        match self {
            LeaseStatus::PendingApproval => "Pending Approval",
            LeaseStatus::Approved => "Approved",
            LeaseStatus::Rejected => "Rejected",
            LeaseStatus::Active => "Active",
        }
    }

    /// Contrato vigente: ocupa a banca e pode ser renovado.
    pub fn is_in_force(self) -> bool {
        matches!(self, LeaseStatus::Active | LeaseStatus::Approved)
    }
}

/// Dados de contato do futuro inquilino, copiados na solicitação.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantInfo {
    #[schema(example = "Ana Cruz")]
    pub name: String,
    pub business: String,
    pub contact: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenewalEntry {
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub previous_end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub new_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub new_end: Option<NaiveDate>,
    /// Novo valor − valor anterior; negativo numa redução.
    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub rate_change: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum RateTrend {
    Increase,
    Decrease,
    Unchanged,
}

impl RenewalEntry {
    pub fn trend(&self) -> RateTrend {
        if self.rate_change > Decimal::ZERO {
            RateTrend::Increase
        } else if self.rate_change < Decimal::ZERO {
            RateTrend::Decrease
        } else {
            RateTrend::Unchanged
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaseRequest {
    #[schema(example = "LEASE-2025-3F2A9C0E4B6D4E1F8A7B5C3D2E1F0A9B")]
    pub id: String,

    #[serde(default)]
    pub status: LeaseStatus,

    #[serde(default, deserialize_with = "lenient::string")]
    #[schema(example = "ST-010")]
    pub stall_id: String,

    #[serde(default)]
    pub tenant_info: TenantInfo,

    #[serde(default, deserialize_with = "lenient::string")]
    pub tenant_id: String,

    #[serde(default, deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>, example = "2025-01-01")]
    pub lease_start: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>, example = "2026-01-01")]
    pub lease_end: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64, example = 5000)]
    pub monthly_rate: Decimal,

    #[serde(default, deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>)]
    pub security_deposit: Option<Decimal>,

    #[serde(default = "default_payment_terms")]
    pub payment_terms: String,

    #[serde(default)]
    pub remarks: String,

    #[serde(default)]
    pub documents: LeaseDocuments,

    #[serde(default)]
    pub renewal_history: Vec<RenewalEntry>,

    #[serde(default = "default_payment_status")]
    pub payment_status: String,

    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub balance: Decimal,

    #[serde(default)]
    pub created_by: String,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date_created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, deserialize_with = "lenient::timestamp", skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,

    #[serde(default, deserialize_with = "lenient::timestamp", skip_serializing_if = "Option::is_none")]
    pub rejected_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::timestamp", skip_serializing_if = "Option::is_none")]
    pub renewed_at: Option<DateTime<Utc>>,
}

fn default_payment_terms() -> String {
    "Monthly".to_string()
}

fn default_payment_status() -> String {
    "Pending".to_string()
}

impl LeaseRequest {
    /// Contrato vigente cobrindo a banca (usado para derivar disponibilidade).
    pub fn occupies(&self, stall_id: &str) -> bool {
        self.status == LeaseStatus::Active && self.stall_id == stall_id
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitLeasePayload {
    #[schema(example = "Ana Cruz")]
    pub tenant_name: String,
    pub tenant_business_name: String,
    pub tenant_contact: String,
    #[validate(email(message = "Invalid email format"))]
    #[serde(deserialize_with = "lenient::opt_string")]
    pub tenant_email: Option<String>,
    pub tenant_address: String,

    #[schema(example = "ST-010")]
    pub stall_id: String,

    #[schema(example = "2025-01-01")]
    pub lease_start: String,
    pub lease_end: String,

    #[serde(deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>, example = 5000)]
    pub monthly_rate: Option<Decimal>,

    #[serde(deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>)]
    pub security_deposit: Option<Decimal>,

    pub payment_terms: Option<String>,
    pub remarks: String,
    pub documents: LeaseDocuments,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ApproveLeasePayload {
    pub documents: LeaseDocuments,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RejectLeasePayload {
    #[schema(example = "Incomplete documents")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RenewLeasePayload {
    #[schema(example = "2026-01-01")]
    pub lease_start: String,
    #[schema(example = "2027-01-01")]
    pub lease_end: String,

    #[serde(deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>, example = 5500)]
    pub monthly_rate: Option<Decimal>,

    #[serde(deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>)]
    pub security_deposit: Option<Decimal>,

    pub payment_terms: Option<String>,
    pub remarks: String,
}

/// Resposta da aprovação: o contrato atualizado e o inquilino criado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedLease {
    pub tenant: crate::models::tenant::Tenant,
    pub lease: LeaseRequest,
}
