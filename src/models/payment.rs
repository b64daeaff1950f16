// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCategory {
    Tenant,
    Public,
    Loan,
    Event,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[default]
    Rent,
    Rights,
    Electricity,
    Water,
    OtherFees,
    Restroom,
    Parking,
    LoanRepayment,
    SpecialEvent,
    #[serde(other)]
    Other,
}

impl PaymentType {
    pub fn label(self) -> &'static str {
        match self {
            PaymentType::Rent => "Rent Payment",
            PaymentType::Rights => "Rights Payment",
            PaymentType::Electricity => "Electricity Bill",
            PaymentType::Water => "Water Bill",
            PaymentType::OtherFees => "Other Fees",
            PaymentType::Restroom => "Restroom Fee",
            PaymentType::Parking => "Parking Fee",
            PaymentType::LoanRepayment => "Loan Repayment",
            PaymentType::SpecialEvent => "Special Event Fee",
            PaymentType::Other => "Other",
        }
    }

    pub fn category(self) -> PaymentCategory {
        match self {
            PaymentType::Rent
            | PaymentType::Rights
            | PaymentType::Electricity
            | PaymentType::Water
            | PaymentType::OtherFees => PaymentCategory::Tenant,
            PaymentType::Restroom | PaymentType::Parking => PaymentCategory::Public,
            PaymentType::LoanRepayment => PaymentCategory::Loan,
            PaymentType::SpecialEvent => PaymentCategory::Event,
            PaymentType::Other => PaymentCategory::Other,
        }
    }

    pub fn requires_tenant(self) -> bool {
        matches!(self.category(), PaymentCategory::Tenant | PaymentCategory::Loan)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ReceiptType {
    /// Acknowledgement Receipt
    #[default]
    #[serde(rename = "AR")]
    Acknowledgement,
    /// Official Receipt
    #[serde(rename = "OR")]
    Official,
    #[serde(rename = "MANUAL")]
    Manual,
}

impl ReceiptType {
    pub fn prefix(self) -> &'static str {
        match self {
            ReceiptType::Acknowledgement => "AR",
            ReceiptType::Official => "OR",
            ReceiptType::Manual => "MANUAL",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentBreakdown {
    #[serde(deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub electric: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub water: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub rent: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub rights: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub others: Decimal,
}

impl PaymentBreakdown {
    pub fn total(&self) -> Decimal {
        self.electric + self.water + self.rent + self.rights + self.others
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,

    #[serde(default, deserialize_with = "lenient::string")]
    #[schema(example = "AR-00001")]
    pub receipt_number: String,

    #[serde(default)]
    pub receipt_type: ReceiptType,

    #[serde(default, deserialize_with = "lenient::string")]
    pub tenant_id: String,
    #[serde(default)]
    pub tenant_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub stall_id: String,
    #[serde(default)]
    pub stall_name: String,

    #[serde(default)]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub payment_type_label: String,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub amount: Decimal,

    #[serde(default)]
    pub breakdown: PaymentBreakdown,

    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub collector_id: String,
    #[serde(default)]
    pub collector_name: String,

    #[serde(default = "default_payment_status")]
    pub status: String,

    #[serde(default = "default_category")]
    pub category: PaymentCategory,

    #[serde(default)]
    pub is_manual: bool,
}

fn default_payment_status() -> String {
    "completed".to_string()
}

fn default_category() -> PaymentCategory {
    PaymentCategory::Other
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordPaymentPayload {
    pub payment_type: PaymentType,
    pub receipt_type: ReceiptType,
    pub tenant_id: String,
    pub stall_id: String,
    /// Nome do cliente avulso nas taxas públicas.
    pub patron_name: String,
    pub breakdown: PaymentBreakdown,
    #[schema(example = "Cash")]
    pub method: String,
    /// Em branco, o primeiro cobrador da escala
    pub collector_id: String,
}

/// Linha de lançamento manual em lote (sem recibo).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ManualPaymentEntry {
    pub tenant_name: String,
    pub stall_name: String,
    pub payment_type: PaymentType,
    pub breakdown: PaymentBreakdown,
    /// Total informado; quando ausente vale a soma do detalhamento.
    #[serde(deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    pub method: String,
    pub collector_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkPaymentPayload {
    pub entries: Vec<ManualPaymentEntry>,
}

/// Cobrador de campo. Cada pagamento registra quem recebeu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Collector {
    #[schema(example = "C-001")]
    pub id: String,
    #[serde(default)]
    #[schema(example = "Juan Dela Cruz")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Stall Area A")]
    pub area: String,
    #[serde(default = "default_collection_type")]
    #[schema(example = "regular")]
    pub collection_type: String,
}

fn default_collection_type() -> String {
    "regular".to_string()
}

impl Collector {
    /// Escala usada enquanto nenhum cobrador foi gravado.
    pub fn defaults() -> Vec<Collector> {
        [
            ("C-001", "Juan Dela Cruz", "Stall Area A"),
            ("C-002", "Maria Santos", "Parking Zone 1"),
            ("C-003", "Pedro Reyes", "Stall Area B"),
        ]
        .into_iter()
        .map(|(id, name, area)| Collector {
            id: id.to_string(),
            name: name.to_string(),
            area: area.to_string(),
            collection_type: default_collection_type(),
        })
        .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignCollectorPayload {
    #[schema(example = "Parking Zone 1")]
    pub area: String,
    /// `regular` quando omitido
    pub collection_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyBreakdown {
    #[schema(value_type = f64)]
    pub rent: Decimal,
    #[schema(value_type = f64)]
    pub rights: Decimal,
    #[schema(value_type = f64)]
    pub electricity: Decimal,
    #[schema(value_type = f64)]
    pub water: Decimal,
    #[schema(value_type = f64)]
    pub other: Decimal,
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub count: usize,
}
