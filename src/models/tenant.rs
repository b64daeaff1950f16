// src/models/tenant.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::lenient;
use crate::models::document::LeaseDocuments;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TenantStatus {
    #[default]
    Active,
    Pending,
    Overdue,
    Inactive,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    #[schema(example = "TEN-2025-042")]
    pub id: String,

    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub business: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub status: TenantStatus,

    #[serde(default, deserialize_with = "lenient::string")]
    pub stall_id: String,

    /// Contrato de origem; vínculo apenas informativo.
    #[serde(default, deserialize_with = "lenient::string")]
    pub lease_id: String,

    #[serde(default, deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>)]
    pub lease_start: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>)]
    pub lease_end: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub monthly_rate: Decimal,

    #[serde(default)]
    pub payment_terms: String,

    #[serde(default)]
    pub documents: LeaseDocuments,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date_registered: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTenantPayload {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub business: Option<String>,
    pub contact: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    #[serde(deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    pub address: Option<String>,
    pub payment_terms: Option<String>,
    pub status: Option<TenantStatus>,
}
