// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::common::lenient;

/// Registro de uma exclusão física, gravado no mesmo lote que remove o item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRecord {
    pub id: String,
    #[serde(default)]
    #[schema(example = "paymentHistory")]
    pub collection: String,
    #[serde(default)]
    pub record_id: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub deleted_by: String,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Cópia do registro removido.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub snapshot: Value,
}
