// src/models/document.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::lenient;

pub const ALLOWED_DOCUMENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/jpg", "application/pdf"];

/// Arquivo anexado, com o conteúdo embutido como data URI base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    #[serde(default, alias = "filename")]
    #[schema(example = "valid-id.jpg")]
    pub file_name: String,

    #[serde(default)]
    #[schema(example = "image/jpeg")]
    pub file_type: String,

    #[serde(default)]
    pub file_size: u64,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub upload_date: Option<DateTime<Utc>>,

    // `data` é o nome usado nos recibos de despesa
    #[serde(default, alias = "data")]
    #[schema(example = "data:image/jpeg;base64,/9j/4AAQSkZJRg==")]
    pub content: String,
}

/// Documentos de uma solicitação de locação. Só o `validId` é obrigatório, e só na aprovação.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaseDocuments {
    #[serde(default)]
    pub valid_id: Option<DocumentFile>,
    #[serde(default)]
    pub business_permit: Option<DocumentFile>,
    #[serde(default)]
    pub barangay_permit: Option<DocumentFile>,
}

impl LeaseDocuments {
    /// Documentos enviados agora têm prioridade; os ausentes mantêm o que já estava salvo.
    pub fn merged_over(self, existing: &LeaseDocuments) -> LeaseDocuments {
        LeaseDocuments {
            valid_id: self.valid_id.or_else(|| existing.valid_id.clone()),
            business_permit: self.business_permit.or_else(|| existing.business_permit.clone()),
            barangay_permit: self.barangay_permit.or_else(|| existing.barangay_permit.clone()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentFile> {
        [&self.valid_id, &self.business_permit, &self.barangay_permit]
            .into_iter()
            .flatten()
    }
}
