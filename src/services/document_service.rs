// src/services/document_service.rs

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;

use crate::{
    common::error::AppError,
    models::document::{ALLOWED_DOCUMENT_TYPES, DocumentFile, LeaseDocuments},
};

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Validação de anexos (upload de arquivo ou foto da câmera).
#[derive(Clone)]
pub struct DocumentService {
    max_bytes: u64,
}

impl DocumentService {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Confere tipo e tamanho. O conteúdo precisa ser um data URI base64 decodificável;
    /// o tamanho considerado é o dos bytes decodificados.
    pub fn validate(&self, mut file: DocumentFile) -> Result<DocumentFile, AppError> {
        let (media_type, bytes) = decode_data_uri(&file.content)?;

        let declared = if file.file_type.trim().is_empty() {
            media_type.clone()
        } else {
            file.file_type.trim().to_ascii_lowercase()
        };

        if !ALLOWED_DOCUMENT_TYPES.contains(&declared.as_str())
            || !ALLOWED_DOCUMENT_TYPES.contains(&media_type.as_str())
        {
            return Err(AppError::DocumentRejected(
                "Please upload only images (JPEG, PNG) or PDF files.".into(),
            ));
        }

        let size = bytes.len() as u64;
        if size > self.max_bytes {
            return Err(AppError::DocumentRejected(format!(
                "File size must be less than {}MB.",
                self.max_bytes / (1024 * 1024)
            )));
        }

        file.file_type = declared;
        file.file_size = size;
        if file.upload_date.is_none() {
            file.upload_date = Some(Utc::now());
        }
        Ok(file)
    }

    pub fn validate_lease_documents(&self, documents: LeaseDocuments) -> Result<LeaseDocuments, AppError> {
        Ok(LeaseDocuments {
            valid_id: documents.valid_id.map(|f| self.validate(f)).transpose()?,
            business_permit: documents.business_permit.map(|f| self.validate(f)).transpose()?,
            barangay_permit: documents.barangay_permit.map(|f| self.validate(f)).transpose()?,
        })
    }

    /// Foto capturada pela câmera: sempre um JPEG com nome gerado.
    pub fn capture(&self, data_uri: &str, label: &str) -> Result<DocumentFile, AppError> {
        let (media_type, _) = decode_data_uri(data_uri)?;
        if media_type != "image/jpeg" {
            return Err(AppError::DocumentRejected("Captured photo must be a JPEG image.".into()));
        }

        let now = Utc::now();
        let label = if label.trim().is_empty() { "capture" } else { label.trim() };
        self.validate(DocumentFile {
            file_name: format!("{}-{}.jpg", label, now.timestamp_millis()),
            file_type: "image/jpeg".into(),
            file_size: 0,
            upload_date: Some(now),
            content: data_uri.to_string(),
        })
    }
}

// `data:<mime>;base64,<payload>` → (mime, bytes)
fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), AppError> {
    let invalid = || AppError::DocumentRejected("Document content must be a base64 data URI.".into());

    let rest = uri.trim().strip_prefix("data:").ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let media_type = header.strip_suffix(";base64").ok_or_else(invalid)?;

    let bytes = STANDARD.decode(payload.trim()).map_err(|_| invalid())?;
    Ok((media_type.to_ascii_lowercase(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_uri(mime: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
    }

    fn file(mime: &str, bytes: &[u8]) -> DocumentFile {
        DocumentFile {
            file_name: "id.jpg".into(),
            file_type: mime.into(),
            file_size: 999,
            upload_date: None,
            content: data_uri(mime, bytes),
        }
    }

    #[test]
    fn accepts_images_and_pdf_with_real_size() {
        let service = DocumentService::new(DEFAULT_MAX_UPLOAD_BYTES);
        let checked = service.validate(file("image/png", b"\x89PNG....")).unwrap();
        assert_eq!(checked.file_size, 8);
        assert!(checked.upload_date.is_some());

        assert!(service.validate(file("application/pdf", b"%PDF-1.4")).is_ok());
    }

    #[test]
    fn rejects_wrong_type_oversize_and_garbage() {
        let service = DocumentService::new(16);

        let err = service.validate(file("text/plain", b"hello")).unwrap_err();
        assert!(matches!(err, AppError::DocumentRejected(_)));

        let err = service.validate(file("image/jpeg", &[0u8; 17])).unwrap_err();
        assert!(matches!(err, AppError::DocumentRejected(_)));

        let mut broken = file("image/jpeg", b"abc");
        broken.content = "not a data uri".into();
        assert!(service.validate(broken).is_err());
    }

    #[test]
    fn capture_requires_jpeg() {
        let service = DocumentService::new(DEFAULT_MAX_UPLOAD_BYTES);
        let photo = service.capture(&data_uri("image/jpeg", b"\xff\xd8\xff"), "validId").unwrap();
        assert!(photo.file_name.starts_with("validId-"));
        assert_eq!(photo.file_type, "image/jpeg");

        assert!(service.capture(&data_uri("image/png", b"png"), "").is_err());
    }
}
