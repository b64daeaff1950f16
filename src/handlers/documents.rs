// src/handlers/documents.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState, models::document::DocumentFile};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CapturePayload {
    /// Foto da câmera como data URI JPEG
    #[schema(example = "data:image/jpeg;base64,/9j/4AAQSkZJRg==")]
    pub data_uri: String,
    #[schema(example = "valid-id")]
    pub label: String,
}

// POST /api/documents/validate
#[utoipa::path(
    post,
    path = "/api/documents/validate",
    tag = "Documents",
    request_body = DocumentFile,
    responses(
        (status = 200, description = "Arquivo aceito, com tamanho real e data de envio", body = DocumentFile),
        (status = 400, description = "Tipo não permitido, tamanho acima do limite ou conteúdo inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn validate_upload(
    State(app_state): State<AppState>,
    Json(file): Json<DocumentFile>,
) -> Result<impl IntoResponse, AppError> {
    let file = app_state.document_service.validate(file)?;
    Ok((StatusCode::OK, Json(file)))
}

// POST /api/documents/capture
#[utoipa::path(
    post,
    path = "/api/documents/capture",
    tag = "Documents",
    request_body = CapturePayload,
    responses(
        (status = 200, description = "Foto anexável", body = DocumentFile),
        (status = 400, description = "Não é um JPEG válido")
    ),
    security(("api_jwt" = []))
)]
pub async fn capture_photo(
    State(app_state): State<AppState>,
    Json(payload): Json<CapturePayload>,
) -> Result<impl IntoResponse, AppError> {
    let file = app_state.document_service.capture(&payload.data_uri, &payload.label)?;
    Ok((StatusCode::OK, Json(file)))
}
