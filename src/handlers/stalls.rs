// src/handlers/stalls.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    models::stall::{Stall, StallPayload},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct StallQuery {
    /// Busca por ID, tipo, seção, local, donos ou utilidades
    pub search: Option<String>,
}

// GET /api/stalls
#[utoipa::path(
    get,
    path = "/api/stalls",
    tag = "Stalls",
    params(StallQuery),
    responses((status = 200, body = Vec<Stall>)),
    security(("api_jwt" = []))
)]
pub async fn list_stalls(
    State(app_state): State<AppState>,
    Query(query): Query<StallQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stalls = app_state.stall_service.list(query.search.as_deref()).await?;
    Ok((StatusCode::OK, Json(stalls)))
}

// GET /api/stalls/available
#[utoipa::path(
    get,
    path = "/api/stalls/available",
    tag = "Stalls",
    responses((status = 200, description = "Bancas livres para locação", body = Vec<Stall>)),
    security(("api_jwt" = []))
)]
pub async fn list_available(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stalls = app_state.stall_service.available().await?;
    Ok((StatusCode::OK, Json(stalls)))
}

// GET /api/stalls/{id}
#[utoipa::path(
    get,
    path = "/api/stalls/{id}",
    tag = "Stalls",
    params(("id" = String, Path, example = "ST-001")),
    responses((status = 200, body = Stall), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_stall(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stall = app_state.stall_service.get(&id).await?;
    Ok((StatusCode::OK, Json(stall)))
}

// POST /api/stalls
#[utoipa::path(
    post,
    path = "/api/stalls",
    tag = "Stalls",
    request_body = StallPayload,
    responses(
        (status = 201, body = Stall),
        (status = 400, description = "Tipo e local são obrigatórios"),
        (status = 409, description = "ID já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_stall(
    State(app_state): State<AppState>,
    Json(payload): Json<StallPayload>,
) -> Result<impl IntoResponse, AppError> {
    let stall = app_state.stall_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(stall)))
}

// PUT /api/stalls/{id}
#[utoipa::path(
    put,
    path = "/api/stalls/{id}",
    tag = "Stalls",
    params(("id" = String, Path)),
    request_body = StallPayload,
    responses((status = 200, body = Stall), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_stall(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StallPayload>,
) -> Result<impl IntoResponse, AppError> {
    let stall = app_state.stall_service.update(&id, payload).await?;
    Ok((StatusCode::OK, Json(stall)))
}

// DELETE /api/stalls/{id} (a banca fica Inactive)
#[utoipa::path(
    delete,
    path = "/api/stalls/{id}",
    tag = "Stalls",
    params(("id" = String, Path)),
    responses((status = 200, body = Stall), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_stall(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stall = app_state.stall_service.deactivate(&id).await?;
    Ok((StatusCode::OK, Json(stall)))
}
