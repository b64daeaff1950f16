// src/handlers/checks.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Actor,
    models::finance::{CheckRelease, CheckRequest, CreateCheckRequestPayload, ReasonPayload, ReleasedCheck},
};

// GET /api/checks/requests
#[utoipa::path(
    get,
    path = "/api/checks/requests",
    tag = "Checks",
    responses((status = 200, body = Vec<CheckRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_requests(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let requests = app_state.check_service.list_requests().await?;
    Ok((StatusCode::OK, Json(requests)))
}

// GET /api/checks/releases
#[utoipa::path(
    get,
    path = "/api/checks/releases",
    tag = "Checks",
    responses((status = 200, body = Vec<CheckRelease>)),
    security(("api_jwt" = []))
)]
pub async fn list_releases(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let releases = app_state.check_service.list_releases().await?;
    Ok((StatusCode::OK, Json(releases)))
}

// POST /api/checks/requests
#[utoipa::path(
    post,
    path = "/api/checks/requests",
    tag = "Checks",
    request_body = CreateCheckRequestPayload,
    responses((status = 201, body = CheckRequest), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCheckRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let request = app_state.check_service.create_request(payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

// POST /api/checks/requests/{id}/approve
#[utoipa::path(
    post,
    path = "/api/checks/requests/{id}/approve",
    tag = "Checks",
    params(("id" = String, Path)),
    responses((status = 200, body = CheckRequest), (status = 409, description = "Pedido não está pendente")),
    security(("api_jwt" = []))
)]
pub async fn approve_request(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let request = app_state.check_service.approve(&id, &actor).await?;
    Ok((StatusCode::OK, Json(request)))
}

// POST /api/checks/requests/{id}/reject
#[utoipa::path(
    post,
    path = "/api/checks/requests/{id}/reject",
    tag = "Checks",
    params(("id" = String, Path)),
    request_body = ReasonPayload,
    responses((status = 200, body = CheckRequest), (status = 400, description = "Motivo obrigatório")),
    security(("api_jwt" = []))
)]
pub async fn reject_request(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let request = app_state.check_service.reject(&id, &payload.reason, &actor).await?;
    Ok((StatusCode::OK, Json(request)))
}

// POST /api/checks/requests/{id}/release
#[utoipa::path(
    post,
    path = "/api/checks/requests/{id}/release",
    tag = "Checks",
    params(("id" = String, Path)),
    responses(
        (status = 200, description = "Cheque emitido", body = ReleasedCheck),
        (status = 409, description = "Pedido não aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn release_request(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let released = app_state.check_service.release(&id, &actor).await?;
    Ok((StatusCode::OK, Json(released)))
}

// DELETE /api/checks/requests/{id}
#[utoipa::path(
    delete,
    path = "/api/checks/requests/{id}",
    tag = "Checks",
    params(("id" = String, Path)),
    request_body = ReasonPayload,
    responses((status = 200, body = CheckRequest), (status = 400, description = "Motivo obrigatório")),
    security(("api_jwt" = []))
)]
pub async fn delete_request(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let removed = app_state.check_service.delete_request(&id, &payload.reason, &actor).await?;
    Ok((StatusCode::OK, Json(removed)))
}
