// src/handlers/leases.rs

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
    middleware::auth::Actor,
    models::lease::{
        ApproveLeasePayload, ApprovedLease, LeaseRequest, LeaseStatus, RejectLeasePayload,
        RenewLeasePayload, SubmitLeasePayload,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct LeaseRequestQuery {
    /// Filtra pelo status, ex.: `Pending Approval`
    pub status: Option<LeaseStatus>,
}

// GET /api/leases
#[utoipa::path(
    get,
    path = "/api/leases",
    tag = "Leases",
    responses((status = 200, body = Vec<LeaseRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_leases(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let leases = app_state.lease_service.list_leases().await?;
    Ok((StatusCode::OK, Json(leases)))
}

// GET /api/leases/requests
#[utoipa::path(
    get,
    path = "/api/leases/requests",
    tag = "Leases",
    params(LeaseRequestQuery),
    responses((status = 200, body = Vec<LeaseRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    Query(query): Query<LeaseRequestQuery>,
) -> Result<impl IntoResponse, AppError> {
    let requests = app_state.lease_service.list_requests(query.status).await?;
    Ok((StatusCode::OK, Json(requests)))
}

// GET /api/leases/approved
#[utoipa::path(
    get,
    path = "/api/leases/approved",
    tag = "Leases",
    responses((status = 200, body = Vec<LeaseRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_approved(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let leases = app_state.lease_service.list_approved().await?;
    Ok((StatusCode::OK, Json(leases)))
}

// GET /api/leases/renewable
#[utoipa::path(
    get,
    path = "/api/leases/renewable",
    tag = "Leases",
    responses((status = 200, description = "Contratos Active ou Approved", body = Vec<LeaseRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_renewable(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let leases = app_state.lease_service.list_renewable().await?;
    Ok((StatusCode::OK, Json(leases)))
}

// GET /api/leases/{id}
#[utoipa::path(
    get,
    path = "/api/leases/{id}",
    tag = "Leases",
    params(("id" = String, Path)),
    responses((status = 200, body = LeaseRequest), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_lease(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lease = app_state.lease_service.get_lease(&id).await?;
    Ok((StatusCode::OK, Json(lease)))
}

// POST /api/leases
#[utoipa::path(
    post,
    path = "/api/leases",
    tag = "Leases",
    request_body = SubmitLeasePayload,
    responses(
        (status = 201, description = "Solicitação em Pending Approval", body = LeaseRequest),
        (status = 400, description = "Campos obrigatórios ausentes ou termos inválidos"),
        (status = 409, description = "Banca indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_lease(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<SubmitLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let lease = app_state.lease_service.submit(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(lease)))
}

// POST /api/leases/{id}/approve
#[utoipa::path(
    post,
    path = "/api/leases/{id}/approve",
    tag = "Leases",
    params(("id" = String, Path)),
    request_body = ApproveLeasePayload,
    responses(
        (status = 200, body = ApprovedLease),
        (status = 400, description = "Valid ID is required for approval."),
        (status = 404, description = "Não encontrado"),
        (status = 409, description = "Status não permite aprovação")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_lease(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ApproveLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let approved = app_state.lease_service.approve(&id, payload, &actor).await?;
    Ok((StatusCode::OK, Json(approved)))
}

// POST /api/leases/{id}/reject
#[utoipa::path(
    post,
    path = "/api/leases/{id}/reject",
    tag = "Leases",
    params(("id" = String, Path)),
    request_body = RejectLeasePayload,
    responses((status = 200, body = LeaseRequest), (status = 400, description = "Dados inválidos"), (status = 409, description = "Transição de status inválida")),
    security(("api_jwt" = []))
)]
pub async fn reject_lease(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<RejectLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let lease = app_state.lease_service.reject(&id, &payload.reason, &actor).await?;
    Ok((StatusCode::OK, Json(lease)))
}

// POST /api/leases/{id}/renew
#[utoipa::path(
    post,
    path = "/api/leases/{id}/renew",
    tag = "Leases",
    params(("id" = String, Path)),
    request_body = RenewLeasePayload,
    responses((status = 200, body = LeaseRequest), (status = 400, description = "Dados inválidos"), (status = 409, description = "Transição de status inválida")),
    security(("api_jwt" = []))
)]
pub async fn renew_lease(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<RenewLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let lease = app_state.lease_service.renew(&id, payload, &actor).await?;
    Ok((StatusCode::OK, Json(lease)))
}
