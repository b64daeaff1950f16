// src/handlers/tenants.rs

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
    models::tenant::{Tenant, TenantStatus, UpdateTenantPayload},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct TenantQuery {
    pub status: Option<TenantStatus>,
}

// GET /api/tenants
#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenants",
    params(TenantQuery),
    responses((status = 200, body = Vec<Tenant>)),
    security(("api_jwt" = []))
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tenants = app_state.tenant_service.list(query.status).await?;
    Ok((StatusCode::OK, Json(tenants)))
}

// GET /api/tenants/{id}
#[utoipa::path(
    get,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = String, Path, example = "TEN-2025-042")),
    responses((status = 200, body = Tenant), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_tenant(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state.tenant_service.get(&id).await?;
    Ok((StatusCode::OK, Json(tenant)))
}

// PUT /api/tenants/{id}
#[utoipa::path(
    put,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = String, Path)),
    request_body = UpdateTenantPayload,
    responses((status = 200, body = Tenant), (status = 400, description = "Dados inválidos"), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_tenant(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state.tenant_service.update(&id, payload).await?;
    Ok((StatusCode::OK, Json(tenant)))
}

// DELETE /api/tenants/{id}
#[utoipa::path(
    delete,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = String, Path)),
    responses((status = 200, description = "Inquilino desativado", body = Tenant), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_tenant(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state.tenant_service.deactivate(&id).await?;
    Ok((StatusCode::OK, Json(tenant)))
}
