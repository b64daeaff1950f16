// src/handlers/payments.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Actor,
    models::{
        finance::ReasonPayload,
        payment::{
            AssignCollectorPayload, BulkPaymentPayload, Collector, DailyBreakdown, Payment, PaymentType,
            RecordPaymentPayload,
        },
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentQuery {
    pub payment_type: Option<PaymentType>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct DailyQuery {
    /// Dia (`YYYY-MM-DD`); sem ele, hoje
    pub date: Option<NaiveDate>,
}

// GET /api/payments
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    params(PaymentQuery),
    responses((status = 200, body = Vec<Payment>)),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    Query(query): Query<PaymentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state
        .payment_service
        .list(query.payment_type, query.tenant_id.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(payments)))
}

// GET /api/payments/{id}
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = String, Path)),
    responses((status = 200, body = Payment), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_payment(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state.payment_service.get(&id).await?;
    Ok((StatusCode::OK, Json(payment)))
}

// POST /api/payments
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = RecordPaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado com recibo", body = Payment),
        (status = 400, description = "Valores ou inquilino inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<RecordPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state.payment_service.record(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

// POST /api/payments/bulk
#[utoipa::path(
    post,
    path = "/api/payments/bulk",
    tag = "Payments",
    request_body = BulkPaymentPayload,
    responses((status = 201, body = Vec<Payment>), (status = 400, description = "Linha inválida")),
    security(("api_jwt" = []))
)]
pub async fn record_bulk(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<BulkPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state.payment_service.record_bulk(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(payments)))
}

// GET /api/payments/daily
#[utoipa::path(
    get,
    path = "/api/payments/daily",
    tag = "Payments",
    params(DailyQuery),
    responses((status = 200, body = DailyBreakdown)),
    security(("api_jwt" = []))
)]
pub async fn daily_breakdown(
    State(app_state): State<AppState>,
    Query(query): Query<DailyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let day = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let breakdown = app_state.payment_service.daily_breakdown(day).await?;
    Ok((StatusCode::OK, Json(breakdown)))
}

// DELETE /api/payments/{id}
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = String, Path)),
    request_body = ReasonPayload,
    responses((status = 200, body = Payment), (status = 400, description = "Motivo obrigatório")),
    security(("api_jwt" = []))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let removed = app_state.payment_service.delete(&id, &payload.reason, &actor).await?;
    Ok((StatusCode::OK, Json(removed)))
}

// GET /api/collectors
#[utoipa::path(
    get,
    path = "/api/collectors",
    tag = "Collectors",
    responses((status = 200, body = Vec<Collector>)),
    security(("api_jwt" = []))
)]
pub async fn list_collectors(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let collectors = app_state.payment_service.list_collectors().await?;
    Ok((StatusCode::OK, Json(collectors)))
}

// PUT /api/collectors/{id}
#[utoipa::path(
    put,
    path = "/api/collectors/{id}",
    tag = "Collectors",
    params(("id" = String, Path, example = "C-002")),
    request_body = AssignCollectorPayload,
    responses(
        (status = 200, description = "Área designada", body = Collector),
        (status = 400, description = "Área obrigatória"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_collector(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AssignCollectorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let collector = app_state.payment_service.assign_collector(&id, payload).await?;
    Ok((StatusCode::OK, Json(collector)))
}
