// src/handlers/expenses.rs

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
    models::finance::{
        CreateExpensePayload, Expense, ExpenseDecisionPayload, ExpenseStatus, ReasonPayload, ReleasedCheck,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct ExpenseQuery {
    /// Status de aprovação, ex.: `Pending`, `Under Review`
    pub status: Option<ExpenseStatus>,
}

// GET /api/expenses
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    params(ExpenseQuery),
    responses((status = 200, body = Vec<Expense>)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    Query(query): Query<ExpenseQuery>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state.expense_service.list(query.status).await?;
    Ok((StatusCode::OK, Json(expenses)))
}

// GET /api/expenses/{id}
#[utoipa::path(
    get,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = String, Path)),
    responses((status = 200, body = Expense), (status = 404, description = "Não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_expense(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.expense_service.get(&id).await?;
    Ok((StatusCode::OK, Json(expense)))
}

// POST /api/expenses
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = CreateExpensePayload,
    responses(
        (status = 201, description = "Despesa registrada com aprovador atribuído", body = Expense),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.expense_service.record(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

// POST /api/expenses/{id}/approve
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/approve",
    tag = "Expenses",
    params(("id" = String, Path)),
    request_body = ExpenseDecisionPayload,
    responses((status = 200, body = Expense), (status = 409, description = "Transição de status inválida")),
    security(("api_jwt" = []))
)]
pub async fn approve_expense(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ExpenseDecisionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.expense_service.approve(&id, &payload.note, &actor).await?;
    Ok((StatusCode::OK, Json(expense)))
}

// POST /api/expenses/{id}/reject
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/reject",
    tag = "Expenses",
    params(("id" = String, Path)),
    request_body = ReasonPayload,
    responses((status = 200, body = Expense), (status = 400, description = "Motivo obrigatório")),
    security(("api_jwt" = []))
)]
pub async fn reject_expense(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.expense_service.reject(&id, &payload.reason, &actor).await?;
    Ok((StatusCode::OK, Json(expense)))
}

// POST /api/expenses/{id}/review
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/review",
    tag = "Expenses",
    params(("id" = String, Path)),
    request_body = ExpenseDecisionPayload,
    responses((status = 200, body = Expense)),
    security(("api_jwt" = []))
)]
pub async fn review_expense(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ExpenseDecisionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.expense_service.mark_under_review(&id, &payload.note, &actor).await?;
    Ok((StatusCode::OK, Json(expense)))
}

// POST /api/expenses/{id}/check-request
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/check-request",
    tag = "Expenses",
    params(("id" = String, Path)),
    responses(
        (status = 200, description = "Pedido de cheque gerado; despesa pronta para pagamento", body = Expense),
        (status = 409, description = "Despesa não aprovada")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_check_request(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.expense_service.generate_check_request(&id, &actor).await?;
    Ok((StatusCode::OK, Json(expense)))
}

// POST /api/expenses/{id}/release
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/release",
    tag = "Expenses",
    params(("id" = String, Path)),
    responses((status = 200, body = ReleasedCheck), (status = 409, description = "Sem pedido de cheque liberável")),
    security(("api_jwt" = []))
)]
pub async fn authorize_release(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let released = app_state.expense_service.authorize_release(&id, &actor).await?;
    Ok((StatusCode::OK, Json(released)))
}

// DELETE /api/expenses/{id}
#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = String, Path)),
    request_body = ReasonPayload,
    responses((status = 200, body = Expense), (status = 400, description = "Motivo obrigatório")),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let removed = app_state.expense_service.delete(&id, &payload.reason, &actor).await?;
    Ok((StatusCode::OK, Json(removed)))
}
