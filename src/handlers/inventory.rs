// src/handlers/inventory.rs

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
    models::{
        finance::ReasonPayload,
        inventory::{
            AdjustInventoryPayload, CreateInventoryItemPayload, CreatePurchaseOrderPayload, InventoryAdjustment,
            InventoryItemView, InventorySummary, PurchaseOrder, PurchaseOrderStatus,
        },
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default, rename_all = "camelCase")]
pub struct InventoryQuery {
    /// Busca por nome ou ID do item
    pub search: Option<String>,
    /// Só itens com estoque baixo ou zerado
    pub low_stock: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default, rename_all = "camelCase")]
pub struct AdjustmentQuery {
    pub item_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct PurchaseOrderQuery {
    pub status: Option<PurchaseOrderStatus>,
}

// GET /api/inventory
#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "Inventory",
    params(InventoryQuery),
    responses((status = 200, body = Vec<InventoryItemView>)),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state
        .inventory_service
        .list(query.search.as_deref(), query.low_stock)
        .await?;
    Ok((StatusCode::OK, Json(items)))
}

// GET /api/inventory/summary
#[utoipa::path(
    get,
    path = "/api/inventory/summary",
    tag = "Inventory",
    responses((status = 200, body = InventorySummary)),
    security(("api_jwt" = []))
)]
pub async fn get_summary(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.inventory_service.summary().await?;
    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/inventory
#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "Inventory",
    request_body = CreateInventoryItemPayload,
    responses((status = 201, body = InventoryItemView), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateInventoryItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.inventory_service.add_item(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// POST /api/inventory/{id}/adjust
#[utoipa::path(
    post,
    path = "/api/inventory/{id}/adjust",
    tag = "Inventory",
    params(("id" = String, Path, example = "ITEM-001")),
    request_body = AdjustInventoryPayload,
    responses(
        (status = 201, description = "Ajuste registrado", body = InventoryAdjustment),
        (status = 400, description = "Quantidade ou motivo inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<AdjustInventoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let adjustment = app_state.inventory_service.adjust(&id, payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

// GET /api/inventory/adjustments
#[utoipa::path(
    get,
    path = "/api/inventory/adjustments",
    tag = "Inventory",
    params(AdjustmentQuery),
    responses((status = 200, body = Vec<InventoryAdjustment>)),
    security(("api_jwt" = []))
)]
pub async fn list_adjustments(
    State(app_state): State<AppState>,
    Query(query): Query<AdjustmentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let adjustments = app_state
        .inventory_service
        .list_adjustments(query.item_id.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(adjustments)))
}

// DELETE /api/inventory/adjustments/{id}
#[utoipa::path(
    delete,
    path = "/api/inventory/adjustments/{id}",
    tag = "Inventory",
    params(("id" = String, Path)),
    request_body = ReasonPayload,
    responses((status = 200, body = InventoryAdjustment), (status = 400, description = "Motivo obrigatório")),
    security(("api_jwt" = []))
)]
pub async fn delete_adjustment(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let removed = app_state
        .inventory_service
        .delete_adjustment(&id, &payload.reason, &actor)
        .await?;
    Ok((StatusCode::OK, Json(removed)))
}

// GET /api/inventory/purchase-orders
#[utoipa::path(
    get,
    path = "/api/inventory/purchase-orders",
    tag = "Inventory",
    params(PurchaseOrderQuery),
    responses((status = 200, description = "Pedidos, do mais recente ao mais antigo", body = Vec<PurchaseOrder>)),
    security(("api_jwt" = []))
)]
pub async fn list_purchase_orders(
    State(app_state): State<AppState>,
    Query(query): Query<PurchaseOrderQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.inventory_service.list_purchase_orders(query.status).await?;
    Ok((StatusCode::OK, Json(orders)))
}

// POST /api/inventory/purchase-orders
#[utoipa::path(
    post,
    path = "/api/inventory/purchase-orders",
    tag = "Inventory",
    request_body = CreatePurchaseOrderPayload,
    responses((status = 201, body = PurchaseOrder), (status = 400, description = "Fornecedor, data ou linhas incompletos")),
    security(("api_jwt" = []))
)]
pub async fn create_purchase_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePurchaseOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.inventory_service.create_purchase_order(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

// POST /api/inventory/purchase-orders/{id}/receive
#[utoipa::path(
    post,
    path = "/api/inventory/purchase-orders/{id}/receive",
    tag = "Inventory",
    params(("id" = String, Path, example = "PO-0001")),
    responses(
        (status = 200, description = "Estoque atualizado e pedido recebido", body = PurchaseOrder),
        (status = 404, description = "Não encontrado"),
        (status = 409, description = "Pedido já recebido")
    ),
    security(("api_jwt" = []))
)]
pub async fn receive_purchase_order(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.inventory_service.receive_purchase_order(&id, &actor).await?;
    Ok((StatusCode::OK, Json(order)))
}

// DELETE /api/inventory/purchase-orders/{id}
#[utoipa::path(
    delete,
    path = "/api/inventory/purchase-orders/{id}",
    tag = "Inventory",
    params(("id" = String, Path)),
    request_body = ReasonPayload,
    responses(
        (status = 200, body = PurchaseOrder),
        (status = 400, description = "Motivo obrigatório"),
        (status = 409, description = "Pedido já recebido")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_purchase_order(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(payload): Json<ReasonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let removed = app_state
        .inventory_service
        .cancel_purchase_order(&id, &payload.reason, &actor)
        .await?;
    Ok((StatusCode::OK, Json(removed)))
}
