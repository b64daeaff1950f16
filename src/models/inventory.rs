// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::lenient;

pub const DEFAULT_MIN_STOCK: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[schema(example = "ITEM-001")]
    pub id: String,

    #[serde(default)]
    #[schema(example = "Rice (25kg)")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::quantity")]
    pub qty: i64,

    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub unit_price: Decimal,

    #[serde(default = "default_min_stock", deserialize_with = "lenient::quantity")]
    pub min_stock: i64,
}

fn default_min_stock() -> i64 {
    DEFAULT_MIN_STOCK
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum StockStatus {
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "In Stock")]
    InStock,
}

impl InventoryItem {
    pub fn stock_status(&self) -> StockStatus {
        if self.qty <= 0 {
            StockStatus::OutOfStock
        } else if self.qty <= self.min_stock {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn value(&self) -> Decimal {
        Decimal::from(self.qty) * self.unit_price
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    #[default]
    Add,
    Subtract,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAdjustment {
    pub id: String,
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub previous_qty: i64,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub new_qty: i64,
    /// Variação com sinal: negativa numa baixa.
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub adjustment: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    pub adjustment_type: AdjustmentType,
    #[serde(default)]
    pub adjusted_by: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInventoryItemPayload {
    pub name: String,
    #[serde(deserialize_with = "lenient::quantity")]
    pub qty: i64,
    #[serde(deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    #[serde(deserialize_with = "lenient::quantity")]
    pub min_stock: i64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AdjustInventoryPayload {
    #[serde(deserialize_with = "lenient::quantity")]
    pub quantity: i64,
    pub reason: String,
    #[serde(rename = "type")]
    pub adjustment_type: AdjustmentType,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub stock_status: StockStatus,
    #[schema(value_type = f64)]
    pub total_value: Decimal,
}

impl From<InventoryItem> for InventoryItemView {
    fn from(item: InventoryItem) -> Self {
        Self {
            stock_status: item.stock_status(),
            total_value: item.value(),
            item,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub item_count: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    #[schema(value_type = f64)]
    pub total_value: Decimal,
    pub total_value_display: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PurchaseOrderStatus {
    #[default]
    Pending,
    Received,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    #[schema(example = "ITEM-001")]
    pub item_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub qty: i64,
    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub line_total: Decimal,
}

/// Pedido de compra a fornecedor. Só entra no estoque quando recebido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[schema(example = "PO-0001")]
    pub id: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default, deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>, example = "2025-03-01")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<PurchaseOrderLine>,
    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(value_type = f64)]
    pub total: Decimal,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseOrderLinePayload {
    pub item_id: String,
    /// Nome do item novo; itens já cadastrados usam o nome do estoque.
    pub name: String,
    #[serde(deserialize_with = "lenient::quantity")]
    pub qty: i64,
    #[serde(deserialize_with = "lenient::opt_amount")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePurchaseOrderPayload {
    #[schema(example = "Manila Rice Traders")]
    pub vendor: String,
    #[serde(deserialize_with = "lenient::date")]
    #[schema(value_type = Option<String>, example = "2025-03-01")]
    pub date: Option<NaiveDate>,
    pub items: Vec<PurchaseOrderLinePayload>,
}
