// src/services/inventory_service.rs

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, money::format_peso},
    db::{RecordRepository, Store, Transaction},
    models::inventory::{
        AdjustInventoryPayload, AdjustmentType, CreateInventoryItemPayload, CreatePurchaseOrderPayload,
        DEFAULT_MIN_STOCK, InventoryAdjustment, InventoryItem, InventoryItemView, InventorySummary,
        PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, StockStatus,
    },
};

const UNKNOWN_ITEM: &str = "Unknown";

#[derive(Clone)]
pub struct InventoryService {
    store: Store,
    items: RecordRepository<InventoryItem>,
    adjustments: RecordRepository<InventoryAdjustment>,
    orders: RecordRepository<PurchaseOrder>,
}

impl InventoryService {
    pub fn new(store: Store) -> Self {
        Self {
            items: RecordRepository::new(store.clone()),
            adjustments: RecordRepository::new(store.clone()),
            orders: RecordRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, search: Option<&str>, low_stock_only: bool) -> Result<Vec<InventoryItemView>, AppError> {
        let query = search.map(|q| q.trim().to_lowercase()).unwrap_or_default();
        Ok(self
            .items
            .list()
            .await?
            .into_iter()
            .filter(|i| query.is_empty() || i.name.to_lowercase().contains(&query) || i.id.to_lowercase().contains(&query))
            .filter(|i| !low_stock_only || i.stock_status() != StockStatus::InStock)
            .map(InventoryItemView::from)
            .collect())
    }

    pub async fn summary(&self) -> Result<InventorySummary, AppError> {
        let items = self.items.list().await?;
        let total_value: Decimal = items.iter().map(InventoryItem::value).sum();

        Ok(InventorySummary {
            item_count: items.len(),
            low_stock_count: items.iter().filter(|i| i.stock_status() == StockStatus::LowStock).count(),
            out_of_stock_count: items.iter().filter(|i| i.stock_status() == StockStatus::OutOfStock).count(),
            total_value,
            total_value_display: format_peso(total_value),
        })
    }

    pub async fn add_item(&self, payload: CreateInventoryItemPayload) -> Result<InventoryItemView, AppError> {
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(AppError::MissingFields(vec!["name".into()]));
        }
        if payload.qty < 0 || payload.unit_price < Decimal::ZERO {
            return Err(AppError::InvalidInput("Quantity and unit price cannot be negative.".into()));
        }

        let item = InventoryItem {
            id: String::new(),
            name: name.to_string(),
            qty: payload.qty,
            unit_price: payload.unit_price,
            min_stock: if payload.min_stock > 0 { payload.min_stock } else { DEFAULT_MIN_STOCK },
        };

        let mut tx = self.store.begin().await;
        let item = self.items.create(&mut tx, item).await?;
        tx.commit().await?;

        tracing::info!(item_id = %item.id, "📦 Item de estoque cadastrado");
        Ok(item.into())
    }

    /// Entrada ou baixa de estoque, com o registro do ajuste no mesmo lote.
    pub async fn adjust(&self, id: &str, payload: AdjustInventoryPayload, actor: &str) -> Result<InventoryAdjustment, AppError> {
        if payload.quantity <= 0 {
            return Err(AppError::InvalidInput("Please enter a valid quantity".into()));
        }
        let reason = payload.reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidInput("Please enter a reason for adjustment".into()));
        }

        let delta = match payload.adjustment_type {
            AdjustmentType::Add => payload.quantity,
            AdjustmentType::Subtract => -payload.quantity,
        };

        let mut tx = self.store.begin().await;
        let mut previous_qty = 0;
        let item = self
            .items
            .update(&mut tx, id, |item| {
                let new_qty = item
                    .qty
                    .checked_add(delta)
                    .ok_or_else(|| AppError::InvalidInput("Quantity is out of range".into()))?;
                if new_qty < 0 {
                    return Err(AppError::InvalidInput("Cannot adjust below 0 quantity".into()));
                }
                previous_qty = item.qty;
                item.qty = new_qty;
                Ok(())
            })
            .await?;

        let adjustment = self
            .adjustments
            .create(
                &mut tx,
                InventoryAdjustment {
                    id: String::new(),
                    item_id: item.id.clone(),
                    item_name: item.name.clone(),
                    previous_qty,
                    new_qty: item.qty,
                    adjustment: delta,
                    reason: reason.to_string(),
                    date: Some(Utc::now()),
                    adjustment_type: payload.adjustment_type,
                    adjusted_by: actor.to_string(),
                },
            )
            .await?;
        tx.commit().await?;

        tracing::info!(item_id = %item.id, delta, "Estoque ajustado");
        Ok(adjustment)
    }

    pub async fn list_adjustments(&self, item_id: Option<&str>) -> Result<Vec<InventoryAdjustment>, AppError> {
        let adjustments = self.adjustments.list().await?;
        Ok(match item_id {
            Some(id) => adjustments.into_iter().filter(|a| a.item_id == id).collect(),
            None => adjustments,
        })
    }

    pub async fn delete_adjustment(&self, id: &str, reason: &str, actor: &str) -> Result<InventoryAdjustment, AppError> {
        let mut tx = self.store.begin().await;
        let removed = self.adjustments.delete(&mut tx, id, reason, actor).await?;
        tx.commit().await?;
        Ok(removed)
    }

    pub async fn list_purchase_orders(&self, status: Option<PurchaseOrderStatus>) -> Result<Vec<PurchaseOrder>, AppError> {
        Ok(self
            .orders
            .list()
            .await?
            .into_iter()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .collect())
    }

    pub async fn create_purchase_order(&self, payload: CreatePurchaseOrderPayload) -> Result<PurchaseOrder, AppError> {
        let vendor = payload.vendor.trim();
        let date = match payload.date {
            Some(date) if !vendor.is_empty() && !payload.items.is_empty() => date,
            _ => {
                return Err(AppError::InvalidInput(
                    "Please fill vendor, date and add at least one item.".into(),
                ))
            }
        };

        let known = self.items.list().await?;
        let mut lines = Vec::with_capacity(payload.items.len());
        for line in payload.items {
            let item_id = line.item_id.trim();
            let price = match line.price {
                Some(price) if !item_id.is_empty() && line.qty > 0 && price >= Decimal::ZERO => price,
                _ => {
                    return Err(AppError::InvalidInput(
                        "Please complete all item rows (select item, qty > 0, price).".into(),
                    ))
                }
            };

            let name = known
                .iter()
                .find(|i| i.id == item_id)
                .map(|i| i.name.clone())
                .unwrap_or_else(|| line.name.trim().to_string());
            lines.push(PurchaseOrderLine {
                item_id: item_id.to_string(),
                name,
                qty: line.qty,
                price,
                line_total: Decimal::from(line.qty) * price,
            });
        }

        let order = PurchaseOrder {
            id: String::new(),
            vendor: vendor.to_string(),
            date: Some(date),
            total: lines.iter().map(|l| l.line_total).sum(),
            items: lines,
            status: PurchaseOrderStatus::Pending,
            created_at: Some(Utc::now()),
            received_at: None,
        };

        let mut tx = self.store.begin().await;
        let order = self.orders.create(&mut tx, order).await?;
        tx.commit().await?;

        tracing::info!(order_id = %order.id, total = %order.total, "🧾 Pedido de compra criado");
        Ok(order)
    }

    /// Dá entrada de todas as linhas no estoque e marca o pedido como recebido, num único lote.
    pub async fn receive_purchase_order(&self, id: &str, actor: &str) -> Result<PurchaseOrder, AppError> {
        let mut tx = self.store.begin().await;
        let now = Utc::now();
        let order = self
            .orders
            .update(&mut tx, id, |order| {
                if order.status != PurchaseOrderStatus::Pending {
                    return Err(AppError::Conflict(format!("Purchase order {} was already received", order.id)));
                }
                order.status = PurchaseOrderStatus::Received;
                order.received_at = Some(now);
                Ok(())
            })
            .await?;

        let reason = format!("Received {}", order.id);
        for line in &order.items {
            self.stock_in(&mut tx, line, &reason, actor).await?;
        }
        tx.commit().await?;

        tracing::info!(order_id = %order.id, lines = order.items.len(), "Pedido de compra recebido");
        Ok(order)
    }

    // Soma a linha ao item existente ou cadastra um novo com o ID do pedido
    async fn stock_in(&self, tx: &mut Transaction, line: &PurchaseOrderLine, reason: &str, actor: &str) -> Result<(), AppError> {
        let existing = self.items.list_in(tx).await?.into_iter().find(|i| i.id == line.item_id);
        let (item, previous_qty) = match existing {
            Some(current) => {
                let item = self
                    .items
                    .update(tx, &line.item_id, |item| {
                        item.qty = item
                            .qty
                            .checked_add(line.qty)
                            .ok_or_else(|| AppError::InvalidInput("Quantity is out of range".into()))?;
                        Ok(())
                    })
                    .await?;
                (item, current.qty)
            }
            None => {
                let name = match line.name.trim() {
                    "" => UNKNOWN_ITEM.to_string(),
                    name => name.to_string(),
                };
                let item = InventoryItem {
                    id: line.item_id.clone(),
                    name,
                    qty: line.qty,
                    unit_price: line.price,
                    min_stock: DEFAULT_MIN_STOCK,
                };
                (self.items.create(tx, item).await?, 0)
            }
        };

        self.adjustments
            .create(
                tx,
                InventoryAdjustment {
                    id: String::new(),
                    item_id: item.id.clone(),
                    item_name: item.name.clone(),
                    previous_qty,
                    new_qty: item.qty,
                    adjustment: line.qty,
                    reason: reason.to_string(),
                    date: Some(Utc::now()),
                    adjustment_type: AdjustmentType::Add,
                    adjusted_by: actor.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    /// Cancela um pedido ainda pendente; fica registrado no `deletionLog`.
    pub async fn cancel_purchase_order(&self, id: &str, reason: &str, actor: &str) -> Result<PurchaseOrder, AppError> {
        let mut tx = self.store.begin().await;
        let order = self.orders.get_in(&mut tx, id).await?;
        if order.status != PurchaseOrderStatus::Pending {
            return Err(AppError::Conflict(format!("Purchase order {} was already received", order.id)));
        }
        let removed = self.orders.delete(&mut tx, id, reason, actor).await?;
        tx.commit().await?;
        Ok(removed)
    }
}
