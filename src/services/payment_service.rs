// src/services/payment_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, ids},
    db::{RecordRepository, Store, Transaction},
    models::{
        payment::{
            AssignCollectorPayload, BulkPaymentPayload, Collector, DailyBreakdown, Payment, PaymentType,
            ReceiptType, RecordPaymentPayload,
        },
        stall::Stall,
        tenant::Tenant,
    },
};

const WALK_IN_PATRON: &str = "Walk-in Customer";
const PUBLIC_FACILITY: &str = "Public Facility";
const NOT_APPLICABLE: &str = "N/A";

#[derive(Clone)]
pub struct PaymentService {
    store: Store,
    payments: RecordRepository<Payment>,
    tenants: RecordRepository<Tenant>,
    stalls: RecordRepository<Stall>,
    collectors: RecordRepository<Collector>,
}

impl PaymentService {
    pub fn new(store: Store) -> Self {
        Self {
            payments: RecordRepository::new(store.clone()),
            tenants: RecordRepository::new(store.clone()),
            stalls: RecordRepository::new(store.clone()),
            collectors: RecordRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, payment_type: Option<PaymentType>, tenant_id: Option<&str>) -> Result<Vec<Payment>, AppError> {
        Ok(self
            .payments
            .list()
            .await?
            .into_iter()
            .filter(|p| payment_type.is_none_or(|t| p.payment_type == t))
            .filter(|p| tenant_id.is_none_or(|t| p.tenant_id == t))
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Payment, AppError> {
        self.payments.get(id).await
    }

    pub async fn record(&self, payload: RecordPaymentPayload, actor: &str) -> Result<Payment, AppError> {
        if payload.receipt_type == ReceiptType::Manual {
            return Err(AppError::InvalidInput("Manual receipts are only issued through bulk entry.".into()));
        }
        let payment_type = payload.payment_type;
        let tenant_id = payload.tenant_id.trim();
        if payment_type.requires_tenant() && tenant_id.is_empty() {
            return Err(AppError::InvalidInput("Please select a tenant for this payment type.".into()));
        }

        let amount = payload.breakdown.total();
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput("Please enter valid payment amounts.".into()));
        }

        let mut tx = self.store.begin().await;
        let collector = self.collector_in(&mut tx, &payload.collector_id).await?;

        let (tenant_id, tenant_name, stall_id, stall_name) = if payment_type.requires_tenant() {
            let tenant = self.tenants.get_in(&mut tx, tenant_id).await?;
            let stall_id = match payload.stall_id.trim() {
                "" => tenant.stall_id.clone(),
                chosen => chosen.to_string(),
            };
            let stall_name = self
                .stalls
                .list_in(&mut tx)
                .await?
                .into_iter()
                .find(|s| s.id == stall_id)
                .map(|s| format!("{} - {}", s.id, s.location))
                .unwrap_or_else(|| stall_id.clone());
            (tenant.id, tenant.name, stall_id, stall_name)
        } else {
            let patron = match payload.patron_name.trim() {
                "" => WALK_IN_PATRON.to_string(),
                name => name.to_string(),
            };
            (
                NOT_APPLICABLE.to_string(),
                patron,
                NOT_APPLICABLE.to_string(),
                PUBLIC_FACILITY.to_string(),
            )
        };

        let existing = self.payments.list_in(&mut tx).await?;
        let prefix = payload.receipt_type.prefix();
        let sequence = ids::next_sequence(prefix, existing.iter().map(|p| p.receipt_number.as_str()));

        let payment = Payment {
            id: String::new(),
            receipt_number: ids::sequence_id(prefix, sequence, 5),
            receipt_type: payload.receipt_type,
            tenant_id,
            tenant_name,
            stall_id,
            stall_name,
            payment_type,
            payment_type_label: payment_type.label().to_string(),
            date: Some(Utc::now()),
            amount,
            breakdown: payload.breakdown,
            method: default_if_blank(payload.method, "Cash"),
            collector_id: collector.id,
            collector_name: collector.name,
            status: "completed".into(),
            category: payment_type.category(),
            is_manual: false,
        };

        let payment = self.payments.create(&mut tx, payment).await?;
        tx.commit().await?;

        tracing::info!(receipt = %payment.receipt_number, %amount, actor, "💰 Pagamento registrado");
        Ok(payment)
    }

    /// Lançamento manual em lote, sem recibo numerado. Tudo ou nada.
    pub async fn record_bulk(&self, payload: BulkPaymentPayload, actor: &str) -> Result<Vec<Payment>, AppError> {
        if payload.entries.is_empty() {
            return Err(AppError::InvalidInput("Please upload or enter payment data first.".into()));
        }

        let mut tx = self.store.begin().await;
        let now = Utc::now();
        let mut payments = Vec::with_capacity(payload.entries.len());
        for (row, entry) in payload.entries.into_iter().enumerate() {
            let amount = entry.amount.unwrap_or_else(|| entry.breakdown.total());
            if amount <= Decimal::ZERO {
                return Err(AppError::InvalidInput(format!(
                    "Row {}: please enter valid payment amounts.",
                    row + 1
                )));
            }

            let collector = self.collector_in(&mut tx, &entry.collector_id).await.map_err(|err| match err {
                AppError::InvalidInput(msg) => AppError::InvalidInput(format!("Row {}: {}", row + 1, msg)),
                other => other,
            })?;

            let payment_type = entry.payment_type;
            payments.push(Payment {
                id: String::new(),
                receipt_number: ReceiptType::Manual.prefix().to_string(),
                receipt_type: ReceiptType::Manual,
                tenant_id: NOT_APPLICABLE.to_string(),
                tenant_name: default_if_blank(entry.tenant_name, WALK_IN_PATRON),
                stall_id: NOT_APPLICABLE.to_string(),
                stall_name: entry.stall_name,
                payment_type,
                payment_type_label: payment_type.label().to_string(),
                date: Some(now),
                amount,
                breakdown: entry.breakdown,
                method: default_if_blank(entry.method, "Cash"),
                collector_id: collector.id,
                collector_name: collector.name,
                status: "completed".into(),
                category: payment_type.category(),
                is_manual: true,
            });
        }

        let created = self.payments.create_many(&mut tx, payments).await?;
        tx.commit().await?;

        tracing::info!(count = created.len(), actor, "Pagamentos manuais lançados");
        Ok(created)
    }

    /// Totais do dia por tipo de cobrança.
    pub async fn daily_breakdown(&self, day: NaiveDate) -> Result<DailyBreakdown, AppError> {
        let mut breakdown = DailyBreakdown::default();
        let payments = self.payments.list().await?;

        for payment in payments.iter().filter(|p| p.date.is_some_and(|d| d.date_naive() == day)) {
            let amount = payment.amount;
            breakdown.total += amount;
            breakdown.count += 1;
            match payment.payment_type {
                PaymentType::Rent => breakdown.rent += amount,
                PaymentType::Rights => breakdown.rights += amount,
                PaymentType::Electricity => breakdown.electricity += amount,
                PaymentType::Water => breakdown.water += amount,
                _ => breakdown.other += amount,
            }
        }
        Ok(breakdown)
    }

    /// Cobradores gravados; sem nenhum, a escala padrão.
    pub async fn list_collectors(&self) -> Result<Vec<Collector>, AppError> {
        let stored = self.collectors.list().await?;
        Ok(if stored.is_empty() { Collector::defaults() } else { stored })
    }

    /// Muda a área (e o tipo de cobrança) de um cobrador.
    pub async fn assign_collector(&self, id: &str, payload: AssignCollectorPayload) -> Result<Collector, AppError> {
        let area = payload.area.trim();
        if area.is_empty() {
            return Err(AppError::MissingFields(vec!["area".into()]));
        }

        let mut tx = self.store.begin().await;
        if self.collectors.list_in(&mut tx).await?.is_empty() {
            self.collectors.create_many(&mut tx, Collector::defaults()).await?;
        }
        let collector = self
            .collectors
            .update(&mut tx, id, |collector| {
                collector.area = area.to_string();
                if let Some(kind) = payload.collection_type.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
                    collector.collection_type = kind.to_string();
                }
                Ok(())
            })
            .await?;
        tx.commit().await?;

        tracing::info!(collector_id = %collector.id, area, "Cobrador designado");
        Ok(collector)
    }

    // Em branco vale o primeiro da escala; um ID fora dela é recusado
    async fn collector_in(&self, tx: &mut Transaction, id: &str) -> Result<Collector, AppError> {
        let stored = self.collectors.list_in(tx).await?;
        let roster = if stored.is_empty() { Collector::defaults() } else { stored };
        let id = id.trim();

        let found = if id.is_empty() {
            roster.into_iter().next()
        } else {
            roster.into_iter().find(|c| c.id == id)
        };
        found.ok_or_else(|| match id {
            "" => AppError::InvalidInput("Please fill in all required fields.".into()),
            unknown => AppError::InvalidInput(format!("Collector {unknown} is not registered.")),
        })
    }

    pub async fn delete(&self, id: &str, reason: &str, actor: &str) -> Result<Payment, AppError> {
        let mut tx = self.store.begin().await;
        let removed = self.payments.delete(&mut tx, id, reason, actor).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

fn default_if_blank(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::Collection,
        models::{
            audit::DeletionRecord,
            payment::{ManualPaymentEntry, PaymentBreakdown, PaymentCategory},
        },
    };

    async fn service() -> (Store, PaymentService) {
        let store = Store::in_memory();
        let tenant: Tenant = serde_json::from_value(serde_json::json!({
            "id": "TEN-2025-042",
            "name": "Ana Cruz",
            "stallId": "ST-010",
        }))
        .unwrap();
        store.save(Collection::Tenants, &[tenant]).await.unwrap();
        (store.clone(), PaymentService::new(store))
    }

    fn rent(amount: i64) -> RecordPaymentPayload {
        RecordPaymentPayload {
            payment_type: PaymentType::Rent,
            tenant_id: "TEN-2025-042".into(),
            breakdown: PaymentBreakdown {
                rent: Decimal::from(amount),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn tenant_payment_uses_tenant_details_and_receipt_sequence() {
        let (_, service) = service().await;
        let first = service.record(rent(5000), "Collector").await.unwrap();
        let second = service.record(rent(250), "Collector").await.unwrap();

        assert_eq!(first.receipt_number, "AR-00001");
        assert_eq!(second.receipt_number, "AR-00002");
        assert_eq!(first.tenant_name, "Ana Cruz");
        assert_eq!(first.stall_id, "ST-010");
        assert_eq!(first.amount, Decimal::from(5000));
        assert_eq!(first.category, PaymentCategory::Tenant);
        assert_eq!(first.payment_type_label, "Rent Payment");

        let mut official = rent(100);
        official.receipt_type = ReceiptType::Official;
        assert_eq!(service.record(official, "Collector").await.unwrap().receipt_number, "OR-00001");
    }

    #[tokio::test]
    async fn public_payment_defaults_to_walk_in() {
        let (_, service) = service().await;
        let payment = service
            .record(
                RecordPaymentPayload {
                    payment_type: PaymentType::Parking,
                    breakdown: PaymentBreakdown {
                        others: Decimal::from(40),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                "Collector",
            )
            .await
            .unwrap();

        assert_eq!(payment.tenant_name, "Walk-in Customer");
        assert_eq!(payment.stall_id, "N/A");
        assert_eq!(payment.stall_name, "Public Facility");
    }

    #[tokio::test]
    async fn invalid_payments_are_refused() {
        let (_, service) = service().await;

        let err = service.record(rent(0), "Collector").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter valid payment amounts.");

        let mut no_tenant = rent(100);
        no_tenant.tenant_id.clear();
        assert!(matches!(service.record(no_tenant, "Collector").await, Err(AppError::InvalidInput(_))));

        let mut unknown = rent(100);
        unknown.tenant_id = "TEN-1999-000".into();
        assert!(matches!(service.record(unknown, "Collector").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn daily_breakdown_and_bulk_entry() {
        let (_, service) = service().await;
        service.record(rent(5000), "Collector").await.unwrap();
        service
            .record_bulk(
                BulkPaymentPayload {
                    entries: vec![
                        ManualPaymentEntry {
                            tenant_name: "Pedro Reyes".into(),
                            payment_type: PaymentType::Water,
                            amount: Some(Decimal::from(300)),
                            ..Default::default()
                        },
                        ManualPaymentEntry {
                            payment_type: PaymentType::Restroom,
                            breakdown: PaymentBreakdown {
                                others: Decimal::from(10),
                                ..Default::default()
                            },
                            ..Default::default()
                        },
                    ],
                },
                "Collector",
            )
            .await
            .unwrap();

        let today = service.daily_breakdown(Utc::now().date_naive()).await.unwrap();
        assert_eq!(today.count, 3);
        assert_eq!(today.rent, Decimal::from(5000));
        assert_eq!(today.water, Decimal::from(300));
        assert_eq!(today.other, Decimal::from(10));
        assert_eq!(today.total, Decimal::from(5310));

        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        assert_eq!(service.daily_breakdown(yesterday).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn bulk_entry_is_all_or_nothing() {
        let (_, service) = service().await;
        let result = service
            .record_bulk(
                BulkPaymentPayload {
                    entries: vec![
                        ManualPaymentEntry {
                            amount: Some(Decimal::from(100)),
                            ..Default::default()
                        },
                        ManualPaymentEntry::default(),
                    ],
                },
                "Collector",
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(msg)) if msg.starts_with("Row 2")));
        assert!(service.list(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_records_reason() {
        let (store, service) = service().await;
        let payment = service.record(rent(5000), "Collector").await.unwrap();

        assert!(service.delete(&payment.id, "", "Admin").await.is_err());
        service.delete(&payment.id, "Wrong tenant", "Admin").await.unwrap();

        assert!(service.list(None, None).await.unwrap().is_empty());
        let log: Vec<DeletionRecord> = store.load(Collection::DeletionLog).await.unwrap();
        assert_eq!(log[0].collection, "paymentHistory");
        assert_eq!(log[0].reason, "Wrong tenant");
    }

    #[tokio::test]
    async fn payments_are_tied_to_a_registered_collector() {
        let (_, service) = service().await;

        let default = service.record(rent(100), "Clerk").await.unwrap();
        assert_eq!(default.collector_id, "C-001");
        assert_eq!(default.collector_name, "Juan Dela Cruz");

        let mut chosen = rent(100);
        chosen.collector_id = " C-003 ".into();
        assert_eq!(service.record(chosen, "Clerk").await.unwrap().collector_name, "Pedro Reyes");

        let mut unknown = rent(100);
        unknown.collector_id = "C-404".into();
        let err = service.record(unknown, "Clerk").await.unwrap_err();
        assert_eq!(err.to_string(), "Collector C-404 is not registered.");

        let bulk = service
            .record_bulk(
                BulkPaymentPayload {
                    entries: vec![
                        ManualPaymentEntry {
                            amount: Some(Decimal::from(50)),
                            collector_id: "C-002".into(),
                            ..Default::default()
                        },
                        ManualPaymentEntry {
                            amount: Some(Decimal::from(50)),
                            collector_id: "C-404".into(),
                            ..Default::default()
                        },
                    ],
                },
                "Clerk",
            )
            .await;
        assert!(matches!(bulk, Err(AppError::InvalidInput(msg)) if msg == "Row 2: Collector C-404 is not registered."));
        assert_eq!(service.list(None, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn assigning_an_area_persists_the_roster() {
        let (store, service) = service().await;
        assert_eq!(service.list_collectors().await.unwrap().len(), 3);

        let blank = service.assign_collector("C-002", AssignCollectorPayload::default()).await;
        assert!(matches!(blank, Err(AppError::MissingFields(_))));
        let missing = service
            .assign_collector(
                "C-404",
                AssignCollectorPayload {
                    area: "Stall Area C".into(),
                    collection_type: None,
                },
            )
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let moved = service
            .assign_collector(
                "C-002",
                AssignCollectorPayload {
                    area: "Stall Area C".into(),
                    collection_type: Some("special".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.area, "Stall Area C");
        assert_eq!(moved.collection_type, "special");

        let stored: Vec<Collector> = store.load(Collection::Collectors).await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[1], moved);
        assert_eq!(stored[0].collection_type, "regular");

        // Com a escala gravada, só ela vale
        store.save(Collection::Collectors, &[stored[1].clone()]).await.unwrap();
        let payment = service.record(rent(100), "Clerk").await.unwrap();
        assert_eq!(payment.collector_id, "C-002");
        let mut gone = rent(100);
        gone.collector_id = "C-001".into();
        assert!(service.record(gone, "Clerk").await.is_err());
    }
}
