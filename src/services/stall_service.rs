// src/services/stall_service.rs

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::{LeaseRepository, RecordRepository, Store},
    models::stall::{Stall, StallPayload, StallStatus},
};

#[derive(Clone)]
pub struct StallService {
    store: Store,
    stalls: RecordRepository<Stall>,
    leases: LeaseRepository,
}

impl StallService {
    pub fn new(store: Store) -> Self {
        Self {
            stalls: RecordRepository::new(store.clone()),
            leases: LeaseRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Stall>, AppError> {
        let stalls = self.stalls.list().await?;
        Ok(match search {
            Some(query) => stalls.into_iter().filter(|s| s.matches(query)).collect(),
            None => stalls,
        })
    }

    /// Bancas que podem receber locação: nem inativas, nem em manutenção, e sem
    /// contrato ativo. A ocupação vem dos contratos, não do campo `status`.
    pub async fn available(&self) -> Result<Vec<Stall>, AppError> {
        let leases = self.leases.list().await?;
        Ok(self
            .stalls
            .list()
            .await?
            .into_iter()
            .filter(|s| s.status.is_leasable())
            .filter(|s| !leases.iter().any(|l| l.occupies(&s.id)))
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Stall, AppError> {
        self.stalls.get(id).await
    }

    pub async fn create(&self, payload: StallPayload) -> Result<Stall, AppError> {
        let mut missing = Vec::new();
        if payload.stall_type.as_deref().is_none_or(|t| t.trim().is_empty()) {
            missing.push("type".to_string());
        }
        if payload.location.as_deref().is_none_or(|l| l.trim().is_empty()) {
            missing.push("location".to_string());
        }
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }

        let now = Utc::now();
        let explicit_id = payload.id.clone().unwrap_or_default().trim().to_string();
        let mut stall = Stall::blank(explicit_id);
        payload.apply_to(&mut stall);
        stall.date_added = Some(now);
        stall.last_updated = Some(now);

        let mut tx = self.store.begin().await;
        let stall = self.stalls.create(&mut tx, stall).await?;
        tx.commit().await?;

        tracing::info!(stall_id = %stall.id, "🏪 Banca cadastrada");
        Ok(stall)
    }

    pub async fn update(&self, id: &str, payload: StallPayload) -> Result<Stall, AppError> {
        let blank_required = payload.stall_type.as_deref().is_some_and(|t| t.trim().is_empty())
            || payload.location.as_deref().is_some_and(|l| l.trim().is_empty());
        if blank_required {
            return Err(AppError::InvalidInput("Type and Location are required.".into()));
        }

        let mut tx = self.store.begin().await;
        let stall = self
            .stalls
            .update(&mut tx, id, |stall| {
                payload.apply_to(stall);
                stall.last_updated = Some(Utc::now());
                Ok(())
            })
            .await?;
        tx.commit().await?;
        Ok(stall)
    }

    /// Exclusão lógica: a banca fica `Inactive` e continua referenciável.
    pub async fn deactivate(&self, id: &str) -> Result<Stall, AppError> {
        let mut tx = self.store.begin().await;
        let stall = self
            .stalls
            .update(&mut tx, id, |stall| {
                stall.status = StallStatus::Inactive;
                stall.last_updated = Some(Utc::now());
                Ok(())
            })
            .await?;
        tx.commit().await?;

        tracing::info!(stall_id = %stall.id, "Banca desativada");
        Ok(stall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{Collection, MemoryStore},
        models::{
            lease::{LeaseRequest, LeaseStatus},
            stall::ElectricityType,
        },
    };

    fn payload(stall_type: &str, location: &str) -> StallPayload {
        StallPayload {
            stall_type: Some(stall_type.into()),
            location: Some(location.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_numbers_stalls_and_requires_type_and_location() {
        let service = StallService::new(Store::in_memory());

        let first = service.create(payload("Food", "A1")).await.unwrap();
        let second = service.create(payload("Dry Goods", "A2")).await.unwrap();
        assert_eq!(first.id, "ST-001");
        assert_eq!(second.id, "ST-002");
        assert_eq!(first.status, StallStatus::Available);
        assert!(first.date_added.is_some());

        let err = service.create(payload("", "A3")).await.unwrap_err();
        assert!(matches!(err, AppError::MissingFields(f) if f == vec!["type"]));

        let mut duplicate = payload("Food", "A4");
        duplicate.id = Some("ST-001".into());
        assert!(matches!(service.create(duplicate).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn delete_is_soft_and_update_is_partial() {
        let service = StallService::new(Store::in_memory());
        let stall = service.create(payload("Food", "A1")).await.unwrap();

        let updated = service
            .update(
                &stall.id,
                StallPayload {
                    electricity_type: Some(ElectricityType::Metered),
                    has_electricity: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location, "A1");
        assert_eq!(updated.utilities.electricity_type, ElectricityType::Metered);

        let removed = service.deactivate(&stall.id).await.unwrap();
        assert_eq!(removed.status, StallStatus::Inactive);
        assert_eq!(service.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn availability_follows_active_leases() {
        let store = Store::in_memory();
        let service = StallService::new(store.clone());
        for location in ["A1", "A2", "A3"] {
            service.create(payload("Food", location)).await.unwrap();
        }
        service
            .update("ST-003", StallPayload { status: Some(StallStatus::UnderMaintenance), ..Default::default() })
            .await
            .unwrap();

        let lease: LeaseRequest = serde_json::from_value(serde_json::json!({
            "id": "LEASE-1",
            "status": LeaseStatus::Active,
            "stallId": "ST-001",
        }))
        .unwrap();
        store.save(Collection::Leases, &[lease]).await.unwrap();

        let available: Vec<String> = service.available().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(available, vec!["ST-002"]);
    }

    #[tokio::test]
    async fn search_covers_text_and_utilities() {
        let service = StallService::new(Store::in_memory());
        let mut wet = payload("Fish", "Wet Section");
        wet.has_water = Some(true);
        service.create(wet).await.unwrap();
        service.create(payload("Food", "B2")).await.unwrap();

        assert_eq!(service.list(Some("water")).await.unwrap().len(), 1);
        assert_eq!(service.list(Some("FISH")).await.unwrap().len(), 1);
        assert_eq!(service.list(Some("  ")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unexpected_stored_values_never_wipe_the_collection() {
        let backend = MemoryStore::default();
        backend.put_raw(
            Collection::Stalls,
            r#"[
                {"id": "ST-001", "type": "Food", "location": "C1", "status": "Available"},
                {"id": "ST-002", "type": "Food", "location": "C2", "status": "Closed"},
                {"id": "ST-004", "type": "Meat", "location": "B4", "capacity": "lots"}
            ]"#,
        );
        let store = Store::new(backend);
        let service = StallService::new(store.clone());

        let listed = service.list(None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].status, StallStatus::Unknown);

        let created = service.create(payload("Meat", "B1")).await.unwrap();
        assert_eq!(created.id, "ST-005");

        let raw: Vec<serde_json::Value> = store.load(Collection::Stalls).await.unwrap();
        let ids: Vec<&str> = raw.iter().filter_map(|s| s["id"].as_str()).collect();
        assert_eq!(ids, ["ST-001", "ST-002", "ST-005", "ST-004"]);
        assert_eq!(raw[3]["capacity"], "lots");

        let available: Vec<String> = service.available().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(available, vec!["ST-001", "ST-005"]);
    }
}
