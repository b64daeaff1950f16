// src/db/record_repo.rs

use chrono::{Datelike, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

use crate::{
    common::{error::AppError, ids},
    db::record_store::{Collection, Store, Transaction},
    models::{
        audit::DeletionRecord,
        finance::{CheckRelease, CheckRequest, Expense},
        inventory::{InventoryAdjustment, InventoryItem, PurchaseOrder},
        payment::{Collector, Payment},
        stall::Stall,
        tenant::Tenant,
    },
};

/// Registro identificado por um ID textual dentro de uma coleção.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Nome usado nas mensagens de erro.
    const LABEL: &'static str;
    const ID_PREFIX: &'static str;
    /// Novos registros entram no início da lista.
    const NEWEST_FIRST: bool = true;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    /// Gera o ID de um novo registro fora de `taken`. O padrão é `<PREFIXO>-<uuid>`.
    fn next_id(_taken: &[String]) -> String {
        ids::record_id(Self::ID_PREFIX)
    }
}

// O repositório genérico, responsável pelas coleções de registros simples.
// Leituras avulsas usam o `Store`; escritas sempre recebem a transação do serviço.
pub struct RecordRepository<T> {
    store: Store,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> RecordRepository<T> {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<T>, AppError> {
        self.store.load(T::COLLECTION).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, AppError> {
        Ok(self.list().await?.into_iter().find(|r| r.id() == id))
    }

    pub async fn get(&self, id: &str) -> Result<T, AppError> {
        self.find(id).await?.ok_or_else(|| not_found::<T>(id))
    }

    pub async fn list_in(&self, tx: &mut Transaction) -> Result<Vec<T>, AppError> {
        tx.load(T::COLLECTION).await
    }

    pub async fn get_in(&self, tx: &mut Transaction, id: &str) -> Result<T, AppError> {
        self.list_in(tx)
            .await?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found::<T>(id))
    }

    /// Insere um registro. Sem ID, um novo é gerado; com ID explícito, duplicatas são recusadas.
    pub async fn create(&self, tx: &mut Transaction, record: T) -> Result<T, AppError> {
        let mut created = self.create_many(tx, vec![record]).await?;
        created.pop().ok_or_else(|| AppError::Storage("empty insert".into()))
    }

    pub async fn create_many(&self, tx: &mut Transaction, records: Vec<T>) -> Result<Vec<T>, AppError> {
        let mut all = self.list_in(tx).await?;
        // Registros ilegíveis continuam na coleção e seus IDs seguem reservados
        let mut taken: Vec<String> = all.iter().map(|r| r.id().to_string()).collect();
        taken.extend(tx.opaque_ids(T::COLLECTION));
        let mut created = Vec::with_capacity(records.len());

        for mut record in records {
            if record.id().trim().is_empty() {
                let id = T::next_id(&taken);
                record.set_id(id);
            } else if taken.iter().any(|id| id == record.id()) {
                return Err(AppError::Conflict(format!(
                    "{} with ID {} already exists",
                    T::LABEL,
                    record.id()
                )));
            }

            taken.push(record.id().to_string());
            if T::NEWEST_FIRST {
                all.insert(0, record.clone());
            } else {
                all.push(record.clone());
            }
            created.push(record);
        }

        tx.stage(T::COLLECTION, &all)?;
        Ok(created)
    }

    /// Aplica `change` ao registro e devolve a versão gravada. Se `change` falhar, nada é preparado.
    pub async fn update<F>(&self, tx: &mut Transaction, id: &str, change: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut T) -> Result<(), AppError>,
    {
        let mut all = self.list_in(tx).await?;
        let record = all
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;

        change(record)?;
        // O ID não muda numa edição
        record.set_id(id.to_string());
        let updated = record.clone();

        tx.stage(T::COLLECTION, &all)?;
        Ok(updated)
    }

    /// Exclusão física com motivo obrigatório, registrada no `deletionLog` no mesmo lote.
    pub async fn delete(&self, tx: &mut Transaction, id: &str, reason: &str, actor: &str) -> Result<T, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidInput("Please provide a reason for deletion.".into()));
        }

        let mut all = self.list_in(tx).await?;
        let position = all
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        let removed = all.remove(position);
        tx.stage(T::COLLECTION, &all)?;

        let entry = DeletionRecord {
            id: String::new(),
            collection: T::COLLECTION.name().to_string(),
            record_id: id.to_string(),
            reason: reason.to_string(),
            deleted_by: actor.to_string(),
            deleted_at: Some(Utc::now()),
            snapshot: serde_json::to_value(&removed)?,
        };
        RecordRepository::<DeletionRecord>::new(self.store.clone())
            .create(tx, entry)
            .await?;

        tracing::info!(collection = %T::COLLECTION, id, actor, "🗑️ Registro excluído");
        Ok(removed)
    }
}

fn not_found<T: Record>(id: &str) -> AppError {
    AppError::NotFound(format!("{} {} not found", T::LABEL, id))
}

// --- Registros concretos ---

impl Record for Stall {
    const COLLECTION: Collection = Collection::Stalls;
    const LABEL: &'static str = "Stall";
    const ID_PREFIX: &'static str = "ST";
    const NEWEST_FIRST: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    // Contador do próprio repositório: maior ST-NNN existente + 1
    fn next_id(taken: &[String]) -> String {
        let next = ids::next_sequence(Self::ID_PREFIX, taken.iter().map(String::as_str));
        ids::sequence_id(Self::ID_PREFIX, next, 3)
    }
}

impl Record for Tenant {
    const COLLECTION: Collection = Collection::Tenants;
    const LABEL: &'static str = "Tenant";
    const ID_PREFIX: &'static str = "TEN";
    const NEWEST_FIRST: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn next_id(taken: &[String]) -> String {
        let year = Utc::now().year();
        ids::tenant_id(year, &mut rand::thread_rng(), |candidate| {
            taken.iter().any(|id| id == candidate)
        })
    }
}

impl Record for Expense {
    const COLLECTION: Collection = Collection::Expenses;
    const LABEL: &'static str = "Expense";
    const ID_PREFIX: &'static str = "EXP";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for CheckRequest {
    const COLLECTION: Collection = Collection::CheckRequests;
    const LABEL: &'static str = "Check request";
    const ID_PREFIX: &'static str = "CHK";
    const NEWEST_FIRST: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for CheckRelease {
    const COLLECTION: Collection = Collection::CheckReleases;
    const LABEL: &'static str = "Check release";
    const ID_PREFIX: &'static str = "REL";
    const NEWEST_FIRST: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for InventoryItem {
    const COLLECTION: Collection = Collection::Inventory;
    const LABEL: &'static str = "Inventory item";
    const ID_PREFIX: &'static str = "ITEM";
    const NEWEST_FIRST: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn next_id(taken: &[String]) -> String {
        let next = ids::next_sequence(Self::ID_PREFIX, taken.iter().map(String::as_str));
        ids::sequence_id(Self::ID_PREFIX, next, 3)
    }
}

impl Record for InventoryAdjustment {
    const COLLECTION: Collection = Collection::InventoryAdjustments;
    const LABEL: &'static str = "Inventory adjustment";
    const ID_PREFIX: &'static str = "ADJ";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for PurchaseOrder {
    const COLLECTION: Collection = Collection::PurchaseOrders;
    const LABEL: &'static str = "Purchase order";
    const ID_PREFIX: &'static str = "PO";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn next_id(taken: &[String]) -> String {
        let next = ids::next_sequence(Self::ID_PREFIX, taken.iter().map(String::as_str));
        ids::sequence_id(Self::ID_PREFIX, next, 4)
    }
}

impl Record for Payment {
    const COLLECTION: Collection = Collection::Payments;
    const LABEL: &'static str = "Payment";
    const ID_PREFIX: &'static str = "PAY";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Collector {
    const COLLECTION: Collection = Collection::Collectors;
    const LABEL: &'static str = "Collector";
    const ID_PREFIX: &'static str = "C";
    const NEWEST_FIRST: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn next_id(taken: &[String]) -> String {
        let next = ids::next_sequence(Self::ID_PREFIX, taken.iter().map(String::as_str));
        ids::sequence_id(Self::ID_PREFIX, next, 3)
    }
}

impl Record for DeletionRecord {
    const COLLECTION: Collection = Collection::DeletionLog;
    const LABEL: &'static str = "Deletion record";
    const ID_PREFIX: &'static str = "DEL";

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
