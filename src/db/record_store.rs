// src/db/record_store.rs

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::common::error::AppError;

/// As coleções nomeadas persistidas. O nome é a chave no backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Stalls,
    Leases,
    LeaseRequests,
    ApprovedLeases,
    Tenants,
    Expenses,
    CheckRequests,
    CheckReleases,
    Inventory,
    InventoryAdjustments,
    PurchaseOrders,
    Payments,
    Collectors,
    Users,
    DeletionLog,
}

impl Collection {
    pub const ALL: [Collection; 15] = [
        Collection::Stalls,
        Collection::Leases,
        Collection::LeaseRequests,
        Collection::ApprovedLeases,
        Collection::Tenants,
        Collection::Expenses,
        Collection::CheckRequests,
        Collection::CheckReleases,
        Collection::Inventory,
        Collection::InventoryAdjustments,
        Collection::PurchaseOrders,
        Collection::Payments,
        Collection::Collectors,
        Collection::Users,
        Collection::DeletionLog,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Collection::Stalls => "stalls",
            Collection::Leases => "leases",
            Collection::LeaseRequests => "leaseRequests",
            Collection::ApprovedLeases => "approvedLeases",
            Collection::Tenants => "tenants",
            Collection::Expenses => "expenses",
            Collection::CheckRequests => "checkRequests",
            Collection::CheckReleases => "checkReleases",
            Collection::Inventory => "inventory",
            Collection::InventoryAdjustments => "inventoryAdjustments",
            Collection::PurchaseOrders => "purchaseOrders",
            Collection::Payments => "paymentHistory",
            Collection::Collectors => "collectors",
            Collection::Users => "palengke_users",
            Collection::DeletionLog => "deletionLog",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Conjunto de coleções a gravar juntas. O backend aplica tudo ou nada.
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: BTreeMap<Collection, Vec<Value>>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_values(&mut self, collection: Collection, values: Vec<Value>) {
        self.writes.insert(collection, values);
    }

    pub fn collections(&self) -> impl Iterator<Item = Collection> + '_ {
        self.writes.keys().copied()
    }

    pub fn into_writes(self) -> impl Iterator<Item = (Collection, Vec<Value>)> {
        self.writes.into_iter()
    }
}

/// Backend durável de coleções. Qualquer armazenamento chave-valor serve.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Documento bruto da coleção; `None` se ela nunca foi gravada.
    async fn read(&self, collection: Collection) -> Result<Option<String>, AppError>;

    /// Grava todas as coleções do lote atomicamente.
    async fn write(&self, batch: WriteBatch) -> Result<(), AppError>;
}

/// Ponto único de acesso às coleções, compartilhado pelos repositórios.
///
/// Leitura-modificação-escrita acontece dentro de uma [`Transaction`], que segura
/// o lock de escrita até o commit ou o drop.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn RecordStore>,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    pub fn new<B: RecordStore>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(crate::db::MemoryStore::default())
    }

    pub async fn begin(&self) -> Transaction {
        let guard = self.write_lock.clone().lock_owned().await;
        Transaction {
            backend: self.backend.clone(),
            _guard: guard,
            staged: BTreeMap::new(),
            opaque: BTreeMap::new(),
        }
    }

    /// Leitura avulsa, fora de transação. Registros ilegíveis ficam de fora.
    pub async fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, AppError> {
        let raw = self.backend.read(collection).await?;
        Ok(decode(collection, raw).records)
    }

    /// Grava uma única coleção (usado pela carga de dados de demonstração).
    pub async fn save<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<(), AppError> {
        let mut tx = self.begin().await;
        tx.stage(collection, records)?;
        tx.commit().await
    }
}

/// Unidade de trabalho sobre várias coleções.
///
/// Leituras enxergam o que já foi preparado nesta transação. Nada chega ao backend
/// antes de `commit`; um drop sem commit descarta tudo.
///
/// Registros que não decodificam no tipo pedido não chegam aos serviços, mas voltam
/// intactos ao backend em qualquer gravação da coleção.
pub struct Transaction {
    backend: Arc<dyn RecordStore>,
    _guard: OwnedMutexGuard<()>,
    staged: BTreeMap<Collection, Vec<Value>>,
    opaque: BTreeMap<Collection, Vec<Value>>,
}

impl Transaction {
    pub async fn load<T: DeserializeOwned>(&mut self, collection: Collection) -> Result<Vec<T>, AppError> {
        if let Some(values) = self.staged.get(&collection) {
            let records = values
                .iter()
                .cloned()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()?;
            return Ok(records);
        }

        let raw = self.backend.read(collection).await?;
        let decoded = decode(collection, raw);
        if decoded.rejected.is_empty() {
            self.opaque.remove(&collection);
        } else {
            self.opaque.insert(collection, decoded.rejected);
        }
        Ok(decoded.records)
    }

    /// IDs dos registros guardados sem decodificar; continuam ocupados.
    pub fn opaque_ids(&self, collection: Collection) -> Vec<String> {
        self.opaque
            .get(&collection)
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn stage<T: Serialize>(&mut self, collection: Collection, records: &[T]) -> Result<(), AppError> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.staged.insert(collection, values);
        Ok(())
    }

    pub async fn commit(self) -> Result<(), AppError> {
        if self.staged.is_empty() {
            return Ok(());
        }

        let mut opaque = self.opaque;
        let mut batch = WriteBatch::new();
        for (collection, mut values) in self.staged {
            if let Some(kept) = opaque.remove(&collection) {
                tracing::warn!(collection = collection.name(), kept = kept.len(), "Registros ilegíveis preservados na gravação");
                values.extend(kept);
            }
            batch.put_values(collection, values);
        }

        let names: Vec<&str> = batch.collections().map(Collection::name).collect();
        self.backend.write(batch).await?;
        tracing::debug!(collections = ?names, "Lote gravado");
        Ok(())
    }
}

struct Decoded<T> {
    records: Vec<T>,
    rejected: Vec<Value>,
}

// Falha de parse nunca é fatal: documento ilegível vira coleção vazia e cada
// registro que não decodifica é separado, com um aviso.
fn decode<T: DeserializeOwned>(collection: Collection, raw: Option<String>) -> Decoded<T> {
    let mut decoded = Decoded { records: Vec::new(), rejected: Vec::new() };
    let Some(text) = raw else {
        return decoded;
    };

    let values = match serde_json::from_str::<Vec<Value>>(&text) {
        Ok(values) => values,
        Err(err) => {
            tracing::warn!(
                collection = collection.name(),
                error = %err,
                "⚠️ Coleção ilegível, tratando como vazia"
            );
            return decoded;
        }
    };

    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(record) => decoded.records.push(record),
            Err(err) => {
                tracing::warn!(
                    collection = collection.name(),
                    index,
                    id = value.get("id").and_then(serde_json::Value::as_str).unwrap_or(""),
                    error = %err,
                    "⚠️ Registro ilegível ignorado"
                );
                decoded.rejected.push(value);
            }
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        n: i32,
    }

    fn rows(n: i32) -> Vec<Row> {
        (0..n).map(|i| Row { id: format!("R-{i}"), n: i }).collect()
    }

    #[tokio::test]
    async fn unknown_collection_loads_empty() {
        let store = Store::in_memory();
        let loaded: Vec<Row> = store.load(Collection::Expenses).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn corrupt_collection_loads_empty() {
        let backend = MemoryStore::default();
        backend.put_raw(Collection::Stalls, "{not json");
        backend.put_raw(Collection::Tenants, r#"{"id": "object instead of array"}"#);
        let store = Store::new(backend);

        let stalls: Vec<Row> = store.load(Collection::Stalls).await.unwrap();
        let tenants: Vec<Row> = store.load(Collection::Tenants).await.unwrap();
        assert!(stalls.is_empty());
        assert!(tenants.is_empty());
    }

    #[tokio::test]
    async fn transaction_reads_its_own_writes_and_commits() {
        let store = Store::in_memory();

        let mut tx = store.begin().await;
        tx.stage(Collection::Inventory, &rows(3)).unwrap();
        let staged: Vec<Row> = tx.load(Collection::Inventory).await.unwrap();
        assert_eq!(staged.len(), 3);
        tx.commit().await.unwrap();

        let loaded: Vec<Row> = store.load(Collection::Inventory).await.unwrap();
        assert_eq!(loaded, rows(3));
    }

    #[tokio::test]
    async fn dropped_transaction_writes_nothing() {
        let store = Store::in_memory();
        store.save(Collection::Payments, &rows(2)).await.unwrap();

        {
            let mut tx = store.begin().await;
            tx.stage(Collection::Payments, &rows(5)).unwrap();
            tx.stage(Collection::DeletionLog, &rows(1)).unwrap();
        }

        let payments: Vec<Row> = store.load(Collection::Payments).await.unwrap();
        let log: Vec<Row> = store.load(Collection::DeletionLog).await.unwrap();
        assert_eq!(payments.len(), 2);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn bad_record_is_skipped_on_read_and_kept_on_write() {
        let backend = MemoryStore::default();
        backend.put_raw(
            Collection::Inventory,
            r#"[{"id": "R-0", "n": 0}, {"id": "R-9", "n": "nine"}, {"id": "R-1", "n": 1}]"#,
        );
        let store = Store::new(backend);

        let loaded: Vec<Row> = store.load(Collection::Inventory).await.unwrap();
        assert_eq!(loaded, rows(2));

        let mut tx = store.begin().await;
        let mut all: Vec<Row> = tx.load(Collection::Inventory).await.unwrap();
        assert_eq!(tx.opaque_ids(Collection::Inventory), vec!["R-9".to_string()]);
        all.push(Row { id: "R-2".into(), n: 2 });
        tx.stage(Collection::Inventory, &all).unwrap();
        tx.commit().await.unwrap();

        let raw: Vec<Value> = store.load(Collection::Inventory).await.unwrap();
        let ids: Vec<&str> = raw.iter().filter_map(|v| v["id"].as_str()).collect();
        assert_eq!(ids, ["R-0", "R-1", "R-2", "R-9"]);
        assert_eq!(raw[3]["n"], "nine");
    }

    #[test]
    fn collection_names_match_persisted_keys() {
        assert_eq!(Collection::LeaseRequests.name(), "leaseRequests");
        assert_eq!(Collection::Users.name(), "palengke_users");
        assert_eq!(Collection::Payments.to_string(), "paymentHistory");
    }
}
