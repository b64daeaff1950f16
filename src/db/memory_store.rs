// src/db/memory_store.rs

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use crate::{
    common::error::AppError,
    db::record_store::{Collection, RecordStore, WriteBatch},
};

/// Backend volátil, usado nos testes e com `STORE_BACKEND=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, String>>,
}

impl MemoryStore {
    /// Grava o texto cru, sem validar (simula um armazenamento corrompido).
    pub fn put_raw(&self, collection: Collection, raw: &str) {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(collection, raw.to_string());
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read(&self, collection: Collection) -> Result<Option<String>, AppError> {
        let collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(collections.get(&collection).cloned())
    }

    async fn write(&self, batch: WriteBatch) -> Result<(), AppError> {
        // Serializa tudo antes de tocar no mapa, para o lote entrar inteiro ou não entrar
        let mut encoded = Vec::new();
        for (collection, values) in batch.into_writes() {
            encoded.push((collection, serde_json::to_string(&values)?));
        }

        let mut collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        collections.extend(encoded);
        Ok(())
    }
}
