// src/db/file_store.rs

use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    db::record_store::{Collection, RecordStore, WriteBatch},
};

const JOURNAL: &str = "batch.journal";

/// Um arquivo JSON por coleção, dentro de `DATA_DIR`.
///
/// Um lote é gravado em três passos: temporários `<coleção>.json.tmp`, depois o
/// diário com os nomes das coleções (ponto de commit), depois os renames. Enquanto
/// o diário existir o lote está incompleto e é terminado antes de qualquer leitura.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    journal_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        let store = Self {
            dir,
            journal_lock: Arc::new(Mutex::new(())),
        };

        if !store.recover().await? {
            store.discard_stray_temps().await?;
        }
        tracing::info!("📁 Coleções gravadas em {}", store.dir.display());
        Ok(store)
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.name()))
    }

    fn temp_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", collection.name()))
    }

    fn journal_path(&self) -> PathBuf {
        self.dir.join(JOURNAL)
    }

    /// Termina um lote registrado no diário. Devolve `true` se havia um.
    async fn recover(&self) -> Result<bool, AppError> {
        let _guard = self.journal_lock.lock().await;
        let text = match tokio::fs::read_to_string(self.journal_path()).await {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        let names: Vec<String> = serde_json::from_str(&text)?;
        let collections: Vec<Collection> = Collection::ALL
            .into_iter()
            .filter(|c| names.iter().any(|n| n == c.name()))
            .collect();

        tracing::warn!(collections = ?names, "Lote interrompido encontrado, concluindo");
        self.finish(&collections).await?;
        Ok(true)
    }

    // Renomeia os temporários ainda pendentes e apaga o diário. Idempotente.
    async fn finish(&self, collections: &[Collection]) -> Result<(), AppError> {
        for &collection in collections {
            match tokio::fs::rename(self.temp_for(collection), self.path_for(collection)).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        match tokio::fs::remove_file(self.journal_path()).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    // Sem diário, temporários são de um lote que nunca chegou ao commit
    async fn discard_stray_temps(&self) -> Result<(), AppError> {
        for collection in Collection::ALL {
            match tokio::fs::remove_file(self.temp_for(collection)).await {
                Ok(()) => tracing::warn!(collection = collection.name(), "Temporário órfão descartado"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        match tokio::fs::remove_file(self.dir.join(format!("{JOURNAL}.tmp"))).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn remove_temps(&self, collections: &[Collection]) {
        for &collection in collections {
            let _ = tokio::fs::remove_file(self.temp_for(collection)).await;
        }
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn read(&self, collection: Collection) -> Result<Option<String>, AppError> {
        // Nunca expõe um lote pela metade
        if tokio::fs::try_exists(self.journal_path()).await? {
            self.recover().await?;
        }

        match tokio::fs::read_to_string(self.path_for(collection)).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, batch: WriteBatch) -> Result<(), AppError> {
        // 1. Temporários; se algum falhar, nenhum arquivo real muda
        let mut written = Vec::new();
        for (collection, values) in batch.into_writes() {
            let text = serde_json::to_string_pretty(&values)?;
            if let Err(err) = tokio::fs::write(self.temp_for(collection), text).await {
                self.remove_temps(&written).await;
                let _ = tokio::fs::remove_file(self.temp_for(collection)).await;
                return Err(err.into());
            }
            written.push(collection);
        }

        let _guard = self.journal_lock.lock().await;

        // 2. Diário: a partir daqui o lote está confirmado
        let names: Vec<&str> = written.iter().map(|c| c.name()).collect();
        let journal_temp = self.dir.join(format!("{JOURNAL}.tmp"));
        let committed = async {
            tokio::fs::write(&journal_temp, serde_json::to_vec(&names)?).await?;
            tokio::fs::rename(&journal_temp, self.journal_path()).await?;
            Ok::<(), AppError>(())
        }
        .await;
        if let Err(err) = committed {
            self.remove_temps(&written).await;
            let _ = tokio::fs::remove_file(&journal_temp).await;
            return Err(err);
        }

        // 3. Renames; uma falha aqui é concluída na próxima leitura
        if let Err(err) = self.finish(&written).await {
            tracing::error!(collections = ?names, error = %err, "Lote confirmado, renomeação pendente");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::record_store::Store;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(FileStore::open(dir.path()).await.unwrap());

        let records = vec![
            json!({ "id": "ST-001", "status": "Available" }),
            json!({ "id": "ST-002", "status": "Occupied" }),
        ];
        store.save(Collection::Stalls, &records).await.unwrap();

        assert!(dir.path().join("stalls.json").exists());
        assert!(!dir.path().join("stalls.json.tmp").exists());
        assert!(!dir.path().join(JOURNAL).exists());

        let reopened = Store::new(FileStore::open(dir.path()).await.unwrap());
        let loaded: Vec<Value> = reopened.load(Collection::Stalls).await.unwrap();
        assert_eq!(loaded, records);
    }

    #[tokio::test]
    async fn unreadable_file_is_an_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tenants.json"), "[{broken").unwrap();

        let store = Store::new(FileStore::open(dir.path()).await.unwrap());
        let loaded: Vec<Value> = store.load(Collection::Tenants).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn failed_rename_is_never_read_half_applied() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileStore::open(dir.path()).await.unwrap();
        let store = Store::new(files.clone());
        store.save(Collection::Stalls, &[json!({ "id": "ST-001", "status": "Available" })]).await.unwrap();

        // Um diretório no lugar de tenants.json faz o rename falhar no meio do lote
        std::fs::create_dir(dir.path().join("tenants.json")).unwrap();
        let mut tx = store.begin().await;
        tx.stage(Collection::Stalls, &[json!({ "id": "ST-001", "status": "Occupied" })]).unwrap();
        tx.stage(Collection::Tenants, &[json!({ "id": "TEN-2025-001" })]).unwrap();
        tx.commit().await.unwrap();

        assert!(dir.path().join(JOURNAL).exists());
        assert!(store.load::<Value>(Collection::Stalls).await.is_err());

        std::fs::remove_dir(dir.path().join("tenants.json")).unwrap();
        let stalls: Vec<Value> = store.load(Collection::Stalls).await.unwrap();
        let tenants: Vec<Value> = store.load(Collection::Tenants).await.unwrap();
        assert_eq!(stalls[0]["status"], "Occupied");
        assert_eq!(tenants.len(), 1);
        assert!(!dir.path().join(JOURNAL).exists());
    }

    #[tokio::test]
    async fn open_completes_journaled_batches_and_drops_uncommitted_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("leases.json"), r#"[{"id": "L-1", "status": "Pending Approval"}]"#).unwrap();
        std::fs::write(dir.path().join("leases.json.tmp"), r#"[{"id": "L-1", "status": "Approved"}]"#).unwrap();
        std::fs::write(dir.path().join(JOURNAL), r#"["leases"]"#).unwrap();

        let store = Store::new(FileStore::open(dir.path()).await.unwrap());
        let leases: Vec<Value> = store.load(Collection::Leases).await.unwrap();
        assert_eq!(leases[0]["status"], "Approved");

        // Temporário sem diário: o lote não foi confirmado
        std::fs::write(dir.path().join("stalls.json.tmp"), "[]").unwrap();
        std::fs::write(dir.path().join("stalls.json"), r#"[{"id": "ST-001"}]"#).unwrap();
        let reopened = Store::new(FileStore::open(dir.path()).await.unwrap());
        let stalls: Vec<Value> = reopened.load(Collection::Stalls).await.unwrap();
        assert_eq!(stalls.len(), 1);
        assert!(!dir.path().join("stalls.json.tmp").exists());
    }
}
