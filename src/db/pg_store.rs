// src/db/pg_store.rs

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use crate::{
    common::error::AppError,
    db::record_store::{Collection, RecordStore, WriteBatch},
};

/// Coleções como linhas JSONB na tabela `record_collections`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn read(&self, collection: Collection) -> Result<Option<String>, AppError> {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT records::text FROM record_collections WHERE name = $1",
        )
        .bind(collection.name())
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw)
    }

    async fn write(&self, batch: WriteBatch) -> Result<(), AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        for (collection, values) in batch.into_writes() {
            sqlx::query(
                r#"
                INSERT INTO record_collections (name, records, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (name)
                DO UPDATE SET records = EXCLUDED.records, updated_at = NOW()
                "#,
            )
            .bind(collection.name())
            .bind(Json(values))
            .execute(&mut *tx)
            .await?; // Se falhar aqui, o tx sofre rollback automático ao sair do escopo
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---
        Ok(())
    }
}
