// src/config.rs

use anyhow::{bail, Context};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::{env, path::PathBuf, time::Duration};

use crate::{
    db::{Collection, FileStore, MemoryStore, PgStore, Store},
    models::payment::Collector,
    services::{
        auth::AuthService, check_service::CheckService, document_service::{DocumentService, DEFAULT_MAX_UPLOAD_BYTES},
        expense_service::ExpenseService, inventory_service::InventoryService, lease_service::LeaseService,
        payment_service::PaymentService, stall_service::StallService, tenant_service::TenantService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    File,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_upload_bytes: u64,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_backend = match env::var("STORE_BACKEND").unwrap_or_else(|_| "file".into()).to_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres,
            "file" => StoreBackend::File,
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND inválido: {other} (use postgres, file ou memory)"),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida para STORE_BACKEND=postgres");
        }

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw.trim().parse().context("MAX_UPLOAD_BYTES deve ser um número de bytes")?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let seed_demo_data = env::var("SEED_DEMO_DATA")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            store_backend,
            database_url,
            data_dir: env::var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./data")),
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            max_upload_bytes,
            seed_demo_data,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub stall_service: StallService,
    pub lease_service: LeaseService,
    pub tenant_service: TenantService,
    pub expense_service: ExpenseService,
    pub check_service: CheckService,
    pub inventory_service: InventoryService,
    pub payment_service: PaymentService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store = match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config.database_url.as_deref().context("DATABASE_URL ausente")?;
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Store::new(PgStore::new(pool))
            }
            StoreBackend::File => Store::new(FileStore::open(&config.data_dir).await?),
            StoreBackend::Memory => Store::new(MemoryStore::default()),
        };

        if config.seed_demo_data {
            seed_demo_data(&store).await?;
        }

        Ok(Self::with_store(store, config.jwt_secret.clone(), config.max_upload_bytes))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(store: Store, jwt_secret: String, max_upload_bytes: u64) -> Self {
        let document_service = DocumentService::new(max_upload_bytes);
        let check_service = CheckService::new(store.clone());

        Self {
            auth_service: AuthService::new(store.clone(), jwt_secret),
            stall_service: StallService::new(store.clone()),
            lease_service: LeaseService::new(store.clone(), document_service.clone()),
            tenant_service: TenantService::new(store.clone()),
            expense_service: ExpenseService::new(store.clone(), check_service.clone(), document_service.clone()),
            check_service,
            inventory_service: InventoryService::new(store.clone()),
            payment_service: PaymentService::new(store),
            document_service,
        }
    }
}

/// Bancas, itens de estoque e cobradores de demonstração, só em coleções vazias.
pub async fn seed_demo_data(store: &Store) -> anyhow::Result<()> {
    let today = chrono::Utc::now().to_rfc3339();
    let stall = |id: &str, stall_type: &str, section: &str, location: &str, x: f64, y: f64, utilities: Value| {
        let mut stall = json!({
            "id": id,
            "type": stall_type,
            "section": section,
            "location": location,
            "dimensions": "2x3m",
            "capacity": 1,
            "status": "Available",
            "x": x, "y": y, "w": 3, "h": 4,
            "dateAdded": today,
            "lastUpdated": today,
        });
        if let (Some(target), Value::Object(extra)) = (stall.as_object_mut(), utilities) {
            target.extend(extra);
        }
        stall
    };

    let stalls = vec![
        stall("ST-001", "Food", "Center", "C1", 20.0, 10.0, json!({
            "hasElectricity": true, "electricityType": "Metered",
            "hasWater": true, "waterType": "Shared", "stallStructure": "Fixed",
        })),
        stall("ST-002", "Food", "Center", "C2", 24.0, 10.0, json!({
            "hasElectricity": true, "electricityType": "Metered", "stallStructure": "Fixed",
        })),
        stall("ST-003", "Dry Goods", "Left Block", "B1", -5.0, -15.0, json!({
            "hasVentilation": true, "stallStructure": "Fixed",
        })),
        stall("ST-004", "Dry Goods", "Left Block", "B2", -1.8, -15.0, json!({
            "stallStructure": "Non-Fixed",
        })),
        stall("ST-005", "Wet Goods", "Center Left Block", "W1", 8.0, 30.0, json!({
            "hasWater": true, "waterType": "Dedicated", "hasDrainage": true, "stallStructure": "Fixed",
        })),
        stall("ST-006", "Ambulant", "Ambulant Blocks", "A1", 60.0, 40.0, json!({
            "stallStructure": "Non-Fixed",
        })),
    ];

    let inventory = vec![
        json!({ "id": "ITEM-001", "name": "Rice (25kg)", "qty": 200, "unitPrice": 45, "minStock": 50 }),
        json!({ "id": "ITEM-002", "name": "Sugar (50kg)", "qty": 120, "unitPrice": 55, "minStock": 30 }),
        json!({ "id": "ITEM-003", "name": "Cooking Oil (1L)", "qty": 80, "unitPrice": 150, "minStock": 20 }),
    ];

    let collectors = Collector::defaults()
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    for (collection, records) in [
        (Collection::Stalls, stalls),
        (Collection::Inventory, inventory),
        (Collection::Collectors, collectors),
    ] {
        let existing: Vec<Value> = store.load(collection).await?;
        if existing.is_empty() {
            store.save(collection, &records).await?;
            tracing::info!(%collection, count = records.len(), "🌱 Dados de demonstração gravados");
        }
    }
    Ok(())
}
