// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        repositories::{BranchRepository, UserRepository, WarehouseRepository},
        PgBranchRepository, PgUserRepository, PgWarehouseRepository, RbacRepository,
    },
    middleware::rbac::PermissionGate,
    services::{BranchService, WarehouseService},
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub run_migrations: bool,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let db_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {}", raw))?,
            None => 5,
        };

        let acquire_secs: u64 = match get("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_ACQUIRE_TIMEOUT_SECS inválido: {}", raw))?,
            None => 3,
        };

        let run_migrations = match get("RUN_MIGRATIONS") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("RUN_MIGRATIONS inválido: {}", raw))?,
            None => true,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(acquire_secs),
            run_migrations,
        })
    }

    pub async fn connect(&self) -> anyhow::Result<PgPool> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(self.db_acquire_timeout)
            .connect(&self.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(db_pool)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: String,
    pub branch_service: BranchService,
    pub warehouse_service: WarehouseService,
    pub permission_gate: Arc<dyn PermissionGate>,
    pub i18n_store: Arc<I18nStore>,
}

impl AppState {
    /// Monta o gráfico de dependências sobre o Postgres.
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> anyhow::Result<Self> {
        let branch_repo: Arc<dyn BranchRepository> = Arc::new(PgBranchRepository::new(db_pool.clone()));
        let warehouse_repo: Arc<dyn WarehouseRepository> =
            Arc::new(PgWarehouseRepository::new(db_pool.clone()));
        let user_repo: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db_pool.clone()));
        let permission_gate: Arc<dyn PermissionGate> = Arc::new(RbacRepository::new(db_pool));

        Self::new(branch_repo, warehouse_repo, user_repo, permission_gate, jwt_secret)
    }

    pub fn new(
        branch_repo: Arc<dyn BranchRepository>,
        warehouse_repo: Arc<dyn WarehouseRepository>,
        user_repo: Arc<dyn UserRepository>,
        permission_gate: Arc<dyn PermissionGate>,
        jwt_secret: String,
    ) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let branch_service = BranchService::new(branch_repo.clone(), user_repo);
        let warehouse_service = WarehouseService::new(warehouse_repo, branch_repo);

        Ok(Self {
            jwt_secret,
            branch_service,
            warehouse_service,
            permission_gate,
            i18n_store,
        })
    }
}
