// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        DashboardRepository, EmployeeRepository, LmsRepository, RequestRepository,
        TalentRepository, TrainingRepository,
    },
    services::{
        auth::{AuthProvider, RemoteAuthService},
        dashboard_service::DashboardService,
        document_service::DocumentService,
        employee_service::EmployeeService,
        lms_service::LmsService,
        request_service::RequestService,
        talent_service::TalentService,
        training_service::TrainingService,
    },
};

// Variáveis de ambiente lidas na inicialização
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub auth_service_url: String,
    pub allowed_origins: Vec<String>,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub auth_timeout: Duration,
    pub fonts_dir: PathBuf,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let auth_service_url = env::var("AUTH_SERVICE_URL").context("AUTH_SERVICE_URL deve ser definida")?;

        let db_max_connections = var_or("DB_MAX_CONNECTIONS", "5")
            .parse()
            .context("DB_MAX_CONNECTIONS deve ser um número")?;
        let auth_timeout_secs: u64 = var_or("AUTH_TIMEOUT_SECS", "10")
            .parse()
            .context("AUTH_TIMEOUT_SECS deve ser um número")?;

        Ok(Self {
            database_url,
            auth_service_url,
            allowed_origins: parse_origins(&var_or("ALLOWED_ORIGINS", "http://localhost:5173")),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            db_max_connections,
            auth_timeout: Duration::from_secs(auth_timeout_secs),
            fonts_dir: PathBuf::from(var_or("FONTS_DIR", "./fonts")),
        })
    }
}

/// Lista separada por vírgulas; entradas vazias são ignoradas.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

// O estado compartilhado por todos os handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_provider: Arc<dyn AuthProvider>,
    pub employee_service: EmployeeService,
    pub request_service: RequestService,
    pub lms_service: LmsService,
    pub training_service: TrainingService,
    pub talent_service: TalentService,
    pub dashboard_service: DashboardService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let auth_provider = RemoteAuthService::new(&config.auth_service_url, config.auth_timeout)?;

        Ok(Self::build(db_pool, config, Arc::new(auth_provider)))
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(db_pool: PgPool, config: Config, auth_provider: Arc<dyn AuthProvider>) -> Self {
        let employee_service = EmployeeService::new(EmployeeRepository::new(db_pool.clone()), db_pool.clone());

        let request_service = RequestService::new(
            RequestRepository::new(db_pool.clone()),
            employee_service.clone(),
            db_pool.clone(),
        );
        let lms_service = LmsService::new(
            LmsRepository::new(db_pool.clone()),
            employee_service.clone(),
            db_pool.clone(),
        );
        let training_service = TrainingService::new(
            TrainingRepository::new(db_pool.clone()),
            employee_service.clone(),
            db_pool.clone(),
        );
        let talent_service = TalentService::new(
            TalentRepository::new(db_pool.clone()),
            employee_service.clone(),
            db_pool.clone(),
        );
        let dashboard_service =
            DashboardService::new(DashboardRepository::new(db_pool.clone()), employee_service.clone());
        let document_service = DocumentService::new(training_service.clone(), config.fonts_dir.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            i18n_store: Arc::new(I18nStore::new()),
            auth_provider,
            employee_service,
            request_service,
            lms_service,
            training_service,
            talent_service,
            dashboard_service,
            document_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://hr.example.com ,"),
            vec!["http://localhost:5173".to_string(), "https://hr.example.com".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }
}
