// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context;
use chrono::FixedOffset;
use sqlx::SqlitePool;

use crate::{
    db::{self, PhotoRepository, SessionRepository, UserRepository, WriteGate},
    services::{
        auth::AuthService,
        document_service::DocumentService,
        file_storage::LocalDiskStorage,
        photo_service::PhotoService,
        session_service::SessionService,
    },
};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/fieldtrack.db?mode=rwc";

// Configuração lida do ambiente (e do .env, se existir)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub public_base_url: Option<String>,
    // Fuso usado nos horários dos relatórios
    pub report_offset: FixedOffset,
    pub fonts_dir: PathBuf,
    pub seed_demo_users: bool,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let offset_minutes: i32 = parse_or("REPORT_UTC_OFFSET_MINUTES", 60)?;
        let report_offset = FixedOffset::east_opt(offset_minutes * 60)
            .context("REPORT_UTC_OFFSET_MINUTES fora do intervalo")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 8)?,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()).into(),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            public_base_url: optional("PUBLIC_BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            report_offset,
            fonts_dir: env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".into()).into(),
            seed_demo_users: parse_or("SEED_DEMO_USERS", false)?,
            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
        })
    }

    /// Link do painel do cliente para uma sessão, usado no QR code dos PDFs.
    pub fn session_panel_url(&self, session_id: uuid::Uuid) -> Option<String> {
        self.public_base_url
            .as_ref()
            .map(|base| format!("{}/client/sessions/{}", base, session_id))
    }
}

// Variável ausente ou vazia = padrão; presente mas inválida = erro
fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} inválido ('{}'): {}", key, raw, e)),
        None => Ok(default),
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: SqlitePool,
    pub user_repo: UserRepository,
    pub auth_service: AuthService,
    pub session_service: SessionService,
    pub photo_service: PhotoService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        if let Some(parent) = sqlite_file_parent(&config.database_url) {
            std::fs::create_dir_all(&parent)
                .with_context(|| format!("não foi possível criar {}", parent.display()))?;
        }

        let db_pool = db::connect(&config.database_url, config.max_connections)
            .await
            .context("falha ao conectar ao SQLite")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_parts(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(config: Config, db_pool: SqlitePool) -> Self {
        let write_gate = WriteGate::new();

        let user_repo = UserRepository::new(db_pool.clone());
        let session_repo = SessionRepository::new(db_pool.clone());
        let photo_repo = PhotoRepository::new();

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.jwt_ttl_hours),
            config.bcrypt_cost,
            db_pool.clone(),
        );
        let session_service = SessionService::new(
            db_pool.clone(),
            session_repo.clone(),
            photo_repo.clone(),
            write_gate.clone(),
        );
        let photo_service = PhotoService::new(
            db_pool.clone(),
            photo_repo,
            session_repo,
            Arc::new(LocalDiskStorage::new(config.upload_dir.clone())),
            write_gate,
        );
        let document_service = DocumentService::new(config.fonts_dir.clone());

        Self {
            config: Arc::new(config),
            db_pool,
            user_repo,
            auth_service,
            session_service,
            photo_service,
            document_service,
        }
    }
}

// `sqlite://data/x.db?mode=rwc` -> `data`
fn sqlite_file_parent(url: &str) -> Option<PathBuf> {
    if url.contains(":memory:") {
        return None;
    }
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()?;
    let parent = PathBuf::from(path).parent()?.to_path_buf();
    if parent.as_os_str().is_empty() { None } else { Some(parent) }
}
