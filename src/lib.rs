//! Contact Book API
//!
//! Multi-tenant contact management:
//! - Account registration with bearer-token sessions
//! - Owner-scoped contact CRUD with filtering, sorting and paging
//! - CSV import and streamed export
//! - Emailing a contact and sharing contact lists over SMTP

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::DatabaseBackend;
use domain::{ContactRepository, MailTransport, UserRepository};
use infrastructure::{
    auth::{JwtConfig, JwtService},
    contact::{ContactService, InMemoryContactRepository, PostgresContactRepository},
    notification::{NotificationDispatcher, SmtpMailTransport},
    rate_limit::RateLimiter,
    storage::{run_schema_migrations, PostgresConfig},
    transfer::{ContactExporter, ContactImporter},
    user::{
        Argon2Hasher, InMemoryUserRepository, PasswordHasher, PostgresUserRepository, UserService,
    },
};
use tracing::{info, warn};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let (users, contacts) = create_repositories(config).await?;
    let transport: Arc<dyn MailTransport> = Arc::new(SmtpMailTransport::from_config(&config.mail)?);

    let mut config = config.clone();
    if config.auth.jwt_secret.trim().is_empty() {
        warn!("No JWT secret configured, using a random per-process secret");
        config.auth.jwt_secret = uuid::Uuid::new_v4().to_string();
    }

    Ok(build_app_state(
        &config,
        users,
        contacts,
        Arc::new(Argon2Hasher::new()),
        transport,
    ))
}

/// Wire services over already constructed stores and transport
pub fn build_app_state(
    config: &AppConfig,
    users: Arc<dyn UserRepository>,
    contacts: Arc<dyn ContactRepository>,
    hasher: Arc<dyn PasswordHasher>,
    transport: Arc<dyn MailTransport>,
) -> AppState {
    let token_service = JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_hours,
    ));

    let dispatcher = NotificationDispatcher::new(
        contacts.clone(),
        transport,
        config.mail.from_name.clone(),
        config.mail.sender_address().to_string(),
    );

    AppState {
        user_service: Arc::new(UserService::new(users, hasher)),
        token_service: Arc::new(token_service),
        contact_service: Arc::new(ContactService::new(contacts.clone())),
        importer: Arc::new(ContactImporter::new(contacts.clone())),
        exporter: Arc::new(ContactExporter::new(contacts)),
        dispatcher: Arc::new(dispatcher),
        rate_limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
        limits: config.limits.clone(),
        cors: config.cors.clone(),
    }
}

async fn create_repositories(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn UserRepository>, Arc<dyn ContactRepository>)> {
    match config.database.backend {
        DatabaseBackend::Memory => {
            info!("Using in-memory storage");
            Ok((
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryContactRepository::new()),
            ))
        }
        DatabaseBackend::Postgres => {
            let db = &config.database;
            let pool = PostgresConfig::new(db.url.clone())
                .with_max_connections(db.max_connections)
                .with_min_connections(db.min_connections)
                .with_acquire_timeout(db.acquire_timeout_secs)
                .with_idle_timeout(db.idle_timeout_secs)
                .connect()
                .await?;

            if db.run_migrations {
                let applied = run_schema_migrations(&pool).await?;
                info!(applied, "Schema migrations complete");
            }

            info!("Using PostgreSQL storage");
            Ok((
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresContactRepository::new(pool)),
            ))
        }
    }
}
