use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::observability::MetricsConfig;

/// Secret shipped in `config/default.toml` for local runs; refused against Postgres
pub const DEVELOPMENT_JWT_SECRET: &str = "dev-secret-change-me";

/// Longest accepted session, one year
pub const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the built single-page app
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// Apply pending migrations at startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Envelope sender; falls back to `username`
    #[serde(default)]
    pub from_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_mail_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

/// A limit of `limit` requests per `window_secs`
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct WindowLimit {
    pub limit: u32,
    pub window_secs: u64,
}

impl WindowLimit {
    pub const fn new(limit: u32, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }
}

/// Limit bound to one route, matched on method and route template
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RouteRateLimit {
    pub name: String,
    pub method: String,
    /// Route template as registered, e.g. `/api/contacts/{id}`
    pub path: String,
    pub limit: u32,
    pub window_secs: u64,
}

impl RouteRateLimit {
    pub fn new(name: &str, method: &str, path: &str, limit: u32, window_secs: u64) -> Self {
        Self {
            name: name.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            limit,
            window_secs,
        }
    }

    pub fn window(&self) -> WindowLimit {
        WindowLimit::new(self.limit, self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_route_limits")]
    pub routes: Vec<RouteRateLimit>,
    /// Applied to every API request of a client
    #[serde(default = "default_global_limits")]
    pub global: Vec<WindowLimit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_true() -> bool {
    true
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_database_url() -> String {
    "postgres://localhost/contact_book".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_token_ttl_hours() -> u64 {
    12
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Contact Book Service".to_string()
}

fn default_mail_timeout() -> u64 {
    30
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5000".to_string(),
    ]
}

fn default_route_limits() -> Vec<RouteRateLimit> {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 3600;

    vec![
        RouteRateLimit::new("register", "POST", "/api/register", 5, MINUTE),
        RouteRateLimit::new("login", "POST", "/api/login", 10, MINUTE),
        RouteRateLimit::new("list_contacts", "GET", "/api/contacts", 720, HOUR),
        RouteRateLimit::new("create_contact", "POST", "/api/contacts", 50, HOUR),
        RouteRateLimit::new("update_contact", "PUT", "/api/contacts/{id}", 100, HOUR),
        RouteRateLimit::new("delete_contact", "DELETE", "/api/contacts/{id}", 50, HOUR),
        RouteRateLimit::new("import_contacts", "POST", "/api/contacts/import", 10, HOUR),
        RouteRateLimit::new("send_email", "POST", "/api/contacts/{id}/send_email", 20, HOUR),
        RouteRateLimit::new("share_contacts", "POST", "/api/contacts/share", 10, HOUR),
    ]
}

fn default_global_limits() -> Vec<WindowLimit> {
    vec![WindowLimit::new(800, 3600), WindowLimit::new(1000, 86400)]
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_address: String::new(),
            from_name: default_from_name(),
            timeout_secs: default_mail_timeout(),
        }
    }
}

impl MailConfig {
    pub fn sender_address(&self) -> &str {
        if self.from_address.is_empty() {
            &self.username
        } else {
            &self.from_address
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            routes: default_route_limits(),
            global: default_global_limits(),
        }
    }
}

impl RateLimitSettings {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Deployment variables honoured next to the `APP__` namespace
const CONVENTIONAL_ENV: [(&str, &str); 6] = [
    ("DATABASE_URL", "database.url"),
    ("JWT_SECRET_KEY", "auth.jwt_secret"),
    ("SMTP_USERNAME", "mail.username"),
    ("SMTP_PASSWORD", "mail.password"),
    ("CORS_ORIGINS", "cors.allowed_origins"),
    ("PORT", "server.port"),
];

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in CONVENTIONAL_ENV {
            let Some(value) = std::env::var(var).ok().filter(|v| !v.trim().is_empty()) else {
                continue;
            };

            builder = if key == "cors.allowed_origins" {
                builder.set_override(key, split_list(&value))?
            } else {
                builder.set_override(key, value)?
            };
        }

        builder.build()?.try_deserialize()
    }

    /// Reject settings that are unsafe for a persistent deployment
    pub fn validate(&self) -> Result<(), DomainError> {
        let secret = self.auth.jwt_secret.trim();
        let weak_secret = secret.is_empty() || secret == DEVELOPMENT_JWT_SECRET;

        if weak_secret && self.database.backend == DatabaseBackend::Postgres {
            return Err(DomainError::configuration(
                "auth.jwt_secret (JWT_SECRET_KEY) must be set to a non-default value",
            ));
        }

        if self.auth.token_ttl_hours == 0 {
            return Err(DomainError::configuration(
                "auth.token_ttl_hours must be greater than zero",
            ));
        }

        if self.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(DomainError::configuration(format!(
                "auth.token_ttl_hours must be at most {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }

        if self.limits.max_body_bytes == 0 {
            return Err(DomainError::configuration(
                "limits.max_body_bytes must be greater than zero",
            ));
        }

        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.backend = DatabaseBackend::Memory;
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.auth.token_ttl_hours, 12);
        assert_eq!(config.limits.max_body_bytes, 16 * 1024 * 1024);
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.mail.smtp_port, 587);
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.global.len(), 2);
    }

    #[test]
    fn test_default_route_limits() {
        let routes = default_route_limits();
        let login = routes.iter().find(|r| r.name == "login").unwrap();

        assert_eq!(login.window(), WindowLimit::new(10, 60));
        assert!(routes.iter().any(|r| r.path == "/api/contacts/{id}/send_email"));
    }

    #[test]
    fn test_validate_rejects_missing_secret_for_postgres() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.auth.jwt_secret = DEVELOPMENT_JWT_SECRET.to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.auth.jwt_secret = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_allows_empty_secret_in_memory_mode() {
        assert!(memory_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = memory_config();
        config.auth.token_ttl_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_ttl() {
        let mut config = memory_config();

        config.auth.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        assert!(config.validate().is_ok());

        config.auth.token_ttl_hours = MAX_TOKEN_TTL_HOURS + 1;
        assert!(config.validate().is_err());

        config.auth.token_ttl_hours = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sender_address_falls_back_to_username() {
        let mut mail = MailConfig::default();
        mail.username = "svc@example.com".to_string();
        assert_eq!(mail.sender_address(), "svc@example.com");

        mail.from_address = "noreply@example.com".to_string();
        assert_eq!(mail.sender_address(), "noreply@example.com");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("http://a.io, http://b.io ,,"),
            vec!["http://a.io".to_string(), "http://b.io".to_string()]
        );
    }

    #[test]
    fn test_deserialize_partial_document() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": { "host": "127.0.0.1", "port": 9000 },
            "database": { "backend": "memory" },
            "logging": { "level": "debug", "format": "json" }
        }))
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.static_dir, "public");
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.auth.token_ttl_hours, 12);
    }
}
