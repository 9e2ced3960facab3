//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseBackend, DatabaseConfig, LimitsConfig, LogFormat,
    LoggingConfig, MailConfig, RateLimitSettings, RouteRateLimit, ServerConfig, WindowLimit,
    DEVELOPMENT_JWT_SECRET,
};
