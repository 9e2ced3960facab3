//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use self::metrics::{
    create_metrics_router, init_metrics, record_email, record_http_request, record_import,
    record_login, record_rate_limit_rejection, PrometheusMetrics,
};
