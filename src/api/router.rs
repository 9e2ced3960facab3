use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::warn;

use super::auth;
use super::contacts;
use super::health;
use super::middleware::{
    body_limit_middleware, logging_middleware, metrics_middleware, rate_limit_middleware,
    security_headers_middleware,
};
use super::state::AppState;
use crate::config::CorsConfig;

/// Create the JSON API router with application state
pub fn create_router(state: AppState) -> Router {
    with_http_layers(api_routes(state))
}

/// Create the API router plus the single-page client served from `static_dir`.
/// Unknown paths fall back to `index.html` so client-side routes resolve.
pub fn create_router_with_ui(state: AppState, static_dir: &str) -> Router {
    let index = format!("{}/index.html", static_dir.trim_end_matches('/'));
    let ui = ServeDir::new(static_dir).fallback(ServeFile::new(index));

    with_http_layers(api_routes(state).fallback_service(ui))
}

fn api_routes(state: AppState) -> Router {
    let limits = state.limits.clone();
    let cors = cors_layer(&state.cors);

    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/ready", get(health::ready_check))
        .merge(auth::create_auth_router())
        .merge(contacts::create_contacts_router())
        .route_layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(middleware::from_fn_with_state(limits, body_limit_middleware))
        .layer(cors)
        .with_state(state)
}

fn with_http_layers(router: Router) -> Router {
    router
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Credentialed CORS restricted to the configured origins
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn cors_app() -> Router {
        let config = CorsConfig {
            allowed_origins: vec![
                "*".to_string(),
                "http://localhost:3000".to_string(),
                "bad\norigin".to_string(),
            ],
        };

        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer(&config))
    }

    async fn allowed_origin(origin: &str) -> Option<HeaderValue> {
        let request = Request::builder()
            .uri("/")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();

        let response = cors_app().oneshot(request).await.unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        assert_eq!(
            allowed_origin("http://localhost:3000").await,
            Some(HeaderValue::from_static("http://localhost:3000"))
        );
    }

    #[tokio::test]
    async fn test_cors_skips_wildcard_and_unknown_origins() {
        assert_eq!(allowed_origin("http://evil.example").await, None);
        assert_eq!(allowed_origin("*").await, None);
    }
}
