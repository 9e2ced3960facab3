//! Per-client rate limiting middleware

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::logging::route_of;
use crate::api::types::ApiError;
use crate::infrastructure::observability::record_rate_limit_rejection;
use crate::infrastructure::rate_limit::RateLimiter;

/// Count the request against its route rule and the global windows.
/// Must be added with `route_layer` so the matched route is known.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    let client = client_key(&request);
    let route = route_of(&request);
    let result = limiter
        .check_and_record(&client, request.method().as_str(), &route)
        .await;

    if !result.allowed {
        let rule = result.rule.as_deref().unwrap_or("unknown");
        record_rate_limit_rejection(rule);
        warn!(client = %client, route = %route, rule, "Rate limit exceeded");
        return ApiError::rate_limited(result.reset_in_seconds).into_response();
    }

    next.run(request).await
}

/// Peer address, else the first `X-Forwarded-For` hop, else `unknown`
fn client_key(request: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
