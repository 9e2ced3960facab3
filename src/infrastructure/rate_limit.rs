//! Rate limiter implementation
//!
//! Sliding window counters per client, evaluated against the matching route
//! rule and the global per-client windows.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::config::{RateLimitSettings, WindowLimit};

const GLOBAL_RULE: &str = "global";

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Limit of the window that decided the outcome
    pub limit: u32,
    /// Seconds until a slot frees up in the exhausted window
    pub reset_in_seconds: u64,
    /// Name of the rule that rejected the request
    pub rule: Option<String>,
}

impl RateLimitResult {
    fn allowed() -> Self {
        Self {
            allowed: true,
            limit: 0,
            reset_in_seconds: 0,
            rule: None,
        }
    }
}

/// Windows that apply to one request, each with its counter key
struct Applicable<'a> {
    key: String,
    rule: &'a str,
    windows: Vec<WindowLimit>,
}

/// Sliding window rate limiter keyed by client address
#[derive(Debug)]
pub struct RateLimiter {
    settings: RateLimitSettings,
    /// Request timestamps per `client:rule` key
    records: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    cleanup_interval: Duration,
    last_cleanup: Arc<RwLock<Instant>>,
    /// Longest configured window; older records are dropped on cleanup
    retention: Duration,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        let retention = settings
            .routes
            .iter()
            .map(|r| r.window_secs)
            .chain(settings.global.iter().map(|w| w.window_secs))
            .max()
            .unwrap_or(0);

        Self {
            settings,
            records: Arc::new(RwLock::new(HashMap::new())),
            cleanup_interval: Duration::from_secs(300),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
            retention: Duration::from_secs(retention),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Check every window that applies to the request and record it when all
    /// of them have room. A rejected request is not counted.
    pub async fn check_and_record(&self, client: &str, method: &str, route: &str) -> RateLimitResult {
        if !self.settings.enabled {
            return RateLimitResult::allowed();
        }

        self.maybe_cleanup().await;

        let applicable = self.applicable(client, method, route);
        let now = Instant::now();
        let mut records = self.records.write().await;

        for entry in &applicable {
            let history = records.get(&entry.key);

            for window in &entry.windows {
                if let Some(reset_in_seconds) = exhausted(history, window, now) {
                    return RateLimitResult {
                        allowed: false,
                        limit: window.limit,
                        reset_in_seconds,
                        rule: Some(entry.rule.to_string()),
                    };
                }
            }
        }

        for entry in applicable {
            records.entry(entry.key).or_default().push(now);
        }

        RateLimitResult::allowed()
    }

    fn applicable(&self, client: &str, method: &str, route: &str) -> Vec<Applicable<'_>> {
        let mut applicable: Vec<Applicable<'_>> = self
            .settings
            .routes
            .iter()
            .filter(|rule| rule.path == route && rule.method.eq_ignore_ascii_case(method))
            .map(|rule| Applicable {
                key: format!("{}:{}", client, rule.name),
                rule: &rule.name,
                windows: vec![rule.window()],
            })
            .collect();

        if !self.settings.global.is_empty() {
            applicable.push(Applicable {
                key: format!("{}:{}", client, GLOBAL_RULE),
                rule: GLOBAL_RULE,
                windows: self.settings.global.clone(),
            });
        }

        applicable
    }

    async fn maybe_cleanup(&self) {
        let should_cleanup = {
            let last = self.last_cleanup.read().await;
            last.elapsed() >= self.cleanup_interval
        };

        if should_cleanup {
            let mut last = self.last_cleanup.write().await;
            *last = Instant::now();

            let now = Instant::now();
            let cutoff = now.checked_sub(self.retention).unwrap_or(now);

            let mut records = self.records.write().await;

            for history in records.values_mut() {
                history.retain(|t| *t >= cutoff);
            }

            records.retain(|_, v| !v.is_empty());
        }
    }
}

/// Seconds until the window frees a slot, or `None` when it has room
fn exhausted(history: Option<&Vec<Instant>>, window: &WindowLimit, now: Instant) -> Option<u64> {
    let history = history?;
    let start = now
        .checked_sub(Duration::from_secs(window.window_secs))
        .unwrap_or(now);

    let in_window = history.iter().filter(|t| **t >= start);

    if (in_window.clone().count() as u32) < window.limit {
        return None;
    }

    let reset_in = in_window
        .min()
        .map(|oldest| {
            let elapsed = now.duration_since(*oldest);
            window.window_secs.saturating_sub(elapsed.as_secs())
        })
        .unwrap_or(window.window_secs);

    Some(reset_in.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteRateLimit;

    fn settings(route_limit: u32, global_limit: u32) -> RateLimitSettings {
        RateLimitSettings {
            enabled: true,
            routes: vec![RouteRateLimit {
                name: "login".to_string(),
                method: "POST".to_string(),
                path: "/api/login".to_string(),
                limit: route_limit,
                window_secs: 60,
            }],
            global: vec![WindowLimit::new(global_limit, 3600)],
        }
    }

    #[tokio::test]
    async fn test_allows_first_request() {
        let limiter = RateLimiter::new(settings(2, 100));

        let result = limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;

        assert!(result.allowed);
        assert_eq!(result.rule, None);
    }

    #[tokio::test]
    async fn test_blocks_route_over_limit() {
        let limiter = RateLimiter::new(settings(2, 100));

        limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;
        limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;

        let result = limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;

        assert!(!result.allowed);
        assert_eq!(result.limit, 2);
        assert_eq!(result.rule.as_deref(), Some("login"));
        assert!(result.reset_in_seconds >= 1 && result.reset_in_seconds <= 60);
    }

    #[tokio::test]
    async fn test_route_rule_matches_method() {
        let limiter = RateLimiter::new(settings(1, 100));

        limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;

        let result = limiter.check_and_record("10.0.0.1", "GET", "/api/login").await;
        assert!(result.allowed);
    }

    #[tokio::test]
    async fn test_different_clients() {
        let limiter = RateLimiter::new(settings(1, 100));

        limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;

        let result = limiter.check_and_record("10.0.0.2", "POST", "/api/login").await;
        assert!(result.allowed);

        let result = limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;
        assert!(!result.allowed);
    }

    #[tokio::test]
    async fn test_global_window_spans_routes() {
        let limiter = RateLimiter::new(settings(100, 2));

        limiter.check_and_record("10.0.0.1", "GET", "/api/contacts").await;
        limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;

        let result = limiter.check_and_record("10.0.0.1", "GET", "/api/health").await;
        assert!(!result.allowed);
        assert_eq!(result.rule.as_deref(), Some("global"));
    }

    #[tokio::test]
    async fn test_rejected_requests_are_not_counted() {
        let limiter = RateLimiter::new(settings(1, 3));

        limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;
        for _ in 0..5 {
            limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;
        }

        // One global slot used by the accepted login, two remain
        assert!(limiter.check_and_record("10.0.0.1", "GET", "/api/contacts").await.allowed);
        assert!(limiter.check_and_record("10.0.0.1", "GET", "/api/contacts").await.allowed);
        assert!(!limiter.check_and_record("10.0.0.1", "GET", "/api/contacts").await.allowed);
    }

    #[tokio::test]
    async fn test_disabled() {
        let limiter = RateLimiter::new(RateLimitSettings::disabled());

        for _ in 0..1000 {
            let result = limiter.check_and_record("10.0.0.1", "POST", "/api/login").await;
            assert!(result.allowed);
        }
    }
}
