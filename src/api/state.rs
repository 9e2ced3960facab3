//! Application state for shared services

use std::sync::Arc;

use crate::config::{CorsConfig, LimitsConfig};
use crate::infrastructure::auth::TokenService;
use crate::infrastructure::contact::ContactService;
use crate::infrastructure::notification::NotificationDispatcher;
use crate::infrastructure::rate_limit::RateLimiter;
use crate::infrastructure::transfer::{ContactExporter, ContactImporter};
use crate::infrastructure::user::UserService;

/// Services shared by every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub token_service: Arc<dyn TokenService>,
    pub contact_service: Arc<ContactService>,
    pub importer: Arc<ContactImporter>,
    pub exporter: Arc<ContactExporter>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub rate_limiter: Arc<RateLimiter>,
    pub limits: LimitsConfig,
    pub cors: CorsConfig,
}
