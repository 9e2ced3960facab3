//! Infrastructure layer - External service implementations

pub mod auth;
pub mod contact;
pub mod logging;
pub mod notification;
pub mod observability;
pub mod rate_limit;
pub mod storage;
pub mod transfer;
pub mod user;
