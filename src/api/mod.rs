//! API layer - HTTP endpoints and middleware

pub mod auth;
pub mod contacts;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;


pub use router::{create_router, create_router_with_ui};
pub use state::AppState;
