//! Authentication infrastructure module
//!
//! Bearer token issuance and verification.

mod jwt;

pub use jwt::{
    IssuedToken, JwtConfig, JwtService, TokenClaims, TokenError, TokenService,
    DEFAULT_TOKEN_TTL_HOURS,
};
