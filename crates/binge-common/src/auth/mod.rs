//! Bearer token verification

mod jwt;

pub use jwt::{Claims, TokenVerifier, SERVICE_SCOPE};
