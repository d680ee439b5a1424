//! Bearer-token authentication for reportage services.
//!
//! The reporting system does not implement login itself; users authenticate
//! against an upstream SSO and present a signed JWT. This crate verifies
//! those tokens and exposes the acting user to handlers.
//!
//! - [`claims`] - the `JwtClaims` structure and builder
//! - [`jwt`] - HS256 encode/decode
//! - [`middleware`] - axum middleware inserting `JwtClaims` into extensions

pub mod claims;
pub mod error;
pub mod jwt;
pub mod middleware;

pub use claims::{JwtClaims, JwtClaimsBuilder};
pub use error::AuthError;
pub use jwt::{decode_token, encode_token};
pub use middleware::{jwt_auth_middleware, JwtSecret};
