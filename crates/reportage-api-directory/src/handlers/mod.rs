//! HTTP handlers for the directory API.

pub mod departments;
pub mod organizations;
pub mod positions;
pub mod roles;
pub mod users;

use uuid::Uuid;

use reportage_auth::JwtClaims;

use crate::error::{ApiDirectoryError, ApiResult};

/// Extract the acting user id from the verified claims.
pub(crate) fn actor_id(claims: &JwtClaims) -> ApiResult<Uuid> {
    Uuid::parse_str(&claims.sub).map_err(|_| ApiDirectoryError::Unauthorized)
}
