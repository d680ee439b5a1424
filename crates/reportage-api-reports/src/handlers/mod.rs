//! HTTP handlers for the reports API.

pub mod report_requests;
pub mod report_responses;
pub mod statistics;

use uuid::Uuid;

use reportage_auth::JwtClaims;

use crate::error::{ApiReportsError, ApiResult};

/// Extract the acting user id from the verified claims.
pub(crate) fn actor_id(claims: &JwtClaims) -> ApiResult<Uuid> {
    Uuid::parse_str(&claims.sub).map_err(|_| ApiReportsError::Unauthorized)
}
