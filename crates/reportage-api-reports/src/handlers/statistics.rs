//! Statistics handlers.

use axum::{extract::{Query, State}, Extension, Json};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use reportage_auth::JwtClaims;

use crate::error::ApiResult;
use crate::handlers::actor_id;
use crate::models::StatisticsResponse;
use crate::router::ReportsState;

/// Query parameters for the statistics listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct StatisticsQuery {
    /// Restrict to responses submitted by this user.
    pub submitted_by: Option<Uuid>,
}

/// Statistics over all responses, optionally filtered by submitter.
#[utoipa::path(
    get,
    path = "/reports/statistics",
    tag = "Reports - Statistics",
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Statistics listing and summary", body = StatisticsResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_statistics(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Query(query): Query<StatisticsQuery>,
) -> ApiResult<Json<StatisticsResponse>> {
    actor_id(&claims)?;
    let stats = state
        .statistics_service
        .statistics(query.submitted_by)
        .await?;
    Ok(Json(stats.into()))
}

/// The current user's own statistics.
#[utoipa::path(
    get,
    path = "/reports/statistics/me",
    tag = "Reports - Statistics",
    responses(
        (status = 200, description = "The caller's statistics", body = StatisticsResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_statistics(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<StatisticsResponse>> {
    let actor = actor_id(&claims)?;
    let stats = state.statistics_service.statistics(Some(actor)).await?;
    Ok(Json(stats.into()))
}
