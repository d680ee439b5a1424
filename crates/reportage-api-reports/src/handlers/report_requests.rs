//! Report request handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use reportage_auth::JwtClaims;
use reportage_db::models::ReportRequestAttachmentRow;
use reportage_workflow::{
    derived_status, ForwardRequest, NewReportRequest, ReportRequestUpdate, RequestFilter,
};

use crate::error::{ApiReportsError, ApiResult};
use crate::handlers::actor_id;
use crate::models::{
    AttachmentResponse, CreateReportRequestRequest, ForwardReportRequestRequest,
    ListRequestsQuery, ReportRequestResponse, RequestHistoryResponse, UpdateReportRequestRequest,
    UpdateStatusRequest, UploadQuery,
};
use crate::router::ReportsState;
use crate::services::EXPORT_CONTENT_TYPE;

impl From<ListRequestsQuery> for RequestFilter {
    fn from(query: ListRequestsQuery) -> Self {
        Self {
            search: query.search,
            status: query.status,
            created_by: query.created_by,
            submitted_by: query.submitted_by,
            organization_id: query.organization_id,
            department_id: query.department_id,
        }
    }
}

async fn enrich(
    state: &ReportsState,
    requests: Vec<reportage_workflow::ReportRequest>,
) -> ApiResult<Vec<ReportRequestResponse>> {
    let mut out = Vec::with_capacity(requests.len());
    for request in requests {
        let rollup = state.request_service.rollup(&request).await?;
        out.push(ReportRequestResponse::from_request(request, rollup));
    }
    Ok(out)
}

/// List all report requests with optional filters.
#[utoipa::path(
    get,
    path = "/reports/requests",
    tag = "Reports - Requests",
    params(ListRequestsQuery),
    responses(
        (status = 200, description = "List of report requests", body = [ReportRequestResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_requests(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Query(query): Query<ListRequestsQuery>,
) -> ApiResult<Json<Vec<ReportRequestResponse>>> {
    actor_id(&claims)?;
    let requests = state
        .request_service
        .list_with_filters(&query.into())
        .await?;
    Ok(Json(enrich(&state, requests).await?))
}

/// List requests created by the current user.
#[utoipa::path(
    get,
    path = "/reports/requests/mine",
    tag = "Reports - Requests",
    responses(
        (status = 200, description = "Requests created by the caller", body = [ReportRequestResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_requests(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<Vec<ReportRequestResponse>>> {
    let actor = actor_id(&claims)?;
    let requests = state.request_service.list_created_by(actor).await?;
    Ok(Json(enrich(&state, requests).await?))
}

/// List requests the current user received, with their derived status.
#[utoipa::path(
    get,
    path = "/reports/requests/received",
    tag = "Reports - Requests",
    responses(
        (status = 200, description = "Requests targeting the caller", body = [ReportRequestResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_received_requests(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<Vec<ReportRequestResponse>>> {
    let actor = actor_id(&claims)?;
    let requests = state.request_service.list_received(actor).await?;

    let mut out = Vec::with_capacity(requests.len());
    for request in requests {
        let rollup = state.request_service.rollup(&request).await?;
        let mine = state
            .response_service
            .get_by_request_and_user(request.id, actor)
            .await?;
        out.push(
            ReportRequestResponse::from_request(request, rollup)
                .with_my_status(derived_status(mine.as_ref())),
        );
    }
    Ok(Json(out))
}

/// Create a report request.
#[utoipa::path(
    post,
    path = "/reports/requests",
    tag = "Reports - Requests",
    request_body = CreateReportRequestRequest,
    responses(
        (status = 201, description = "Request created", body = ReportRequestResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_request(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Json(request): Json<CreateReportRequestRequest>,
) -> ApiResult<(StatusCode, Json<ReportRequestResponse>)> {
    request.validate()?;
    let actor = actor_id(&claims)?;

    let created = state
        .request_service
        .create_request(
            actor,
            NewReportRequest {
                title: request.title,
                description: request.description,
                deadline: request.deadline,
                target_organizations: request.organization_ids,
                target_departments: request.department_ids,
                target_users: request.user_ids,
            },
        )
        .await?;

    let rollup = state.request_service.rollup(&created).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReportRequestResponse::from_request(created, rollup)),
    ))
}

/// Get a report request by id.
#[utoipa::path(
    get,
    path = "/reports/requests/{id}",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Report request ID")),
    responses(
        (status = 200, description = "Request details", body = ReportRequestResponse),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_request(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReportRequestResponse>> {
    let actor = actor_id(&claims)?;
    let request = state.request_service.get_request(id).await?;
    let rollup = state.request_service.rollup(&request).await?;
    let mine = state
        .response_service
        .get_by_request_and_user(request.id, actor)
        .await?;

    let mut dto = ReportRequestResponse::from_request(request, rollup);
    if let Some(response) = mine {
        dto = dto.with_my_status(derived_status(Some(&response)));
    }
    Ok(Json(dto))
}

/// Edit a report request (creator only).
#[utoipa::path(
    put,
    path = "/reports/requests/{id}",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Report request ID")),
    request_body = UpdateReportRequestRequest,
    responses(
        (status = 200, description = "Request updated", body = ReportRequestResponse),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_request(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReportRequestRequest>,
) -> ApiResult<Json<ReportRequestResponse>> {
    request.validate()?;
    let actor = actor_id(&claims)?;

    let updated = state
        .request_service
        .update_request(
            actor,
            id,
            ReportRequestUpdate {
                title: request.title,
                description: request.description,
                deadline: request.deadline,
                target_organizations: request.organization_ids,
                target_departments: request.department_ids,
                target_users: request.user_ids,
            },
        )
        .await?;

    let rollup = state.request_service.rollup(&updated).await?;
    Ok(Json(ReportRequestResponse::from_request(updated, rollup)))
}

/// Change a report request's status.
#[utoipa::path(
    patch,
    path = "/reports/requests/{id}/status",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Report request ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ReportRequestResponse),
        (status = 400, description = "Transition not permitted"),
        (status = 403, description = "Not a recipient or the creator"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is in a terminal status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_status(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<ReportRequestResponse>> {
    let actor = actor_id(&claims)?;
    let updated = state
        .request_service
        .update_status(actor, id, request.status)
        .await?;
    let rollup = state.request_service.rollup(&updated).await?;
    Ok(Json(ReportRequestResponse::from_request(updated, rollup)))
}

/// Delete a report request and everything hanging off it (creator only).
#[utoipa::path(
    delete,
    path = "/reports/requests/{id}",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Report request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_request(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = actor_id(&claims)?;

    // Remove creator attachments and their stored files first.
    let attachments = ReportRequestAttachmentRow::list_for_request(&state.pool, id).await?;

    let orphaned = state.request_service.delete_request(actor, id).await?;

    for attachment in attachments {
        if let Err(e) = state.files.delete(&attachment.file_path).await {
            tracing::warn!(path = %attachment.file_path, error = %e, "Failed to delete stored file");
        }
    }
    for file in orphaned {
        if let Err(e) = state.files.delete(&file.file_path).await {
            tracing::warn!(path = %file.file_path, error = %e, "Failed to delete stored file");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Forward a report request to new recipients.
#[utoipa::path(
    post,
    path = "/reports/requests/{id}/forward",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Source report request ID")),
    request_body = ForwardReportRequestRequest,
    responses(
        (status = 201, description = "Forwarded request created", body = ReportRequestResponse),
        (status = 403, description = "Not a recipient or the creator of the source"),
        (status = 404, description = "Source request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn forward_request(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<ForwardReportRequestRequest>,
) -> ApiResult<(StatusCode, Json<ReportRequestResponse>)> {
    request.validate()?;
    let actor = actor_id(&claims)?;

    let forwarded = state
        .request_service
        .forward(
            actor,
            id,
            ForwardRequest {
                title: request.title,
                forward_note: request.forward_note,
                deadline: request.deadline,
                target_users: request.user_ids,
            },
        )
        .await?;

    let rollup = state.request_service.rollup(&forwarded).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReportRequestResponse::from_request(forwarded, rollup)),
    ))
}

/// Edit history of a report request, newest version first.
#[utoipa::path(
    get,
    path = "/reports/requests/{id}/history",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Report request ID")),
    responses(
        (status = 200, description = "Edit history", body = [RequestHistoryResponse]),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_history(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<RequestHistoryResponse>>> {
    actor_id(&claims)?;
    let history = state.request_service.history(id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// Export a request and all of its responses as an office document.
#[utoipa::path(
    get,
    path = "/reports/requests/{id}/export",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Report request ID")),
    responses(
        (status = 200, description = "Generated document"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_request(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    actor_id(&claims)?;
    let request = state.request_service.get_request(id).await?;
    let responses = state.response_service.list_by_request(id).await?;

    let (bytes, file_name) = state
        .export_service
        .export_request(&request, &responses)
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, EXPORT_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(bytes.into())
        .map_err(|e| ApiReportsError::Storage(e.to_string()))
}

/// Upload an attachment to a request (creator only).
#[utoipa::path(
    post,
    path = "/reports/requests/{id}/attachments",
    tag = "Reports - Requests",
    params(
        ("id" = Uuid, Path, description = "Report request ID"),
        UploadQuery
    ),
    request_body(content = Vec<u8>, description = "Raw file bytes", content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Attachment stored", body = AttachmentResponse),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_attachment(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<AttachmentResponse>)> {
    let actor = actor_id(&claims)?;
    let request = state.request_service.get_request(id).await?;
    if request.created_by != actor {
        return Err(reportage_workflow::WorkflowError::NotCreator.into());
    }

    let metadata = state
        .files
        .store(
            &format!("report-requests/{id}"),
            &query.file_name,
            query.content_type.as_deref(),
            &body,
        )
        .await?;

    let row = ReportRequestAttachmentRow::insert(
        &state.pool,
        id,
        &metadata.file_name,
        &metadata.file_path,
        metadata.file_type.as_deref(),
        metadata.file_size,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// List attachments of a request.
#[utoipa::path(
    get,
    path = "/reports/requests/{id}/attachments",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Report request ID")),
    responses(
        (status = 200, description = "Attachments", body = [AttachmentResponse]),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_attachments(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<AttachmentResponse>>> {
    actor_id(&claims)?;
    state.request_service.get_request(id).await?;
    let rows = ReportRequestAttachmentRow::list_for_request(&state.pool, id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Delete an attachment (creator of the owning request only).
#[utoipa::path(
    delete,
    path = "/reports/attachments/{id}",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 204, description = "Attachment deleted"),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Attachment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_attachment(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = actor_id(&claims)?;
    let attachment = ReportRequestAttachmentRow::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiReportsError::NotFound(format!("Attachment not found: {id}")))?;

    let request = state
        .request_service
        .get_request(attachment.report_request_id)
        .await?;
    if request.created_by != actor {
        return Err(reportage_workflow::WorkflowError::NotCreator.into());
    }

    if let Err(e) = state.files.delete(&attachment.file_path).await {
        tracing::warn!(path = %attachment.file_path, error = %e, "Failed to delete stored file");
    }
    ReportRequestAttachmentRow::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Download an attachment's bytes.
#[utoipa::path(
    get,
    path = "/reports/attachments/{id}/download",
    tag = "Reports - Requests",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "File bytes"),
        (status = 404, description = "Attachment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_attachment(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    actor_id(&claims)?;
    let attachment = ReportRequestAttachmentRow::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiReportsError::NotFound(format!("Attachment not found: {id}")))?;

    let bytes = state.files.load(&attachment.file_path).await?;
    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            attachment
                .file_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        )
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment.file_name),
        )
        .body(bytes.into())
        .map_err(|e| ApiReportsError::Storage(e.to_string()))
}
