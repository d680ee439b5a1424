//! Report response handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use reportage_auth::JwtClaims;
use reportage_workflow::NewResponseItem;

use crate::error::{ApiReportsError, ApiResult};
use crate::handlers::actor_id;
use crate::models::{
    EvaluateRequest, ReportResponseDto, ResponseCommentDto, ResponseHistoryDto, ResponseItemDto,
    SelfEvaluateRequest, SendBackRequest, SubmitResponseRequest, UploadQuery,
};
use crate::router::ReportsState;
use crate::services::is_valid_file_type;

fn to_items(items: Vec<crate::models::ResponseItemRequest>) -> Vec<NewResponseItem> {
    items.into_iter().map(Into::into).collect()
}

/// Submit a response to a request.
#[utoipa::path(
    post,
    path = "/reports/requests/{id}/responses",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report request ID")),
    request_body = SubmitResponseRequest,
    responses(
        (status = 201, description = "Response submitted", body = ReportResponseDto),
        (status = 400, description = "Invalid items"),
        (status = 403, description = "Not a recipient"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Deadline passed or response already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_response(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitResponseRequest>,
) -> ApiResult<(StatusCode, Json<ReportResponseDto>)> {
    request.validate()?;
    let actor = actor_id(&claims)?;

    let response = state
        .response_service
        .submit(actor, id, request.note, to_items(request.items))
        .await?;
    Ok((StatusCode::CREATED, Json(response.into())))
}

/// List responses for a request (evaluator view).
#[utoipa::path(
    get,
    path = "/reports/requests/{id}/responses",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report request ID")),
    responses(
        (status = 200, description = "Responses", body = [ReportResponseDto]),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_responses_for_request(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ReportResponseDto>>> {
    actor_id(&claims)?;
    state.request_service.get_request(id).await?;
    let responses = state.response_service.list_by_request(id).await?;
    Ok(Json(responses.into_iter().map(Into::into).collect()))
}

/// The current user's response for a request, if any.
#[utoipa::path(
    get,
    path = "/reports/requests/{id}/responses/mine",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report request ID")),
    responses(
        (status = 200, description = "The caller's response, or null", body = Option<ReportResponseDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_response_for_request(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Option<ReportResponseDto>>> {
    let actor = actor_id(&claims)?;
    let response = state
        .response_service
        .get_by_request_and_user(id, actor)
        .await?;
    Ok(Json(response.map(Into::into)))
}

/// List the current user's responses across all requests.
#[utoipa::path(
    get,
    path = "/reports/responses/mine",
    tag = "Reports - Responses",
    responses(
        (status = 200, description = "The caller's responses", body = [ReportResponseDto])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_responses(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<Vec<ReportResponseDto>>> {
    let actor = actor_id(&claims)?;
    let responses = state.response_service.list_my(actor).await?;
    Ok(Json(responses.into_iter().map(Into::into).collect()))
}

/// Get a response by id.
#[utoipa::path(
    get,
    path = "/reports/responses/{id}",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report response ID")),
    responses(
        (status = 200, description = "Response details", body = ReportResponseDto),
        (status = 404, description = "Response not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_response(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReportResponseDto>> {
    actor_id(&claims)?;
    let response = state.response_service.get_response(id).await?;
    Ok(Json(response.into()))
}

/// Revise an unscored response (submitter only).
#[utoipa::path(
    put,
    path = "/reports/responses/{id}",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report response ID")),
    request_body = SubmitResponseRequest,
    responses(
        (status = 200, description = "Response updated", body = ReportResponseDto),
        (status = 403, description = "Not the submitter"),
        (status = 404, description = "Response not found"),
        (status = 409, description = "Response locked or deadline passed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_response(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitResponseRequest>,
) -> ApiResult<Json<ReportResponseDto>> {
    request.validate()?;
    let actor = actor_id(&claims)?;

    let response = state
        .response_service
        .update(actor, id, request.note, to_items(request.items))
        .await?;
    Ok(Json(response.into()))
}

/// Evaluate a response: assign a score and lock it (request creator only).
#[utoipa::path(
    post,
    path = "/reports/responses/{id}/evaluate",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report response ID")),
    request_body = EvaluateRequest,
    responses(
        (status = 200, description = "Response evaluated", body = ReportResponseDto),
        (status = 400, description = "Score out of range"),
        (status = 403, description = "Not the request creator"),
        (status = 404, description = "Response not found"),
        (status = 409, description = "Response already evaluated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn evaluate_response(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<EvaluateRequest>,
) -> ApiResult<Json<ReportResponseDto>> {
    request.validate()?;
    let actor = actor_id(&claims)?;

    let response = state
        .response_service
        .evaluate(actor, id, request.score, request.comment)
        .await?;
    Ok(Json(response.into()))
}

/// Send an unscored response back for revision (request creator only).
#[utoipa::path(
    post,
    path = "/reports/responses/{id}/send-back",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report response ID")),
    request_body = SendBackRequest,
    responses(
        (status = 200, description = "Response sent back", body = ReportResponseDto),
        (status = 400, description = "Missing comment"),
        (status = 403, description = "Not the request creator"),
        (status = 404, description = "Response not found"),
        (status = 409, description = "Response already evaluated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_back_response(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendBackRequest>,
) -> ApiResult<Json<ReportResponseDto>> {
    request.validate()?;
    let actor = actor_id(&claims)?;

    let response = state
        .response_service
        .send_back(actor, id, request.comment)
        .await?;
    Ok(Json(response.into()))
}

/// Record the submitter's one-time self-score.
#[utoipa::path(
    post,
    path = "/reports/responses/{id}/self-evaluate",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report response ID")),
    request_body = SelfEvaluateRequest,
    responses(
        (status = 200, description = "Self-evaluation recorded", body = ReportResponseDto),
        (status = 400, description = "Score out of range"),
        (status = 403, description = "Not the submitter"),
        (status = 404, description = "Response not found"),
        (status = 409, description = "Self-evaluation already recorded")
    ),
    security(("bearer_auth" = []))
)]
pub async fn self_evaluate_response(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelfEvaluateRequest>,
) -> ApiResult<Json<ReportResponseDto>> {
    request.validate()?;
    let actor = actor_id(&claims)?;

    let response = state
        .response_service
        .self_evaluate(actor, id, request.score)
        .await?;
    Ok(Json(response.into()))
}

/// Edit history of a response (submitter or request creator).
#[utoipa::path(
    get,
    path = "/reports/responses/{id}/history",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report response ID")),
    responses(
        (status = 200, description = "Edit history", body = [ResponseHistoryDto]),
        (status = 403, description = "Not the submitter or the creator"),
        (status = 404, description = "Response not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn response_history(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ResponseHistoryDto>>> {
    let actor = actor_id(&claims)?;
    let history = state.response_service.history(actor, id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// Evaluation comment log of a response, newest first.
#[utoipa::path(
    get,
    path = "/reports/responses/{id}/comments",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report response ID")),
    responses(
        (status = 200, description = "Comment log", body = [ResponseCommentDto]),
        (status = 404, description = "Response not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn comment_history(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ResponseCommentDto>>> {
    actor_id(&claims)?;
    let comments = state.response_service.comment_history(id).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// Delete a response (submitter only).
#[utoipa::path(
    delete,
    path = "/reports/responses/{id}",
    tag = "Reports - Responses",
    params(("id" = Uuid, Path, description = "Report response ID")),
    responses(
        (status = 204, description = "Response deleted"),
        (status = 403, description = "Not the submitter"),
        (status = 404, description = "Response not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_response(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = actor_id(&claims)?;
    let orphaned = state.response_service.delete(actor, id).await?;
    for file in orphaned {
        if let Err(e) = state.files.delete(&file.file_path).await {
            tracing::warn!(path = %file.file_path, error = %e, "Failed to delete stored file");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a file for a persisted response item.
///
/// Issued after the item batch write, keyed by the item id returned from
/// it. The raw request body carries the file bytes; name and type come
/// from the query string. Only images and PDFs are accepted.
#[utoipa::path(
    put,
    path = "/reports/responses/items/{item_id}/file",
    tag = "Reports - Responses",
    params(
        ("item_id" = Uuid, Path, description = "Response item ID"),
        UploadQuery
    ),
    request_body(content = Vec<u8>, description = "Raw file bytes", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "File attached", body = ResponseItemDto),
        (status = 400, description = "Unsupported file type"),
        (status = 403, description = "Not the submitter"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Response locked or deadline passed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_item_file(
    State(state): State<ReportsState>,
    Extension(claims): Extension<JwtClaims>,
    Path(item_id): Path<Uuid>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<Json<ResponseItemDto>> {
    let actor = actor_id(&claims)?;

    if !is_valid_file_type(query.content_type.as_deref()) {
        return Err(ApiReportsError::Validation(
            "Only image and PDF files are accepted".to_string(),
        ));
    }

    // Locate the owning response to build the storage folder.
    let response = state
        .response_service
        .get_response_for_item(item_id)
        .await?;

    let metadata = state
        .files
        .store(
            &format!("reports/{}", response.id),
            &query.file_name,
            query.content_type.as_deref(),
            &body,
        )
        .await?;

    match state
        .response_service
        .attach_item_file(actor, item_id, metadata.clone())
        .await
    {
        Ok(item) => Ok(Json(item.into())),
        Err(e) => {
            // The attach was rejected; do not leave the stored bytes behind.
            if let Err(cleanup) = state.files.delete(&metadata.file_path).await {
                tracing::warn!(path = %metadata.file_path, error = %cleanup, "Failed to clean up rejected upload");
            }
            Err(e.into())
        }
    }
}
