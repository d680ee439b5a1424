//! Router configuration for the reports API.

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;

use reportage_db::{
    PgCommentStore, PgDirectoryStore, PgRequestHistoryStore, PgRequestStore,
    PgResponseHistoryStore, PgResponseStore,
};
use reportage_workflow::{RequestService, ResponseService, StatisticsService};

use crate::handlers::{report_requests, report_responses, statistics};
use crate::services::{ExportService, FileStore};

/// Shared state for report handlers.
#[derive(Clone)]
pub struct ReportsState {
    pub(crate) pool: PgPool,
    pub request_service: Arc<RequestService>,
    pub response_service: Arc<ResponseService>,
    pub statistics_service: Arc<StatisticsService>,
    pub export_service: Arc<ExportService>,
    pub files: Arc<dyn FileStore>,
}

impl ReportsState {
    /// Wire the services over PostgreSQL-backed stores.
    #[must_use]
    pub fn new(pool: PgPool, files: Arc<dyn FileStore>) -> Self {
        let requests = Arc::new(PgRequestStore::new(pool.clone()));
        let responses = Arc::new(PgResponseStore::new(pool.clone()));
        let request_history = Arc::new(PgRequestHistoryStore::new(pool.clone()));
        let response_history = Arc::new(PgResponseHistoryStore::new(pool.clone()));
        let comments = Arc::new(PgCommentStore::new(pool.clone()));
        let directory = Arc::new(PgDirectoryStore::new(pool.clone()));

        let request_service = Arc::new(RequestService::new(
            requests.clone(),
            responses.clone(),
            request_history,
            response_history.clone(),
            comments.clone(),
            directory.clone(),
        ));
        let response_service = Arc::new(ResponseService::new(
            responses.clone(),
            requests.clone(),
            response_history,
            comments,
            directory.clone(),
        ));
        let statistics_service = Arc::new(StatisticsService::new(
            responses,
            requests,
            directory.clone(),
        ));
        let export_service = Arc::new(ExportService::new(directory));

        Self {
            pool,
            request_service,
            response_service,
            statistics_service,
            export_service,
            files,
        }
    }
}

/// Build the reports router. Nest under `/reports`.
pub fn reports_router(pool: PgPool, files: Arc<dyn FileStore>) -> Router {
    let state = ReportsState::new(pool, files);

    Router::new()
        // Request lifecycle
        .route(
            "/requests",
            get(report_requests::list_requests).post(report_requests::create_request),
        )
        .route("/requests/mine", get(report_requests::list_my_requests))
        .route(
            "/requests/received",
            get(report_requests::list_received_requests),
        )
        .route(
            "/requests/:id",
            get(report_requests::get_request)
                .put(report_requests::update_request)
                .delete(report_requests::delete_request),
        )
        .route("/requests/:id/status", patch(report_requests::update_status))
        .route("/requests/:id/forward", post(report_requests::forward_request))
        .route("/requests/:id/history", get(report_requests::get_history))
        .route("/requests/:id/export", get(report_requests::export_request))
        .route(
            "/requests/:id/attachments",
            get(report_requests::list_attachments).post(report_requests::upload_attachment),
        )
        .route(
            "/attachments/:id",
            delete(report_requests::delete_attachment),
        )
        .route(
            "/attachments/:id/download",
            get(report_requests::download_attachment),
        )
        // Response lifecycle
        .route(
            "/requests/:id/responses",
            get(report_responses::list_responses_for_request)
                .post(report_responses::submit_response),
        )
        .route(
            "/requests/:id/responses/mine",
            get(report_responses::my_response_for_request),
        )
        .route("/responses/mine", get(report_responses::list_my_responses))
        .route(
            "/responses/:id",
            get(report_responses::get_response)
                .put(report_responses::update_response)
                .delete(report_responses::delete_response),
        )
        .route(
            "/responses/:id/evaluate",
            post(report_responses::evaluate_response),
        )
        .route(
            "/responses/:id/send-back",
            post(report_responses::send_back_response),
        )
        .route(
            "/responses/:id/self-evaluate",
            post(report_responses::self_evaluate_response),
        )
        .route(
            "/responses/:id/history",
            get(report_responses::response_history),
        )
        .route(
            "/responses/:id/comments",
            get(report_responses::comment_history),
        )
        .route(
            "/responses/items/:item_id/file",
            put(report_responses::upload_item_file),
        )
        // Statistics
        .route("/statistics", get(statistics::get_statistics))
        .route("/statistics/me", get(statistics::get_my_statistics))
        .with_state(state)
}
