//! REST API for the report request lifecycle.
//!
//! # Endpoints
//!
//! - `GET/POST /reports/requests` - request listing and creation
//! - `GET/PUT/DELETE /reports/requests/{id}` - request detail and editing
//! - `PATCH /reports/requests/{id}/status` - status transitions
//! - `POST /reports/requests/{id}/forward` - forward to new recipients
//! - `GET/POST /reports/requests/{id}/responses` - response submission
//! - `POST /reports/responses/{id}/evaluate|send-back|self-evaluate`
//! - `GET /reports/requests/{id}/history`, `/reports/responses/{id}/history`
//! - `GET /reports/statistics`, `/reports/statistics/me`
//! - `GET /reports/requests/{id}/export` - office-document export

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::{ApiReportsError, ApiResult, ErrorResponse};
pub use router::{reports_router, ReportsState};
pub use services::{ExportService, FileStore, LocalFileStore};
