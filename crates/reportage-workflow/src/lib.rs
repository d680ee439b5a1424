//! Report request lifecycle domain logic.
//!
//! This crate owns the rules of the reporting workflow: who may create,
//! edit, forward, and close report requests; how recipients submit and
//! revise responses; how evaluation and self-evaluation freeze them; and
//! which derived views (per-recipient status, rollups, statistics) are
//! computed from the stored state.
//!
//! Storage is abstracted behind async store traits with in-memory
//! implementations for testing; PostgreSQL-backed implementations live in
//! `reportage-db`. Services take the acting user as an explicit parameter
//! on every call.
//!
//! # Modules
//!
//! - [`types`] - statuses, entities, validation, the `derived_status` rule
//! - [`error`] - [`WorkflowError`] and its HTTP classification helpers
//! - [`directory`] - user profiles, recipient scope, target expansion
//! - [`requests`] - request store + [`requests::RequestService`]
//! - [`responses`] - response store + [`responses::ResponseService`]
//! - [`history`] - append-only edit history and the evaluation comment log
//! - [`statistics`] - read-only rollups and the letter rating

pub mod directory;
pub mod error;
pub mod history;
pub mod requests;
pub mod responses;
pub mod statistics;
pub mod types;

pub use directory::{
    resolve_recipient_scope, resolve_recipients, DirectoryStore, InMemoryDirectoryStore,
    RecipientScope, UserProfile,
};
pub use error::{Result, WorkflowError};
pub use history::{
    CommentStore, InMemoryCommentStore, InMemoryRequestHistoryStore,
    InMemoryResponseHistoryStore, RequestHistoryEntry, RequestHistoryStore, RequestSnapshot,
    ResponseComment, ResponseHistoryEntry, ResponseHistoryStore, ResponseSnapshot,
};
pub use requests::{InMemoryRequestStore, RequestFilter, RequestService, RequestStore};
pub use responses::{InMemoryResponseStore, ResponseService, ResponseStore};
pub use statistics::{
    summarize, ReportStatistics, StatisticsRow, StatisticsService, StatisticsSummary,
};
pub use types::{
    derived_status, response_rollup, validate_items, validate_score, DerivedStatus, DirectoryRef,
    FileMetadata, ForwardRequest, NewReportRequest, NewResponseItem, Rating, ReportRequest,
    ReportRequestUpdate, ReportResponse, RequestRollup, RequestStatus, ResponseItem,
};
