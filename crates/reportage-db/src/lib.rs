//! PostgreSQL persistence for reportage.
//!
//! - [`models`] - row structs with static query methods
//! - [`stores`] - implementations of the `reportage-workflow` store traits
//! - [`migrations`] - embedded schema migrations
//! - [`error`] - database error type

pub mod error;
pub mod migrations;
pub mod models;
pub mod stores;

pub use error::DbError;
pub use migrations::run_migrations;
pub use stores::{
    PgCommentStore, PgDirectoryStore, PgRequestHistoryStore, PgRequestStore,
    PgResponseHistoryStore, PgResponseStore,
};
