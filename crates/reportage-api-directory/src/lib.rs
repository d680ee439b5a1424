//! REST API for the organizational reference data.
//!
//! Administrators manage the directory the reporting workflow draws on:
//! organizations, departments, positions, roles, and users. The user
//! listing doubles as the candidate-recipient query used by recipient
//! scope resolution (`GET /directory/users?department_id=…`).
//!
//! # Endpoints
//!
//! - `GET/POST /directory/organizations`, `GET/PUT/DELETE /directory/organizations/{id}`
//! - `GET/POST /directory/departments`, `GET/PUT/DELETE /directory/departments/{id}`
//! - `GET/POST /directory/positions`, `GET/PUT/DELETE /directory/positions/{id}`
//! - `GET/POST /directory/roles`, `GET/PUT/DELETE /directory/roles/{id}`
//! - `GET/POST /directory/users`, `GET/PUT/DELETE /directory/users/{id}`
//! - `GET /directory/users/me` - the caller's resolved profile
//! - `GET /directory/users/recipients` - scope-filtered recipient candidates

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

pub use error::{ApiDirectoryError, ApiResult, ErrorResponse};
pub use router::{directory_router, DirectoryState};
