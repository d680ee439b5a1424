//! Append-only history logs for requests and responses.
//!
//! Every accepted edit of a request (title/description/deadline/targets) or a
//! response (note/items) appends a snapshot of the pre-change state, keyed by
//! (entity id, version) with versions assigned 1, 2, 3, ... by the store.
//! Comment history is a separate append-only log per response recording each
//! evaluate-with-score and send-back action.
//!
//! The in-memory stores exist for tests and mirror the PostgreSQL-backed
//! implementations in `reportage-db`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{ResponseItem, ReportRequest, ReportResponse};

/// Snapshot of a request's mutable fields at one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub target_organizations: Vec<Uuid>,
    pub target_departments: Vec<Uuid>,
    pub target_users: Vec<Uuid>,
}

impl From<&ReportRequest> for RequestSnapshot {
    fn from(request: &ReportRequest) -> Self {
        Self {
            title: request.title.clone(),
            description: request.description.clone(),
            deadline: request.deadline,
            target_organizations: request.target_organizations.clone(),
            target_departments: request.target_departments.clone(),
            target_users: request.target_users.clone(),
        }
    }
}

/// Snapshot of a response's mutable fields at one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub note: Option<String>,
    pub items: Vec<ResponseItem>,
}

impl From<&ReportResponse> for ResponseSnapshot {
    fn from(response: &ReportResponse) -> Self {
        Self {
            note: response.note.clone(),
            items: response.items.clone(),
        }
    }
}

/// One entry in a request's edit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestHistoryEntry {
    pub id: Uuid,
    pub request_id: Uuid,
    /// Monotonically increasing per request, starting at 1.
    pub version: i32,
    pub edited_by: Uuid,
    pub edited_at: DateTime<Utc>,
    pub snapshot: RequestSnapshot,
}

/// One entry in a response's edit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseHistoryEntry {
    pub id: Uuid,
    pub response_id: Uuid,
    /// Monotonically increasing per response, starting at 1.
    pub version: i32,
    pub edited_by: Uuid,
    pub edited_at: DateTime<Utc>,
    pub snapshot: ResponseSnapshot,
}

/// One entry in a response's evaluation comment log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseComment {
    pub id: Uuid,
    pub response_id: Uuid,
    pub commented_by: Uuid,
    pub commented_at: DateTime<Utc>,
    pub comment: Option<String>,
    /// Set when the entry records a final evaluation.
    pub score: Option<f64>,
    /// True for evaluate-with-score, false for send-back.
    pub is_final_evaluation: bool,
}

/// Storage backend for request edit history.
#[async_trait::async_trait]
pub trait RequestHistoryStore: Send + Sync {
    /// Append a snapshot; the store assigns the next version number.
    async fn append(
        &self,
        request_id: Uuid,
        edited_by: Uuid,
        snapshot: RequestSnapshot,
    ) -> Result<RequestHistoryEntry>;

    /// List entries for a request, newest first.
    async fn list(&self, request_id: Uuid) -> Result<Vec<RequestHistoryEntry>>;

    /// Delete all entries for a request (request deletion cascade).
    async fn delete_for_request(&self, request_id: Uuid) -> Result<u64>;
}

/// Storage backend for response edit history.
#[async_trait::async_trait]
pub trait ResponseHistoryStore: Send + Sync {
    /// Append a snapshot; the store assigns the next version number.
    async fn append(
        &self,
        response_id: Uuid,
        edited_by: Uuid,
        snapshot: ResponseSnapshot,
    ) -> Result<ResponseHistoryEntry>;

    /// List entries for a response, newest first.
    async fn list(&self, response_id: Uuid) -> Result<Vec<ResponseHistoryEntry>>;

    /// Delete all entries for a response (response deletion cascade).
    async fn delete_for_response(&self, response_id: Uuid) -> Result<u64>;
}

/// Storage backend for the evaluation comment log.
#[async_trait::async_trait]
pub trait CommentStore: Send + Sync {
    /// Append a comment entry.
    async fn append(
        &self,
        response_id: Uuid,
        commented_by: Uuid,
        comment: Option<String>,
        score: Option<f64>,
        is_final_evaluation: bool,
    ) -> Result<ResponseComment>;

    /// List entries for a response, newest first.
    async fn list(&self, response_id: Uuid) -> Result<Vec<ResponseComment>>;

    /// Delete all entries for a response (response deletion cascade).
    async fn delete_for_response(&self, response_id: Uuid) -> Result<u64>;
}

/// In-memory request history store for testing.
#[derive(Debug, Default)]
pub struct InMemoryRequestHistoryStore {
    entries: Arc<RwLock<HashMap<Uuid, Vec<RequestHistoryEntry>>>>,
}

impl InMemoryRequestHistoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RequestHistoryStore for InMemoryRequestHistoryStore {
    async fn append(
        &self,
        request_id: Uuid,
        edited_by: Uuid,
        snapshot: RequestSnapshot,
    ) -> Result<RequestHistoryEntry> {
        let mut entries = self.entries.write().await;
        let log = entries.entry(request_id).or_default();
        let entry = RequestHistoryEntry {
            id: Uuid::new_v4(),
            request_id,
            version: log.len() as i32 + 1,
            edited_by,
            edited_at: Utc::now(),
            snapshot,
        };
        log.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, request_id: Uuid) -> Result<Vec<RequestHistoryEntry>> {
        let entries = self.entries.read().await;
        let mut log = entries.get(&request_id).cloned().unwrap_or_default();
        log.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(log)
    }

    async fn delete_for_request(&self, request_id: Uuid) -> Result<u64> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(&request_id).map_or(0, |log| log.len() as u64))
    }
}

/// In-memory response history store for testing.
#[derive(Debug, Default)]
pub struct InMemoryResponseHistoryStore {
    entries: Arc<RwLock<HashMap<Uuid, Vec<ResponseHistoryEntry>>>>,
}

impl InMemoryResponseHistoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ResponseHistoryStore for InMemoryResponseHistoryStore {
    async fn append(
        &self,
        response_id: Uuid,
        edited_by: Uuid,
        snapshot: ResponseSnapshot,
    ) -> Result<ResponseHistoryEntry> {
        let mut entries = self.entries.write().await;
        let log = entries.entry(response_id).or_default();
        let entry = ResponseHistoryEntry {
            id: Uuid::new_v4(),
            response_id,
            version: log.len() as i32 + 1,
            edited_by,
            edited_at: Utc::now(),
            snapshot,
        };
        log.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, response_id: Uuid) -> Result<Vec<ResponseHistoryEntry>> {
        let entries = self.entries.read().await;
        let mut log = entries.get(&response_id).cloned().unwrap_or_default();
        log.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(log)
    }

    async fn delete_for_response(&self, response_id: Uuid) -> Result<u64> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(&response_id)
            .map_or(0, |log| log.len() as u64))
    }
}

/// In-memory comment log for testing.
#[derive(Debug, Default)]
pub struct InMemoryCommentStore {
    entries: Arc<RwLock<HashMap<Uuid, Vec<ResponseComment>>>>,
}

impl InMemoryCommentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn append(
        &self,
        response_id: Uuid,
        commented_by: Uuid,
        comment: Option<String>,
        score: Option<f64>,
        is_final_evaluation: bool,
    ) -> Result<ResponseComment> {
        let mut entries = self.entries.write().await;
        let log = entries.entry(response_id).or_default();
        let entry = ResponseComment {
            id: Uuid::new_v4(),
            response_id,
            commented_by,
            commented_at: Utc::now(),
            comment,
            score,
            is_final_evaluation,
        };
        log.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, response_id: Uuid) -> Result<Vec<ResponseComment>> {
        let entries = self.entries.read().await;
        let mut log = entries.get(&response_id).cloned().unwrap_or_default();
        log.sort_by(|a, b| b.commented_at.cmp(&a.commented_at));
        Ok(log)
    }

    async fn delete_for_response(&self, response_id: Uuid) -> Result<u64> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(&response_id)
            .map_or(0, |log| log.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(title: &str) -> RequestSnapshot {
        RequestSnapshot {
            title: title.to_string(),
            description: None,
            deadline: Utc::now(),
            target_organizations: vec![],
            target_departments: vec![],
            target_users: vec![],
        }
    }

    #[tokio::test]
    async fn test_versions_start_at_one_and_increase() {
        let store = InMemoryRequestHistoryStore::new();
        let request_id = Uuid::new_v4();
        let editor = Uuid::new_v4();

        for expected in 1..=4 {
            let entry = store
                .append(request_id, editor, snapshot("t"))
                .await
                .unwrap();
            assert_eq!(entry.version, expected);
        }

        let log = store.list(request_id).await.unwrap();
        assert_eq!(log.len(), 4);
        // Newest first, no gaps.
        let versions: Vec<i32> = log.iter().map(|e| e.version).collect();
        assert_eq!(versions, vec![4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_versions_are_per_entity() {
        let store = InMemoryRequestHistoryStore::new();
        let editor = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.append(a, editor, snapshot("a1")).await.unwrap();
        store.append(a, editor, snapshot("a2")).await.unwrap();
        let entry = store.append(b, editor, snapshot("b1")).await.unwrap();
        assert_eq!(entry.version, 1);
    }

    #[tokio::test]
    async fn test_response_history_round_trip() {
        let store = InMemoryResponseHistoryStore::new();
        let response_id = Uuid::new_v4();
        let editor = Uuid::new_v4();

        let snap = ResponseSnapshot {
            note: Some("draft".to_string()),
            items: vec![],
        };
        let entry = store.append(response_id, editor, snap.clone()).await.unwrap();
        assert_eq!(entry.version, 1);
        assert_eq!(entry.snapshot, snap);

        let log = store.list(response_id).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].snapshot.note.as_deref(), Some("draft"));
    }

    #[tokio::test]
    async fn test_comment_log_appends() {
        let store = InMemoryCommentStore::new();
        let response_id = Uuid::new_v4();
        let evaluator = Uuid::new_v4();

        store
            .append(
                response_id,
                evaluator,
                Some("add details".to_string()),
                None,
                false,
            )
            .await
            .unwrap();
        store
            .append(response_id, evaluator, Some("good".to_string()), Some(8.5), true)
            .await
            .unwrap();

        let log = store.list(response_id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().any(|c| c.is_final_evaluation && c.score == Some(8.5)));
        assert!(log.iter().any(|c| !c.is_final_evaluation && c.score.is_none()));
    }

    #[tokio::test]
    async fn test_delete_cascade() {
        let store = InMemoryResponseHistoryStore::new();
        let response_id = Uuid::new_v4();
        let editor = Uuid::new_v4();
        store
            .append(
                response_id,
                editor,
                ResponseSnapshot {
                    note: None,
                    items: vec![],
                },
            )
            .await
            .unwrap();

        let removed = store.delete_for_response(response_id).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.list(response_id).await.unwrap().is_empty());
    }
}
