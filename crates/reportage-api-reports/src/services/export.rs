//! Document export for report requests.
//!
//! Renders a request and all of its responses into a Word-compatible
//! HTML document. The renderer is a black box to the lifecycle core; it
//! only reads the entities it is given.

use std::sync::Arc;

use reportage_workflow::{DirectoryStore, ReportRequest, ReportResponse, Result};

/// MIME type of the exported document.
pub const EXPORT_CONTENT_TYPE: &str = "application/msword";

/// Service rendering export documents.
pub struct ExportService {
    directory: Arc<dyn DirectoryStore>,
}

impl ExportService {
    /// Create an export service.
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }

    /// Render a request and its responses into document bytes, returning
    /// the bytes and a suggested file name.
    pub async fn export_request(
        &self,
        request: &ReportRequest,
        responses: &[ReportResponse],
    ) -> Result<(Vec<u8>, String)> {
        let mut body = String::new();
        body.push_str(&format!("<h1>{}</h1>\n", escape(&request.title)));
        if let Some(description) = &request.description {
            body.push_str(&format!("<p>{}</p>\n", escape(description)));
        }
        body.push_str(&format!(
            "<p>Deadline: {}</p>\n",
            request.deadline.format("%Y-%m-%d %H:%M")
        ));

        for response in responses {
            let submitter = self
                .directory
                .get_user(response.submitted_by)
                .await?
                .map(|p| p.full_name)
                .unwrap_or_else(|| response.submitted_by.to_string());

            body.push_str(&format!("<h2>{}</h2>\n", escape(&submitter)));
            if let Some(note) = &response.note {
                body.push_str(&format!("<p>{}</p>\n", escape(note)));
            }

            body.push_str("<table border=\"1\" cellspacing=\"0\" cellpadding=\"4\">\n");
            body.push_str(
                "<tr><th>#</th><th>Title</th><th>Content</th><th>Progress</th><th>Difficulties</th></tr>\n",
            );
            let mut items = response.items.clone();
            items.sort_by_key(|item| item.display_order);
            for (index, item) in items.iter().enumerate() {
                body.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}%</td><td>{}</td></tr>\n",
                    index + 1,
                    escape(item.title.as_deref().unwrap_or("")),
                    escape(item.content.as_deref().unwrap_or("")),
                    item.progress,
                    escape(item.difficulties.as_deref().unwrap_or("")),
                ));
            }
            body.push_str("</table>\n");

            if let Some(score) = response.score {
                body.push_str(&format!("<p>Score: {score}</p>\n"));
            }
            if let Some(comment) = &response.comment {
                body.push_str(&format!("<p>Reviewer comment: {}</p>\n", escape(comment)));
            }
        }

        let document = format!(
            "<html><head><meta charset=\"utf-8\"><title>{}</title></head><body>\n{}</body></html>",
            escape(&request.title),
            body
        );

        let file_name = format!("report-{}.doc", request.id);
        Ok((document.into_bytes(), file_name))
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reportage_workflow::{InMemoryDirectoryStore, RequestStatus, ResponseItem, UserProfile};
    use uuid::Uuid;

    fn request() -> ReportRequest {
        let now = Utc::now();
        ReportRequest {
            id: Uuid::new_v4(),
            title: "Q3 <review>".to_string(),
            description: Some("All units".to_string()),
            deadline: now,
            status: RequestStatus::Submitted,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            forwarded_from: None,
            forward_note: None,
            target_organizations: vec![],
            target_departments: vec![],
            target_users: vec![],
        }
    }

    fn response(submitted_by: Uuid) -> ReportResponse {
        let now = Utc::now();
        ReportResponse {
            id: Uuid::new_v4(),
            report_request_id: Uuid::new_v4(),
            submitted_by,
            note: Some("note".to_string()),
            items: vec![ResponseItem {
                id: Uuid::new_v4(),
                title: Some("Task".to_string()),
                content: Some("Done".to_string()),
                progress: 90,
                difficulties: None,
                attachment: None,
                display_order: 0,
            }],
            score: Some(8.0),
            self_score: None,
            comment: Some("Good".to_string()),
            evaluated_by: None,
            evaluated_at: None,
            self_evaluated_at: None,
            submitted_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_export_contains_request_and_responses() {
        let directory = Arc::new(InMemoryDirectoryStore::new());
        let submitter = Uuid::new_v4();
        directory
            .put_user(UserProfile {
                id: submitter,
                full_name: "Alice".to_string(),
                email: None,
                role: None,
                is_senior: false,
                department: None,
                organizations: vec![],
                is_active: true,
            })
            .await;

        let service = ExportService::new(directory);
        let (bytes, file_name) = service
            .export_request(&request(), &[response(submitter)])
            .await
            .unwrap();

        let html = String::from_utf8(bytes).unwrap();
        assert!(html.contains("Q3 &lt;review&gt;"));
        assert!(html.contains("Alice"));
        assert!(html.contains("Done"));
        assert!(html.contains("Score: 8"));
        assert!(file_name.ends_with(".doc"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
