//! Read-only statistics over report responses.
//!
//! Derived views only; nothing here mutates state. The summary math is a
//! pure function so the rollup rules are testable without stores.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::DirectoryStore;
use crate::error::Result;
use crate::requests::RequestStore;
use crate::responses::ResponseStore;
use crate::types::{DirectoryRef, FileMetadata, Rating};

/// Summary rollup over a set of responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_reports: usize,
    /// Responses submitted at or before the request deadline.
    pub on_time_reports: usize,
    /// Responses submitted after the request deadline.
    pub overdue_reports: usize,
    /// Mean of non-null scores, rounded to two decimals.
    pub average_score: Option<f64>,
    /// Letter rating bucketed from the average score.
    pub rating: Option<Rating>,
}

/// One row in the detailed statistics listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRow {
    /// 1-based sequence number in the listing.
    pub seq: usize,
    pub response_id: Uuid,
    pub request_id: Uuid,
    /// Request title.
    pub report_name: String,
    pub author: DirectoryRef,
    pub department: Option<DirectoryRef>,
    pub organizations: Vec<DirectoryRef>,
    pub score: Option<f64>,
    pub reviewer: Option<DirectoryRef>,
    pub submitted_at: DateTime<Utc>,
    /// True when submitted at or before the deadline.
    pub on_time: bool,
    /// Evidence files attached to the response items.
    pub files: Vec<FileMetadata>,
}

/// The detailed listing plus its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub reports: Vec<StatisticsRow>,
    pub summary: StatisticsSummary,
}

/// Compute the summary from (`submitted_at` ≤ deadline, score) pairs.
#[must_use]
pub fn summarize(entries: &[(bool, Option<f64>)]) -> StatisticsSummary {
    let total_reports = entries.len();
    let on_time_reports = entries.iter().filter(|(on_time, _)| *on_time).count();
    let overdue_reports = total_reports - on_time_reports;

    let scores: Vec<f64> = entries.iter().filter_map(|(_, score)| *score).collect();
    let average_score = if scores.is_empty() {
        None
    } else {
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        Some((mean * 100.0).round() / 100.0)
    };
    let rating = average_score.map(Rating::from_average);

    StatisticsSummary {
        total_reports,
        on_time_reports,
        overdue_reports,
        average_score,
        rating,
    }
}

/// Service producing the statistics views.
pub struct StatisticsService {
    responses: Arc<dyn ResponseStore>,
    requests: Arc<dyn RequestStore>,
    directory: Arc<dyn DirectoryStore>,
}

impl StatisticsService {
    /// Create a new statistics service over the given stores.
    pub fn new(
        responses: Arc<dyn ResponseStore>,
        requests: Arc<dyn RequestStore>,
        directory: Arc<dyn DirectoryStore>,
    ) -> Self {
        Self {
            responses,
            requests,
            directory,
        }
    }

    /// Build the detailed listing and summary, optionally restricted to one
    /// submitter. Responses whose request no longer exists are skipped.
    pub async fn statistics(&self, submitted_by: Option<Uuid>) -> Result<ReportStatistics> {
        let responses = match submitted_by {
            Some(user_id) => self.responses.list_by_submitter(user_id).await?,
            None => self.responses.list_all().await?,
        };

        let mut rows = Vec::with_capacity(responses.len());
        for response in responses {
            let Some(request) = self.requests.find_by_id(response.report_request_id).await? else {
                continue;
            };

            let submitter = self.directory.get_user(response.submitted_by).await?;
            let author = submitter
                .as_ref()
                .map(|profile| DirectoryRef {
                    id: profile.id,
                    name: profile.full_name.clone(),
                })
                .unwrap_or(DirectoryRef {
                    id: response.submitted_by,
                    name: String::new(),
                });
            let (department, organizations) = match submitter {
                Some(profile) => (profile.department, profile.organizations),
                None => (None, vec![]),
            };

            let reviewer = match response.evaluated_by {
                Some(reviewer_id) => self
                    .directory
                    .get_user(reviewer_id)
                    .await?
                    .map(|p| DirectoryRef {
                        id: p.id,
                        name: p.full_name,
                    }),
                None => None,
            };

            let files = response
                .items
                .iter()
                .filter_map(|item| item.attachment.clone())
                .collect();

            rows.push(StatisticsRow {
                seq: 0,
                response_id: response.id,
                request_id: request.id,
                report_name: request.title.clone(),
                author,
                department,
                organizations,
                score: response.score,
                reviewer,
                submitted_at: response.submitted_at,
                on_time: response.submitted_at <= request.deadline,
                files,
            });
        }

        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        for (index, row) in rows.iter_mut().enumerate() {
            row.seq = index + 1;
        }

        let entries: Vec<(bool, Option<f64>)> =
            rows.iter().map(|r| (r.on_time, r.score)).collect();
        let summary = summarize(&entries);

        Ok(ReportStatistics {
            reports: rows,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_reports, 0);
        assert_eq!(summary.on_time_reports, 0);
        assert_eq!(summary.overdue_reports, 0);
        assert_eq!(summary.average_score, None);
        assert_eq!(summary.rating, None);
    }

    #[test]
    fn test_summarize_counts_and_average() {
        let entries = [
            (true, Some(9.0)),
            (true, Some(8.0)),
            (false, None),
            (false, Some(7.0)),
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.total_reports, 4);
        assert_eq!(summary.on_time_reports, 2);
        assert_eq!(summary.overdue_reports, 2);
        assert_eq!(summary.average_score, Some(8.0));
        assert_eq!(summary.rating, Some(Rating::B));
    }

    #[test]
    fn test_summarize_rounds_to_two_decimals() {
        let entries = [(true, Some(8.0)), (true, Some(9.0)), (true, Some(9.0))];
        let summary = summarize(&entries);
        assert_eq!(summary.average_score, Some(8.67));
        assert_eq!(summary.rating, Some(Rating::A));
    }

    #[test]
    fn test_summarize_unscored_only() {
        let entries = [(true, None), (false, None)];
        let summary = summarize(&entries);
        assert_eq!(summary.average_score, None);
        assert_eq!(summary.rating, None);
        assert_eq!(summary.overdue_reports, 1);
    }
}
