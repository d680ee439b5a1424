//! Response models for statistics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use reportage_workflow::{ReportStatistics, StatisticsRow, StatisticsSummary};

/// A named directory reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NamedRefDto {
    pub id: Uuid,
    pub name: String,
}

impl From<reportage_workflow::DirectoryRef> for NamedRefDto {
    fn from(r: reportage_workflow::DirectoryRef) -> Self {
        Self {
            id: r.id,
            name: r.name,
        }
    }
}

/// An evidence file linked from a statistics row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentFileDto {
    pub file_name: String,
    pub file_path: String,
}

/// One row of the detailed statistics listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatisticsRowDto {
    /// 1-based sequence number.
    pub seq: usize,
    pub response_id: Uuid,
    pub request_id: Uuid,
    pub report_name: String,
    pub author: NamedRefDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<NamedRefDto>,
    pub organizations: Vec<NamedRefDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<NamedRefDto>,
    pub submitted_at: DateTime<Utc>,
    /// True when submitted at or before the deadline.
    pub on_time: bool,
    pub files: Vec<DocumentFileDto>,
}

impl From<StatisticsRow> for StatisticsRowDto {
    fn from(row: StatisticsRow) -> Self {
        Self {
            seq: row.seq,
            response_id: row.response_id,
            request_id: row.request_id,
            report_name: row.report_name,
            author: row.author.into(),
            department: row.department.map(Into::into),
            organizations: row.organizations.into_iter().map(Into::into).collect(),
            score: row.score,
            reviewer: row.reviewer.map(Into::into),
            submitted_at: row.submitted_at,
            on_time: row.on_time,
            files: row
                .files
                .into_iter()
                .map(|f| DocumentFileDto {
                    file_name: f.file_name,
                    file_path: f.file_path,
                })
                .collect(),
        }
    }
}

/// Summary rollup over the listed responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatisticsSummaryDto {
    pub total_reports: usize,
    pub on_time_reports: usize,
    pub overdue_reports: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    /// Letter rating (A-D) for the average score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

impl From<StatisticsSummary> for StatisticsSummaryDto {
    fn from(summary: StatisticsSummary) -> Self {
        Self {
            total_reports: summary.total_reports,
            on_time_reports: summary.on_time_reports,
            overdue_reports: summary.overdue_reports,
            average_score: summary.average_score,
            rating: summary.rating.map(|r| r.to_string()),
        }
    }
}

/// The statistics endpoint payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatisticsResponse {
    pub reports: Vec<StatisticsRowDto>,
    pub summary: StatisticsSummaryDto,
}

impl From<ReportStatistics> for StatisticsResponse {
    fn from(stats: ReportStatistics) -> Self {
        Self {
            reports: stats.reports.into_iter().map(Into::into).collect(),
            summary: stats.summary.into(),
        }
    }
}
