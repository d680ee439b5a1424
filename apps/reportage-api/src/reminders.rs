//! Background deadline-reminder sweep.
//!
//! Periodically scans for report requests whose deadline falls within the
//! configured look-ahead window and which still have recipients without a
//! submitted response, and emits a structured event per request. The event
//! stream is the notification hook; delivery transport lives elsewhere.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;

use reportage_db::models::{ReportRequestRow, ReportResponseRow};

/// Spawn the reminder sweep loop.
pub fn spawn_deadline_reminders(pool: PgPool, interval_secs: u64, window_hours: i64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick fires immediately; skip it so startup stays quiet.
        interval.tick().await;
        loop {
            interval.tick().await;
            match sweep_once(&pool, window_hours).await {
                Ok(count) if count > 0 => {
                    tracing::info!(
                        target: "reminders",
                        flagged = count,
                        window_hours,
                        "Deadline reminder sweep completed"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        target: "reminders",
                        error = %e,
                        "Deadline reminder sweep failed"
                    );
                }
            }
        }
    });
}

/// Run one sweep, returning how many requests were flagged.
async fn sweep_once(pool: &PgPool, window_hours: i64) -> Result<usize, sqlx::Error> {
    let now = Utc::now();
    let until = now + chrono::Duration::hours(window_hours);
    let due = ReportRequestRow::list_due_between(pool, now, until).await?;

    let mut flagged = 0;
    for request in due {
        let responses = ReportResponseRow::list_by_request(pool, request.id).await?;
        let submitted: Vec<_> = responses.iter().map(|r| r.submitted_by).collect();
        let pending: Vec<_> = request
            .target_users
            .iter()
            .copied()
            .filter(|u| !submitted.contains(u))
            .collect();

        // Department/organization targets are resolved at submission time;
        // here only directly targeted users are checked for a missing row.
        if pending.is_empty() && !request.target_users.is_empty() {
            continue;
        }

        flagged += 1;
        tracing::info!(
            target: "reminders",
            request_id = %request.id,
            title = %request.title,
            deadline = %request.deadline,
            pending_recipients = pending.len(),
            submitted = submitted.len(),
            "Report request deadline approaching"
        );
    }

    Ok(flagged)
}
