//! Database row types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use summary_core::{Status, SummaryItem};

/// A stored summary document header.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SummaryRow {
    /// Calendar day key (YYYY-MM-DD).
    pub date: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last rebuild timestamp.
    pub updated_at: String,
}

/// A stored summary item.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SummaryItemRow {
    pub client_name: String,
    pub problem: String,
    pub solution: String,
    /// "Resolved", "Unresolved" or "Unknown".
    pub status: String,
    pub subject: String,
    pub message_id: String,
    /// RFC 3339 instant, if the provider reported one.
    pub received_at: Option<String>,
}

impl From<SummaryItemRow> for SummaryItem {
    fn from(row: SummaryItemRow) -> Self {
        let received_at = row.received_at.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| tracing::warn!(value = raw, error = %e, "Ignoring unreadable received_at"))
                .ok()
        });

        Self {
            client_name: row.client_name,
            problem: row.problem,
            solution: row.solution,
            status: row.status.parse().unwrap_or(Status::Unknown),
            subject: row.subject,
            message_id: row.message_id,
            received_at,
        }
    }
}
