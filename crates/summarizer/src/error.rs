//! Error types for summary building and scheduling.

use database::DatabaseError;
use graph_mail::MailError;
use summary_core::SummaryDate;
use thiserror::Error;

/// Errors that can occur while building a daily summary.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No monitored mailbox is configured.
    #[error("MONITORED_MAILBOX not set")]
    MissingMailbox,

    /// The date has no representable UTC range.
    #[error("date out of range: {0}")]
    DateOutOfRange(SummaryDate),

    /// Fetching mail failed.
    #[error("mail fetch failed: {0}")]
    Mail(#[from] MailError),

    /// Storing the summary failed.
    #[error("storage failed: {0}")]
    Database(#[from] DatabaseError),
}

/// Errors that can occur when setting up a schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The cron expression could not be parsed.
    #[error("invalid cron expression {expression:?}: {reason}")]
    InvalidExpression { expression: String, reason: String },
}
