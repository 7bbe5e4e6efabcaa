//! The mail source seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use summary_core::Message;

use crate::MailError;

/// Default cap on messages per fetch.
pub const DEFAULT_MAX_MESSAGES: usize = 200;

/// What to fetch: one mailbox, one closed time range, at most `max` messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub mailbox: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub max: usize,
}

impl FetchRequest {
    /// Create a request with the default message cap.
    pub fn new(mailbox: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            mailbox: mailbox.into(),
            start,
            end,
            max: DEFAULT_MAX_MESSAGES,
        }
    }

    /// Builder method to set the message cap.
    pub fn with_max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }
}

/// A source of mailbox messages.
///
/// Implementations return messages in ascending receipt order, capped at
/// `request.max`. This trait is object-safe and can be used as
/// `Arc<dyn MailSource>`.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Fetch the messages received in the requested range.
    async fn fetch_messages(&self, request: &FetchRequest) -> Result<Vec<Message>, MailError>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}
