//! In-memory mail source for tests and local runs without Graph access.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use summary_core::Message;

use crate::error::MailError;
use crate::source::{FetchRequest, MailSource};

/// A mail source that serves a fixed list of messages.
///
/// Messages with a receipt time outside the requested range are left out;
/// messages without one are always served. Every request is recorded.
#[derive(Debug, Clone, Default)]
pub struct StaticMailSource {
    messages: Vec<Message>,
    failure: Option<String>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl StaticMailSource {
    /// Serve these messages, in this order.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Fail every fetch with a 503 API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MailSource for StaticMailSource {
    async fn fetch_messages(&self, request: &FetchRequest) -> Result<Vec<Message>, MailError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(message) = &self.failure {
            return Err(MailError::Api {
                status: 503,
                message: message.clone(),
            });
        }

        Ok(self
            .messages
            .iter()
            .filter(|m| {
                m.received_date_time
                    .map_or(true, |at| at >= request.start && at <= request.end)
            })
            .take(request.max)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "StaticMailSource"
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn message(id: &str, hour: u32) -> Message {
        Message {
            subject: "Slow internet".to_string(),
            body_preview: String::new(),
            from: "a@x.com".to_string(),
            internet_message_id: id.to_string(),
            received_date_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_filters_by_range_and_caps() {
        let source = StaticMailSource::new(vec![message("a", 1), message("b", 5), message("c", 6), message("d", 7)]);
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 4, 0, 0).unwrap();
        let request = FetchRequest::new("box@x.com", start, start + Duration::hours(3)).with_max(2);

        let messages = source.fetch_messages(&request).await.unwrap();

        let ids: Vec<_> = messages.iter().map(|m| m.internet_message_id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        assert_eq!(source.requests(), vec![request]);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = StaticMailSource::failing("graph down");
        let now = Utc::now();
        let err = source
            .fetch_messages(&FetchRequest::new("box@x.com", now, now))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("graph down"));
    }
}
