//! Graph wire types and their normalization into [`Message`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use summary_core::Message;

/// Placeholder subject for messages without one.
pub const NO_SUBJECT: &str = "(no subject)";

/// Placeholder sender when Graph omits `from`.
pub const UNKNOWN_SENDER: &str = "Unknown Sender";

/// Successful token response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// OAuth2 error body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenErrorResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
}

/// Graph error envelope: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorResponse {
    pub error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// One entry from a `messages` page, every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMessage {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body_preview: Option<String>,
    #[serde(default)]
    pub from: Option<GraphRecipient>,
    #[serde(default)]
    pub internet_message_id: Option<String>,
    #[serde(default)]
    pub received_date_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRecipient {
    #[serde(default)]
    pub email_address: Option<GraphEmailAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphEmailAddress {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl GraphMessage {
    /// Normalize into a [`Message`]. `position` is the message's index in the
    /// whole batch and seeds the placeholder id.
    pub fn into_message(self, position: usize) -> Message {
        let from = match self.from.and_then(|r| r.email_address) {
            Some(addr) => match (present(addr.name), present(addr.address)) {
                (Some(name), Some(address)) => format!("{} <{}>", name, address),
                (None, Some(address)) => address,
                (Some(name), None) => name,
                (None, None) => UNKNOWN_SENDER.to_string(),
            },
            None => UNKNOWN_SENDER.to_string(),
        };

        let received_date_time = self
            .received_date_time
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Message {
            subject: present(self.subject).unwrap_or_else(|| NO_SUBJECT.to_string()),
            body_preview: self.body_preview.unwrap_or_default(),
            from,
            internet_message_id: present(self.internet_message_id)
                .unwrap_or_else(|| format!("missing-id-{}", position)),
            received_date_time,
        }
    }
}
