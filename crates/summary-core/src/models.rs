//! Summary data model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date::SummaryDate;

/// A mail message as delivered by a mail source, already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Subject line ("(no subject)" when the provider sent none).
    pub subject: String,
    /// Plain-text preview of the body.
    pub body_preview: String,
    /// Sender rendered as `Name <address>`, a bare address, or "Unknown Sender".
    pub from: String,
    /// RFC 5322 message id, or a generated placeholder unique within a batch.
    pub internet_message_id: String,
    /// When the provider received the message.
    pub received_date_time: Option<DateTime<Utc>>,
}

/// Inferred resolution status of a complaint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Resolved,
    Unresolved,
    #[default]
    Unknown,
}

impl Status {
    /// Stable string form, as stored and served.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Resolved => "Resolved",
            Status::Unresolved => "Unresolved",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    /// Anything other than the two known states reads back as `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Resolved" => Status::Resolved,
            "Unresolved" => Status::Unresolved,
            _ => Status::Unknown,
        })
    }
}

/// The classifier's view of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRecord {
    pub client_name: String,
    pub problem: String,
    pub solution: String,
    pub status: Status,
}

/// A classified message ready to be stored and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    pub client_name: String,
    pub problem: String,
    pub solution: String,
    pub status: Status,
    pub subject: String,
    pub message_id: String,
    pub received_at: Option<DateTime<Utc>>,
}

impl SummaryItem {
    /// Combine a message with its classification.
    pub fn from_classified(message: &Message, record: ClassificationRecord) -> Self {
        Self {
            client_name: record.client_name,
            problem: record.problem,
            solution: record.solution,
            status: record.status,
            subject: message.subject.clone(),
            message_id: message.internet_message_id.clone(),
            received_at: message.received_date_time,
        }
    }
}

/// All classified messages for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub date: SummaryDate,
    pub items: Vec<SummaryItem>,
    pub created_at: String,
    pub updated_at: String,
}

/// A page of summary items plus the total for the day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPage {
    pub items: Vec<SummaryItem>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [Status::Resolved, Status::Unresolved, Status::Unknown] {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert_eq!("garbage".parse::<Status>().unwrap(), Status::Unknown);
    }

    #[test]
    fn test_summary_item_serializes_camel_case() {
        let item = SummaryItem {
            client_name: "Jane".to_string(),
            problem: "latency".to_string(),
            solution: "N/A".to_string(),
            status: Status::Unresolved,
            subject: "Lag".to_string(),
            message_id: "<1@x>".to_string(),
            received_at: None,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["clientName"], "Jane");
        assert_eq!(json["messageId"], "<1@x>");
        assert_eq!(json["status"], "Unresolved");
        assert!(json["receivedAt"].is_null());
    }
}
