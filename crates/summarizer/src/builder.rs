//! Fetch, classify and store one day of mail.

use std::sync::Arc;

use chrono_tz::Tz;
use database::{summary, Database};
use graph_mail::{FetchRequest, MailSource, DEFAULT_MAX_MESSAGES};
use summary_core::{classify, ClassifyInput, SummaryDate, SummaryItem};
use tracing::info;

use crate::day::{day_range, today};
use crate::error::BuildError;

/// Default timezone anchoring calendar days.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Dhaka;

/// Configuration for the summary builder.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Mailbox to summarise. Builds fail while this is unset.
    pub mailbox: Option<String>,

    /// Timezone whose calendar days are summarised.
    pub timezone: Tz,

    /// Maximum number of messages per day.
    pub max_messages: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            mailbox: None,
            timezone: DEFAULT_TIMEZONE,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

impl BuilderConfig {
    /// Create a config for a mailbox with default timezone and cap.
    pub fn with_mailbox(mailbox: impl Into<String>) -> Self {
        Self {
            mailbox: Some(mailbox.into()),
            ..Default::default()
        }
    }
}

/// Builds the summary document for a calendar day.
///
/// Shared by the scheduler and the rebuild endpoint. Concurrent builds of
/// the same date are not coordinated; the last write wins.
pub struct SummaryBuilder {
    mail: Arc<dyn MailSource>,
    db: Database,
    config: BuilderConfig,
}

impl SummaryBuilder {
    /// Create a new builder.
    pub fn new(mail: Arc<dyn MailSource>, db: Database, config: BuilderConfig) -> Self {
        Self { mail, db, config }
    }

    /// The configured timezone.
    pub fn timezone(&self) -> Tz {
        self.config.timezone
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> SummaryDate {
        today(self.config.timezone)
    }

    /// Fetch, classify and replace the summary for `date`.
    ///
    /// Returns the stored items in receipt order.
    pub async fn build(&self, date: SummaryDate) -> Result<Vec<SummaryItem>, BuildError> {
        let mailbox = self
            .config
            .mailbox
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or(BuildError::MissingMailbox)?;

        let range = day_range(date, self.config.timezone).ok_or(BuildError::DateOutOfRange(date))?;
        info!(
            date = %date,
            start = %range.start,
            end = %range.end,
            source = self.mail.name(),
            "Building summary"
        );

        let request = FetchRequest::new(mailbox, range.start, range.end).with_max(self.config.max_messages);
        let messages = self.mail.fetch_messages(&request).await?;

        let items: Vec<SummaryItem> = messages
            .iter()
            .map(|message| {
                let record = classify(ClassifyInput {
                    subject: &message.subject,
                    body: &message.body_preview,
                    from: &message.from,
                });
                SummaryItem::from_classified(message, record)
            })
            .collect();

        summary::upsert_summary(self.db.pool(), &date, &items).await?;

        info!(date = %date, count = items.len(), "Summary stored");
        Ok(items)
    }
}
