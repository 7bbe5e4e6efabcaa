//! Microsoft Graph mailbox client.
//!
//! This crate retrieves the messages a mailbox received in a time range. It
//! supports:
//!
//! - OAuth2 client-credentials token acquisition
//! - Paginated `messages` listing with continuation links
//! - Normalization of missing fields to explicit placeholders
//!
//! The [`MailSource`] trait is the seam consumers depend on; [`GraphClient`]
//! is the production implementation.
//!
//! # Example
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use graph_mail::{FetchRequest, GraphClient, GraphConfig, MailSource};
//!
//! # async fn example() -> Result<(), graph_mail::MailError> {
//! let client = GraphClient::new(GraphConfig::from_env()?)?;
//!
//! let end = Utc::now();
//! let request = FetchRequest::new("support@example.com", end - Duration::days(1), end);
//! for message in client.fetch_messages(&request).await? {
//!     println!("{}: {}", message.from, message.subject);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod source;
pub mod types;

pub use client::GraphClient;
pub use config::GraphConfig;
pub use error::MailError;
pub use mock::StaticMailSource;
pub use source::{FetchRequest, MailSource, DEFAULT_MAX_MESSAGES};
