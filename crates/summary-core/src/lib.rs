//! Core types for the mailbox complaint summarizer.
//!
//! This crate holds the pieces every other crate agrees on:
//!
//! - [`Message`], the normalized mail message handed over by a mail source
//! - [`ClassificationRecord`] and [`SummaryItem`], the per-message results
//! - [`Summary`] and [`SummaryPage`], the per-day document and its paged view
//! - [`SummaryDate`], a validated `YYYY-MM-DD` calendar key
//! - [`classify`], the keyword heuristic that turns text into a record
//!
//! # Example
//!
//! ```rust
//! use summary_core::{classify, ClassifyInput, Status};
//!
//! let record = classify(ClassifyInput {
//!     subject: "Slow internet again",
//!     body: "",
//!     from: "Jane Doe <jane@example.com>",
//! });
//!
//! assert_eq!(record.client_name, "Jane Doe");
//! assert_eq!(record.problem, "slow internet");
//! assert_eq!(record.status, Status::Unknown);
//! ```

pub mod classifier;
pub mod date;
pub mod models;

pub use classifier::{classify, ClassifyInput};
pub use date::{DateError, SummaryDate};
pub use models::{ClassificationRecord, Message, Status, Summary, SummaryItem, SummaryPage};
