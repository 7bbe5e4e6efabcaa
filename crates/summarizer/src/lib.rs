//! Daily complaint summaries.
//!
//! Ties the mail source, the classifier and storage together:
//!
//! - [`SummaryBuilder`] turns one local calendar day of mail into a stored
//!   summary, replacing whatever was there before
//! - [`Scheduler`] and [`spawn_daily_summaries`] run that build for "today"
//!   on a cron schedule

pub mod builder;
pub mod day;
pub mod error;
pub mod scheduler;

pub use builder::{BuilderConfig, SummaryBuilder, DEFAULT_TIMEZONE};
pub use day::{day_range, today, DayRange};
pub use error::{BuildError, ScheduleError};
pub use scheduler::{spawn_daily_summaries, CronSchedule, Schedule, Scheduler, DEFAULT_CRON};
