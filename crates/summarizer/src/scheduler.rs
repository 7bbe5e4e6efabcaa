//! Time-driven job execution.
//!
//! A [`Schedule`] answers "when next?"; a [`Scheduler`] sleeps until then and
//! runs a job. Failed runs are logged and never retried; the next tick is the
//! only recovery.

use std::fmt::Display;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::builder::SummaryBuilder;
use crate::error::ScheduleError;

/// Daily at 00:05 local time.
pub const DEFAULT_CRON: &str = "5 0 * * *";

/// Source of fire instants.
pub trait Schedule: Send + Sync {
    /// The first fire instant strictly after `after`, if any.
    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// A cron expression evaluated in a timezone.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    schedule: cron::Schedule,
    timezone: Tz,
}

impl CronSchedule {
    /// Parse a cron expression.
    ///
    /// Accepts the classic five fields (`min hour dom month dow`) as well as
    /// the six/seven field form with a leading seconds field.
    pub fn parse(expression: &str, timezone: Tz) -> Result<Self, ScheduleError> {
        let trimmed = expression.trim();
        let normalized = if trimmed.split_whitespace().count() == 5 {
            format!("0 {}", trimmed)
        } else {
            trimmed.to_string()
        };

        let schedule = cron::Schedule::from_str(&normalized).map_err(|e| ScheduleError::InvalidExpression {
            expression: expression.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            expression: trimmed.to_string(),
            schedule,
            timezone,
        })
    }

    /// The expression as configured.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The timezone the expression is evaluated in.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl Schedule for CronSchedule {
    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&self.timezone))
            .next()
            .map(|at| at.with_timezone(&Utc))
    }
}

/// Runs a job at every instant of a schedule.
pub struct Scheduler<S: Schedule> {
    schedule: S,
    name: String,
}

impl<S: Schedule> Scheduler<S> {
    /// Create a scheduler; `name` labels its log lines.
    pub fn new(name: impl Into<String>, schedule: S) -> Self {
        Self {
            schedule,
            name: name.into(),
        }
    }

    /// Run `job` at each fire instant until the schedule is exhausted.
    ///
    /// A job error is logged and the loop carries on with the next tick.
    pub async fn run<F, Fut, E>(&self, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        loop {
            let now = Utc::now();
            let Some(next) = self.schedule.next_after(now) else {
                warn!(job = %self.name, "Schedule has no further runs, stopping");
                return;
            };

            let wait = (next - now).to_std().unwrap_or_default();
            info!(job = %self.name, next = %next, "Next scheduled run");
            tokio::time::sleep(wait).await;

            match job().await {
                Ok(()) => info!(job = %self.name, "Scheduled run complete"),
                Err(e) => error!(job = %self.name, error = %e, "Scheduled run failed"),
            }
        }
    }
}

/// Spawn the daily build: at each tick, build today's summary in the
/// builder's timezone.
pub fn spawn_daily_summaries(builder: Arc<SummaryBuilder>, schedule: CronSchedule) -> JoinHandle<()> {
    info!(
        cron = schedule.expression(),
        timezone = %schedule.timezone(),
        "Scheduling daily summary job"
    );

    tokio::spawn(async move {
        let scheduler = Scheduler::new("daily-summary", schedule);
        scheduler
            .run(|| {
                let builder = Arc::clone(&builder);
                async move {
                    let date = builder.today();
                    builder.build(date).await.map(|items| {
                        info!(date = %date, count = items.len(), "Daily summary built");
                    })
                }
            })
            .await;
    })
}
