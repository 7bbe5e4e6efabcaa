//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderName;
use chrono_tz::Tz;
use graph_mail::{GraphConfig, MailError, DEFAULT_MAX_MESSAGES};
use summarizer::{CronSchedule, ScheduleError, DEFAULT_CRON, DEFAULT_TIMEZONE};

/// Identity gate settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Reject API calls and show the sign-in page when the identity header is absent.
    pub required: bool,
    /// Header the fronting proxy sets to the signed-in user.
    pub header: HeaderName,
    pub sign_in_url: String,
    pub sign_out_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required: true,
            header: HeaderName::from_static("x-auth-request-email"),
            sign_in_url: "/oauth2/start".to_string(),
            sign_out_url: "/oauth2/sign_out".to_string(),
        }
    }
}

/// Summary web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Mailbox to summarise.
    pub mailbox: Option<String>,
    /// Microsoft Graph settings.
    pub graph: GraphConfig,
    /// Timezone anchoring calendar days.
    pub timezone: Tz,
    /// Daily build schedule, in `timezone`.
    pub schedule: CronSchedule,
    pub scheduler_enabled: bool,
    pub max_messages: usize,
    pub auth: AuthConfig,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SUMMARY_ADDR` | Server bind address | `127.0.0.1:4000` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:summaries.db?mode=rwc` |
    /// | `MONITORED_MAILBOX` | Mailbox to summarise | (unset) |
    /// | `TIMEZONE` | IANA timezone | `Asia/Dhaka` |
    /// | `CRON_TIME` | Daily schedule | `5 0 * * *` |
    /// | `SCHEDULER_ENABLED` | Run the daily job | `true` |
    /// | `MAX_MESSAGES` | Messages per build | `200` |
    /// | `AUTH_REQUIRED` | Gate on the identity header | `true` |
    /// | `AUTH_HEADER` | Identity header name | `x-auth-request-email` |
    /// | `AUTH_SIGN_IN_URL` | Sign-in link | `/oauth2/start` |
    /// | `AUTH_SIGN_OUT_URL` | Sign-out link | `/oauth2/sign_out` |
    /// | `STATIC_DIR` | Dashboard assets | `static` |
    ///
    /// Graph credentials and endpoints are read by [`GraphConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = var("SUMMARY_ADDR")
            .unwrap_or_else(|| "127.0.0.1:4000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = var("SQLITE_PATH").unwrap_or_else(|| "sqlite:summaries.db?mode=rwc".to_string());

        let timezone = match var("TIMEZONE") {
            Some(raw) => parse_timezone(&raw)?,
            None => DEFAULT_TIMEZONE,
        };

        let cron = var("CRON_TIME").unwrap_or_else(|| DEFAULT_CRON.to_string());
        let schedule = CronSchedule::parse(&cron, timezone)?;

        let max_messages = match var("MAX_MESSAGES") {
            Some(raw) => parse_count("MAX_MESSAGES", &raw)?,
            None => DEFAULT_MAX_MESSAGES,
        };

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            required: flag("AUTH_REQUIRED", defaults.required)?,
            header: match var("AUTH_HEADER") {
                Some(raw) => HeaderName::try_from(raw.trim().to_ascii_lowercase())
                    .map_err(|_| ConfigError::InvalidHeader(raw))?,
                None => defaults.header,
            },
            sign_in_url: var("AUTH_SIGN_IN_URL").unwrap_or(defaults.sign_in_url),
            sign_out_url: var("AUTH_SIGN_OUT_URL").unwrap_or(defaults.sign_out_url),
        };

        Ok(Self {
            addr,
            database_url,
            mailbox: var("MONITORED_MAILBOX"),
            graph: GraphConfig::from_env()?,
            timezone,
            schedule,
            scheduler_enabled: flag("SCHEDULER_ENABLED", true)?,
            max_messages,
            auth,
            static_dir: var("STATIC_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("static")),
        })
    }
}

/// A set, non-blank environment variable.
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    var(name).map_or(Ok(default), |raw| parse_bool(name, &raw))
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
        }),
    }
}

fn parse_count(name: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
        })
}

fn parse_timezone(raw: &str) -> Result<Tz, ConfigError> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::InvalidTimezone(raw.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid SUMMARY_ADDR format")]
    InvalidAddr,

    #[error("Invalid TIMEZONE: {0}")]
    InvalidTimezone(String),

    #[error("Invalid AUTH_HEADER: {0}")]
    InvalidHeader(String),

    #[error("Invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Invalid CRON_TIME: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Invalid Graph configuration: {0}")]
    Graph(#[from] MailError),
}
