//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use summarizer::SummaryBuilder;

use crate::config::AuthConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Builder shared with the scheduler.
    pub builder: Arc<SummaryBuilder>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, builder: Arc<SummaryBuilder>, auth: AuthConfig) -> Self {
        Self {
            db,
            builder,
            auth: Arc::new(auth),
        }
    }
}
