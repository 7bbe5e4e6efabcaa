//! Daily complaint summary service.
//!
//! Serves the summary API and dashboard, and runs the daily build on a
//! schedule. Sign-in is delegated to an identity-aware proxy in front.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use database::Database;
use graph_mail::GraphClient;
use summarizer::{spawn_daily_summaries, BuilderConfig, SummaryBuilder};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "summary_web=info,summarizer=info,graph_mail=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, timezone = %config.timezone, "Starting summary web server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    if config.mailbox.is_none() {
        warn!("MONITORED_MAILBOX not set; builds will fail until it is configured");
    }

    let graph = GraphClient::new(config.graph.clone())?;
    let builder = Arc::new(SummaryBuilder::new(
        Arc::new(graph),
        db.clone(),
        BuilderConfig {
            mailbox: config.mailbox.clone(),
            timezone: config.timezone,
            max_messages: config.max_messages,
        },
    ));

    if config.scheduler_enabled {
        spawn_daily_summaries(Arc::clone(&builder), config.schedule.clone());
    } else {
        info!("Scheduler disabled");
    }

    // Build application state
    let state = AppState::new(db, builder, config.auth.clone());
    let app = routes::app(state, &config.static_dir);

    // Start server
    info!(addr = %config.addr, "Summary web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
