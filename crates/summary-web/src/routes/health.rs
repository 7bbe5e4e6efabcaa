//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    pub ok: bool,
}

/// Health check endpoint. Always open.
pub async fn health() -> Json<Health> {
    Json(Health { ok: true })
}
