//! Summary query and rebuild endpoints.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use summary_core::{SummaryDate, SummaryPage};
use tracing::info;

use crate::auth::Authorized;
use crate::error::{Result, WebError};
use crate::state::AppState;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw query parameters; parsed by hand so malformed numbers get a JSON 400.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RebuildQuery {
    pub date: Option<String>,
}

/// Rebuild result.
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub ok: bool,
    pub date: SummaryDate,
    pub count: usize,
}

/// `GET /summaries?date&page&pageSize`
pub async fn list_summaries(
    State(state): State<AppState>,
    _auth: Authorized,
    query: std::result::Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<SummaryPage>> {
    let Query(query) = query.map_err(invalid_query)?;
    let date = resolve_date(&state, query.date.as_deref())?;
    let page = parse_number("page", query.page.as_deref())?.map_or(1, |p| p.clamp(1, u32::MAX as i64) as u32);
    let page_size = parse_number("pageSize", query.page_size.as_deref())?
        .map_or(DEFAULT_PAGE_SIZE, |s| s.clamp(1, MAX_PAGE_SIZE as i64) as u32);

    let result = database::summary::get_summary_page(state.db.pool(), &date, page, page_size).await?;
    Ok(Json(result))
}

/// `POST /summaries/rebuild?date`
pub async fn rebuild_summary(
    State(state): State<AppState>,
    Authorized(viewer): Authorized,
    query: std::result::Result<Query<RebuildQuery>, QueryRejection>,
) -> Result<Json<RebuildResponse>> {
    let Query(query) = query.map_err(invalid_query)?;
    let date = resolve_date(&state, query.date.as_deref())?;
    info!(date = %date, requested_by = ?viewer.identity, "Rebuild requested");

    let items = state.builder.build(date).await?;

    Ok(Json(RebuildResponse {
        ok: true,
        date,
        count: items.len(),
    }))
}

/// The requested date, or today in the builder's timezone.
fn resolve_date(state: &AppState, raw: Option<&str>) -> Result<SummaryDate> {
    match non_blank(raw) {
        Some(raw) => Ok(SummaryDate::parse(raw)?),
        None => Ok(state.builder.today()),
    }
}

fn parse_number(name: &str, raw: Option<&str>) -> Result<Option<i64>> {
    non_blank(raw)
        .map(|raw| {
            raw.parse::<i64>()
                .map_err(|_| WebError::Validation(format!("{} must be an integer, got {:?}", name, raw)))
        })
        .transpose()
}

fn invalid_query(rejection: QueryRejection) -> WebError {
    WebError::Validation(rejection.body_text())
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}
