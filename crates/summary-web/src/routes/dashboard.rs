//! Dashboard and sign-in pages.

use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::auth::Viewer;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub identity: Option<String>,
    /// Initial date, today in the configured timezone.
    pub today: String,
    pub timezone: String,
    pub sign_out_url: String,
}

/// Sign-in page template.
#[derive(Template)]
#[template(path = "sign_in.html")]
pub struct SignInTemplate {
    pub sign_in_url: String,
}

/// Render the dashboard, or the sign-in page when no identity is present.
pub async fn dashboard_page(State(state): State<AppState>, viewer: Viewer) -> Response {
    if state.auth.required && viewer.identity.is_none() {
        return SignInTemplate {
            sign_in_url: state.auth.sign_in_url.clone(),
        }
        .into_response();
    }

    DashboardTemplate {
        identity: viewer.identity,
        today: state.builder.today().to_string(),
        timezone: state.builder.timezone().name().to_string(),
        sign_out_url: state.auth.sign_out_url.clone(),
    }
    .into_response()
}
