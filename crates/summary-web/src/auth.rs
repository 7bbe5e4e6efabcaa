//! Identity read from the fronting proxy.
//!
//! The service never authenticates anyone itself. A proxy in front of it
//! completes the sign-in flow and forwards the user in a header; these
//! extractors only look at that header.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::WebError;
use crate::state::AppState;

/// The signed-in user, if the proxy named one.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub identity: Option<String>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get(&state.auth.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Viewer { identity })
    }
}

/// A request allowed through the gate. Rejects with 401 when sign-in is
/// required and no identity is present.
#[derive(Debug, Clone)]
pub struct Authorized(pub Viewer);

#[axum::async_trait]
impl FromRequestParts<AppState> for Authorized {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let viewer = match Viewer::from_request_parts(parts, state).await {
            Ok(viewer) => viewer,
            Err(never) => match never {},
        };

        if state.auth.required && viewer.identity.is_none() {
            return Err(WebError::Unauthorized);
        }
        Ok(Authorized(viewer))
    }
}
