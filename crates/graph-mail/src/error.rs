//! Error types for graph-mail.

use thiserror::Error;

/// Errors that can occur when fetching mail from Microsoft Graph.
#[derive(Debug, Error)]
pub enum MailError {
    /// A credential needed for the token request is not configured.
    #[error("Missing Azure credentials: {0} is not set")]
    MissingCredentials(&'static str),

    /// The token endpoint rejected the client credentials.
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// HTTP request failed (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Graph answered with a non-success status.
    #[error("Graph API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
