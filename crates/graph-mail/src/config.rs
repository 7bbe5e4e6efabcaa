//! Configuration types for graph-mail.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::MailError;

/// Default OAuth2 authority.
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";

/// Default Graph API base URL.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

/// Scope requested for application permissions.
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Messages requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Upper bound on page requests per fetch.
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for talking to Microsoft Graph.
///
/// Credentials are optional here so a service can start without them; a
/// fetch fails with [`MailError::MissingCredentials`] until they are set.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Azure AD tenant id.
    pub tenant_id: Option<String>,
    /// Application (client) id.
    pub client_id: Option<String>,
    /// Client secret.
    client_secret: Option<SecretString>,
    /// OAuth2 authority, without tenant (e.g., "https://login.microsoftonline.com").
    pub authority_url: String,
    /// Graph base URL (e.g., "https://graph.microsoft.com/v1.0").
    pub graph_url: String,
    /// OAuth2 scope.
    pub scope: String,
    /// `$top` for each page.
    pub page_size: u32,
    /// Maximum number of page requests per fetch.
    pub max_pages: usize,
    /// Timeout applied to every HTTP request.
    pub timeout: Duration,
}

impl GraphConfig {
    /// Create a configuration with explicit credentials and default endpoints.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            client_id: Some(client_id.into()),
            client_secret: Some(SecretString::from(client_secret.into())),
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Credentials (checked when fetching, not here):
    /// - `AZURE_TENANT_ID`
    /// - `AZURE_CLIENT_ID`
    /// - `AZURE_CLIENT_SECRET`
    ///
    /// Optional (with defaults):
    /// - `GRAPH_AUTHORITY_URL` - Default: https://login.microsoftonline.com
    /// - `GRAPH_API_URL` - Default: https://graph.microsoft.com/v1.0
    /// - `GRAPH_TIMEOUT_SECS` - Default: 30
    pub fn from_env() -> Result<Self, MailError> {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());

        let timeout = match non_empty("GRAPH_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|e| MailError::Config(format!("Invalid GRAPH_TIMEOUT_SECS: {}", e)))?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            tenant_id: non_empty("AZURE_TENANT_ID"),
            client_id: non_empty("AZURE_CLIENT_ID"),
            client_secret: non_empty("AZURE_CLIENT_SECRET").map(SecretString::from),
            authority_url: non_empty("GRAPH_AUTHORITY_URL")
                .unwrap_or_else(|| DEFAULT_AUTHORITY_URL.to_string()),
            graph_url: non_empty("GRAPH_API_URL").unwrap_or_else(|| DEFAULT_GRAPH_URL.to_string()),
            timeout,
            ..Self::default()
        })
    }

    /// Token endpoint URL for the configured tenant.
    pub(crate) fn token_url(&self, tenant_id: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_url.trim_end_matches('/'),
            urlencoding::encode(tenant_id)
        )
    }

    /// Messages endpoint URL for a mailbox.
    pub(crate) fn messages_url(&self, mailbox: &str) -> String {
        format!(
            "{}/users/{}/messages",
            self.graph_url.trim_end_matches('/'),
            urlencoding::encode(mailbox)
        )
    }

    /// Resolve the three credentials or name the first missing one.
    pub(crate) fn credentials(&self) -> Result<(&str, &str, &str), MailError> {
        let tenant = self
            .tenant_id
            .as_deref()
            .ok_or(MailError::MissingCredentials("AZURE_TENANT_ID"))?;
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(MailError::MissingCredentials("AZURE_CLIENT_ID"))?;
        let secret = self
            .client_secret
            .as_ref()
            .map(|s| s.expose_secret())
            .ok_or(MailError::MissingCredentials("AZURE_CLIENT_SECRET"))?;
        Ok((tenant, client_id, secret))
    }

    /// Builder method to set the authority URL.
    pub fn with_authority_url(mut self, url: impl Into<String>) -> Self {
        self.authority_url = url.into();
        self
    }

    /// Builder method to set the Graph base URL.
    pub fn with_graph_url(mut self, url: impl Into<String>) -> Self {
        self.graph_url = url.into();
        self
    }

    /// Builder method to set the page request limit.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_secret: None,
            authority_url: DEFAULT_AUTHORITY_URL.to_string(),
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
