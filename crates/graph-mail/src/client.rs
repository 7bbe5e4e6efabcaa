//! Microsoft Graph HTTP client.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Response};
use serde_json::Value;
use summary_core::Message;
use tracing::{debug, info, warn};

use crate::config::GraphConfig;
use crate::error::MailError;
use crate::source::{FetchRequest, MailSource};
use crate::types::{GraphErrorResponse, GraphMessage, TokenErrorResponse, TokenResponse};

/// Fields requested for each message.
const SELECT_FIELDS: &str = "subject,receivedDateTime,from,bodyPreview,internetMessageId";

/// Continuation link key in a page body.
const NEXT_LINK: &str = "@odata.nextLink";

/// Client for reading a mailbox through Microsoft Graph.
#[derive(Clone)]
pub struct GraphClient {
    http: Client,
    config: GraphConfig,
}

/// One decoded page.
enum Page {
    Items { items: Vec<GraphMessage>, next: Option<String> },
    Malformed(String),
}

impl GraphClient {
    /// Create a client. No network I/O happens until a fetch.
    pub fn new(config: GraphConfig) -> Result<Self, MailError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MailError::Transport)?;

        Ok(Self { http, config })
    }

    /// Get the client's configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Acquire an application access token.
    pub async fn access_token(&self) -> Result<String, MailError> {
        let (tenant, client_id, secret) = self.config.credentials()?;
        let url = self.config.token_url(tenant);
        debug!("Requesting token: {}", url);

        let params = [
            ("client_id", client_id),
            ("scope", self.config.scope.as_str()),
            ("client_secret", secret),
            ("grant_type", "client_credentials"),
        ];
        let resp = self.http.post(&url).form(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body: TokenErrorResponse = resp.json().await.unwrap_or_default();
            let message = match (body.error.is_empty(), body.error_description.is_empty()) {
                (true, _) => status.canonical_reason().unwrap_or("token request rejected").to_string(),
                (false, true) => body.error,
                (false, false) => format!("{}: {}", body.error, body.error_description),
            };
            return Err(MailError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| MailError::Decode(format!("token response: {}", e)))?;
        Ok(token.access_token)
    }

    async fn fetch_page(&self, token: &str, url: &str, query: Option<&[(&str, String)]>) -> Result<Page, MailError> {
        let mut request = self.http.get(url).bearer_auth(token);
        if let Some(query) = query {
            request = request.query(query);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(resp).await);
        }

        let body: Value = match resp.json().await {
            Ok(body) => body,
            Err(e) => return Ok(Page::Malformed(format!("body is not JSON: {}", e))),
        };
        Ok(decode_page(body))
    }
}

fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn first_page_query(request: &FetchRequest, page_size: u32) -> Vec<(&'static str, String)> {
    vec![
        (
            "$filter",
            format!(
                "receivedDateTime ge {} and receivedDateTime le {}",
                format_instant(&request.start),
                format_instant(&request.end)
            ),
        ),
        ("$select", SELECT_FIELDS.to_string()),
        ("$orderby", "receivedDateTime asc".to_string()),
        ("$top", page_size.to_string()),
    ]
}

fn decode_page(mut body: Value) -> Page {
    let next = body
        .get(NEXT_LINK)
        .and_then(Value::as_str)
        .map(str::to_string);

    let entries = match body.get_mut("value").map(Value::take) {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Page::Malformed("`value` is not an array".to_string()),
        None => return Page::Malformed("`value` is missing".to_string()),
    };

    let items = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<GraphMessage>(entry) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable message entry");
                None
            }
        })
        .collect();

    Page::Items { items, next }
}

async fn api_error(resp: Response) -> MailError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<GraphErrorResponse>(&text) {
        Ok(parsed) if !parsed.error.code.is_empty() => {
            format!("{}: {}", parsed.error.code, parsed.error.message)
        }
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ if !text.is_empty() => text,
        _ => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    MailError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl MailSource for GraphClient {
    async fn fetch_messages(&self, request: &FetchRequest) -> Result<Vec<Message>, MailError> {
        let token = self.access_token().await?;
        let base = self.config.messages_url(&request.mailbox);
        let query = first_page_query(request, self.config.page_size);

        let mut messages: Vec<Message> = Vec::new();
        let mut next_url: Option<String> = None;
        let mut pages = 0;

        while pages < self.config.max_pages {
            let page = match &next_url {
                Some(url) => self.fetch_page(&token, url, None).await?,
                None => self.fetch_page(&token, &base, Some(query.as_slice())).await?,
            };
            pages += 1;

            match page {
                Page::Items { items, next } => {
                    debug!(page = pages, count = items.len(), "Fetched page");
                    for item in items {
                        let position = messages.len();
                        messages.push(item.into_message(position));
                    }
                    next_url = next;
                }
                Page::Malformed(reason) => {
                    warn!(page = pages, reason = %reason, "Malformed page, stopping pagination");
                    break;
                }
            }

            if next_url.is_none() || messages.len() >= request.max {
                break;
            }
        }

        if next_url.is_some() && pages >= self.config.max_pages && messages.len() < request.max {
            warn!(pages, "Page limit reached before the range was exhausted");
        }

        messages.truncate(request.max);
        info!(
            mailbox = %request.mailbox,
            pages,
            count = messages.len(),
            "Fetched mailbox messages"
        );
        Ok(messages)
    }

    fn name(&self) -> &str {
        "GraphClient"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    /// How the fake messages endpoint should behave.
    #[derive(Clone, Copy)]
    enum Mode {
        /// Three pages holding 2, 2 and 1 messages.
        ThreePages,
        /// Every page holds one message and links to another.
        Endless,
        /// Second page has no `value` array.
        MalformedSecond,
        /// Token endpoint rejects the credentials.
        BadCredentials,
        /// Messages endpoint fails with 403.
        Forbidden,
    }

    #[derive(Clone)]
    struct Fake {
        mode: Mode,
        base: String,
        requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
        tokens: Arc<Mutex<usize>>,
    }

    fn message(n: usize) -> Value {
        json!({
            "subject": format!("Complaint {}", n),
            "bodyPreview": "No internet since morning",
            "from": {"emailAddress": {"name": format!("Client {}", n), "address": format!("c{}@x.com", n)}},
            "internetMessageId": format!("<{}@x.com>", n),
            "receivedDateTime": format!("2024-05-01T0{}:00:00Z", n % 10)
        })
    }

    async fn token(State(fake): State<Fake>) -> Response {
        *fake.tokens.lock().unwrap() += 1;
        match fake.mode {
            Mode::BadCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid_client", "error_description": "bad secret"})),
            )
                .into_response(),
            _ => Json(json!({"access_token": "test-token", "token_type": "Bearer", "expires_in": 3599}))
                .into_response(),
        }
    }

    async fn messages(State(fake): State<Fake>, Query(query): Query<HashMap<String, String>>) -> Response {
        let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        fake.requests.lock().unwrap().push(query);
        let next = |n: usize| format!("{}/v1.0/users/support%40isp.example/messages?page={}", fake.base, n);

        match (fake.mode, page) {
            (Mode::Forbidden, _) => (
                StatusCode::FORBIDDEN,
                Json(json!({"error": {"code": "ErrorAccessDenied", "message": "Access is denied."}})),
            )
                .into_response(),
            (Mode::ThreePages, 1) => Json(json!({"value": [message(1), message(2)], "@odata.nextLink": next(2)})).into_response(),
            (Mode::ThreePages, 2) => Json(json!({"value": [message(3), message(4)], "@odata.nextLink": next(3)})).into_response(),
            (Mode::ThreePages, _) => Json(json!({"value": [message(5)]})).into_response(),
            (Mode::Endless, n) => Json(json!({"value": [message(n)], "@odata.nextLink": next(n + 1)})).into_response(),
            (Mode::MalformedSecond, 1) => Json(json!({"value": [message(1), {}], "@odata.nextLink": next(2)})).into_response(),
            (Mode::MalformedSecond, _) => Json(json!({"value": {"unexpected": true}, "@odata.nextLink": next(3)})).into_response(),
            (Mode::BadCredentials, _) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    async fn spawn_fake(mode: Mode) -> (GraphClient, Fake) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let fake = Fake {
            mode,
            base: base.clone(),
            requests: Arc::new(Mutex::new(Vec::new())),
            tokens: Arc::new(Mutex::new(0)),
        };

        let app = Router::new()
            .route("/tenant-1/oauth2/v2.0/token", post(token))
            .route("/v1.0/users/:mailbox/messages", get(messages))
            .with_state(fake.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = GraphConfig::new("tenant-1", "client-1", "secret-1")
            .with_authority_url(base.clone())
            .with_graph_url(format!("{}/v1.0", base));
        (GraphClient::new(config).unwrap(), fake)
    }

    fn request() -> FetchRequest {
        let start = Utc.with_ymd_and_hms(2024, 4, 30, 18, 0, 0).unwrap();
        let end = start + chrono::Duration::days(1) - chrono::Duration::milliseconds(1);
        FetchRequest::new("support@isp.example", start, end)
    }

    #[tokio::test]
    async fn test_follows_continuation_links_in_order() {
        let (client, fake) = spawn_fake(Mode::ThreePages).await;

        let messages = client.fetch_messages(&request()).await.unwrap();

        let ids: Vec<_> = messages.iter().map(|m| m.internet_message_id.as_str()).collect();
        assert_eq!(ids, ["<1@x.com>", "<2@x.com>", "<3@x.com>", "<4@x.com>", "<5@x.com>"]);
        assert_eq!(messages[0].from, "Client 1 <c1@x.com>");

        let requests = fake.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        let first = &requests[0];
        assert_eq!(first.get("$top").map(String::as_str), Some("50"));
        assert_eq!(first.get("$orderby").map(String::as_str), Some("receivedDateTime asc"));
        assert_eq!(
            first.get("$filter").map(String::as_str),
            Some("receivedDateTime ge 2024-04-30T18:00:00.000Z and receivedDateTime le 2024-05-01T17:59:59.999Z")
        );
        assert_eq!(first.get("$select").map(String::as_str), Some(SELECT_FIELDS));
        // Continuation requests use the link verbatim.
        assert!(requests[1].get("$filter").is_none());
        assert_eq!(*fake.tokens.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_truncates_to_max() {
        let (client, fake) = spawn_fake(Mode::ThreePages).await;

        let messages = client.fetch_messages(&request().with_max(3)).await.unwrap();

        assert_eq!(messages.len(), 3);
        // Two pages were enough to collect three messages.
        assert_eq!(fake.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stops_after_page_limit() {
        let (client, fake) = spawn_fake(Mode::Endless).await;

        let messages = client.fetch_messages(&request()).await.unwrap();

        assert_eq!(fake.requests.lock().unwrap().len(), 10);
        assert_eq!(messages.len(), 10);
    }

    #[tokio::test]
    async fn test_malformed_page_ends_pagination_early() {
        let (client, fake) = spawn_fake(Mode::MalformedSecond).await;

        let messages = client.fetch_messages(&request()).await.unwrap();

        assert_eq!(fake.requests.lock().unwrap().len(), 2);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].internet_message_id, "<1@x.com>");
        // The empty entry was normalized with placeholders.
        assert_eq!(messages[1].internet_message_id, "missing-id-1");
        assert_eq!(messages[1].from, "Unknown Sender");
    }

    #[tokio::test]
    async fn test_rejected_credentials_surface_as_auth_error() {
        let (client, fake) = spawn_fake(Mode::BadCredentials).await;

        let err = client.fetch_messages(&request()).await.unwrap_err();

        match err {
            MailError::Auth { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid_client: bad secret");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(fake.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_error_carries_graph_message() {
        let (client, _fake) = spawn_fake(Mode::Forbidden).await;

        let err = client.fetch_messages(&request()).await.unwrap_err();

        assert!(matches!(err, MailError::Api { status: 403, .. }));
        assert!(err.to_string().contains("Access is denied."));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_io() {
        let config = GraphConfig::default().with_authority_url("http://127.0.0.1:9");
        let client = GraphClient::new(config).unwrap();

        let err = client.fetch_messages(&request()).await.unwrap_err();

        assert!(matches!(err, MailError::MissingCredentials("AZURE_TENANT_ID")));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = GraphConfig::new("t", "c", "s")
            .with_authority_url("http://127.0.0.1:9")
            .with_timeout(std::time::Duration::from_secs(2));
        let client = GraphClient::new(config).unwrap();

        let err = client.fetch_messages(&request()).await.unwrap_err();

        assert!(matches!(err, MailError::Transport(_)));
    }

    #[test]
    fn test_decode_page_variants() {
        assert!(matches!(decode_page(json!({})), Page::Malformed(_)));
        assert!(matches!(decode_page(json!({"value": "nope"})), Page::Malformed(_)));
        match decode_page(json!({"value": [], "@odata.nextLink": "http://next"})) {
            Page::Items { items, next } => {
                assert!(items.is_empty());
                assert_eq!(next.as_deref(), Some("http://next"));
            }
            Page::Malformed(reason) => panic!("unexpected malformed page: {reason}"),
        }
    }
}
