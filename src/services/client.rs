//! Backend HTTP client
//!
//! Wraps a cookie-carrying `reqwest::Client`. The session cookie set by a
//! login call is replayed on every later request, so the client itself never
//! holds a credential. Non-2xx responses are classified into [`PortalError`]
//! variants here, once, so callers only ever match on the error type.

use std::sync::Arc;
use std::time::Instant;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use crate::config::BackendConfig;
use crate::utils::errors::{PortalError, RejectionKind, Result};
use crate::utils::logging::{log_api_error, log_request};

/// Query parameters as owned key/value pairs
pub type Query<'a> = &'a [(&'a str, String)];

/// Structured error body; `error` is accepted as an alias Spring uses for `message`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    legacy_phrases: Arc<Vec<String>>,
}

impl ApiClient {
    /// Create a client for the configured backend
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        let base_url = Url::parse(&config.base_url)?;
        let legacy_phrases = config
            .legacy_rejection_phrases
            .iter()
            .map(|phrase| phrase.to_lowercase())
            .collect();

        Ok(Self {
            client,
            base_url,
            legacy_phrases: Arc::new(legacy_phrases),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET and decode a JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.send(Method::GET, path, &[], None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET a body that may legitimately be empty or `null`
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let body = self.send(Method::GET, path, &[], None).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a JSON body; returns the raw response text
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, &[], Some(body)).await
    }

    /// POST with query parameters only
    pub async fn post_query(&self, path: &str, query: Query<'_>) -> Result<String> {
        self.send(Method::POST, path, query, None).await
    }

    /// PUT a JSON body; returns the raw response text
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    /// PUT with query parameters only
    pub async fn put_query(&self, path: &str, query: Query<'_>) -> Result<String> {
        self.send(Method::PUT, path, query, None).await
    }

    pub async fn delete(&self, path: &str, query: Query<'_>) -> Result<String> {
        self.send(Method::DELETE, path, query, None).await
    }

    /// Issue one request and return the body of a 2xx response
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<serde_json::Value>,
    ) -> Result<String> {
        let url = self.base_url.join(path)?;
        let started = Instant::now();

        let mut request = self.client.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connect"
            } else {
                "transport"
            };
            log_api_error(path, &e.to_string(), Some(reason));
            PortalError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        log_request(method.as_str(), path, status.as_u16(), started.elapsed().as_millis() as u64);

        if status.is_success() {
            Ok(text)
        } else {
            let err = self.classify(status, &text);
            debug!(path = path, status = status.as_u16(), error = %err, "Backend returned an error");
            Err(err)
        }
    }

    /// Turn a non-2xx response into the matching error variant
    pub(crate) fn classify(&self, status: StatusCode, body: &str) -> PortalError {
        let (code, message) = parse_error_body(body);

        match status {
            StatusCode::UNAUTHORIZED => PortalError::Unauthorized(if message.is_empty() {
                "Session expired".to_string()
            } else {
                message
            }),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => {
                if let Some(code) = code {
                    PortalError::Rejected { kind: RejectionKind::from_code(&code), message }
                } else if self.matches_legacy_phrase(&message) {
                    PortalError::Rejected { kind: RejectionKind::ReassignmentRequired, message }
                } else {
                    PortalError::Http { status: status.as_u16(), message }
                }
            }
            _ => PortalError::Http { status: status.as_u16(), message },
        }
    }

    fn matches_legacy_phrase(&self, message: &str) -> bool {
        if self.legacy_phrases.is_empty() {
            return false;
        }
        let message = message.to_lowercase();
        self.legacy_phrases.iter().any(|phrase| message.contains(phrase.as_str()))
    }
}

/// Extract `(code, message)` from a structured, string, or plain-text error body
fn parse_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
        let message = parsed.message.or(parsed.error).unwrap_or_default();
        return (parsed.code.filter(|c| !c.trim().is_empty()), message);
    }
    if let Ok(text) = serde_json::from_str::<String>(trimmed) {
        return (None, text);
    }
    (None, trimmed.to_string())
}
