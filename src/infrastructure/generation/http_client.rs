//! JSON-over-HTTP transport for generation backends
//!
//! Providers build the request body and headers; this layer only moves
//! bytes and reports what went wrong in transport terms. Providers turn an
//! [`HttpError`] into a `DomainError::Generation` tagged with their own name.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::DomainError;

/// Longest slice of an error response body kept in an [`HttpError`]
pub const ERROR_BODY_LIMIT: usize = 512;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Transport-level failure of a JSON POST
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HttpError {
    /// Connection, TLS or timeout failure before a status was received
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-2xx status; `body` is truncated to [`ERROR_BODY_LIMIT`] chars
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx status whose body is not JSON
    #[error("invalid JSON response: {0}")]
    Decode(String),
}

impl HttpError {
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: truncate(body, ERROR_BODY_LIMIT),
        }
    }

    /// Status code when the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Credentials rejected (401/403)
    pub fn is_auth(&self) -> bool {
        matches!(self.status_code(), Some(401) | Some(403))
    }

    /// Tag the failure with the provider that issued the request
    pub fn into_generation(self, provider: &str) -> DomainError {
        DomainError::generation(provider, self.to_string())
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

/// POST a JSON body and decode a JSON reply; the seam providers are tested at
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpError>;
}

/// reqwest-backed client with a whole-request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpError> {
        let request = headers
            .iter()
            .fold(self.client.post(url), |request, (name, value)| {
                request.header(*name, *value)
            });

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(HttpError::status(status.as_u16(), &text));
        }

        response
            .json()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// One POST the mock received
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: serde_json::Value,
    }

    impl RecordedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }
    }

    /// Answers by URL with a canned reply and records every request
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        replies: HashMap<String, Result<serde_json::Value, HttpError>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(mut self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.replies.insert(url.into(), Ok(response));
            self
        }

        pub fn with_error(mut self, url: impl Into<String>, error: HttpError) -> Self {
            self.replies.insert(url.into(), Err(error));
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            headers: &[(&str, &str)],
            body: &serde_json::Value,
        ) -> Result<serde_json::Value, HttpError> {
            self.requests.lock().unwrap().push(RecordedRequest {
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.clone(),
            });

            self.replies
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(HttpError::Transport(format!("no route to {}", url))))
        }
    }
}
