//! Shared HTTP client for the upstream services

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use response_selector_core::UpstreamError;

use crate::AnnotatorError;

/// Header carrying the upstream API key
pub const API_KEY_HEADER: &str = "x-api-key";

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Upstream error bodies are cut to this many characters
const MAX_ERROR_BODY_CHARS: usize = 512;

/// JSON-over-HTTP client with a bounded per-call timeout
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    timeout: Duration,
}

impl UpstreamClient {
    /// Create a client that sends `api_key` with every request
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, AnnotatorError> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| AnnotatorError::Configuration(format!("Invalid API key: {}", e)))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AnnotatorError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST `body` as JSON and decode the JSON reply
    ///
    /// The whole exchange, including reading the body, is bounded by the
    /// client timeout.
    pub async fn post_json<Req, Resp>(&self, url: &str, body: &Req) -> Result<Resp, UpstreamError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        match tokio::time::timeout(self.timeout, self.execute(url, body)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        }
    }

    async fn execute<Req, Resp>(&self, url: &str, body: &Req) -> Result<Resp, UpstreamError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response.json::<Resp>().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout(self.timeout)
            } else {
                UpstreamError::InvalidResponse(e.to_string())
            }
        })
    }

    fn map_error(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}
