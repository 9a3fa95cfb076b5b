//! Blacklisted-words detector client

use async_trait::async_trait;
use serde::Deserialize;

use response_selector_core::{BlacklistDetector, UpstreamError};

use crate::client::UpstreamClient;
use crate::toxicity::SentencesRequest;

#[derive(Debug, Deserialize)]
struct BlacklistResult {
    profanity: ProfanityFlag,
}

/// The detector reports 0/1; booleans are accepted too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfanityFlag {
    Bool(bool),
    Number(f64),
}

impl ProfanityFlag {
    fn is_set(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
        }
    }
}

/// HTTP blacklist detector
pub struct HttpBlacklistDetector {
    client: UpstreamClient,
    url: String,
}

impl HttpBlacklistDetector {
    pub fn new(client: UpstreamClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl BlacklistDetector for HttpBlacklistDetector {
    async fn detect(&self, sentences: &[String]) -> Result<Vec<bool>, UpstreamError> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let results: Vec<BlacklistResult> = self
            .client
            .post_json(&self.url, &SentencesRequest { sentences })
            .await?;
        UpstreamError::check_len(sentences.len(), results.len())?;

        Ok(results.iter().map(|r| r.profanity.is_set()).collect())
    }
}
