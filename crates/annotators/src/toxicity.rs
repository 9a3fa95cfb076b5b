//! Toxicity classifier client

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use response_selector_core::{ToxicityClassifier, UpstreamError};

use crate::client::UpstreamClient;

#[derive(Debug, Serialize)]
pub(crate) struct SentencesRequest<'a> {
    pub sentences: &'a [String],
}

/// Per-sentence label probabilities
///
/// The classifier answers either with a plain `{label: prob}` map or with a
/// one-element list wrapping it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelScores {
    Map(HashMap<String, f64>),
    Wrapped(Vec<HashMap<String, f64>>),
}

impl LabelScores {
    /// Highest probability across labels
    fn toxicity(&self) -> f64 {
        let labels = match self {
            Self::Map(map) => Some(map),
            Self::Wrapped(list) => list.first(),
        };
        labels
            .into_iter()
            .flat_map(|m| m.values().copied())
            .fold(0.0, f64::max)
    }
}

/// HTTP toxicity classifier
pub struct HttpToxicityClassifier {
    client: UpstreamClient,
    url: String,
}

impl HttpToxicityClassifier {
    pub fn new(client: UpstreamClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ToxicityClassifier for HttpToxicityClassifier {
    async fn classify(&self, sentences: &[String]) -> Result<Vec<f64>, UpstreamError> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let results: Vec<LabelScores> = self
            .client
            .post_json(&self.url, &SentencesRequest { sentences })
            .await?;
        UpstreamError::check_len(sentences.len(), results.len())?;

        Ok(results.iter().map(LabelScores::toxicity).collect())
    }
}
