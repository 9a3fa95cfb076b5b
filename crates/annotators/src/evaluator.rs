//! Conversation quality evaluator client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use response_selector_core::{ConversationEvaluator, ConversationSnippet, QualityScore, UpstreamError};

use crate::client::UpstreamClient;

#[derive(Debug, Serialize)]
struct EvaluationRequest<'a> {
    conversations: &'a [ConversationSnippet],
}

#[derive(Debug, Deserialize)]
struct EvaluationResponse {
    #[serde(rename = "conversationEvaluationScores")]
    scores: Vec<QualityScore>,
}

/// HTTP conversation evaluator
pub struct HttpConversationEvaluator {
    client: UpstreamClient,
    url: String,
}

impl HttpConversationEvaluator {
    pub fn new(client: UpstreamClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ConversationEvaluator for HttpConversationEvaluator {
    async fn evaluate(
        &self,
        conversations: &[ConversationSnippet],
    ) -> Result<Vec<QualityScore>, UpstreamError> {
        if conversations.is_empty() {
            return Ok(Vec::new());
        }

        let response: EvaluationResponse = self
            .client
            .post_json(&self.url, &EvaluationRequest { conversations })
            .await?;
        UpstreamError::check_len(conversations.len(), response.scores.len())?;

        Ok(response.scores)
    }
}
