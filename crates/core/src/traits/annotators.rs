//! Upstream annotation service traits

use async_trait::async_trait;

use crate::conversation::ConversationSnippet;
use crate::error::UpstreamError;
use crate::scores::QualityScore;

/// Scores how toxic each sentence is
#[async_trait]
pub trait ToxicityClassifier: Send + Sync {
    /// One probability in [0, 1] per input sentence, in input order
    async fn classify(&self, sentences: &[String]) -> Result<Vec<f64>, UpstreamError>;
}

/// Flags sentences that contain blacklisted phrases
#[async_trait]
pub trait BlacklistDetector: Send + Sync {
    /// One flag per input sentence, in input order
    async fn detect(&self, sentences: &[String]) -> Result<Vec<bool>, UpstreamError>;
}

/// Rates candidate replies in their conversational context
#[async_trait]
pub trait ConversationEvaluator: Send + Sync {
    /// One score per snippet, in input order
    async fn evaluate(
        &self,
        conversations: &[ConversationSnippet],
    ) -> Result<Vec<QualityScore>, UpstreamError>;
}
