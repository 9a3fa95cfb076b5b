//! Builds the three upstream clients from configuration

use std::sync::Arc;

use response_selector_config::ServicesConfig;
use response_selector_core::{BlacklistDetector, ConversationEvaluator, ToxicityClassifier};

use crate::{
    AnnotatorError, HttpBlacklistDetector, HttpConversationEvaluator, HttpToxicityClassifier,
    UpstreamClient,
};

/// The collaborator set consumed by the orchestrator
#[derive(Clone)]
pub struct Annotators {
    pub toxicity: Arc<dyn ToxicityClassifier>,
    pub blacklist: Arc<dyn BlacklistDetector>,
    pub evaluator: Arc<dyn ConversationEvaluator>,
}

impl Annotators {
    /// HTTP clients sharing one connection pool
    ///
    /// Fails when the API key or evaluator URL is missing.
    pub fn from_config(config: &ServicesConfig) -> Result<Self, AnnotatorError> {
        let client = UpstreamClient::new(config.api_key()?, config.timeout())?;
        let evaluator_url = config.evaluator_url()?;

        tracing::info!(
            toxicity_url = %config.toxicity_url,
            blacklist_url = %config.blacklist_url,
            evaluator_url = %evaluator_url,
            timeout_secs = config.timeout_secs,
            "Upstream annotation clients created"
        );

        Ok(Self {
            toxicity: Arc::new(HttpToxicityClassifier::new(
                client.clone(),
                config.toxicity_url.clone(),
            )),
            blacklist: Arc::new(HttpBlacklistDetector::new(
                client.clone(),
                config.blacklist_url.clone(),
            )),
            evaluator: Arc::new(HttpConversationEvaluator::new(client, evaluator_url)),
        })
    }
}
