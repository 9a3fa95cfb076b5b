//! Upstream annotation service clients
//!
//! Features:
//! - Toxicity classifier, blacklist detector and conversation evaluator
//!   clients implementing the core collaborator traits
//! - One shared `reqwest::Client` carrying the API key header
//! - Per-call timeout; every failure comes back as an `UpstreamError`

pub mod blacklist;
pub mod client;
pub mod evaluator;
pub mod factory;
pub mod toxicity;

pub use blacklist::HttpBlacklistDetector;
pub use client::UpstreamClient;
pub use evaluator::HttpConversationEvaluator;
pub use factory::Annotators;
pub use toxicity::HttpToxicityClassifier;

use thiserror::Error;

/// Errors raised while constructing the clients
#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<response_selector_config::ConfigError> for AnnotatorError {
    fn from(err: response_selector_config::ConfigError) -> Self {
        AnnotatorError::Configuration(err.to_string())
    }
}
