//! Error types shared across the response selector crates

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result alias using the core error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid dialogue {index}: {reason}")]
    InvalidDialogue { index: usize, reason: String },

    #[error("Upstream {service} failed: {source}")]
    Upstream {
        service: UpstreamService,
        #[source]
        source: UpstreamError,
    },
}

/// The three annotation services called once per batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamService {
    /// Toxicity classifier
    Toxicity,
    /// Blacklisted-words detector
    Blacklist,
    /// Conversation quality evaluator
    Evaluator,
}

impl UpstreamService {
    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toxicity => "toxicity",
            Self::Blacklist => "blacklist",
            Self::Evaluator => "evaluator",
        }
    }
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure outcome of one upstream call
///
/// Consumed by the orchestrator, which substitutes safe defaults instead of
/// failing the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("expected {expected} results, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl UpstreamError {
    /// Short error kind for metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::InvalidResponse(_) => "invalid_response",
            Self::LengthMismatch { .. } => "length_mismatch",
        }
    }

    /// Check that a service returned one result per input
    pub fn check_len(expected: usize, actual: usize) -> std::result::Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::LengthMismatch { expected, actual })
        }
    }
}
