//! Core traits and types for the response selector
//!
//! This crate provides foundational types used across all other crates:
//! - Dialogue, utterance and candidate records (the `/respond` wire format)
//! - Quality and safety signals attached to candidates
//! - The selection record returned per dialogue
//! - Collaborator traits for the upstream annotation services
//! - Error types

pub mod conversation;
pub mod dialogue;
pub mod error;
pub mod scores;
pub mod selection;
pub mod traits;

pub use conversation::ConversationSnippet;
pub use dialogue::{Attributes, Candidate, Dialogue, Utterance};
pub use error::{Error, Result, UpstreamError, UpstreamService};
pub use scores::{QualityScore, SafetySignal};
pub use selection::Selection;
pub use traits::{BlacklistDetector, ConversationEvaluator, ToxicityClassifier};
