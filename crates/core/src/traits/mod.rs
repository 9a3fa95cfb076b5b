//! Collaborator traits
//!
//! The selector consumes three upstream annotation services. Each is a trait so
//! the HTTP clients can be swapped for mocks in tests:
//!
//! ```text
//!   - ToxicityClassifier: sentences → toxicity probability per sentence
//!   - BlacklistDetector: sentences → blacklist flag per sentence
//!   - ConversationEvaluator: snippets → quality sub-scores per snippet
//! ```

mod annotators;

pub use annotators::{BlacklistDetector, ConversationEvaluator, ToxicityClassifier};
