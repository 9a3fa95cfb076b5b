//! Response selection engine
//!
//! Takes a batch of dialogues whose latest turn carries candidate replies and
//! picks one reply per dialogue:
//! - `orchestrator`: flattens the batch, calls the annotation services once
//!   per batch and regroups their results per dialogue
//! - `scorer`: composite score per candidate plus skill override rules
//! - `selector`: argmax, repair loop, apology fallback, follow-up phrasing

pub mod metrics;
pub mod orchestrator;
pub mod phrases;
pub mod scorer;
pub mod selector;

pub use orchestrator::ResponseSelector;
pub use scorer::{CandidateScorer, OverrideRule, ScoreCard, ScoredCandidate};
pub use selector::Selector;
