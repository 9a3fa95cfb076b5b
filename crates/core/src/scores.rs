//! Quality and safety signals attached to each candidate

use serde::{Deserialize, Serialize};

/// Conversation-quality sub-scores for one candidate
///
/// Field names follow the evaluator's response format.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityScore {
    #[serde(rename = "isResponseOnTopic", default)]
    pub on_topic: f64,
    #[serde(rename = "isResponseInteresting", default)]
    pub interesting: f64,
    #[serde(rename = "responseEngagesUser", default)]
    pub engages_user: f64,
    #[serde(rename = "isResponseComprehensible", default)]
    pub comprehensible: f64,
    #[serde(rename = "isResponseErroneous", default)]
    pub erroneous: f64,
}

impl QualityScore {
    pub fn new(
        on_topic: f64,
        interesting: f64,
        engages_user: f64,
        comprehensible: f64,
        erroneous: f64,
    ) -> Self {
        Self {
            on_topic,
            interesting,
            engages_user,
            comprehensible,
            erroneous,
        }
    }

    /// Score used when nothing is known about a candidate, or it must not win
    pub fn erroneous() -> Self {
        Self {
            erroneous: 1.0,
            ..Self::default()
        }
    }

    /// Positive sub-scores minus the erroneous score
    pub fn sum(&self) -> f64 {
        self.on_topic + self.interesting + self.engages_user + self.comprehensible - self.erroneous
    }
}

/// Toxicity probability and blacklist flag for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SafetySignal {
    pub toxicity: f64,
    pub is_blacklisted: bool,
}

impl SafetySignal {
    pub fn new(toxicity: f64, is_blacklisted: bool) -> Self {
        Self {
            toxicity,
            is_blacklisted,
        }
    }

    /// Unsafe only when highly toxic AND blacklisted
    pub fn is_unsafe(&self, toxicity_threshold: f64) -> bool {
        self.toxicity > toxicity_threshold && self.is_blacklisted
    }
}
