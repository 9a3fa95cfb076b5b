//! Dialogue, utterance and candidate records
//!
//! These mirror the `/respond` request body. Unknown keys sent by the
//! dialogue manager are ignored.

use serde::{Deserialize, Serialize};

use crate::conversation::ConversationSnippet;
use crate::error::{Error, Result};

/// Opaque key-value payload passed through the selector unmodified
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Number of past user/bot texts handed to the conversation evaluator
pub const HISTORY_WINDOW: usize = 2;

/// One skill's proposed reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Skill that produced the candidate
    pub skill_name: String,
    /// Reply text (may be empty)
    #[serde(default)]
    pub text: String,
    /// Skill's self-reported confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_attributes: Option<Attributes>,
}

impl Candidate {
    /// Create a candidate without attributes
    pub fn new(skill_name: impl Into<String>, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            skill_name: skill_name.into(),
            text: text.into(),
            confidence,
            human_attributes: None,
            bot_attributes: None,
        }
    }

    /// Human attributes, empty when the skill sent none
    pub fn human_attributes_or_default(&self) -> Attributes {
        self.human_attributes.clone().unwrap_or_default()
    }

    /// Bot attributes, empty when the skill sent none
    pub fn bot_attributes_or_default(&self) -> Attributes {
        self.bot_attributes.clone().unwrap_or_default()
    }
}

/// A single dialogue turn
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Utterance {
    #[serde(default)]
    pub text: String,
    /// Candidate replies; only present on the latest utterance
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hypotheses: Vec<Candidate>,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hypotheses: Vec::new(),
        }
    }

    pub fn with_hypotheses(mut self, hypotheses: Vec<Candidate>) -> Self {
        self.hypotheses = hypotheses;
        self
    }
}

/// Ordered utterances, bot at even indices and user at odd indices
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dialogue {
    #[serde(default)]
    pub utterances: Vec<Utterance>,
}

impl Dialogue {
    pub fn new(utterances: Vec<Utterance>) -> Self {
        Self { utterances }
    }

    /// Reject dialogues the selector cannot work with
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.utterances.is_empty() {
            return Err(Error::InvalidDialogue {
                index,
                reason: "dialogue has no utterances".to_string(),
            });
        }
        Ok(())
    }

    /// Number of utterances so far
    pub fn turn_count(&self) -> usize {
        self.utterances.len()
    }

    /// True while the dialogue is still on its opening turn
    pub fn is_first_turn(&self) -> bool {
        self.turn_count() < 2
    }

    /// Most recent utterance
    pub fn latest(&self) -> Option<&Utterance> {
        self.utterances.last()
    }

    /// Candidates attached to the latest utterance
    pub fn candidates(&self) -> &[Candidate] {
        self.latest().map(|u| u.hypotheses.as_slice()).unwrap_or(&[])
    }

    /// Text of the latest utterance
    pub fn current_text(&self) -> &str {
        self.latest().map(|u| u.text.as_str()).unwrap_or("")
    }

    /// Last `n` user texts (odd indices), oldest first
    pub fn recent_user_texts(&self, n: usize) -> Vec<String> {
        Self::tail(self.utterances.iter().skip(1).step_by(2), n)
    }

    /// Last `n` bot texts (even indices), oldest first
    pub fn recent_bot_texts(&self, n: usize) -> Vec<String> {
        Self::tail(self.utterances.iter().step_by(2), n)
    }

    /// Evaluator input for one of this dialogue's candidates
    pub fn snippet_for(&self, candidate: &Candidate) -> ConversationSnippet {
        ConversationSnippet {
            current_utterance: self.current_text().to_string(),
            current_response: candidate.text.clone(),
            past_utterances: self.recent_user_texts(HISTORY_WINDOW),
            past_responses: self.recent_bot_texts(HISTORY_WINDOW),
        }
    }

    fn tail<'a>(utterances: impl Iterator<Item = &'a Utterance>, n: usize) -> Vec<String> {
        let texts: Vec<String> = utterances.map(|u| u.text.clone()).collect();
        let skip = texts.len().saturating_sub(n);
        texts.into_iter().skip(skip).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialogue(texts: &[&str]) -> Dialogue {
        Dialogue::new(texts.iter().map(|t| Utterance::new(*t)).collect())
    }

    #[test]
    fn test_history_split_by_parity() {
        let d = dialogue(&["b0", "u1", "b2", "u3", "b4", "u5", "b6"]);
        assert_eq!(d.recent_user_texts(2), vec!["u3", "u5"]);
        assert_eq!(d.recent_bot_texts(2), vec!["b4", "b6"]);
        assert_eq!(d.current_text(), "b6");
    }

    #[test]
    fn test_short_history() {
        let d = dialogue(&["hello"]);
        assert!(d.recent_user_texts(2).is_empty());
        assert_eq!(d.recent_bot_texts(2), vec!["hello"]);
        assert!(d.is_first_turn());
    }

    #[test]
    fn test_candidates_from_latest_only() {
        let mut d = dialogue(&["hi", "how are you"]);
        d.utterances[1].hypotheses = vec![Candidate::new("a", "fine", 0.5)];
        assert_eq!(d.candidates().len(), 1);
        assert!(!d.is_first_turn());
        assert!(Dialogue::default().candidates().is_empty());
    }

    #[test]
    fn test_snippet_for_candidate() {
        let mut d = dialogue(&["b0", "u1", "b2", "u3"]);
        let cand = Candidate::new("skill", "reply", 0.9);
        d.utterances[3].hypotheses = vec![cand.clone()];
        let snippet = d.snippet_for(&cand);
        assert_eq!(snippet.current_utterance, "u3");
        assert_eq!(snippet.current_response, "reply");
        assert_eq!(snippet.past_utterances, vec!["u1", "u3"]);
        assert_eq!(snippet.past_responses, vec!["b0", "b2"]);
    }

    #[test]
    fn test_validate_empty_dialogue() {
        assert!(Dialogue::default().validate(0).is_err());
        assert!(dialogue(&["x"]).validate(0).is_ok());
    }

    #[test]
    fn test_deserialize_ignores_extra_keys() {
        let json = serde_json::json!({
            "id": "abc",
            "utterances": [
                {"text": "hi", "annotations": {"x": 1}},
                {"text": "yo", "hypotheses": [
                    {"skill_name": "s", "text": "t", "confidence": 0.3,
                     "human_attributes": {"name": "ann"}, "extra": true}
                ]}
            ]
        });
        let d: Dialogue = serde_json::from_value(json).unwrap();
        let c = &d.candidates()[0];
        assert_eq!(c.skill_name, "s");
        assert_eq!(c.human_attributes_or_default()["name"], "ann");
        assert!(c.bot_attributes_or_default().is_empty());
    }
}
