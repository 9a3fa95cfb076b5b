//! The reply chosen for one dialogue

use serde::{Deserialize, Serialize};

use crate::dialogue::{Attributes, Candidate};

/// Selected reply, serialized as
/// `[skill_name | null, text, confidence, human_attributes, bot_attributes]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SelectionTuple", from = "SelectionTuple")]
pub struct Selection {
    /// Originating skill; `None` for the apology fallback
    pub skill_name: Option<String>,
    pub text: String,
    pub confidence: f64,
    pub human_attributes: Attributes,
    pub bot_attributes: Attributes,
}

type SelectionTuple = (Option<String>, String, f64, Attributes, Attributes);

impl From<Selection> for SelectionTuple {
    fn from(s: Selection) -> Self {
        (
            s.skill_name,
            s.text,
            s.confidence,
            s.human_attributes,
            s.bot_attributes,
        )
    }
}

impl From<SelectionTuple> for Selection {
    fn from(t: SelectionTuple) -> Self {
        Self {
            skill_name: t.0,
            text: t.1,
            confidence: t.2,
            human_attributes: t.3,
            bot_attributes: t.4,
        }
    }
}

impl Selection {
    /// Selection attributed to a candidate, with the given final text
    pub fn from_candidate(candidate: &Candidate, text: String) -> Self {
        Self {
            skill_name: Some(candidate.skill_name.clone()),
            text,
            confidence: candidate.confidence,
            human_attributes: candidate.human_attributes_or_default(),
            bot_attributes: candidate.bot_attributes_or_default(),
        }
    }

    /// Unattributed fixed reply with full confidence
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            skill_name: None,
            text: text.into(),
            confidence: 1.0,
            human_attributes: Attributes::new(),
            bot_attributes: Attributes::new(),
        }
    }
}
