//! Evaluator input built for every candidate

use serde::{Deserialize, Serialize};

/// Conversation snippet scored by the quality evaluator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSnippet {
    /// Latest utterance of the dialogue
    pub current_utterance: String,
    /// Candidate reply under evaluation
    pub current_response: String,
    /// Recent user texts, oldest first
    pub past_utterances: Vec<String>,
    /// Recent bot texts, oldest first
    pub past_responses: Vec<String>,
}
