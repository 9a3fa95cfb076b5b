//! Centralized constants for the response selector
//!
//! Single source of truth for default values. Skill names and phrases must
//! match what the upstream skills actually emit.

/// Upstream service endpoints (defaults for the compose deployment)
pub mod endpoints {
    /// Toxicity classifier
    pub const TOXICITY_DEFAULT: &str = "http://toxic_classification:8013/toxicity_annotations";

    /// Blacklisted-words detector
    pub const BLACKLIST_DEFAULT: &str = "http://blacklisted_words:8018/blacklisted_words";
}

/// Timeouts
pub mod timeouts {
    /// Per upstream call, in seconds
    pub const UPSTREAM_SECS: u64 = 10;

    /// Whole `/respond` request, in seconds
    pub const REQUEST_SECS: u64 = 30;
}

/// Composite score parameters
pub mod scoring {
    /// Weight of the summed conversation-evaluation sub-scores
    pub const CONV_EVAL_WEIGHT: f64 = 0.4;

    /// Weight of the skill's confidence
    pub const CONFIDENCE_WEIGHT: f64 = 2.0;

    /// Toxicity above this (together with a blacklist hit) marks a candidate unsafe
    pub const UNSAFE_TOXICITY_THRESHOLD: f64 = 0.5;

    /// Score assigned by override rules
    pub const MAX_SCORE: f64 = 100.0;

    /// Confidence given to a chit-chat greeting outside the first turn
    pub const MID_DIALOGUE_GREETING_CONFIDENCE: f64 = 0.2;
}

/// Skills with override rules
pub mod skills {
    /// General chit-chat skill
    pub const CHIT_CHAT: &str = "program_y";

    /// Crisis / psychological-help skill
    pub const CRISIS: &str = "program_y_dangerous";

    /// Fallback skill whose question is reused as a follow-up
    pub const FALLBACK: &str = "dummy_skill";
}

/// Fixed phrases recognised by the override rules
pub mod phrases {
    pub const GREETING: &str = "Hi, this is an Alexa Prize Socialbot.";

    pub const HOW_ARE_YOU_REPLY: &str = "I'm fine, thanks! Do you want to know what I can do?";

    pub const PSYCHOLOGICAL_HELP: &str = "If you or someone you know is in immediate danger";
}

/// Server defaults
pub mod server {
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 3000;
}
