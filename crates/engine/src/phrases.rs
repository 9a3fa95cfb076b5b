//! Fixed texts produced by the selector itself

use rand::seq::SliceRandom;
use rand::Rng;

/// Replies used when every candidate is unsafe
pub const APOLOGIES: [&str; 3] = [
    "I really do not know what to answer.",
    "Sorry, probably, I didn't get what you mean.",
    "I didn't get it. Sorry",
];

/// Low-content replies that get a follow-up question appended
pub const ACKNOWLEDGEMENTS: [&str; 9] = [
    "Okay.",
    "That's cool!",
    "Interesting.",
    "Sounds interesting.",
    "Sounds interesting!",
    "OK.",
    "Cool!",
    "Thanks!",
    "Okay, thanks.",
];

/// Lead-ins placed before the fallback skill's question
pub const FOLLOW_UP_LEAD_INS: [&str; 3] = [
    "Let's switch the topic.",
    "Let me ask you something.",
    "I would like to ask you a question.",
];

/// Random apology text
pub fn apology<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    APOLOGIES.choose(rng).copied().unwrap_or(APOLOGIES[0])
}

/// True for replies that leave the user nothing to answer
pub fn is_acknowledgement(text: &str) -> bool {
    ACKNOWLEDGEMENTS.contains(&text.trim())
}

/// Suffix appended to an acknowledgement, starting with a space
pub fn follow_up<R: Rng + ?Sized>(question: &str, rng: &mut R) -> String {
    let lead_in = FOLLOW_UP_LEAD_INS
        .choose(rng)
        .copied()
        .unwrap_or(FOLLOW_UP_LEAD_INS[0]);
    format!(" {} {}", lead_in, question)
}
