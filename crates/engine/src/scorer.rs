//! Per-candidate composite scoring
//!
//! Each candidate gets
//! `conv_eval_weight * quality.sum() + confidence_weight * confidence`,
//! after two adjustments:
//! - unsafe candidates (toxic AND blacklisted) are scored as erroneous with
//!   zero confidence
//! - a few skill/text combinations override the score. The first one that
//!   forces the maximum score ends the pass, and later candidates stay unscored.

use response_selector_config::{ScoringConfig, SkillsConfig};
use response_selector_core::{Candidate, QualityScore, SafetySignal};

/// Skill-specific rule that replaces generic scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideRule {
    /// Chit-chat reply on the opening turn without the bot greeting;
    /// the greeting is prepended and the candidate wins
    PrependGreeting,
    /// Chit-chat answer to "how are you"
    HowAreYouReply,
    /// Crisis skill pointing the user to help
    PsychologicalHelp,
    /// Chit-chat reply already carrying the greeting on the opening turn
    GreetingOnFirstTurn,
    /// Greeting repeated mid-dialogue; confidence is lowered and generic
    /// scoring continues
    RepeatedGreeting,
}

impl OverrideRule {
    /// Rules that force the maximum score and stop the pass
    pub fn is_short_circuit(&self) -> bool {
        !matches!(self, Self::RepeatedGreeting)
    }
}

/// Score entry for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    /// Confidence after the unsafe and greeting adjustments
    pub effective_confidence: f64,
    /// `None` when an earlier candidate short-circuited the pass
    pub score: Option<f64>,
}

/// Result of scoring one dialogue's candidates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreCard {
    /// One entry per candidate, in candidate order
    pub entries: Vec<ScoredCandidate>,
    /// Text of the last fallback-skill candidate reached by the pass
    pub follow_up_question: Option<String>,
    /// Index and rule of the short-circuiting candidate, if any
    pub short_circuit: Option<(usize, OverrideRule)>,
}

impl ScoreCard {
    /// Index of the highest score among non-excluded candidates
    ///
    /// Ties go to the earliest candidate.
    pub fn argmax(&self, excluded: &[bool]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if excluded.get(i).copied().unwrap_or(false) {
                continue;
            }
            let Some(score) = entry.score.filter(|s| !s.is_nan()) else {
                continue;
            };
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((i, score)),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn effective_confidence(&self, index: usize) -> f64 {
        self.entries
            .get(index)
            .map(|e| e.effective_confidence)
            .unwrap_or(0.0)
    }
}

/// Applies the scoring formula and override rules
#[derive(Debug, Clone)]
pub struct CandidateScorer {
    scoring: ScoringConfig,
    skills: SkillsConfig,
}

impl CandidateScorer {
    pub fn new(scoring: ScoringConfig, skills: SkillsConfig) -> Self {
        Self { scoring, skills }
    }

    /// True when the candidate's safety signal disqualifies it
    pub fn is_unsafe(&self, safety: &SafetySignal) -> bool {
        safety.is_unsafe(self.scoring.unsafe_toxicity_threshold)
    }

    /// Score every candidate of one dialogue
    ///
    /// `candidates` is mutable because the greeting rule rewrites text.
    /// Missing quality or safety entries count as erroneous and safe.
    pub fn score(
        &self,
        first_turn: bool,
        candidates: &mut [Candidate],
        quality: &[QualityScore],
        safety: &[SafetySignal],
    ) -> ScoreCard {
        let mut card = ScoreCard {
            entries: Vec::with_capacity(candidates.len()),
            ..ScoreCard::default()
        };

        for (i, candidate) in candidates.iter_mut().enumerate() {
            let signal = safety.get(i).copied().unwrap_or_default();
            let unsafe_candidate = self.is_unsafe(&signal);
            let (quality, mut confidence) = if unsafe_candidate {
                (QualityScore::erroneous(), 0.0)
            } else {
                (
                    quality.get(i).copied().unwrap_or_else(QualityScore::erroneous),
                    candidate.confidence,
                )
            };

            if card.short_circuit.is_some() {
                card.entries.push(ScoredCandidate {
                    effective_confidence: confidence,
                    score: None,
                });
                continue;
            }

            match self.match_rule(first_turn, candidate) {
                Some(rule) if rule.is_short_circuit() => {
                    if rule == OverrideRule::PrependGreeting {
                        candidate.text = format!("{} {}", self.skills.greeting_phrase, candidate.text);
                    }
                    tracing::debug!(
                        skill = %candidate.skill_name,
                        rule = ?rule,
                        "Override rule forces maximum score"
                    );
                    card.entries.push(ScoredCandidate {
                        effective_confidence: confidence,
                        score: Some(self.scoring.max_score),
                    });
                    card.short_circuit = Some((i, rule));
                    continue;
                }
                Some(_) if !unsafe_candidate => {
                    confidence = self.scoring.mid_dialogue_greeting_confidence
                },
                _ => {}
            }

            if candidate.skill_name == self.skills.fallback {
                card.follow_up_question = Some(candidate.text.clone());
            }

            let score = self.scoring.conv_eval_weight * quality.sum()
                + self.scoring.confidence_weight * confidence;
            tracing::debug!(
                skill = %candidate.skill_name,
                quality = quality.sum(),
                confidence,
                score,
                "Candidate scored"
            );
            card.entries.push(ScoredCandidate {
                effective_confidence: confidence,
                score: Some(score),
            });
        }

        card
    }

    fn match_rule(&self, first_turn: bool, candidate: &Candidate) -> Option<OverrideRule> {
        let skills = &self.skills;
        let chit_chat = candidate.skill_name == skills.chit_chat;
        let greeted = candidate.text.contains(skills.greeting_phrase.trim());

        if first_turn && chit_chat && !greeted {
            Some(OverrideRule::PrependGreeting)
        } else if chit_chat && candidate.text == skills.how_are_you_reply {
            Some(OverrideRule::HowAreYouReply)
        } else if candidate.skill_name == skills.crisis
            && candidate.text.contains(&skills.psychological_help_phrase)
        {
            Some(OverrideRule::PsychologicalHelp)
        } else if chit_chat && greeted {
            if first_turn {
                Some(OverrideRule::GreetingOnFirstTurn)
            } else {
                Some(OverrideRule::RepeatedGreeting)
            }
        } else {
            None
        }
    }
}
