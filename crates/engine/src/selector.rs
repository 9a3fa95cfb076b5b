//! Picks one reply per dialogue from its scored candidates

use rand::Rng;

use response_selector_core::{Candidate, Dialogue, QualityScore, SafetySignal, Selection};

use crate::metrics::{self, SelectionOutcome};
use crate::phrases;
use crate::scorer::{CandidateScorer, ScoreCard};

/// Chooses the reply for a single dialogue
#[derive(Debug, Clone)]
pub struct Selector {
    scorer: CandidateScorer,
}

impl Selector {
    pub fn new(scorer: CandidateScorer) -> Self {
        Self { scorer }
    }

    /// Select the reply for `dialogue`
    ///
    /// `quality` and `safety` are aligned with `dialogue.candidates()`.
    pub fn select<R: Rng + ?Sized>(
        &self,
        dialogue: &Dialogue,
        quality: &[QualityScore],
        safety: &[SafetySignal],
        rng: &mut R,
    ) -> Selection {
        let mut candidates = dialogue.candidates().to_vec();

        if candidates.is_empty() {
            tracing::warn!("Dialogue has no candidates, apologizing");
            return self.apology(rng);
        }

        let all_unsafe = (0..candidates.len()).all(|i| {
            safety
                .get(i)
                .map(|s| self.scorer.is_unsafe(s))
                .unwrap_or(false)
        });
        if all_unsafe {
            tracing::info!(
                candidates = candidates.len(),
                "Every candidate is unsafe, apologizing"
            );
            return self.apology(rng);
        }

        let card = self
            .scorer
            .score(dialogue.is_first_turn(), &mut candidates, quality, safety);

        let Some(best) = Self::repair(&card, &candidates) else {
            return self.apology(rng);
        };
        let candidate = &candidates[best];

        let mut text = candidate.text.clone();
        if let Some(question) = card.follow_up_question.as_deref() {
            if !question.is_empty() && phrases::is_acknowledgement(&text) {
                text.push_str(&phrases::follow_up(question, rng));
            }
        }

        Selection::from_candidate(candidate, text)
    }

    /// Argmax, then skip over picks with empty text or zero confidence
    ///
    /// Both the skill's reported confidence and the effective one must be
    /// non-zero. When nothing valid remains the last pick is returned as is.
    fn repair(card: &ScoreCard, candidates: &[Candidate]) -> Option<usize> {
        let mut excluded = vec![false; candidates.len()];
        let mut best = card.argmax(&excluded)?;

        while Self::is_degenerate(card, &candidates[best], best) {
            excluded[best] = true;
            match card.argmax(&excluded) {
                Some(next) => best = next,
                None => {
                    tracing::warn!(
                        skill = %candidates[best].skill_name,
                        "No candidate with text and confidence, keeping last pick"
                    );
                    metrics::record_selection(SelectionOutcome::Degenerate);
                    return Some(best);
                }
            }
        }

        metrics::record_selection(SelectionOutcome::Scored);
        Some(best)
    }

    fn is_degenerate(card: &ScoreCard, candidate: &Candidate, index: usize) -> bool {
        candidate.text.is_empty()
            || candidate.confidence == 0.0
            || card.effective_confidence(index) == 0.0
    }

    fn apology<R: Rng + ?Sized>(&self, rng: &mut R) -> Selection {
        metrics::record_selection(SelectionOutcome::Apology);
        Selection::fallback(phrases::apology(rng))
    }
}
