//! Batch orchestration
//!
//! One `/respond` request becomes exactly one call to each annotation
//! service, issued concurrently. A failed call never fails the batch: its
//! results are replaced with defaults that leave the candidates selectable
//! (toxicity 0, not blacklisted, erroneous quality).

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::Instrument;
use uuid::Uuid;

use response_selector_annotators::Annotators;
use response_selector_config::Settings;
use response_selector_core::{
    BlacklistDetector, ConversationEvaluator, ConversationSnippet, Dialogue, Error,
    QualityScore, SafetySignal, Selection, ToxicityClassifier, UpstreamError, UpstreamService,
};

use crate::metrics;
use crate::scorer::CandidateScorer;
use crate::selector::Selector;

/// Every candidate of a batch, flattened into parallel arrays
#[derive(Debug, Default)]
struct CandidateBatch {
    texts: Vec<String>,
    snippets: Vec<ConversationSnippet>,
    skill_names: Vec<String>,
    /// Index of the owning dialogue
    owners: Vec<usize>,
}

impl CandidateBatch {
    fn flatten(dialogs: &[Dialogue]) -> Self {
        let mut batch = Self::default();
        for (owner, dialog) in dialogs.iter().enumerate() {
            for candidate in dialog.candidates() {
                batch.texts.push(candidate.text.clone());
                batch.snippets.push(dialog.snippet_for(candidate));
                batch.skill_names.push(candidate.skill_name.clone());
                batch.owners.push(owner);
            }
        }
        batch
    }

    fn len(&self) -> usize {
        self.texts.len()
    }

    /// Flat indices per dialogue, in candidate order
    fn groups(&self, dialogs: usize) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); dialogs];
        for (i, &owner) in self.owners.iter().enumerate() {
            groups[owner].push(i);
        }
        groups
    }
}

/// Annotation results aligned with a `CandidateBatch`
#[derive(Debug)]
struct Annotations {
    toxicity: Vec<f64>,
    blacklisted: Vec<bool>,
    quality: Vec<QualityScore>,
}

/// Selects one reply per dialogue for a whole batch
pub struct ResponseSelector {
    toxicity: Arc<dyn ToxicityClassifier>,
    blacklist: Arc<dyn BlacklistDetector>,
    evaluator: Arc<dyn ConversationEvaluator>,
    selector: Selector,
    timeout: Duration,
}

impl ResponseSelector {
    pub fn new(annotators: Annotators, settings: &Settings) -> Self {
        Self {
            toxicity: annotators.toxicity,
            blacklist: annotators.blacklist,
            evaluator: annotators.evaluator,
            selector: Selector::new(CandidateScorer::new(
                settings.scoring.clone(),
                settings.skills.clone(),
            )),
            timeout: settings.services.timeout(),
        }
    }

    /// Override the per-call upstream deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// One selection per dialogue, in input order
    pub async fn respond(&self, dialogs: &[Dialogue]) -> Vec<Selection> {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("respond", %batch_id, dialogs = dialogs.len());
        let mut rng = StdRng::from_entropy();
        self.respond_with_rng(dialogs, &mut rng)
            .instrument(span)
            .await
    }

    /// Same as `respond` with a caller-supplied random source
    pub async fn respond_with_rng<R: Rng + ?Sized>(
        &self,
        dialogs: &[Dialogue],
        rng: &mut R,
    ) -> Vec<Selection> {
        let started = Instant::now();
        let batch = CandidateBatch::flatten(dialogs);
        let annotations = self.annotate(&batch).await;
        let selections = self.select_all(dialogs, &batch, &annotations, rng);

        let elapsed = started.elapsed();
        metrics::record_batch(batch.len(), elapsed);
        tracing::info!(
            candidates = batch.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Batch processed"
        );
        selections
    }

    async fn annotate(&self, batch: &CandidateBatch) -> Annotations {
        let n = batch.len();
        if n == 0 {
            return Annotations {
                toxicity: Vec::new(),
                blacklisted: Vec::new(),
                quality: Vec::new(),
            };
        }

        let (toxicity, blacklisted, quality) = tokio::join!(
            self.bounded(self.toxicity.classify(&batch.texts)),
            self.bounded(self.blacklist.detect(&batch.texts)),
            self.bounded(self.evaluator.evaluate(&batch.snippets)),
        );

        let annotations = Annotations {
            toxicity: Self::or_default(UpstreamService::Toxicity, n, toxicity, 0.0),
            blacklisted: Self::or_default(UpstreamService::Blacklist, n, blacklisted, false),
            quality: Self::or_default(
                UpstreamService::Evaluator,
                n,
                quality,
                QualityScore::erroneous(),
            ),
        };

        for (i, _) in annotations.blacklisted.iter().enumerate().filter(|(_, b)| **b) {
            let owner = batch.owners[i];
            let skills: Vec<&str> = batch
                .owners
                .iter()
                .zip(&batch.skill_names)
                .filter(|(o, _)| **o == owner)
                .map(|(_, s)| s.as_str())
                .collect();
            tracing::info!(
                dialog = owner,
                skill = %batch.skill_names[i],
                text = %batch.texts[i],
                skills = ?skills,
                "Candidate contains blacklisted words"
            );
            metrics::record_blacklisted_candidate();
        }

        annotations
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, UpstreamError>>,
    ) -> Result<T, UpstreamError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        }
    }

    fn or_default<T: Clone>(
        service: UpstreamService,
        expected: usize,
        result: Result<Vec<T>, UpstreamError>,
        default: T,
    ) -> Vec<T> {
        let checked = result.and_then(|values| {
            UpstreamError::check_len(expected, values.len())?;
            Ok(values)
        });
        match checked {
            Ok(values) => values,
            Err(source) => {
                let kind = source.kind();
                let err = Error::Upstream { service, source };
                tracing::warn!(
                    service = service.as_str(),
                    kind,
                    candidates = expected,
                    error = %err,
                    "Upstream call failed, using defaults"
                );
                metrics::record_upstream_failure(service, kind);
                vec![default; expected]
            }
        }
    }

    fn select_all<R: Rng + ?Sized>(
        &self,
        dialogs: &[Dialogue],
        batch: &CandidateBatch,
        annotations: &Annotations,
        rng: &mut R,
    ) -> Vec<Selection> {
        batch
            .groups(dialogs.len())
            .into_iter()
            .zip(dialogs)
            .enumerate()
            .map(|(d, (indices, dialog))| {
                let quality: Vec<QualityScore> =
                    indices.iter().map(|&i| annotations.quality[i]).collect();
                let safety: Vec<SafetySignal> = indices
                    .iter()
                    .map(|&i| SafetySignal::new(annotations.toxicity[i], annotations.blacklisted[i]))
                    .collect();
                let selection = self.selector.select(dialog, &quality, &safety, rng);
                tracing::info!(
                    dialog = d,
                    skill = selection.skill_name.as_deref().unwrap_or("-"),
                    confidence = selection.confidence,
                    text = %selection.text,
                    "Response selected"
                );
                selection
            })
            .collect()
    }
}
