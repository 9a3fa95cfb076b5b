//! End-to-end batch selection against in-process annotator stubs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use response_selector_annotators::Annotators;
use response_selector_config::Settings;
use response_selector_core::{
    BlacklistDetector, Candidate, ConversationEvaluator, ConversationSnippet, Dialogue,
    QualityScore, ToxicityClassifier, UpstreamError, Utterance,
};
use response_selector_engine::phrases::APOLOGIES;
use response_selector_engine::ResponseSelector;

/// Toxicity looked up by candidate text; unknown texts are clean
struct StubToxicity {
    toxic: Vec<&'static str>,
    fail: Option<UpstreamError>,
    delay: Duration,
    calls: AtomicUsize,
}

#[async_trait]
impl ToxicityClassifier for StubToxicity {
    async fn classify(&self, texts: &[String]) -> Result<Vec<f64>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }
        Ok(texts
            .iter()
            .map(|t| if self.toxic.contains(&t.as_str()) { 0.9 } else { 0.0 })
            .collect())
    }
}

struct StubBlacklist {
    flagged: Vec<&'static str>,
    fail: Option<UpstreamError>,
    calls: AtomicUsize,
}

#[async_trait]
impl BlacklistDetector for StubBlacklist {
    async fn detect(&self, texts: &[String]) -> Result<Vec<bool>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }
        Ok(texts
            .iter()
            .map(|t| self.flagged.contains(&t.as_str()))
            .collect())
    }
}

/// Quality sum taken from a per-text table (on_topic carries the whole sum)
struct StubEvaluator {
    sums: Vec<(&'static str, f64)>,
    fail: Option<UpstreamError>,
    calls: AtomicUsize,
    seen: std::sync::Mutex<Vec<ConversationSnippet>>,
}

#[async_trait]
impl ConversationEvaluator for StubEvaluator {
    async fn evaluate(
        &self,
        conversations: &[ConversationSnippet],
    ) -> Result<Vec<QualityScore>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.extend_from_slice(conversations);
        }
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }
        Ok(conversations
            .iter()
            .map(|c| {
                let sum = self
                    .sums
                    .iter()
                    .find(|(t, _)| *t == c.current_response)
                    .map(|(_, s)| *s)
                    .unwrap_or(0.0);
                QualityScore::new(sum, 0.0, 0.0, 0.0, 0.0)
            })
            .collect())
    }
}

struct Harness {
    toxicity: Arc<StubToxicity>,
    blacklist: Arc<StubBlacklist>,
    evaluator: Arc<StubEvaluator>,
}

impl Harness {
    fn new() -> Self {
        Self {
            toxicity: Arc::new(StubToxicity {
                toxic: Vec::new(),
                fail: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }),
            blacklist: Arc::new(StubBlacklist {
                flagged: Vec::new(),
                fail: None,
                calls: AtomicUsize::new(0),
            }),
            evaluator: Arc::new(StubEvaluator {
                sums: Vec::new(),
                fail: None,
                calls: AtomicUsize::new(0),
                seen: std::sync::Mutex::new(Vec::new()),
            }),
        }
    }

    fn with_toxicity(mut self, toxicity: StubToxicity) -> Self {
        self.toxicity = Arc::new(toxicity);
        self
    }

    fn with_blacklist(mut self, flagged: Vec<&'static str>) -> Self {
        self.blacklist = Arc::new(StubBlacklist {
            flagged,
            fail: None,
            calls: AtomicUsize::new(0),
        });
        self
    }

    fn with_failing_blacklist(mut self, err: UpstreamError) -> Self {
        self.blacklist = Arc::new(StubBlacklist {
            flagged: Vec::new(),
            fail: Some(err),
            calls: AtomicUsize::new(0),
        });
        self
    }

    fn with_evaluator(mut self, sums: Vec<(&'static str, f64)>, fail: Option<UpstreamError>) -> Self {
        self.evaluator = Arc::new(StubEvaluator {
            sums,
            fail,
            calls: AtomicUsize::new(0),
            seen: std::sync::Mutex::new(Vec::new()),
        });
        self
    }

    fn selector(&self) -> ResponseSelector {
        let annotators = Annotators {
            toxicity: self.toxicity.clone(),
            blacklist: self.blacklist.clone(),
            evaluator: self.evaluator.clone(),
        };
        ResponseSelector::new(annotators, &Settings::default())
    }

    fn call_counts(&self) -> (usize, usize, usize) {
        (
            self.toxicity.calls.load(Ordering::SeqCst),
            self.blacklist.calls.load(Ordering::SeqCst),
            self.evaluator.calls.load(Ordering::SeqCst),
        )
    }
}

fn mid_dialogue(candidates: Vec<Candidate>) -> Dialogue {
    Dialogue::new(vec![
        Utterance::new("Hi, how can I help?"),
        Utterance::new("tell me something").with_hypotheses(candidates),
    ])
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(3)
}

#[tokio::test]
async fn test_higher_composite_selected() {
    let harness = Harness::new().with_evaluator(vec![("A text", 2.0), ("B text", 3.0)], None);
    let dialogs = vec![mid_dialogue(vec![
        Candidate::new("skillA", "A text", 0.9),
        Candidate::new("skillB", "B text", 0.1),
    ])];

    let out = harness.selector().respond_with_rng(&dialogs, &mut rng()).await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].skill_name.as_deref(), Some("skillA"));
    assert_eq!(out[0].text, "A text");
}

#[tokio::test]
async fn test_one_call_per_service_for_whole_batch() {
    let harness = Harness::new();
    let dialogs = vec![
        mid_dialogue(vec![Candidate::new("a", "one", 0.5)]),
        mid_dialogue(vec![
            Candidate::new("b", "two", 0.5),
            Candidate::new("c", "three", 0.6),
        ]),
        mid_dialogue(vec![Candidate::new("d", "four", 0.5)]),
    ];

    let out = harness.selector().respond(&dialogs).await;
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].skill_name.as_deref(), Some("a"));
    assert_eq!(out[1].skill_name.as_deref(), Some("c"));
    assert_eq!(out[2].skill_name.as_deref(), Some("d"));
    assert_eq!(harness.call_counts(), (1, 1, 1));
}

#[tokio::test]
async fn test_evaluator_sees_history() {
    let harness = Harness::new();
    let dialogs = vec![Dialogue::new(vec![
        Utterance::new("b0"),
        Utterance::new("u1"),
        Utterance::new("b2"),
        Utterance::new("u3").with_hypotheses(vec![Candidate::new("s", "reply", 0.5)]),
    ])];

    harness.selector().respond(&dialogs).await;
    let seen = harness.evaluator.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].current_utterance, "u3");
    assert_eq!(seen[0].current_response, "reply");
    assert_eq!(seen[0].past_utterances, vec!["u1", "u3"]);
    assert_eq!(seen[0].past_responses, vec!["b0", "b2"]);
}

#[tokio::test]
async fn test_evaluator_failure_falls_back_to_confidence() {
    let harness = Harness::new().with_evaluator(
        vec![("low", 4.0)],
        Some(UpstreamError::Status {
            status: 500,
            body: "boom".to_string(),
        }),
    );
    let dialogs = vec![mid_dialogue(vec![
        Candidate::new("low", "low", 0.2),
        Candidate::new("high", "high", 0.7),
    ])];

    let out = harness.selector().respond_with_rng(&dialogs, &mut rng()).await;
    assert_eq!(out[0].skill_name.as_deref(), Some("high"));
}

#[tokio::test]
async fn test_toxicity_timeout_treated_as_clean() {
    let harness = Harness::new()
        .with_toxicity(StubToxicity {
            toxic: vec!["rude"],
            fail: None,
            delay: Duration::from_secs(5),
            calls: AtomicUsize::new(0),
        })
        .with_blacklist(vec!["rude"])
        .with_evaluator(vec![("rude", 4.0)], None);
    let dialogs = vec![mid_dialogue(vec![
        Candidate::new("edgy", "rude", 0.9),
        Candidate::new("polite", "nice", 0.1),
    ])];

    let selector = harness.selector().with_timeout(Duration::from_millis(50));
    let out = selector.respond_with_rng(&dialogs, &mut rng()).await;
    // Blacklisted alone is not enough to disqualify
    assert_eq!(out[0].skill_name.as_deref(), Some("edgy"));
}

#[tokio::test]
async fn test_all_unsafe_apologizes() {
    let harness = Harness::new()
        .with_toxicity(StubToxicity {
            toxic: vec!["bad", "worse"],
            fail: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
        .with_blacklist(vec!["bad", "worse"]);
    let dialogs = vec![mid_dialogue(vec![
        Candidate::new("a", "bad", 0.9),
        Candidate::new("b", "worse", 0.9),
    ])];

    let out = harness.selector().respond_with_rng(&dialogs, &mut rng()).await;
    assert_eq!(out[0].skill_name, None);
    assert_eq!(out[0].confidence, 1.0);
    assert!(APOLOGIES.contains(&out[0].text.as_str()));
}

#[tokio::test]
async fn test_dialogue_without_candidates_gets_apology() {
    let harness = Harness::new();
    let dialogs = vec![
        Dialogue::new(vec![Utterance::new("hello")]),
        mid_dialogue(vec![Candidate::new("a", "hey", 0.5)]),
    ];

    let out = harness.selector().respond_with_rng(&dialogs, &mut rng()).await;
    assert_eq!(out[0].skill_name, None);
    assert_eq!(out[1].skill_name.as_deref(), Some("a"));
}

#[tokio::test]
async fn test_empty_batch_makes_no_calls() {
    let harness = Harness::new();
    let out = harness.selector().respond(&[]).await;
    assert!(out.is_empty());
    assert_eq!(harness.call_counts(), (0, 0, 0));
}

#[tokio::test]
async fn test_first_turn_greeting() {
    let harness = Harness::new().with_evaluator(vec![("Sure!", 4.0)], None);
    let dialogs = vec![Dialogue::new(vec![Utterance::new("hi").with_hypotheses(
        vec![
            Candidate::new("other", "Sure!", 1.0),
            Candidate::new("program_y", "Hello there.", 0.4),
        ],
    )])];

    let out = harness.selector().respond_with_rng(&dialogs, &mut rng()).await;
    assert_eq!(out[0].skill_name.as_deref(), Some("program_y"));
    assert_eq!(out[0].text, "Hi, this is an Alexa Prize Socialbot. Hello there.");
}

#[tokio::test]
async fn test_acknowledgement_extended_with_question() {
    let harness = Harness::new().with_evaluator(vec![("Cool!", 2.0)], None);
    let dialogs = vec![mid_dialogue(vec![
        Candidate::new("skillA", "Cool!", 0.8),
        Candidate::new("dummy_skill", "Have you seen any good films lately?", 0.1),
    ])];

    let out = harness.selector().respond_with_rng(&dialogs, &mut rng()).await;
    assert_eq!(out[0].skill_name.as_deref(), Some("skillA"));
    assert!(out[0].text.starts_with("Cool! "));
    assert!(out[0]
        .text
        .ends_with(" Have you seen any good films lately?"));
}

#[tokio::test]
async fn test_blacklist_failure_treats_candidates_as_clean() {
    let harness = Harness::new()
        .with_toxicity(StubToxicity {
            toxic: vec!["rude"],
            fail: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
        .with_failing_blacklist(UpstreamError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
        .with_evaluator(vec![("rude", 4.0)], None);
    let dialogs = vec![mid_dialogue(vec![
        Candidate::new("edgy", "rude", 0.9),
        Candidate::new("polite", "nice", 0.1),
    ])];

    let out = harness.selector().respond_with_rng(&dialogs, &mut rng()).await;
    // Toxic alone is not enough to disqualify, so no apology either
    assert_eq!(out[0].skill_name.as_deref(), Some("edgy"));
    assert_eq!(harness.call_counts(), (1, 1, 1));
}

#[tokio::test]
async fn test_first_turn_reply_with_greeting_wins() {
    let greeted = "Hi, this is an Alexa Prize Socialbot. What's your name?";
    let harness = Harness::new().with_evaluator(vec![("Sure!", 4.0)], None);
    let dialogs = vec![Dialogue::new(vec![Utterance::new("hi").with_hypotheses(
        vec![
            Candidate::new("other", "Sure!", 1.0),
            Candidate::new("program_y", greeted, 0.4),
        ],
    )])];

    let out = harness.selector().respond_with_rng(&dialogs, &mut rng()).await;
    assert_eq!(out[0].skill_name.as_deref(), Some("program_y"));
    assert_eq!(out[0].text, greeted);
    assert_eq!(out[0].confidence, 0.4);
}

#[tokio::test]
async fn test_zero_confidence_greeting_repaired_mid_dialogue() {
    let harness = Harness::new().with_evaluator(
        vec![("Hi, this is an Alexa Prize Socialbot. How are you?", 4.0)],
        None,
    );
    let dialogs = vec![mid_dialogue(vec![
        Candidate::new(
            "program_y",
            "Hi, this is an Alexa Prize Socialbot. How are you?",
            0.0,
        ),
        Candidate::new("skillB", "Sure, let's talk about movies.", 0.3),
    ])];

    let out = harness.selector().respond_with_rng(&dialogs, &mut rng()).await;
    assert_eq!(out[0].skill_name.as_deref(), Some("skillB"));
}
