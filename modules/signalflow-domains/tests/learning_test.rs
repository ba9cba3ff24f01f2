//! Learning flow reference traces.

use chrono::{TimeZone, Utc};
use serde_json::json;
use signalflow_domains::learning::{
    attempt_signal, learning_pipeline, AttemptEvent, LearningState,
};
use signalflow_engine::Engine;

fn fixture_signal(
    signal_id: &str,
    expected: f64,
    observed: f64,
) -> signalflow_core::Signal<AttemptEvent> {
    attempt_signal(
        signal_id,
        Utc.with_ymd_and_hms(2026, 2, 6, 15, 0, 0).unwrap(),
        "ops.learning.worker",
        AttemptEvent {
            learner_id: "learner_1".into(),
            skill_id: "skill_1".into(),
            attempt_id: "attempt_1".into(),
            expected_score: expected,
            observed_score: observed,
        },
    )
}

#[test]
fn passing_attempt_classifies_none_and_proposes_maintain() {
    let mut engine = Engine::new(learning_pipeline(), LearningState::default());

    let emissions = engine.process(&fixture_signal("sig_learn_1", 0.7, 0.8)).unwrap();

    assert_eq!(
        emissions.iter().map(|e| e.emission_id.as_str()).collect::<Vec<_>>(),
        [
            "sig_learn_1:attempt",
            "sig_learn_1:outcome",
            "sig_learn_1:failure",
            "sig_learn_1:calibration",
        ]
    );
    assert_eq!(emissions[1].payload["passed"], json!(true));
    assert_eq!(emissions[2].payload["failure_class"], "none");
    assert_eq!(emissions[3].payload["proposal"], "maintain");
}

#[test]
fn small_shortfall_classifies_minor_gap_and_proposes_support() {
    let mut engine = Engine::new(learning_pipeline(), LearningState::default());

    let emissions = engine.process(&fixture_signal("sig_learn_2", 0.8, 0.75)).unwrap();

    assert_eq!(emissions[1].payload["passed"], json!(false));
    assert_eq!(emissions[1].payload["gap"], json!(0.05));
    assert_eq!(emissions[2].payload["failure_class"], "minor_gap");
    assert_eq!(emissions[3].payload["proposal"], "increase_support");
}

#[test]
fn large_shortfall_classifies_major_gap_and_proposes_rebuild() {
    let mut engine = Engine::new(learning_pipeline(), LearningState::default());

    let emissions = engine.process(&fixture_signal("sig_learn_3", 0.9, 0.5)).unwrap();

    assert_eq!(emissions[1].payload["gap"], json!(0.4));
    assert_eq!(emissions[2].payload["failure_class"], "major_gap");
    assert_eq!(emissions[3].payload["proposal"], "rebuild_foundation");
}

#[test]
fn learning_counters_advance_per_stage() {
    let mut engine = Engine::new(learning_pipeline(), LearningState::default());

    engine.process(&fixture_signal("sig_learn_4", 0.9, 0.5)).unwrap();
    engine.process(&fixture_signal("sig_learn_5", 0.7, 0.8)).unwrap();

    let state = engine.state().value();
    assert_eq!(state.attempts_seen, 2);
    assert_eq!(state.outcomes_emitted, 2);
    assert_eq!(state.failures_emitted, 2);
    assert_eq!(state.calibrations_emitted, 2);
    assert_eq!(state.latest_failure_class, "none");
}
