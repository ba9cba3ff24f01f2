//! Learning flow: attempt → outcome → failure → calibration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use signalflow_core::{Emission, Signal};
use signalflow_engine::{Pipeline, StepResult};

/// Gaps below this classify as minor.
const MINOR_GAP_CEILING: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptEvent {
    pub learner_id: String,
    pub skill_id: String,
    pub attempt_id: String,
    pub expected_score: f64,
    pub observed_score: f64,
}

/// State threaded through attempt → calibration processing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningState {
    pub attempts_seen: u64,
    pub outcomes_emitted: u64,
    pub failures_emitted: u64,
    pub calibrations_emitted: u64,
    pub latest_gap: f64,
    pub latest_failure_class: String,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn attempt_stage(signal: &Signal<AttemptEvent>, state: LearningState) -> StepResult<LearningState, Value> {
    let emission = Emission::new(
        "attempt.snapshot",
        signal.signal_id.clone(),
        json!({
            "learner_id": signal.payload.learner_id,
            "skill_id": signal.payload.skill_id,
            "attempt_id": signal.payload.attempt_id,
            "expected_score": signal.payload.expected_score,
            "observed_score": signal.payload.observed_score,
        }),
    )
    .with_id(format!("{}:attempt", signal.signal_id))
    .with_timestamp(signal.timestamp);

    Ok((state, vec![emission]))
}

fn outcome_stage(signal: &Signal<AttemptEvent>, state: LearningState) -> StepResult<LearningState, Value> {
    let gap = round4(signal.payload.expected_score - signal.payload.observed_score);
    let passed = signal.payload.observed_score >= signal.payload.expected_score;
    let emission = Emission::new(
        "outcome.evaluated",
        signal.signal_id.clone(),
        json!({
            "attempt_id": signal.payload.attempt_id,
            "passed": passed,
            "gap": gap,
        }),
    )
    .with_id(format!("{}:outcome", signal.signal_id))
    .with_timestamp(signal.timestamp);

    let next = LearningState {
        attempts_seen: state.attempts_seen + 1,
        outcomes_emitted: state.outcomes_emitted + 1,
        latest_gap: gap,
        ..state
    };
    Ok((next, vec![emission]))
}

fn failure_stage(signal: &Signal<AttemptEvent>, state: LearningState) -> StepResult<LearningState, Value> {
    let gap = state.latest_gap;
    let failure_class = if gap <= 0.0 {
        "none"
    } else if gap < MINOR_GAP_CEILING {
        "minor_gap"
    } else {
        "major_gap"
    };
    let emission = Emission::new(
        "failure.classified",
        signal.signal_id.clone(),
        json!({
            "attempt_id": signal.payload.attempt_id,
            "failure_class": failure_class,
            "gap": gap,
        }),
    )
    .with_id(format!("{}:failure", signal.signal_id))
    .with_timestamp(signal.timestamp);

    let next = LearningState {
        failures_emitted: state.failures_emitted + 1,
        latest_failure_class: failure_class.to_string(),
        ..state
    };
    Ok((next, vec![emission]))
}

fn calibration_stage(signal: &Signal<AttemptEvent>, state: LearningState) -> StepResult<LearningState, Value> {
    let proposal = match state.latest_failure_class.as_str() {
        "none" => "maintain",
        "major_gap" => "rebuild_foundation",
        _ => "increase_support",
    };
    let emission = Emission::new(
        "calibration.proposed",
        signal.signal_id.clone(),
        json!({
            "attempt_id": signal.payload.attempt_id,
            "proposal": proposal,
            "failure_class": state.latest_failure_class,
        }),
    )
    .with_id(format!("{}:calibration", signal.signal_id))
    .with_timestamp(signal.timestamp);

    let next = LearningState {
        calibrations_emitted: state.calibrations_emitted + 1,
        ..state
    };
    Ok((next, vec![emission]))
}

/// Deterministic attempt → outcome → failure → calibration pipeline.
pub fn learning_pipeline() -> Pipeline<AttemptEvent, LearningState, Value> {
    Pipeline::named("learning_attempt_outcome_failure_calibration")
        .then(attempt_stage)
        .then(outcome_stage)
        .then(failure_stage)
        .then(calibration_stage)
}

/// Stable-ID signal constructor for attempt events.
pub fn attempt_signal(
    signal_id: impl Into<String>,
    timestamp: DateTime<Utc>,
    source: impl Into<String>,
    event: AttemptEvent,
) -> Signal<AttemptEvent> {
    Signal::new(event)
        .with_id(signal_id)
        .with_timestamp(timestamp)
        .with_source(source)
}
