//! Shortlist flow: rank candidates, then draft for the top pick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use signalflow_core::{Emission, EngineError, Signal};
use signalflow_engine::{Pipeline, StepResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: String,
    pub title: String,
    pub score: f64,
    #[serde(default)]
    pub context_boost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEvent {
    pub audience_id: String,
    pub prompt: String,
    pub candidates: Vec<Candidate>,
}

/// State used across ranking and draft shaping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationState {
    pub ranked_count: u64,
    pub drafted_count: u64,
    pub latest_top_candidate_id: String,
    pub latest_ranked_ids: Vec<String>,
}

fn round3(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}

fn rank_stage(
    signal: &Signal<RecommendationEvent>,
    state: RecommendationState,
) -> StepResult<RecommendationState, Value> {
    // Bucket the blended score so near-equal values sort deterministically
    // by candidate_id.
    let mut ranked: Vec<&Candidate> = signal.payload.candidates.iter().collect();
    ranked.sort_by(|a, b| {
        round3(b.score + b.context_boost)
            .total_cmp(&round3(a.score + a.context_boost))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });

    let top = ranked.first().ok_or_else(|| {
        EngineError::step("recommendation.rank", "no candidates in payload")
    })?;
    let ranked_ids: Vec<String> = ranked.iter().map(|c| c.candidate_id.clone()).collect();

    let emission = Emission::new(
        "recommendation.ranked",
        signal.signal_id.clone(),
        json!({
            "audience_id": signal.payload.audience_id,
            "ranked_ids": ranked_ids,
            "top_candidate_id": top.candidate_id,
        }),
    )
    .with_id(format!("{}:recommendation", signal.signal_id))
    .with_timestamp(signal.timestamp);

    let next = RecommendationState {
        ranked_count: state.ranked_count + 1,
        drafted_count: state.drafted_count,
        latest_top_candidate_id: top.candidate_id.clone(),
        latest_ranked_ids: ranked_ids,
    };
    Ok((next, vec![emission]))
}

fn draft_stage(
    signal: &Signal<RecommendationEvent>,
    state: RecommendationState,
) -> StepResult<RecommendationState, Value> {
    if state.latest_top_candidate_id.is_empty() {
        return Ok((state, Vec::new()));
    }

    let top = signal
        .payload
        .candidates
        .iter()
        .find(|c| c.candidate_id == state.latest_top_candidate_id)
        .ok_or_else(|| {
            EngineError::step("recommendation.draft", "top candidate missing from payload")
        })?;

    let emission = Emission::new(
        "draft.generated",
        signal.signal_id.clone(),
        json!({
            "audience_id": signal.payload.audience_id,
            "recommended_candidate_id": top.candidate_id,
            "draft_text": format!("{}: {}", signal.payload.prompt, top.title),
        }),
    )
    .with_id(format!("{}:draft", signal.signal_id))
    .with_timestamp(signal.timestamp);

    let next = RecommendationState {
        drafted_count: state.drafted_count + 1,
        ..state
    };
    Ok((next, vec![emission]))
}

/// Deterministic rank → draft pipeline.
pub fn recommendation_pipeline() -> Pipeline<RecommendationEvent, RecommendationState, Value> {
    Pipeline::named("recommendation_rank_and_draft")
        .then(rank_stage)
        .then(draft_stage)
}

/// Stable-ID signal constructor for recommendation events.
pub fn recommendation_signal(
    signal_id: impl Into<String>,
    timestamp: DateTime<Utc>,
    source: impl Into<String>,
    event: RecommendationEvent,
) -> Signal<RecommendationEvent> {
    Signal::new(event)
        .with_id(signal_id)
        .with_timestamp(timestamp)
        .with_source(source)
}
