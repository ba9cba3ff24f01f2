//! Profile routing flow: profile → score → route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use signalflow_core::{Emission, Signal};
use signalflow_engine::{Pipeline, StepResult};

/// Profiles scoring at or above this blend route to priority review.
pub const PRIORITY_ROUTE_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEvent {
    pub profile_id: String,
    pub profile_tier: String,
    pub quality_score: f64,
    pub intent_score: f64,
    pub channel: String,
}

/// State shared across profile/score/route stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingState {
    pub profiled_count: u64,
    pub scored_count: u64,
    pub routed_count: u64,
    pub last_route: String,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn profile_stage(signal: &Signal<ProfileEvent>, state: RoutingState) -> StepResult<RoutingState, Value> {
    let emission = Emission::new(
        "profile.enriched",
        signal.signal_id.clone(),
        json!({
            "profile_id": signal.payload.profile_id,
            "profile_tier": signal.payload.profile_tier,
            "channel": signal.payload.channel,
        }),
    )
    .with_id(format!("{}:profile", signal.signal_id))
    .with_timestamp(signal.timestamp);

    Ok((state, vec![emission]))
}

fn score_stage(signal: &Signal<ProfileEvent>, state: RoutingState) -> StepResult<RoutingState, Value> {
    let score = round4(signal.payload.quality_score * 0.6 + signal.payload.intent_score * 0.4);
    let route = if score >= PRIORITY_ROUTE_THRESHOLD {
        "priority_review"
    } else {
        "standard_queue"
    };
    let emission = Emission::new(
        "scores.computed",
        signal.signal_id.clone(),
        json!({
            "profile_id": signal.payload.profile_id,
            "score": score,
            "route_hint": route,
        }),
    )
    .with_id(format!("{}:score", signal.signal_id))
    .with_timestamp(signal.timestamp);

    let next = RoutingState {
        profiled_count: state.profiled_count + 1,
        scored_count: state.scored_count + 1,
        routed_count: state.routed_count,
        last_route: route.to_string(),
    };
    Ok((next, vec![emission]))
}

fn route_stage(signal: &Signal<ProfileEvent>, state: RoutingState) -> StepResult<RoutingState, Value> {
    let emission = Emission::new(
        "route.selected",
        signal.signal_id.clone(),
        json!({
            "profile_id": signal.payload.profile_id,
            "route": state.last_route,
        }),
    )
    .with_id(format!("{}:route", signal.signal_id))
    .with_timestamp(signal.timestamp);

    let next = RoutingState {
        routed_count: state.routed_count + 1,
        ..state
    };
    Ok((next, vec![emission]))
}

/// Deterministic profile → score → route pipeline.
pub fn routing_pipeline() -> Pipeline<ProfileEvent, RoutingState, Value> {
    Pipeline::named("routing_profile_score_route")
        .then(profile_stage)
        .then(score_stage)
        .then(route_stage)
}

/// Stable-ID signal constructor for profile events.
pub fn profile_signal(
    signal_id: impl Into<String>,
    timestamp: DateTime<Utc>,
    source: impl Into<String>,
    event: ProfileEvent,
) -> Signal<ProfileEvent> {
    Signal::new(event)
        .with_id(signal_id)
        .with_timestamp(timestamp)
        .with_source(source)
}
