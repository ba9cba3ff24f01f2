//! Social intake flow: ingest → resolve → emit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use signalflow_core::{Emission, Signal};
use signalflow_engine::{Pipeline, StepResult};

/// Minimal social intake payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeEvent {
    pub platform: String,
    pub external_id: String,
    pub actor_ref: String,
    pub content_hash: String,
}

/// State carried across ingest → resolve → emit processing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestionState {
    pub ingested_count: u64,
    pub resolved_count: u64,
    pub last_entity_ref: String,
}

fn ingest_stage(signal: &Signal<IntakeEvent>, state: IngestionState) -> StepResult<IngestionState, Value> {
    let emission = Emission::new(
        "ingest.accepted",
        signal.signal_id.clone(),
        json!({
            "platform": signal.payload.platform,
            "external_id": signal.payload.external_id,
            "content_hash": signal.payload.content_hash,
        }),
    )
    .with_id(format!("{}:ingest", signal.signal_id))
    .with_timestamp(signal.timestamp);

    Ok((state, vec![emission]))
}

fn resolve_stage(signal: &Signal<IntakeEvent>, state: IngestionState) -> StepResult<IngestionState, Value> {
    let entity_ref = format!("{}:{}", signal.payload.platform, signal.payload.actor_ref);
    let emission = Emission::new(
        "resolve.completed",
        signal.signal_id.clone(),
        json!({
            "entity_ref": entity_ref,
            "external_id": signal.payload.external_id,
        }),
    )
    .with_id(format!("{}:resolve", signal.signal_id))
    .with_timestamp(signal.timestamp);

    let next = IngestionState {
        ingested_count: state.ingested_count + 1,
        resolved_count: state.resolved_count + 1,
        last_entity_ref: entity_ref,
    };
    Ok((next, vec![emission]))
}

fn emit_stage(signal: &Signal<IntakeEvent>, state: IngestionState) -> StepResult<IngestionState, Value> {
    let emission = Emission::new(
        "event.ready",
        signal.signal_id.clone(),
        json!({
            "entity_ref": state.last_entity_ref,
            "ordinal": state.resolved_count,
        }),
    )
    .with_id(format!("{}:emit", signal.signal_id))
    .with_timestamp(signal.timestamp);

    Ok((state, vec![emission]))
}

/// Deterministic ingest → resolve → emit pipeline.
pub fn ingestion_pipeline() -> Pipeline<IntakeEvent, IngestionState, Value> {
    Pipeline::named("intake_ingest_resolve_emit")
        .then(ingest_stage)
        .then(resolve_stage)
        .then(emit_stage)
}

/// Stable-ID signal constructor for intake events.
pub fn intake_signal(
    signal_id: impl Into<String>,
    timestamp: DateTime<Utc>,
    source: impl Into<String>,
    event: IntakeEvent,
) -> Signal<IntakeEvent> {
    Signal::new(event)
        .with_id(signal_id)
        .with_timestamp(timestamp)
        .with_source(source)
}
