//! Cross-flow contract tests: trace linkage, id conventions, rerun stability.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use signalflow_domains::ingestion::{ingestion_pipeline, intake_signal, IngestionState, IntakeEvent};
use signalflow_domains::learning::{attempt_signal, learning_pipeline, AttemptEvent, LearningState};
use signalflow_domains::recommendation::{
    recommendation_pipeline, recommendation_signal, Candidate, RecommendationEvent,
    RecommendationState,
};
use signalflow_domains::rewards::{
    reward_pipeline, reward_signal, GroupRewardInput, MemberPosition, RewardConfig,
    RewardCycleEvent, RewardState,
};
use signalflow_domains::routing::{profile_signal, routing_pipeline, ProfileEvent, RoutingState};
use signalflow_engine::Engine;

/// Expected emission id suffixes per flow, in stage order.
const INTAKE_SUFFIXES: [&str; 3] = ["ingest", "resolve", "emit"];
const ROUTING_SUFFIXES: [&str; 3] = ["profile", "score", "route"];
const SHORTLIST_SUFFIXES: [&str; 2] = ["recommendation", "draft"];
const LEARNING_SUFFIXES: [&str; 4] = ["attempt", "outcome", "failure", "calibration"];
const REWARD_SUFFIXES: [&str; 3] = ["attention", "pool", "member"];

fn expected_ids(signal_id: &str, suffixes: &[&str]) -> Vec<String> {
    suffixes.iter().map(|s| format!("{signal_id}:{s}")).collect()
}

#[test]
fn every_flow_links_emissions_back_to_the_signal() -> Result<()> {
    let ts = Utc.with_ymd_and_hms(2026, 2, 7, 9, 0, 0).unwrap();

    let mut intake = Engine::new(ingestion_pipeline(), IngestionState::default());
    let intake_out = intake.process(&intake_signal(
        "sig_a",
        ts,
        "contract",
        IntakeEvent {
            platform: "x".into(),
            external_id: "post".into(),
            actor_ref: "actor".into(),
            content_hash: "hash".into(),
        },
    ))?;
    assert_eq!(
        intake_out.iter().map(|e| e.emission_id.clone()).collect::<Vec<_>>(),
        expected_ids("sig_a", &INTAKE_SUFFIXES)
    );

    let mut routing = Engine::new(routing_pipeline(), RoutingState::default());
    let routing_out = routing.process(&profile_signal(
        "sig_b",
        ts,
        "contract",
        ProfileEvent {
            profile_id: "p".into(),
            profile_tier: "standard".into(),
            quality_score: 0.5,
            intent_score: 0.5,
            channel: "webform".into(),
        },
    ))?;
    assert_eq!(
        routing_out.iter().map(|e| e.emission_id.clone()).collect::<Vec<_>>(),
        expected_ids("sig_b", &ROUTING_SUFFIXES)
    );

    let mut shortlist = Engine::new(recommendation_pipeline(), RecommendationState::default());
    let shortlist_out = shortlist.process(&recommendation_signal(
        "sig_c",
        ts,
        "contract",
        RecommendationEvent {
            audience_id: "aud".into(),
            prompt: "Pick".into(),
            candidates: vec![Candidate {
                candidate_id: "c1".into(),
                title: "Only".into(),
                score: 1.0,
                context_boost: 0.0,
            }],
        },
    ))?;
    assert_eq!(
        shortlist_out.iter().map(|e| e.emission_id.clone()).collect::<Vec<_>>(),
        expected_ids("sig_c", &SHORTLIST_SUFFIXES)
    );

    let mut learning = Engine::new(learning_pipeline(), LearningState::default());
    let learning_out = learning.process(&attempt_signal(
        "sig_d",
        ts,
        "contract",
        AttemptEvent {
            learner_id: "l".into(),
            skill_id: "s".into(),
            attempt_id: "a".into(),
            expected_score: 0.5,
            observed_score: 0.6,
        },
    ))?;
    assert_eq!(
        learning_out.iter().map(|e| e.emission_id.clone()).collect::<Vec<_>>(),
        expected_ids("sig_d", &LEARNING_SUFFIXES)
    );

    let mut rewards = Engine::new(reward_pipeline(RewardConfig::default()), RewardState::default());
    let rewards_out = rewards.process(&reward_signal(
        "sig_e",
        ts,
        "contract",
        RewardCycleEvent {
            cycle_id: "cycle".into(),
            total_pool: 10.0,
            groups: vec![GroupRewardInput {
                group_id: "g".into(),
                attention_weight: 1.0,
                members: vec![MemberPosition {
                    member_id: "m".into(),
                    raw_weight: 1.0,
                    tenure_days: 0,
                }],
            }],
        },
    ))?;
    assert_eq!(
        rewards_out.iter().map(|e| e.emission_id.clone()).collect::<Vec<_>>(),
        expected_ids("sig_e", &REWARD_SUFFIXES)
    );

    for emission in intake_out
        .iter()
        .chain(&routing_out)
        .chain(&shortlist_out)
        .chain(&learning_out)
        .chain(&rewards_out)
    {
        let (signal_id, _) = emission
            .emission_id
            .split_once(':')
            .expect("flow emission ids are {signal_id}:{stage}");
        assert_eq!(emission.caused_by, signal_id);
    }
    Ok(())
}

#[test]
fn emission_timestamps_reuse_the_signal_timestamp() -> Result<()> {
    let ts = Utc.with_ymd_and_hms(2026, 2, 7, 9, 30, 0).unwrap();
    let mut engine = Engine::new(ingestion_pipeline(), IngestionState::default());

    let emissions = engine.process(&intake_signal(
        "sig_ts",
        ts,
        "contract",
        IntakeEvent {
            platform: "x".into(),
            external_id: "post".into(),
            actor_ref: "actor".into(),
            content_hash: "hash".into(),
        },
    ))?;

    assert!(emissions.iter().all(|e| e.timestamp == ts));
    Ok(())
}

#[test]
fn reruns_on_fresh_engines_are_byte_identical() -> Result<()> {
    let ts = Utc.with_ymd_and_hms(2026, 2, 7, 10, 0, 0).unwrap();
    let signals = [
        attempt_signal(
            "sig_1",
            ts,
            "contract",
            AttemptEvent {
                learner_id: "l".into(),
                skill_id: "s".into(),
                attempt_id: "a1".into(),
                expected_score: 0.9,
                observed_score: 0.4,
            },
        ),
        attempt_signal(
            "sig_2",
            ts + chrono::Duration::seconds(1),
            "contract",
            AttemptEvent {
                learner_id: "l".into(),
                skill_id: "s".into(),
                attempt_id: "a2".into(),
                expected_score: 0.9,
                observed_score: 0.95,
            },
        ),
    ];

    let mut first = Engine::new(learning_pipeline(), LearningState::default());
    let mut second = Engine::new(learning_pipeline(), LearningState::default());

    let first_out = first.process_batch(signals.clone())?;
    let second_out = second.process_batch(signals)?;

    assert_eq!(first_out, second_out);
    assert_eq!(first.state().value(), second.state().value());
    Ok(())
}
