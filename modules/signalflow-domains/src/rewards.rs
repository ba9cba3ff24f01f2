//! Cycle reward allocation: attention → pool → member shares.
//!
//! Built from the engine's `update_state` + `emit_with` combinators rather
//! than hand-written stages: each allocation step first folds its result
//! into state, then a deterministic emit reads it back out. All shares and
//! allocations round to 6 decimals; groups and members resolve in sorted-id
//! order so reruns are byte-stable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use signalflow_core::{EmissionFactories, Signal};
use signalflow_engine::{emit_with, update_state, Pipeline};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPosition {
    pub member_id: String,
    pub raw_weight: f64,
    #[serde(default)]
    pub tenure_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRewardInput {
    pub group_id: String,
    pub attention_weight: f64,
    pub members: Vec<MemberPosition>,
}

/// Cycle-level reward input payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardCycleEvent {
    pub cycle_id: String,
    pub total_pool: f64,
    pub groups: Vec<GroupRewardInput>,
}

/// Configurable controls for reward experiments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub enable_tenure_multiplier: bool,
    pub tenure_multiplier: f64,
    pub tenure_days_threshold: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            enable_tenure_multiplier: false,
            tenure_multiplier: 1.25,
            tenure_days_threshold: 30,
        }
    }
}

/// State threaded through the attention → pool → member stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardState {
    pub cycles_processed: u64,
    pub latest_cycle_id: String,
    pub latest_attention_share: BTreeMap<String, f64>,
    pub latest_group_pool: BTreeMap<String, f64>,
    pub latest_member_rewards: BTreeMap<String, BTreeMap<String, f64>>,
    pub total_distributed: f64,
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Attention share per group: `group_attention / sum(group_attention)`,
/// negative weights clamped to zero, equal shares when total attention is 0.
fn attention_shares(event: &RewardCycleEvent) -> (BTreeMap<String, f64>, f64) {
    let total_attention: f64 = event
        .groups
        .iter()
        .map(|g| g.attention_weight.max(0.0))
        .sum();

    let mut shares = BTreeMap::new();
    if event.groups.is_empty() {
        return (shares, 0.0);
    }

    if total_attention > 0.0 {
        for group in &event.groups {
            shares.insert(
                group.group_id.clone(),
                round6(group.attention_weight.max(0.0) / total_attention),
            );
        }
    } else {
        let equal_share = round6(1.0 / event.groups.len() as f64);
        for group in &event.groups {
            shares.insert(group.group_id.clone(), equal_share);
        }
    }
    (shares, round6(total_attention))
}

/// Per-member allocation: `group_pool * (effective_weight / sum(effective))`,
/// where the tenure multiplier applies once a member clears the configured
/// threshold. Zero total effective weight allocates zero to everyone.
fn member_rewards(
    config: &RewardConfig,
    event: &RewardCycleEvent,
    pools: &BTreeMap<String, f64>,
) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut by_group = BTreeMap::new();
    for group in &event.groups {
        let group_pool = pools.get(&group.group_id).copied().unwrap_or(0.0);

        let mut effective: Vec<(String, f64)> = group
            .members
            .iter()
            .map(|member| {
                let multiplier = if config.enable_tenure_multiplier
                    && member.tenure_days >= config.tenure_days_threshold
                {
                    config.tenure_multiplier
                } else {
                    1.0
                };
                (member.member_id.clone(), member.raw_weight.max(0.0) * multiplier)
            })
            .collect();
        effective.sort_by(|a, b| a.0.cmp(&b.0));

        let total_effective: f64 = effective.iter().map(|(_, weight)| weight).sum();
        let allocations: BTreeMap<String, f64> = if total_effective <= 0.0 {
            effective.into_iter().map(|(id, _)| (id, 0.0)).collect()
        } else {
            effective
                .into_iter()
                .map(|(id, weight)| (id, round6(group_pool * (weight / total_effective))))
                .collect()
        };
        by_group.insert(group.group_id.clone(), allocations);
    }
    by_group
}

fn distributed_total(rewards: &BTreeMap<String, BTreeMap<String, f64>>) -> f64 {
    let sum: f64 = rewards.values().flat_map(|members| members.values()).sum();
    round6(sum)
}

/// Deterministic attention → pool → member allocation pipeline.
pub fn reward_pipeline(config: RewardConfig) -> Pipeline<RewardCycleEvent, RewardState, Value> {
    debug!(
        tenure_multiplier_enabled = config.enable_tenure_multiplier,
        "building reward pipeline"
    );
    let member_config = config.clone();

    Pipeline::named("rewards_attention_pool_member")
        .then(update_state(|event: &RewardCycleEvent, state: &RewardState| {
            let (shares, _) = attention_shares(event);
            RewardState {
                latest_cycle_id: event.cycle_id.clone(),
                latest_attention_share: shares,
                ..state.clone()
            }
        }))
        .then(emit_with(
            "rewards.attention.computed",
            |event: &RewardCycleEvent, state: &RewardState| {
                let (_, total_attention) = attention_shares(event);
                json!({
                    "cycle_id": event.cycle_id,
                    "attention_share_by_group": state.latest_attention_share,
                    "total_attention": total_attention,
                })
            },
            EmissionFactories::deterministic("attention"),
        ))
        .then(update_state(|event: &RewardCycleEvent, state: &RewardState| {
            let pools = state
                .latest_attention_share
                .iter()
                .map(|(group_id, share)| (group_id.clone(), round6(event.total_pool * share)))
                .collect();
            RewardState {
                latest_group_pool: pools,
                ..state.clone()
            }
        }))
        .then(emit_with(
            "rewards.pool.allocated",
            |event: &RewardCycleEvent, state: &RewardState| {
                json!({
                    "cycle_id": event.cycle_id,
                    "total_pool": round6(event.total_pool),
                    "reward_pool_by_group": state.latest_group_pool,
                })
            },
            EmissionFactories::deterministic("pool"),
        ))
        .then(update_state(move |event: &RewardCycleEvent, state: &RewardState| {
            let rewards = member_rewards(&member_config, event, &state.latest_group_pool);
            let distributed = distributed_total(&rewards);
            RewardState {
                cycles_processed: state.cycles_processed + 1,
                latest_member_rewards: rewards,
                total_distributed: state.total_distributed + distributed,
                ..state.clone()
            }
        }))
        .then(emit_with(
            "rewards.member.allocated",
            move |event: &RewardCycleEvent, state: &RewardState| {
                json!({
                    "cycle_id": event.cycle_id,
                    "member_reward_by_group": state.latest_member_rewards,
                    "total_distributed": distributed_total(&state.latest_member_rewards),
                    "config": {
                        "enable_tenure_multiplier": config.enable_tenure_multiplier,
                        "tenure_multiplier": config.tenure_multiplier,
                        "tenure_days_threshold": config.tenure_days_threshold,
                    },
                })
            },
            EmissionFactories::deterministic("member"),
        ))
}

/// Stable-ID signal constructor for reward cycles.
pub fn reward_signal(
    signal_id: impl Into<String>,
    timestamp: DateTime<Utc>,
    source: impl Into<String>,
    event: RewardCycleEvent,
) -> Signal<RewardCycleEvent> {
    Signal::new(event)
        .with_id(signal_id)
        .with_timestamp(timestamp)
        .with_source(source)
}
