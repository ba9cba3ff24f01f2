//! Injectable identifier and timestamp factories.
//!
//! The defaults use random UUIDs and the processing-time clock, which breaks
//! run-to-run reproducibility by design. Callers that need replay-safe
//! emissions inject deterministic factories instead.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Produces an emission id from `(signal_id, emission_type)`.
pub type IdFactory = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Produces an emission timestamp from the originating signal's timestamp.
pub type TimestampFactory = Arc<dyn Fn(&DateTime<Utc>) -> DateTime<Utc> + Send + Sync>;

/// The two injection points consumed by every emitting transform.
#[derive(Clone)]
pub struct EmissionFactories {
    pub emission_id: IdFactory,
    pub timestamp: TimestampFactory,
}

impl EmissionFactories {
    /// Fresh UUIDv4 ids and wall-clock timestamps. Not deterministic.
    pub fn random() -> Self {
        Self {
            emission_id: Arc::new(|_, _| Uuid::new_v4().to_string()),
            timestamp: Arc::new(|_| Utc::now()),
        }
    }

    /// Ids of the form `"{signal_id}:{label}"` and the signal's own
    /// timestamp. Re-processing a signal reproduces identical emissions,
    /// which is what idempotent downstream writers key on.
    pub fn deterministic(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            emission_id: Arc::new(move |signal_id, _| format!("{signal_id}:{label}")),
            timestamp: Arc::new(|signal_ts| *signal_ts),
        }
    }
}

impl Default for EmissionFactories {
    fn default() -> Self {
        Self::random()
    }
}

impl fmt::Debug for EmissionFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmissionFactories").finish_non_exhaustive()
    }
}
