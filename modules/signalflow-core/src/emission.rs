//! The immutable output event.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// An output event produced while processing exactly one signal.
///
/// `caused_by` always equals the `signal_id` of the originating signal. The
/// built-in emitting transforms enforce this; code constructing emissions by
/// hand is expected to honor the same contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emission<U> {
    pub emission_id: String,
    pub payload: U,
    pub emission_type: String,
    pub caused_by: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl<U> Emission<U> {
    /// Build an emission with a random id and the current time. Deterministic
    /// callers override both via [`Emission::with_id`] and
    /// [`Emission::with_timestamp`].
    pub fn new(
        emission_type: impl Into<String>,
        caused_by: impl Into<String>,
        payload: U,
    ) -> Self {
        Self {
            emission_id: Uuid::new_v4().to_string(),
            payload,
            emission_type: emission_type.into(),
            caused_by: caused_by.into(),
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_id(mut self, emission_id: impl Into<String>) -> Self {
        self.emission_id = emission_id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

impl<U: Serialize> Emission<U> {
    /// Canonical record form for transport and persistence. Lossless for all
    /// declared fields.
    pub fn to_value(&self) -> Result<serde_json::Value, EngineError> {
        serde_json::to_value(self).map_err(|e| EngineError::ShapeMismatch {
            context: "emission".into(),
            detail: e.to_string(),
        })
    }
}

impl<U: DeserializeOwned> Emission<U> {
    /// Rebuild an emission from its canonical record form.
    pub fn from_value(value: serde_json::Value) -> Result<Self, EngineError> {
        serde_json::from_value(value).map_err(|e| EngineError::ShapeMismatch {
            context: "emission".into(),
            detail: e.to_string(),
        })
    }
}
