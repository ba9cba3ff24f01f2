//! The immutable input event.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// An input event entering the engine.
///
/// `signal_id` is the traceability anchor: every emission produced while this
/// signal is processed carries it in `caused_by`. The id defaults to a fresh
/// random UUID; callers that need stable identity across retries must supply
/// it themselves via [`Signal::with_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal<T> {
    pub signal_id: String,
    pub payload: T,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl<T> Signal<T> {
    /// Wrap a payload with a random id, the current time, and an empty source.
    pub fn new(payload: T) -> Self {
        Self {
            signal_id: Uuid::new_v4().to_string(),
            payload,
            timestamp: Utc::now(),
            source: String::new(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_id(mut self, signal_id: impl Into<String>) -> Self {
        self.signal_id = signal_id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

impl<T: Serialize> Signal<T> {
    /// Canonical record form for transport and persistence. Lossless for all
    /// declared fields.
    pub fn to_value(&self) -> Result<serde_json::Value, EngineError> {
        serde_json::to_value(self).map_err(|e| EngineError::ShapeMismatch {
            context: "signal".into(),
            detail: e.to_string(),
        })
    }
}

impl<T: DeserializeOwned> Signal<T> {
    /// Rebuild a signal from its canonical record form.
    pub fn from_value(value: serde_json::Value) -> Result<Self, EngineError> {
        serde_json::from_value(value).map_err(|e| EngineError::ShapeMismatch {
            context: "signal".into(),
            detail: e.to_string(),
        })
    }
}
