//! Versioned accumulator threaded through a pipeline's steps.

use serde::{Deserialize, Serialize};

/// State owned by exactly one engine instance.
///
/// Mutation is whole-value replacement: [`State::replace`] supersedes the
/// current value, bumps `version` by exactly 1, and (when history tracking
/// is enabled) appends the prior value. Steps never mutate state in place;
/// they return the next value and the engine commits it once per signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State<S> {
    value: S,
    version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    history: Option<Vec<S>>,
}

impl<S> State<S> {
    /// Version 0, no history retention.
    pub fn new(value: S) -> Self {
        Self {
            value,
            version: 0,
            history: None,
        }
    }

    /// Version 0, retaining every superseded value in order.
    pub fn with_history(value: S) -> Self {
        Self {
            value,
            version: 0,
            history: Some(Vec::new()),
        }
    }

    pub fn value(&self) -> &S {
        &self.value
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Past values, oldest first. `None` unless history tracking is enabled.
    pub fn history(&self) -> Option<&[S]> {
        self.history.as_deref()
    }

    /// Replace the current value. The only mutation this type supports.
    pub fn replace(&mut self, next: S) {
        let prior = std::mem::replace(&mut self.value, next);
        if let Some(history) = &mut self.history {
            history.push(prior);
        }
        self.version += 1;
    }

    pub fn into_value(self) -> S {
        self.value
    }
}
