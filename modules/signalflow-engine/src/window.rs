//! Windowing: buffer signals in state, emit one summary on closure.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use signalflow_core::{EmissionFactories, Signal};

use crate::step::{Step, StepResult};
use crate::transforms::build_emission;

/// The buffer a window step keeps inside the pipeline's state, reached
/// through the caller's read/write lens.
///
/// `opened_at` is the timestamp of the first buffered signal; span windows
/// measure against it, never against the wall clock, so replaying the same
/// signals closes the same windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowBuffer<B> {
    pub items: Vec<B>,
    pub opened_at: Option<DateTime<Utc>>,
}

impl<B> WindowBuffer<B> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            opened_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<B> Default for WindowBuffer<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// When a window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClose {
    /// After this many buffered signals.
    Count(usize),
    /// Once the current signal's timestamp is this far past the first
    /// buffered signal's.
    Span(Duration),
}

/// Buffer `capture(signal)` values in state until the closing condition is
/// met, then emit exactly one summary emission and reset the buffer.
///
/// The closing signal's value is buffered before the condition is checked,
/// so it is part of the batch it closes. Calls that do not close the window
/// only update the buffer and emit nothing. A window that never closes
/// emits nothing for the remainder; there is no flush operation at this
/// layer.
pub fn window<T, S, U, B>(
    close: WindowClose,
    read: impl Fn(&S) -> WindowBuffer<B> + Send + Sync,
    write: impl Fn(S, WindowBuffer<B>) -> S + Send + Sync,
    capture: impl Fn(&Signal<T>) -> B + Send + Sync,
    summarize: impl Fn(&[B]) -> U + Send + Sync,
    emission_type: impl Into<String>,
) -> impl Step<T, S, U> {
    window_with(
        close,
        read,
        write,
        capture,
        summarize,
        emission_type,
        EmissionFactories::default(),
    )
}

pub fn window_with<T, S, U, B>(
    close: WindowClose,
    read: impl Fn(&S) -> WindowBuffer<B> + Send + Sync,
    write: impl Fn(S, WindowBuffer<B>) -> S + Send + Sync,
    capture: impl Fn(&Signal<T>) -> B + Send + Sync,
    summarize: impl Fn(&[B]) -> U + Send + Sync,
    emission_type: impl Into<String>,
    factories: EmissionFactories,
) -> impl Step<T, S, U> {
    let emission_type = emission_type.into();
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> {
        let mut buffer = read(&state);
        if buffer.opened_at.is_none() {
            buffer.opened_at = Some(signal.timestamp);
        }
        buffer.items.push(capture(signal));

        let closes = match close {
            WindowClose::Count(n) => buffer.items.len() >= n,
            WindowClose::Span(span) => buffer
                .opened_at
                .is_some_and(|opened| signal.timestamp - opened >= span),
        };

        if closes {
            let payload = summarize(&buffer.items);
            let emission = build_emission(&emission_type, signal, payload, &factories);
            Ok((write(state, WindowBuffer::new()), vec![emission]))
        } else {
            Ok((write(state, buffer), Vec::new()))
        }
    }
}
