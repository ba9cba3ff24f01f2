//! The orchestrator binding one pipeline to one live state.

use tracing::{debug, trace};

use signalflow_core::{Emission, EngineError, Signal, State};

use crate::pipeline::Pipeline;

/// Runs a pipeline over signals, one at a time, retaining state across calls.
///
/// Processing is atomic per signal: the current state value is cloned,
/// threaded through every step, and committed only if the whole pipeline
/// succeeds. A failing step leaves the retained state untouched and the
/// error surfaces to the caller; retries and dead-lettering belong to an
/// external orchestration layer re-invoking [`Engine::process`] with the
/// same signal id.
///
/// Determinism: for a fixed pipeline, fixed initial state, and a fixed
/// signal order, repeated runs produce identical emission sequences,
/// provided the id/timestamp factories in use are deterministic. The random
/// defaults break this on purpose; see `EmissionFactories::deterministic`.
pub struct Engine<T, S, U> {
    pipeline: Pipeline<T, S, U>,
    state: State<S>,
}

impl<T, S: Clone, U> Engine<T, S, U> {
    pub fn new(pipeline: Pipeline<T, S, U>, initial: S) -> Self {
        Self {
            pipeline,
            state: State::new(initial),
        }
    }

    /// Bind a pre-built state, e.g. one with history tracking enabled.
    pub fn with_state(pipeline: Pipeline<T, S, U>, state: State<S>) -> Self {
        Self { pipeline, state }
    }

    /// Run the pipeline over one signal and return its emissions in order.
    pub fn process(&mut self, signal: &Signal<T>) -> Result<Vec<Emission<U>>, EngineError> {
        debug!(
            signal_id = %signal.signal_id,
            source = %signal.source,
            pipeline = self.pipeline.name().unwrap_or("anonymous"),
            "processing signal"
        );

        let working = self.state.value().clone();
        let (next, emissions) = self.pipeline.run(signal, working)?;
        self.state.replace(next);

        trace!(
            signal_id = %signal.signal_id,
            version = self.state.version(),
            emitted = emissions.len(),
            "state committed"
        );
        Ok(emissions)
    }

    /// Process signals in order, concatenating their emissions. Stops at the
    /// first failure; signals already committed stay committed.
    pub fn process_batch<I>(&mut self, signals: I) -> Result<Vec<Emission<U>>, EngineError>
    where
        I: IntoIterator<Item = Signal<T>>,
    {
        let mut emissions = Vec::new();
        for signal in signals {
            emissions.extend(self.process(&signal)?);
        }
        Ok(emissions)
    }

    /// Read-only snapshot of the retained state.
    pub fn state(&self) -> &State<S> {
        &self.state
    }

    pub fn pipeline(&self) -> &Pipeline<T, S, U> {
        &self.pipeline
    }
}
