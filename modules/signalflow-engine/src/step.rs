//! The step execution contract.

use signalflow_core::{Emission, EngineError, Signal};

/// What a step hands back: the next state and the emissions it appended.
pub type StepResult<S, U> = Result<(S, Vec<Emission<U>>), EngineError>;

/// A pure function from `(signal, state)` to `(next state, emissions)`.
///
/// Steps never perform I/O, never retain mutable closures across calls, and
/// surface data-shape problems as typed errors rather than panics. Composite
/// steps (branch, merge, sequence) are ordinary implementations of this
/// trait; the engine has no special cases.
pub trait Step<T, S, U>: Send + Sync {
    fn apply(&self, signal: &Signal<T>, state: S) -> StepResult<S, U>;
}

/// Free functions and closures with the step signature are steps directly.
impl<T, S, U, F> Step<T, S, U> for F
where
    F: Fn(&Signal<T>, S) -> StepResult<S, U> + Send + Sync,
{
    fn apply(&self, signal: &Signal<T>, state: S) -> StepResult<S, U> {
        self(signal, state)
    }
}
