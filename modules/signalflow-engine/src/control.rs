//! Control-flow steps: branch, merge, sequence.
//!
//! All three are ordinary steps composed from pipelines — the engine never
//! special-cases them. State threads explicitly into and out of each
//! sub-pipeline; divergence is resolved only by a caller-supplied combiner.

use signalflow_core::{EngineError, Signal};

use crate::pipeline::Pipeline;
use crate::step::{Step, StepResult};

/// Delegate the entire remaining processing of a signal to one of two
/// sub-pipelines, chosen by `predicate(signal, state)`. Threading inside the
/// chosen arm is identical to the engine's own.
pub fn branch<T, S, U>(
    predicate: impl Fn(&Signal<T>, &S) -> bool + Send + Sync,
    if_true: Pipeline<T, S, U>,
    if_false: Pipeline<T, S, U>,
) -> impl Step<T, S, U> {
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> {
        if predicate(signal, &state) {
            if_true.run(signal, state)
        } else {
            if_false.run(signal, state)
        }
    }
}

/// Run two sub-pipelines against the same signal and the same input state
/// (not chained) and reconcile their output states through `combine`.
///
/// Emissions concatenate left-then-right; that ordering is a fixed
/// tie-break, not an accident of evaluation. When the two arms produce
/// incompatible replacements the combiner is the sole authority; its error
/// propagates unchanged.
pub fn merge<T, S, U>(
    left: Pipeline<T, S, U>,
    right: Pipeline<T, S, U>,
    combine: impl Fn(S, S) -> Result<S, EngineError> + Send + Sync,
) -> impl Step<T, S, U>
where
    S: Clone,
{
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> {
        let (left_state, mut emissions) = left.run(signal, state.clone())?;
        let (right_state, mut right_emissions) = right.run(signal, state)?;
        let combined = combine(left_state, right_state)?;
        emissions.append(&mut right_emissions);
        Ok((combined, emissions))
    }
}

/// Wrap a pipeline as a single step: a named, reusable sub-pipeline unit
/// with the engine's threading semantics and nothing more.
pub fn sequence<T, S, U>(pipeline: Pipeline<T, S, U>) -> impl Step<T, S, U> {
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> { pipeline.run(signal, state) }
}
