//! Ordered, immutable composition of steps.

use std::sync::Arc;

use tracing::trace;

use signalflow_core::Signal;

use crate::step::{Step, StepResult};

/// An ordered sequence of steps with an optional label.
///
/// Composition operators return new pipelines; operands are never mutated.
/// Clones share the underlying steps, so pipelines are cheap to hand to
/// multiple engines, each of which still owns its state independently.
pub struct Pipeline<T, S, U> {
    steps: Vec<Arc<dyn Step<T, S, U>>>,
    name: Option<String>,
}

impl<T, S, U> Clone for Pipeline<T, S, U> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
            name: self.name.clone(),
        }
    }
}

impl<T, S, U> Default for Pipeline<T, S, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S, U> Pipeline<T, S, U> {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            name: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            name: Some(name.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// A new pipeline with `step` appended.
    pub fn then(&self, step: impl Step<T, S, U> + 'static) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Arc::new(step));
        Self {
            steps,
            name: self.name.clone(),
        }
    }

    /// A new pipeline running `self`'s steps then `other`'s. Keeps `self`'s
    /// label.
    pub fn concat(&self, other: &Self) -> Self {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        Self {
            steps,
            name: self.name.clone(),
        }
    }

    /// Thread state through the steps in declaration order, concatenating
    /// their emissions. Step i's output state is step i+1's input state.
    ///
    /// This is the single threading routine: the engine, `branch`, `merge`,
    /// and `sequence` all execute sub-pipelines through it.
    pub fn run(&self, signal: &Signal<T>, state: S) -> StepResult<S, U> {
        let mut state = state;
        let mut emissions = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            let (next, mut produced) = step.apply(signal, state)?;
            trace!(
                pipeline = self.name.as_deref().unwrap_or("anonymous"),
                step = index,
                emitted = produced.len(),
                "step applied"
            );
            state = next;
            emissions.append(&mut produced);
        }
        Ok((state, emissions))
    }
}
