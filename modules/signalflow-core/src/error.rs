use thiserror::Error;

/// Errors surfaced synchronously from `Engine::process`.
///
/// The engine performs no retries and no partial commits: a failing step
/// leaves the retained state exactly as it was before the signal arrived.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A payload or state could not be decoded into the shape a step
    /// requires. Signaled immediately, never coerced.
    #[error("shape mismatch in {context}: {detail}")]
    ShapeMismatch { context: String, detail: String },

    /// A caller-supplied function (reducer, predicate, extractor) failed
    /// during evaluation. Propagated unchanged.
    #[error("step `{step}` failed: {detail}")]
    Step { step: String, detail: String },

    /// A merge combiner refused to reconcile divergent branch states. The
    /// engine does not arbitrate.
    #[error("merge combiner failed: {detail}")]
    Combiner { detail: String },
}

impl EngineError {
    pub fn step(step: impl Into<String>, detail: impl Into<String>) -> Self {
        EngineError::Step {
            step: step.into(),
            detail: detail.into(),
        }
    }

    pub fn combiner(detail: impl Into<String>) -> Self {
        EngineError::Combiner {
            detail: detail.into(),
        }
    }
}
