//! Deterministic signal-processing engine.
//!
//! Signals flow through an ordered pipeline of pure steps, each reading the
//! incoming signal and the current state and producing the next state plus
//! zero or more traceable emissions. The engine threads state from step to
//! step, commits it once per signal, and returns the emissions in step order.
//!
//! Consumers define their domain as typed payloads plus step functions; the
//! transform library covers the recurring shapes (accumulate, update_state,
//! the emit family, branch/merge, windowing, sequence).

pub mod control;
pub mod engine;
pub mod pipeline;
pub mod step;
pub mod transforms;
pub mod window;

pub use control::{branch, merge, sequence};
pub use engine::Engine;
pub use pipeline::Pipeline;
pub use step::{Step, StepResult};
pub use transforms::{
    accumulate, emit, emit_if, emit_if_with, emit_on_change, emit_on_change_by,
    emit_on_change_with, emit_with, update_state, update_state_when,
};
pub use window::{window, window_with, WindowBuffer, WindowClose};
