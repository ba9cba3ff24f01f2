//! Window closure: count-based, span-based, and the change-detection tie-break.

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use signalflow_core::{EmissionFactories, Signal};
use signalflow_engine::{emit_on_change_with, window_with, Engine, Pipeline, WindowBuffer, WindowClose};

// ---------------------------------------------------------------------------
// Test state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
struct TickState {
    window: WindowBuffer<f64>,
}

fn tick(id: &str, value: f64, offset_secs: i64) -> Signal<f64> {
    Signal::new(value)
        .with_id(id)
        .with_timestamp(Utc.with_ymd_and_hms(2026, 2, 6, 14, 0, 0).unwrap() + Duration::seconds(offset_secs))
        .with_source("ticks")
}

fn windowed_pipeline(close: WindowClose) -> Pipeline<f64, TickState, Value> {
    Pipeline::named("tick_window").then(window_with(
        close,
        |state: &TickState| state.window.clone(),
        |_state: TickState, window| TickState { window },
        |signal: &Signal<f64>| signal.payload,
        |items: &[f64]| {
            json!({
                "count": items.len(),
                "sum": items.iter().sum::<f64>(),
            })
        },
        "window.closed",
        EmissionFactories::deterministic("window"),
    ))
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn count_window_of_three_emits_exactly_once_on_the_third() {
    let mut engine = Engine::new(windowed_pipeline(WindowClose::Count(3)), TickState::default());

    assert!(engine.process(&tick("sig_1", 1.0, 0)).unwrap().is_empty());
    assert!(engine.process(&tick("sig_2", 2.0, 1)).unwrap().is_empty());

    let closing = engine.process(&tick("sig_3", 3.0, 2)).unwrap();

    assert_eq!(closing.len(), 1);
    assert_eq!(closing[0].emission_id, "sig_3:window");
    assert_eq!(closing[0].caused_by, "sig_3");
    assert_eq!(closing[0].payload, json!({ "count": 3, "sum": 6.0 }));
}

#[test]
fn two_signals_against_a_count_window_of_three_emit_nothing() {
    let mut engine = Engine::new(windowed_pipeline(WindowClose::Count(3)), TickState::default());

    assert!(engine.process(&tick("sig_1", 1.0, 0)).unwrap().is_empty());
    assert!(engine.process(&tick("sig_2", 2.0, 1)).unwrap().is_empty());

    // Partial buffer at stream end: nothing emitted, buffer still holding.
    assert_eq!(engine.state().value().window.len(), 2);
}

#[test]
fn buffer_resets_after_each_closure() {
    let mut engine = Engine::new(windowed_pipeline(WindowClose::Count(2)), TickState::default());

    let signals = [
        tick("sig_1", 1.0, 0),
        tick("sig_2", 2.0, 1),
        tick("sig_3", 3.0, 2),
        tick("sig_4", 4.0, 3),
    ];
    let emissions = engine.process_batch(signals).unwrap();

    assert_eq!(emissions.len(), 2);
    assert_eq!(emissions[0].payload, json!({ "count": 2, "sum": 3.0 }));
    assert_eq!(emissions[1].payload, json!({ "count": 2, "sum": 7.0 }));
    assert!(engine.state().value().window.is_empty());
}

#[test]
fn span_window_closes_off_signal_timestamps_not_wall_clock() {
    let mut engine = Engine::new(
        windowed_pipeline(WindowClose::Span(Duration::seconds(30))),
        TickState::default(),
    );

    assert!(engine.process(&tick("sig_1", 1.0, 0)).unwrap().is_empty());
    assert!(engine.process(&tick("sig_2", 2.0, 10)).unwrap().is_empty());

    // 40s past the first buffered signal: the closing signal is included.
    let closing = engine.process(&tick("sig_3", 3.0, 40)).unwrap();

    assert_eq!(closing.len(), 1);
    assert_eq!(closing[0].payload, json!({ "count": 3, "sum": 6.0 }));
}

#[test]
fn span_window_stays_open_inside_the_span() {
    let mut engine = Engine::new(
        windowed_pipeline(WindowClose::Span(Duration::seconds(30))),
        TickState::default(),
    );

    let emissions = engine
        .process_batch([tick("sig_1", 1.0, 0), tick("sig_2", 2.0, 10), tick("sig_3", 3.0, 20)])
        .unwrap();

    assert!(emissions.is_empty());
    assert_eq!(engine.state().value().window.len(), 3);
}

#[test]
fn window_closure_is_evaluated_before_change_detection() {
    // Design choice, pinned here: when a change wrapper observes a window
    // step, the window's count/span closure runs first, so on a closing tick
    // the wrapper sees the already-reset buffer. The summary emission
    // precedes the change emission.
    let inner = window_with(
        WindowClose::Count(2),
        |state: &TickState| state.window.clone(),
        |_state: TickState, window| TickState { window },
        |signal: &Signal<f64>| signal.payload,
        |items: &[f64]| json!({ "count": items.len() }),
        "window.closed",
        EmissionFactories::deterministic("window"),
    );
    let pipeline: Pipeline<f64, TickState, Value> = Pipeline::new().then(emit_on_change_with(
        inner,
        |state: &TickState| state.window.len(),
        "buffer.changed",
        |_payload: &f64, state: &TickState| json!({ "buffered": state.window.len() }),
        EmissionFactories::deterministic("changed"),
    ));
    let mut engine = Engine::new(pipeline, TickState::default());

    // Non-closing tick: buffer 0 -> 1, only the change emission fires.
    let first = engine.process(&tick("sig_1", 1.0, 0)).unwrap();
    assert_eq!(
        first.iter().map(|e| e.emission_type.as_str()).collect::<Vec<_>>(),
        ["buffer.changed"]
    );

    // Closing tick: summary first, then the change emission for 1 -> 0.
    let second = engine.process(&tick("sig_2", 2.0, 1)).unwrap();
    assert_eq!(
        second.iter().map(|e| e.emission_type.as_str()).collect::<Vec<_>>(),
        ["window.closed", "buffer.changed"]
    );
    assert_eq!(second[1].payload, json!({ "buffered": 0 }));
}
