//! Transform combinator library: state maintenance and the emit family.
//!
//! Every factory is a free function returning an `impl Step`. Emitting
//! factories stamp `caused_by` with the incoming signal's id; the
//! traceability contract is enforced here, not left to callers. The `*_with`
//! variants take explicit [`EmissionFactories`] for replay-safe ids and
//! timestamps; the plain variants use the random defaults.

use signalflow_core::{Emission, EmissionFactories, Signal};

use crate::step::{Step, StepResult};

pub(crate) fn build_emission<T, U>(
    emission_type: &str,
    signal: &Signal<T>,
    payload: U,
    factories: &EmissionFactories,
) -> Emission<U> {
    let emission_id = (factories.emission_id)(&signal.signal_id, emission_type);
    let timestamp = (factories.timestamp)(&signal.timestamp);
    Emission::new(emission_type, signal.signal_id.clone(), payload)
        .with_id(emission_id)
        .with_timestamp(timestamp)
}

/// Maintain a single field of state by folding each signal payload into it.
///
/// `read` extracts the current accumulated value, `reducer` folds the
/// payload in, `write` replaces only that field; every other part of the
/// state passes through unchanged. Emits nothing.
pub fn accumulate<T, S, U, A>(
    read: impl Fn(&S) -> A + Send + Sync,
    write: impl Fn(S, A) -> S + Send + Sync,
    reducer: impl Fn(A, &T) -> A + Send + Sync,
) -> impl Step<T, S, U> {
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> {
        let current = read(&state);
        let folded = reducer(current, &signal.payload);
        Ok((write(state, folded), Vec::new()))
    }
}

/// Replace the state with a pure function of `(payload, current state)`.
/// Emits nothing.
pub fn update_state<T, S, U>(
    apply: impl Fn(&T, &S) -> S + Send + Sync,
) -> impl Step<T, S, U> {
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> {
        let next = apply(&signal.payload, &state);
        Ok((next, Vec::new()))
    }
}

/// [`update_state`] gated by a predicate; when it is false the old state
/// passes through untouched.
pub fn update_state_when<T, S, U>(
    predicate: impl Fn(&T, &S) -> bool + Send + Sync,
    apply: impl Fn(&T, &S) -> S + Send + Sync,
) -> impl Step<T, S, U> {
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> {
        if predicate(&signal.payload, &state) {
            let next = apply(&signal.payload, &state);
            Ok((next, Vec::new()))
        } else {
            Ok((state, Vec::new()))
        }
    }
}

/// Append one emission per signal, with payload `extract(payload, state)`.
pub fn emit<T, S, U>(
    emission_type: impl Into<String>,
    extract: impl Fn(&T, &S) -> U + Send + Sync,
) -> impl Step<T, S, U> {
    emit_with(emission_type, extract, EmissionFactories::default())
}

pub fn emit_with<T, S, U>(
    emission_type: impl Into<String>,
    extract: impl Fn(&T, &S) -> U + Send + Sync,
    factories: EmissionFactories,
) -> impl Step<T, S, U> {
    let emission_type = emission_type.into();
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> {
        let payload = extract(&signal.payload, &state);
        let emission = build_emission(&emission_type, signal, payload, &factories);
        Ok((state, vec![emission]))
    }
}

/// [`emit`] gated by a predicate over `(payload, state)`; 0 or 1 emission.
pub fn emit_if<T, S, U>(
    predicate: impl Fn(&T, &S) -> bool + Send + Sync,
    emission_type: impl Into<String>,
    extract: impl Fn(&T, &S) -> U + Send + Sync,
) -> impl Step<T, S, U> {
    emit_if_with(predicate, emission_type, extract, EmissionFactories::default())
}

pub fn emit_if_with<T, S, U>(
    predicate: impl Fn(&T, &S) -> bool + Send + Sync,
    emission_type: impl Into<String>,
    extract: impl Fn(&T, &S) -> U + Send + Sync,
    factories: EmissionFactories,
) -> impl Step<T, S, U> {
    let emission_type = emission_type.into();
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> {
        if !predicate(&signal.payload, &state) {
            return Ok((state, Vec::new()));
        }
        let payload = extract(&signal.payload, &state);
        let emission = build_emission(&emission_type, signal, payload, &factories);
        Ok((state, vec![emission]))
    }
}

/// Run `inner` and append a change emission only when `project(state)`
/// differs before and after it ran. Inner emissions always pass through
/// first; no-op ticks are suppressed.
pub fn emit_on_change<T, S, U, P>(
    inner: impl Step<T, S, U>,
    project: impl Fn(&S) -> P + Send + Sync,
    emission_type: impl Into<String>,
    extract: impl Fn(&T, &S) -> U + Send + Sync,
) -> impl Step<T, S, U>
where
    P: PartialEq,
{
    emit_on_change_by(
        inner,
        project,
        |before: &P, after: &P| before == after,
        emission_type,
        extract,
        EmissionFactories::default(),
    )
}

pub fn emit_on_change_with<T, S, U, P>(
    inner: impl Step<T, S, U>,
    project: impl Fn(&S) -> P + Send + Sync,
    emission_type: impl Into<String>,
    extract: impl Fn(&T, &S) -> U + Send + Sync,
    factories: EmissionFactories,
) -> impl Step<T, S, U>
where
    P: PartialEq,
{
    emit_on_change_by(
        inner,
        project,
        |before: &P, after: &P| before == after,
        emission_type,
        extract,
        factories,
    )
}

/// [`emit_on_change`] with a caller-supplied equality notion instead of
/// `PartialEq`.
pub fn emit_on_change_by<T, S, U, P>(
    inner: impl Step<T, S, U>,
    project: impl Fn(&S) -> P + Send + Sync,
    same: impl Fn(&P, &P) -> bool + Send + Sync,
    emission_type: impl Into<String>,
    extract: impl Fn(&T, &S) -> U + Send + Sync,
    factories: EmissionFactories,
) -> impl Step<T, S, U> {
    let emission_type = emission_type.into();
    move |signal: &Signal<T>, state: S| -> StepResult<S, U> {
        let before = project(&state);
        let (next, mut emissions) = inner.apply(signal, state)?;
        let after = project(&next);
        if !same(&before, &after) {
            let payload = extract(&signal.payload, &next);
            emissions.push(build_emission(&emission_type, signal, payload, &factories));
        }
        Ok((next, emissions))
    }
}
