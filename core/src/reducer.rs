//! Reducer trait - state updates driven by pipeline actions
//!
//! Feature reducers fold the lifecycle actions the middleware dispatches into
//! application state. They are plain synchronous functions: side effects
//! belong to the middleware, not to reducers.

use std::marker::PhantomData;

/// The Reducer trait - core abstraction for state updates
///
/// # Type Parameters
///
/// - `State`: The state this reducer updates
/// - `Action`: The action type this reducer reacts to
///
/// # Example
///
/// ```
/// use action_http_core::reducer::Reducer;
///
/// struct Counter;
///
/// impl Reducer for Counter {
///     type State = i32;
///     type Action = ();
///
///     fn reduce(&self, state: &mut i32, _action: &()) {
///         *state += 1;
///     }
/// }
///
/// let mut state = 0;
/// Counter.reduce(&mut state, &());
/// assert_eq!(state, 1);
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// Apply `action` to `state` in place
    fn reduce(&self, state: &mut Self::State, action: &Self::Action);
}

/// Reducer backed by a closure
///
/// Created by [`from_fn`].
pub struct FnReducer<S, A, F> {
    f: F,
    _marker: PhantomData<fn(&mut S, &A)>,
}

impl<S, A, F> Reducer for FnReducer<S, A, F>
where
    F: Fn(&mut S, &A),
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &mut S, action: &A) {
        (self.f)(state, action);
    }
}

/// Wrap a closure as a [`Reducer`]
///
/// ```
/// use action_http_core::reducer::{Reducer, from_fn};
///
/// let double = from_fn(|state: &mut i32, factor: &i32| *state *= factor);
/// let mut state = 3;
/// double.reduce(&mut state, &2);
/// assert_eq!(state, 6);
/// ```
#[must_use]
pub const fn from_fn<S, A, F>(f: F) -> FnReducer<S, A, F>
where
    F: Fn(&mut S, &A),
{
    FnReducer {
        f,
        _marker: PhantomData,
    }
}
