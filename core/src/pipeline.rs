//! Dispatch pipeline contract
//!
//! The pipeline (store) is owned by the host application. Middleware only
//! receives the store-like [`MiddlewareApi`]: a `dispatch` function that
//! re-enters the pipeline and a `get_state` accessor.

use crate::action::Action;
use std::fmt;
use std::sync::Arc;

/// Pipeline entry point: a synchronous call that runs the action through
/// the pipeline.
pub type Dispatch = Arc<dyn Fn(Action) + Send + Sync>;

/// State accessor of the pipeline
pub type GetState<S> = Arc<dyn Fn() -> S + Send + Sync>;

/// Store-like API handed to middleware
pub struct MiddlewareApi<S = ()> {
    /// Re-enter the pipeline with an action
    pub dispatch: Dispatch,
    /// Read the current state
    pub get_state: GetState<S>,
}

impl<S> MiddlewareApi<S> {
    /// Build the API from a dispatch function and a state accessor
    pub fn new<D, G>(dispatch: D, get_state: G) -> Self
    where
        D: Fn(Action) + Send + Sync + 'static,
        G: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            dispatch: Arc::new(dispatch),
            get_state: Arc::new(get_state),
        }
    }

    /// Dispatch `action` into the pipeline
    pub fn dispatch(&self, action: Action) {
        (self.dispatch)(action);
    }

    /// Current pipeline state
    #[must_use]
    pub fn state(&self) -> S {
        (self.get_state)()
    }
}

impl MiddlewareApi<()> {
    /// API for pipelines without readable state
    pub fn from_dispatch<D>(dispatch: D) -> Self
    where
        D: Fn(Action) + Send + Sync + 'static,
    {
        Self::new(dispatch, || ())
    }
}

impl<S> Clone for MiddlewareApi<S> {
    fn clone(&self) -> Self {
        Self {
            dispatch: Arc::clone(&self.dispatch),
            get_state: Arc::clone(&self.get_state),
        }
    }
}

impl<S> fmt::Debug for MiddlewareApi<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareApi").finish_non_exhaustive()
    }
}
