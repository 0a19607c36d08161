//! Indicator reducers
//!
//! Feature reducers use these helpers to turn lifecycle actions into a UI
//! "loading / error" slice. [`handle_http`] writes the lifecycle status under
//! `ui[key]` (or `ui[indicator.id][key]`), then runs the feature's own
//! reducer for that status, which therefore already sees the updated UI slice.
//!
//! # Precondition
//!
//! The state must expose a `ui` map. This is enforced by the [`HasUi`] bound
//! rather than checked at runtime.
//!
//! # Example
//!
//! ```
//! use action_http_core::indicator::{HasUi, HttpHandlers, UiState, handle_http};
//! use action_http_core::reducer::Reducer;
//! use action_http_core::{Action, LifecycleAction, LifecyclePayload, HttpResponse, Status};
//!
//! #[derive(Default)]
//! struct FlowState {
//!     ui: UiState,
//!     flows: Vec<serde_json::Value>,
//! }
//!
//! impl HasUi for FlowState {
//!     fn ui(&self) -> &UiState { &self.ui }
//!     fn ui_mut(&mut self) -> &mut UiState { &mut self.ui }
//! }
//!
//! let reducer = handle_http(
//!     "query",
//!     HttpHandlers::new().on_success(|state: &mut FlowState, action| {
//!         if let Some(response) = action.response() {
//!             state.flows.push(response.data.clone());
//!         }
//!     }),
//! )
//! .scoped("flows/query");
//!
//! let mut state = FlowState::default();
//! let send = LifecycleAction::new("flows/query", Status::Send, None, None);
//! reducer.reduce(&mut state, &send.into());
//! assert!(state.ui.is_loading("query"));
//!
//! let response = HttpResponse::new(200, serde_json::json!({ "name": "flow" }));
//! let done = LifecycleAction::new(
//!     "flows/query",
//!     Status::Success,
//!     Some(LifecyclePayload::Response(response)),
//!     None,
//! );
//! reducer.reduce(&mut state, &Action::from(done));
//! assert_eq!(state.ui.get("query"), Some(Status::Success));
//! assert_eq!(state.flows.len(), 1);
//! ```

use crate::action::{Action, LifecycleAction, Status};
use crate::reducer::Reducer;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// UI slice: request status per key, optionally nested under an entity id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    flat: BTreeMap<String, Status>,
    by_id: BTreeMap<String, BTreeMap<String, Status>>,
}

impl UiState {
    /// Empty UI slice
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `ui[key]`
    pub fn set(&mut self, key: impl Into<String>, status: Status) {
        self.flat.insert(key.into(), status);
    }

    /// Set `ui[id][key]`
    pub fn set_in(&mut self, id: impl Into<String>, key: impl Into<String>, status: Status) {
        self.by_id
            .entry(id.into())
            .or_default()
            .insert(key.into(), status);
    }

    /// Read `ui[key]`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Status> {
        self.flat.get(key).copied()
    }

    /// Read `ui[id][key]`
    #[must_use]
    pub fn get_in(&self, id: &str, key: &str) -> Option<Status> {
        self.by_id.get(id).and_then(|keys| keys.get(key)).copied()
    }

    /// Whether `ui[key]` is a request still in flight
    #[must_use]
    pub fn is_loading(&self, key: &str) -> bool {
        self.get(key) == Some(Status::Send)
    }

    /// Whether `ui[id][key]` is a request still in flight
    #[must_use]
    pub fn is_loading_in(&self, id: &str, key: &str) -> bool {
        self.get_in(id, key) == Some(Status::Send)
    }
}

/// State carrying a `ui` slice
pub trait HasUi {
    /// The UI slice
    fn ui(&self) -> &UiState;

    /// The UI slice, mutably
    fn ui_mut(&mut self) -> &mut UiState;
}

impl HasUi for UiState {
    fn ui(&self) -> &UiState {
        self
    }

    fn ui_mut(&mut self) -> &mut UiState {
        self
    }
}

/// Per-status partial reducer
pub type PartialReducer<S> = Box<dyn Fn(&mut S, &LifecycleAction) + Send + Sync>;

/// Optional reducers for each lifecycle status
pub struct HttpHandlers<S> {
    send: Option<PartialReducer<S>>,
    success: Option<PartialReducer<S>>,
    failure: Option<PartialReducer<S>>,
    cancel: Option<PartialReducer<S>>,
}

impl<S> HttpHandlers<S> {
    /// No handlers
    #[must_use]
    pub const fn new() -> Self {
        Self {
            send: None,
            success: None,
            failure: None,
            cancel: None,
        }
    }

    /// Handle `send`
    #[must_use]
    pub fn on_send<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut S, &LifecycleAction) + Send + Sync + 'static,
    {
        self.send = Some(Box::new(f));
        self
    }

    /// Handle `success`
    #[must_use]
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut S, &LifecycleAction) + Send + Sync + 'static,
    {
        self.success = Some(Box::new(f));
        self
    }

    /// Handle `failure`
    #[must_use]
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut S, &LifecycleAction) + Send + Sync + 'static,
    {
        self.failure = Some(Box::new(f));
        self
    }

    /// Handle `cancel`
    #[must_use]
    pub fn on_cancel<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut S, &LifecycleAction) + Send + Sync + 'static,
    {
        self.cancel = Some(Box::new(f));
        self
    }

    fn get(&self, status: Status) -> Option<&PartialReducer<S>> {
        match status {
            Status::Send => self.send.as_ref(),
            Status::Success => self.success.as_ref(),
            Status::Failure => self.failure.as_ref(),
            Status::Cancel => self.cancel.as_ref(),
        }
    }
}

impl<S> Default for HttpHandlers<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reducer dispatching lifecycle actions to per-status handlers
///
/// Created by [`handle_http_actions`].
pub struct HttpActionsReducer<S> {
    handlers: HttpHandlers<S>,
    scope: Option<String>,
}

impl<S> HttpActionsReducer<S> {
    /// Only react to lifecycle actions of request `name`
    #[must_use]
    pub fn scoped(mut self, name: impl Into<String>) -> Self {
        self.scope = Some(name.into());
        self
    }

    fn accepts<'a>(&self, action: &'a Action) -> Option<&'a LifecycleAction> {
        let lifecycle = action.as_lifecycle()?;
        match self.scope.as_deref() {
            Some(scope) if lifecycle.name() != scope => None,
            _ => Some(lifecycle),
        }
    }
}

impl<S> Reducer for HttpActionsReducer<S> {
    type State = S;
    type Action = Action;

    fn reduce(&self, state: &mut S, action: &Action) {
        let Some(lifecycle) = self.accepts(action) else {
            return;
        };
        if let Some(handler) = self.handlers.get(lifecycle.status) {
            handler(state, lifecycle);
        }
    }
}

/// Dispatch lifecycle actions to `handlers` by status
///
/// Non-lifecycle actions leave the state untouched.
#[must_use]
pub const fn handle_http_actions<S>(handlers: HttpHandlers<S>) -> HttpActionsReducer<S> {
    HttpActionsReducer {
        handlers,
        scope: None,
    }
}

/// Reducer keeping `ui[key]` in sync with lifecycle actions
///
/// Created by [`handle_http`].
pub struct IndicatorReducer<S> {
    ui_key: String,
    inner: HttpActionsReducer<S>,
    _state: PhantomData<fn(&mut S)>,
}

impl<S> IndicatorReducer<S> {
    /// Only react to lifecycle actions of request `name`
    #[must_use]
    pub fn scoped(mut self, name: impl Into<String>) -> Self {
        self.inner = self.inner.scoped(name);
        self
    }
}

impl<S: HasUi> Reducer for IndicatorReducer<S> {
    type State = S;
    type Action = Action;

    fn reduce(&self, state: &mut S, action: &Action) {
        let Some(lifecycle) = self.inner.accepts(action) else {
            return;
        };

        if !self.ui_key.is_empty() {
            let ui = state.ui_mut();
            match &lifecycle.indicator {
                Some(indicator) => ui.set_in(&indicator.id, &self.ui_key, lifecycle.status),
                None => ui.set(&self.ui_key, lifecycle.status),
            }
        }

        if let Some(handler) = self.inner.handlers.get(lifecycle.status) {
            handler(state, lifecycle);
        }
    }
}

/// Track request status under `ui_key`, then run `handlers`
///
/// An empty `ui_key` skips the UI update and behaves like
/// [`handle_http_actions`].
#[must_use]
pub fn handle_http<S: HasUi>(
    ui_key: impl Into<String>,
    handlers: HttpHandlers<S>,
) -> IndicatorReducer<S> {
    IndicatorReducer {
        ui_key: ui_key.into(),
        inner: handle_http_actions(handlers),
        _state: PhantomData,
    }
}
