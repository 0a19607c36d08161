//! Mock transport and pipeline for tests
//!
//! - [`MockClient`]: scripted [`HttpClient`] with per-route responses and delays
//! - [`RecordingDispatch`]: pipeline `dispatch` that records every action
//! - [`TestStore`]: minimal store running one reducer under a mutex

use action_http_core::reducer::Reducer;
use action_http_core::{
    Action, Dispatch, HttpClient, HttpError, HttpResponse, HttpResult, MiddlewareApi,
    RequestOptions, Status,
};
use futures::future::BoxFuture;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Scripted outcome of one mocked request
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    status: u16,
    body: Value,
    delay: Duration,
    network_error: Option<String>,
}

impl MockResponse {
    /// `200` with `body`
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    /// `status` with `body`; non-2xx statuses reject with [`HttpError::Status`]
    #[must_use]
    pub const fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
            network_error: None,
        }
    }

    /// Connection-level failure
    #[must_use]
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            network_error: Some(message.into()),
            ..Self::status(0, Value::Null)
        }
    }

    /// Settle only after `delay` (Tokio time, so it can be paused)
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn into_result(self) -> HttpResult {
        if let Some(message) = self.network_error {
            return Err(HttpError::Network(message));
        }
        if (200..300).contains(&self.status) {
            Ok(HttpResponse::new(self.status, self.body))
        } else {
            Err(HttpError::Status {
                status: self.status,
                data: self.body,
            })
        }
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::ok(json!({ "message": "this is default response" }))
    }
}

#[derive(Debug, Default)]
struct MockState {
    routes: Mutex<Vec<(String, MockResponse)>>,
    fallback: Mutex<MockResponse>,
    requests: Mutex<Vec<RequestOptions>>,
    completed: AtomicUsize,
    aborted: AtomicUsize,
}

/// Scripted [`HttpClient`]
///
/// Responses are chosen by the first route whose pattern the resolved url
/// ends with; unrouted requests get the fallback (`200` with
/// `{"message": "this is default response"}` unless replaced). Every request
/// is recorded with its merged options, and requests dropped before settling
/// are counted as aborted.
///
/// # Example
///
/// ```
/// use action_http_testing::mocks::{MockClient, MockResponse};
/// use serde_json::json;
///
/// let client = MockClient::new()
///     .route("/bad", MockResponse::status(400, json!({ "message": "bad request" })));
/// assert_eq!(client.request_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    state: Arc<MockState>,
}

impl MockClient {
    /// Client answering every request with the default response
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer urls ending with `pattern` with `response`
    #[must_use]
    pub fn route(self, pattern: impl Into<String>, response: MockResponse) -> Self {
        lock(&self.state.routes).push((pattern.into(), response));
        self
    }

    /// Replace the response used for unrouted requests
    #[must_use]
    pub fn fallback(self, response: MockResponse) -> Self {
        *lock(&self.state.fallback) = response;
        self
    }

    /// Options of every request received, in order
    #[must_use]
    pub fn requests(&self) -> Vec<RequestOptions> {
        lock(&self.state.requests).clone()
    }

    /// Resolved urls of every request received, in order
    #[must_use]
    pub fn urls(&self) -> Vec<Option<String>> {
        lock(&self.state.requests)
            .iter()
            .map(RequestOptions::resolved_url)
            .collect()
    }

    /// Number of requests received
    #[must_use]
    pub fn request_count(&self) -> usize {
        lock(&self.state.requests).len()
    }

    /// Number of requests that ran to completion
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.state.completed.load(Ordering::SeqCst)
    }

    /// Number of requests dropped before completing
    #[must_use]
    pub fn aborted_count(&self) -> usize {
        self.state.aborted.load(Ordering::SeqCst)
    }

    fn response_for(&self, options: &RequestOptions) -> MockResponse {
        let url = options.resolved_url().unwrap_or_default();
        lock(&self.state.routes)
            .iter()
            .find(|(pattern, _)| url.ends_with(pattern.as_str()))
            .map_or_else(
                || lock(&self.state.fallback).clone(),
                |(_, response)| response.clone(),
            )
    }
}

impl HttpClient for MockClient {
    fn request(&self, options: RequestOptions) -> BoxFuture<'static, HttpResult> {
        let response = self.response_for(&options);
        lock(&self.state.requests).push(options);

        let mut guard = AbortGuard {
            state: Arc::clone(&self.state),
            finished: false,
        };
        Box::pin(async move {
            if !response.delay.is_zero() {
                tokio::time::sleep(response.delay).await;
            }
            guard.finished = true;
            guard.state.completed.fetch_add(1, Ordering::SeqCst);
            response.into_result()
        })
    }
}

struct AbortGuard {
    state: Arc<MockState>,
    finished: bool,
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.state.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Pipeline `dispatch` recording every action it receives
///
/// # Example
///
/// ```
/// use action_http_core::Action;
/// use action_http_testing::mocks::RecordingDispatch;
///
/// let recorder = RecordingDispatch::new();
/// (recorder.dispatch())(Action::custom("ping"));
/// assert_eq!(recorder.types(), vec!["ping"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatch {
    actions: Arc<Mutex<Vec<Action>>>,
}

impl RecordingDispatch {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch function feeding this recorder
    #[must_use]
    pub fn dispatch(&self) -> Dispatch {
        let actions = Arc::clone(&self.actions);
        Arc::new(move |action: Action| lock(&actions).push(action))
    }

    /// Middleware API feeding this recorder
    #[must_use]
    pub fn api(&self) -> MiddlewareApi {
        let dispatch = self.dispatch();
        MiddlewareApi::from_dispatch(move |action| dispatch(action))
    }

    /// Every action recorded so far
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        lock(&self.actions).clone()
    }

    /// Types of the recorded actions (untyped actions are skipped)
    #[must_use]
    pub fn types(&self) -> Vec<String> {
        lock(&self.actions)
            .iter()
            .filter_map(Action::action_type)
            .map(str::to_string)
            .collect()
    }

    /// Statuses of the recorded lifecycle actions
    #[must_use]
    pub fn statuses(&self) -> Vec<Status> {
        lock(&self.actions)
            .iter()
            .filter_map(Action::as_lifecycle)
            .map(|lifecycle| lifecycle.status)
            .collect()
    }

    /// Forget recorded actions
    pub fn clear(&self) {
        lock(&self.actions).clear();
    }
}

/// Minimal store: one reducer, state behind a mutex, every action recorded
///
/// Dispatch is synchronous, like the pipeline the middleware plugs into.
pub struct TestStore<R: Reducer> {
    reducer: Arc<R>,
    state: Arc<Mutex<R::State>>,
    recorder: RecordingDispatch,
}

impl<R> TestStore<R>
where
    R: Reducer<Action = Action> + Send + Sync + 'static,
    R::State: Send + 'static,
{
    /// Store starting from `state`
    pub fn new(reducer: R, state: R::State) -> Self {
        Self {
            reducer: Arc::new(reducer),
            state: Arc::new(Mutex::new(state)),
            recorder: RecordingDispatch::new(),
        }
    }

    /// Run `action` through the reducer
    pub fn dispatch(&self, action: &Action) {
        self.reducer.reduce(&mut lock(&self.state), action);
        (self.recorder.dispatch())(action.clone());
    }

    /// Read from the current state
    pub fn state<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        f(&lock(&self.state))
    }

    /// Every action dispatched so far
    #[must_use]
    pub fn recorder(&self) -> &RecordingDispatch {
        &self.recorder
    }

    /// Middleware API dispatching into this store
    #[must_use]
    pub fn api(&self) -> MiddlewareApi<R::State>
    where
        R::State: Clone,
    {
        let reducer = Arc::clone(&self.reducer);
        let state = Arc::clone(&self.state);
        let recorder = self.recorder.dispatch();
        let read = Arc::clone(&self.state);
        MiddlewareApi::new(
            move |action: Action| {
                reducer.reduce(&mut lock(&state), &action);
                recorder(action);
            },
            move || lock(&read).clone(),
        )
    }
}

impl<R: Reducer> std::fmt::Debug for TestStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestStore")
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
