//! Lifecycle dispatcher
//!
//! Emits the `<name>/SEND`, `<name>/SUCCESS`, `<name>/FAILURE` and
//! `<name>/CANCEL` actions of one request into the pipeline. Each call is a
//! direct, synchronous call of the pipeline's `dispatch`.

use crate::metrics::{
    REQUEST_DURATION, REQUESTS_CANCELLED, REQUESTS_FAILED, REQUESTS_SENT, REQUESTS_SUCCEEDED,
};
use action_http_core::{
    Action, CancelDispatch, Dispatch, HttpError, HttpResponse, Indicator, LifecycleAction,
    LifecyclePayload, Status,
};
use std::time::Instant;

/// Emits lifecycle actions for one request
pub struct LifecycleDispatcher {
    dispatch: Dispatch,
    name: String,
    indicator: Option<Indicator>,
    cancel_dispatch: CancelDispatch,
    started: Instant,
}

impl LifecycleDispatcher {
    /// Dispatcher for request `name`, echoing `indicator` on every action
    #[must_use]
    pub fn new(
        dispatch: Dispatch,
        name: impl Into<String>,
        indicator: Option<Indicator>,
        cancel_dispatch: CancelDispatch,
    ) -> Self {
        Self {
            dispatch,
            name: name.into(),
            indicator,
            cancel_dispatch,
            started: Instant::now(),
        }
    }

    /// Request name used in lifecycle types
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch `<name>/SEND`
    pub fn send(&self) {
        metrics::counter!(REQUESTS_SENT, "name" => self.name.clone()).increment(1);
        self.emit(Status::Send, None);
    }

    /// Dispatch `<name>/SUCCESS` with the response
    pub fn success(&self, response: &HttpResponse) {
        metrics::counter!(REQUESTS_SUCCEEDED, "name" => self.name.clone()).increment(1);
        self.record_duration(Status::Success);
        self.emit(
            Status::Success,
            Some(LifecyclePayload::Response(response.clone())),
        );
    }

    /// Dispatch `<name>/FAILURE` with the error
    pub fn failure(&self, error: &HttpError) {
        metrics::counter!(REQUESTS_FAILED, "name" => self.name.clone()).increment(1);
        self.record_duration(Status::Failure);
        self.emit(Status::Failure, Some(LifecyclePayload::Error(error.clone())));
    }

    /// Dispatch the cancel action with the cancellation error
    ///
    /// `<name>/CANCEL`, or `<name>/FAILURE` under [`CancelDispatch::Failure`].
    pub fn cancel(&self, error: &HttpError) {
        metrics::counter!(REQUESTS_CANCELLED, "name" => self.name.clone()).increment(1);
        self.record_duration(Status::Cancel);
        let status = match self.cancel_dispatch {
            CancelDispatch::Cancel => Status::Cancel,
            CancelDispatch::Failure => Status::Failure,
        };
        self.emit(status, Some(LifecyclePayload::Error(error.clone())));
    }

    fn record_duration(&self, outcome: Status) {
        metrics::histogram!(
            REQUEST_DURATION,
            "name" => self.name.clone(),
            "outcome" => outcome.as_str()
        )
        .record(self.started.elapsed().as_secs_f64());
    }

    fn emit(&self, status: Status, payload: Option<LifecyclePayload>) {
        let action = LifecycleAction::new(&self.name, status, payload, self.indicator.clone());
        tracing::trace!(action_type = %action.action_type, "Dispatching lifecycle action");
        (self.dispatch)(Action::Lifecycle(action));
    }
}

impl std::fmt::Debug for LifecycleDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleDispatcher")
            .field("name", &self.name)
            .field("indicator", &self.indicator)
            .field("cancel_dispatch", &self.cancel_dispatch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (Dispatch, Arc<Mutex<Vec<Action>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let dispatch: Dispatch = Arc::new(move |action| sink.lock().unwrap().push(action));
        (dispatch, log)
    }

    fn lifecycle_types(log: &Mutex<Vec<Action>>) -> Vec<(String, Status)> {
        log.lock()
            .unwrap()
            .iter()
            .filter_map(Action::as_lifecycle)
            .map(|a| (a.action_type.clone(), a.status))
            .collect()
    }

    #[test]
    fn test_send_then_success() {
        let (dispatch, log) = recording();
        let lifecycle = LifecycleDispatcher::new(
            dispatch,
            "getSomeThing",
            Some(Indicator::new("row-1")),
            CancelDispatch::Cancel,
        );

        lifecycle.send();
        lifecycle.success(&HttpResponse::new(200, serde_json::json!({ "ok": true })));

        assert_eq!(
            lifecycle_types(&log),
            vec![
                ("getSomeThing/SEND".to_string(), Status::Send),
                ("getSomeThing/SUCCESS".to_string(), Status::Success),
            ]
        );
        let log = log.lock().unwrap();
        let success = log[1].as_lifecycle().unwrap();
        assert_eq!(success.indicator, Some(Indicator::new("row-1")));
        assert_eq!(success.response().map(|r| r.status), Some(200));
    }

    #[test]
    fn test_cancel_modes() {
        let (dispatch, log) = recording();
        LifecycleDispatcher::new(Arc::clone(&dispatch), "a", None, CancelDispatch::Cancel)
            .cancel(&HttpError::cancelled());
        LifecycleDispatcher::new(dispatch, "b", None, CancelDispatch::Failure)
            .cancel(&HttpError::cancelled());

        assert_eq!(
            lifecycle_types(&log),
            vec![
                ("a/CANCEL".to_string(), Status::Cancel),
                ("b/FAILURE".to_string(), Status::Failure),
            ]
        );
        let log = log.lock().unwrap();
        assert!(log.iter().all(|a| a
            .as_lifecycle()
            .and_then(LifecycleAction::error)
            .is_some_and(HttpError::is_cancel)));
    }
}
