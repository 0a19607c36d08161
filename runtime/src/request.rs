//! In-flight requests
//!
//! [`spawn_request`] dispatches `SEND`, starts the transport call on its own
//! task and returns a [`RequestHandle`]. From then on two paths race for the
//! request's [`CancelToken`]:
//!
//! - the transport task, once the call settles, and
//! - the cancel hook, run by whoever calls [`cancel`](action_http_core::cancel()).
//!
//! The winner dispatches the terminal lifecycle action and resolves the
//! handle. The loser does nothing: a late response is discarded and a late
//! cancel returns `false`.

use crate::lifecycle::LifecycleDispatcher;
use action_http_core::{
    CancelToken, Cancellable, HttpClient, HttpError, HttpResult, RequestOptions,
};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

type ResultSender = Arc<Mutex<Option<oneshot::Sender<HttpResult>>>>;

const NO_RUNTIME: &str = "no Tokio runtime to run the request on";

/// Handle of an in-flight request
///
/// Awaiting it yields the response, the transport error, or
/// [`HttpError::Cancelled`]. The request runs whether or not the handle is
/// awaited; dropping the handle does not cancel it.
///
/// # Example
///
/// ```ignore
/// let handle = handler.handle(request.into()).into_request().unwrap();
/// let token = handle.token().clone();
///
/// tokio::spawn(async move {
///     tokio::time::sleep(Duration::from_millis(100)).await;
///     cancel(&token);
/// });
///
/// match handle.await {
///     Err(error) if is_cancel(&error) => { /* user gave up */ }
///     other => { /* ... */ }
/// }
/// ```
#[must_use = "the request runs regardless; keep the handle to await or cancel it"]
pub struct RequestHandle {
    token: CancelToken,
    receiver: oneshot::Receiver<HttpResult>,
}

impl RequestHandle {
    /// Cancellation token of this request
    #[must_use]
    pub const fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Cancel this request
    ///
    /// Returns `false` if it already settled or was cancelled.
    pub fn cancel(&self) -> bool {
        self.token.cancel()
    }

    /// Cancel this request with a reason
    pub fn cancel_with(&self, message: impl Into<String>) -> bool {
        self.token.cancel_with(message)
    }
}

impl Cancellable for RequestHandle {
    fn cancel_token(&self) -> &CancelToken {
        &self.token
    }
}

impl Future for RequestHandle {
    type Output = HttpResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(HttpError::Transport(
                    "request task ended without a result".to_string(),
                ))
            })
        })
    }
}

impl std::fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandle")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Dispatch `SEND`, start the transport call and return its handle
///
/// The transport runs on a spawned Tokio task. `client.request` is called on
/// that task, so a client that panics, synchronously or while polled, ends
/// the request with `FAILURE`. Called outside a Tokio runtime, the request
/// fails immediately: `SEND` then `FAILURE` with [`HttpError::Transport`].
pub fn spawn_request<C>(
    client: Arc<C>,
    options: RequestOptions,
    lifecycle: LifecycleDispatcher,
) -> RequestHandle
where
    C: HttpClient + ?Sized + 'static,
{
    let token = CancelToken::new();
    let (tx, receiver) = oneshot::channel();
    let sender: ResultSender = Arc::new(Mutex::new(Some(tx)));
    let lifecycle = Arc::new(lifecycle);

    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(name = lifecycle.name(), "No Tokio runtime, failing request");
        let error = HttpError::Transport(NO_RUNTIME.to_string());
        lifecycle.send();
        token.try_settle();
        lifecycle.failure(&error);
        deliver(&sender, Err(error));
        return RequestHandle { token, receiver };
    };

    lifecycle.send();

    let task = {
        let token = token.clone();
        let sender = Arc::clone(&sender);
        let lifecycle = Arc::clone(&lifecycle);
        runtime.spawn(async move {
            let result = AssertUnwindSafe(async move { client.request(options).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(HttpError::Transport(panic_message(&*panic))));

            if !token.try_settle() {
                tracing::debug!(
                    name = lifecycle.name(),
                    "Discarding result of cancelled request"
                );
                return;
            }

            match &result {
                Ok(response) => {
                    tracing::debug!(
                        name = lifecycle.name(),
                        status = response.status,
                        "Request succeeded"
                    );
                    lifecycle.success(response);
                }
                Err(error) => {
                    tracing::warn!(name = lifecycle.name(), error = %error, "Request failed");
                    lifecycle.failure(error);
                }
            }
            deliver(&sender, result);
        })
    };

    let abort = task.abort_handle();
    token.on_cancel(move |error| {
        abort.abort();
        tracing::info!(name = lifecycle.name(), "Request cancelled");
        lifecycle.cancel(&error);
        deliver(&sender, Err(error));
    });

    RequestHandle { token, receiver }
}

fn deliver(sender: &ResultSender, result: HttpResult) {
    let sender = sender
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(sender) = sender {
        // The caller may have dropped the handle; the result is then unobserved.
        let _ = sender.send(result);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "transport panicked".to_string())
}
