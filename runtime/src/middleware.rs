//! HTTP middleware
//!
//! The middleware follows the pipeline's fixed three-stage shape:
//!
//! ```text
//! HttpMiddleware::new(config, client)   // once per pipeline
//!     .bind(api)                        // store-like API: dispatch + get_state
//!     .wrap(next)                       // next middleware / reducer entry
//!     .handle(action)                   // every action
//! ```
//!
//! Unmatched actions go to `next` and its return value comes back verbatim
//! as [`Dispatched::Next`]. Matched request actions are performed and return
//! [`Dispatched::Request`] with the in-flight [`RequestHandle`].

use crate::lifecycle::LifecycleDispatcher;
use crate::metrics::ACTIONS_PASSED;
use crate::request::{RequestHandle, spawn_request};
use action_http_core::matcher::request_matches;
use action_http_core::{Action, HttpClient, HttpConfig, MiddlewareApi, RequestAction};
use std::fmt;
use std::sync::Arc;

/// Result of handling one action
pub enum Dispatched<R> {
    /// The action was not a matching request; this is what `next` returned
    Next(R),
    /// The action was a matching request, now in flight
    Request(RequestHandle),
}

impl<R> Dispatched<R> {
    /// Whether the action was intercepted
    #[must_use]
    pub const fn is_request(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    /// The request handle, if the action was intercepted
    #[must_use]
    pub fn into_request(self) -> Option<RequestHandle> {
        match self {
            Self::Request(handle) => Some(handle),
            Self::Next(_) => None,
        }
    }

    /// What `next` returned, if the action was passed through
    #[must_use]
    pub fn into_next(self) -> Option<R> {
        match self {
            Self::Next(result) => Some(result),
            Self::Request(_) => None,
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Dispatched<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next(result) => f.debug_tuple("Dispatched::Next").field(result).finish(),
            Self::Request(handle) => f.debug_tuple("Dispatched::Request").field(handle).finish(),
        }
    }
}

/// Cancellable HTTP action middleware
///
/// Holds the immutable configuration and the injected transport. Cloning is
/// cheap and shares both.
///
/// # Example
///
/// ```ignore
/// let middleware = HttpMiddleware::new(
///     HttpConfig::default().with_base_url("http://api.domain.com"),
///     ReqwestClient::new(),
/// );
///
/// let handler = middleware
///     .bind(MiddlewareApi::from_dispatch(|action| store.dispatch(action)))
///     .wrap(|action| reducer_entry(action));
///
/// let handle = handler
///     .handle(RequestAction::new("/flows").with_name("flows/query").into())
///     .into_request()
///     .unwrap();
///
/// let flows = handle.await?;
/// ```
pub struct HttpMiddleware<C: ?Sized> {
    config: Arc<HttpConfig>,
    client: Arc<C>,
}

impl<C: HttpClient + 'static> HttpMiddleware<C> {
    /// Create the middleware from its configuration and transport
    #[must_use]
    pub fn new(config: HttpConfig, client: C) -> Self {
        Self::with_shared_client(config, Arc::new(client))
    }
}

impl<C: HttpClient + ?Sized + 'static> HttpMiddleware<C> {
    /// Create the middleware around an already shared transport
    #[must_use]
    pub fn with_shared_client(config: HttpConfig, client: Arc<C>) -> Self {
        tracing::debug!(
            action_type = ?config.action_type,
            base_url = ?config.defaults.base_url,
            "Creating HTTP middleware"
        );
        Self {
            config: Arc::new(config),
            client,
        }
    }

    /// The middleware configuration
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// First stage: attach the pipeline's store-like API
    #[must_use]
    pub fn bind<S>(&self, api: MiddlewareApi<S>) -> BoundMiddleware<C, S> {
        BoundMiddleware {
            middleware: self.clone(),
            api,
        }
    }
}

impl<C: ?Sized> Clone for HttpMiddleware<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: ?Sized> fmt::Debug for HttpMiddleware<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMiddleware")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Middleware bound to a pipeline, waiting for its `next` continuation
pub struct BoundMiddleware<C: ?Sized, S> {
    middleware: HttpMiddleware<C>,
    api: MiddlewareApi<S>,
}

impl<C: HttpClient + ?Sized + 'static, S> BoundMiddleware<C, S> {
    /// Second stage: attach the `next` continuation
    #[must_use]
    pub fn wrap<N, R>(&self, next: N) -> ActionHandler<C, S, N>
    where
        N: Fn(Action) -> R,
    {
        ActionHandler {
            middleware: self.middleware.clone(),
            api: self.api.clone(),
            next,
        }
    }
}

/// Fully wired middleware, handling one action per call
pub struct ActionHandler<C: ?Sized, S, N> {
    middleware: HttpMiddleware<C>,
    api: MiddlewareApi<S>,
    next: N,
}

impl<C: HttpClient + ?Sized + 'static, S, N> ActionHandler<C, S, N> {
    /// Third stage: handle `action`
    ///
    /// Unmatched actions are passed to `next` with no other effect.
    /// A matched request dispatches `SEND` before this returns. Outside a
    /// Tokio runtime it also fails at once, see [`spawn_request`].
    pub fn handle<R>(&self, action: Action) -> Dispatched<R>
    where
        N: Fn(Action) -> R,
    {
        match action {
            Action::Request(request) if request_matches(&self.middleware.config, &request) => {
                Dispatched::Request(self.perform(request))
            }
            other => {
                tracing::trace!(action_type = ?other.action_type(), "Passing action to next");
                metrics::counter!(ACTIONS_PASSED).increment(1);
                Dispatched::Next((self.next)(other))
            }
        }
    }

    #[tracing::instrument(
        skip_all,
        name = "http_request",
        fields(
            request_name = request.lifecycle_name(),
            method = tracing::field::Empty,
            url = tracing::field::Empty
        )
    )]
    fn perform(&self, request: RequestAction) -> RequestHandle {
        let config = &self.middleware.config;
        let options = config.defaults.merge(&request.request);

        let span = tracing::Span::current();
        span.record("method", options.method().as_str());
        if let Some(url) = options.resolved_url() {
            span.record("url", url.as_str());
        }
        tracing::debug!("Sending request");

        let name = request.lifecycle_name().to_string();
        let lifecycle = LifecycleDispatcher::new(
            Arc::clone(&self.api.dispatch),
            name,
            request.indicator,
            config.cancel_dispatch,
        );

        spawn_request(Arc::clone(&self.middleware.client), options, lifecycle)
    }
}

impl<C: ?Sized, S, N> fmt::Debug for ActionHandler<C, S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandler")
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}
