//! # Action HTTP Runtime
//!
//! Runtime side of the cancellable HTTP action middleware.
//!
//! This crate performs the requests that `action-http-core` describes: it
//! intercepts matching request actions, runs them through an injected
//! [`HttpClient`](action_http_core::HttpClient) on a Tokio task, and
//! dispatches their lifecycle actions back into the pipeline.
//!
//! ## Core Components
//!
//! - **`HttpMiddleware`**: The three-stage middleware (`bind` / `wrap` / `handle`)
//! - **`RequestHandle`**: Awaitable, cancellable handle of one in-flight request
//! - **`LifecycleDispatcher`**: Emits `SEND` / `SUCCESS` / `FAILURE` / `CANCEL`
//! - **`ReqwestClient`**: Production transport on top of `reqwest`
//!
//! ## Example
//!
//! ```ignore
//! use action_http_core::{HttpConfig, MiddlewareApi, RequestAction, cancel, is_cancel};
//! use action_http_runtime::{HttpMiddleware, ReqwestClient};
//!
//! let middleware = HttpMiddleware::new(
//!     HttpConfig::default().with_base_url("http://api.domain.com"),
//!     ReqwestClient::new(),
//! );
//! let handler = middleware
//!     .bind(MiddlewareApi::from_dispatch(move |action| store.dispatch(action)))
//!     .wrap(|action| next(action));
//!
//! let handle = handler
//!     .handle(RequestAction::new("/somepath").with_name("getSomeThing").into())
//!     .into_request()
//!     .unwrap();
//!
//! cancel(&handle);
//! assert!(is_cancel(&handle.await.unwrap_err()));
//! ```

/// reqwest-backed transport
pub mod client;

/// Lifecycle action dispatch
pub mod lifecycle;

/// Metrics recorded through the `metrics` facade
pub mod metrics;

/// The middleware itself
pub mod middleware;

/// In-flight request execution and handles
pub mod request;

pub use action_http_core::{cancel, is_cancel};
pub use client::ReqwestClient;
pub use lifecycle::LifecycleDispatcher;
pub use middleware::{ActionHandler, BoundMiddleware, Dispatched, HttpMiddleware};
pub use request::{RequestHandle, spawn_request};
