//! # Action HTTP Core
//!
//! Core types for the cancellable HTTP action middleware.
//!
//! The middleware sits in a unidirectional dispatch pipeline. Actions that
//! describe an HTTP request are intercepted, performed through an injected
//! [`HttpClient`], and reported back to the pipeline as lifecycle actions.
//! This crate holds everything that is pure data or pure logic; the
//! middleware itself lives in `action-http-runtime`.
//!
//! ## Core Concepts
//!
//! - **Request action**: [`RequestAction`] - carries a `url`, an optional
//!   `name` and per-call [`RequestOptions`]
//! - **Matcher**: [`matcher::matches`] - which actions the middleware takes
//! - **Lifecycle action**: [`LifecycleAction`] - `<name>/SEND`, `/SUCCESS`,
//!   `/FAILURE`, `/CANCEL`
//! - **Cancellation**: [`CancelToken`], [`cancel()`] and [`is_cancel`]
//! - **Indicators**: [`indicator::handle_http`] - lifecycle actions into a UI slice
//!
//! ## Lifecycle wire contract
//!
//! ```text
//! { type: "<name>/SEND" | "<name>/SUCCESS" | "<name>/FAILURE" | "<name>/CANCEL",
//!   status: send | success | failure | cancel,
//!   payload?: response | error,
//!   indicator?: { id } }
//! ```
//!
//! `SEND` always comes first and exactly one of the others follows.

/// Pipeline actions (request, lifecycle, custom)
pub mod action;

/// Cancellation tokens and the cancellation predicate
pub mod cancel;

/// Middleware configuration
pub mod config;

/// Error types
pub mod error;

/// Indicator reducers
pub mod indicator;

/// Action matcher
pub mod matcher;

/// Request options and default merging
pub mod options;

/// Dispatch pipeline contract
pub mod pipeline;

/// Reducer trait
pub mod reducer;

/// Transport seam
pub mod transport;

pub use action::{
    Action, DEFAULT_NAME, Indicator, LifecycleAction, LifecyclePayload, RequestAction, Status,
};
pub use cancel::{CancelToken, Cancellable, cancel, is_cancel};
pub use config::{CancelDispatch, ConfigError, HttpConfig};
pub use error::HttpError;
pub use options::{Method, RequestOptions};
pub use pipeline::{Dispatch, MiddlewareApi};
pub use reducer::Reducer;
pub use transport::{HttpClient, HttpResponse, HttpResult};
