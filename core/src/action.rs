//! Pipeline actions
//!
//! [`Action`] is the value flowing through the dispatch pipeline. Request
//! actions go in, lifecycle actions come back out; anything else is passed
//! along untouched.

use crate::error::HttpError;
use crate::options::RequestOptions;
use crate::transport::HttpResponse;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used for lifecycle types when a request action carries no `name`.
pub const DEFAULT_NAME: &str = "@@http";

/// UI marker attached to a request and echoed on its lifecycle actions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Indicator {
    /// Entity the request is about (a row, a form)
    pub id: String,
}

impl Indicator {
    /// Create an indicator for `id`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Phase of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Request started
    Send,
    /// Transport answered with a 2xx response
    Success,
    /// Transport failed or answered with a non-2xx response
    Failure,
    /// Request was cancelled before it settled
    Cancel,
}

impl Status {
    /// Suffix used in lifecycle action types (`SEND`, `SUCCESS`, ...)
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Send => "SEND",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Cancel => "CANCEL",
        }
    }

    /// Lower-case status name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancel => "cancel",
        }
    }

    /// Whether the request is over (anything but `Send`)
    ///
    /// Indicator logic that clears a loading marker keys on this rather than
    /// on a specific terminal status.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Send)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data carried by a lifecycle action
#[derive(Debug, Clone, PartialEq)]
pub enum LifecyclePayload {
    /// Response of a successful request
    Response(HttpResponse),
    /// Error of a failed or cancelled request
    Error(HttpError),
}

/// Action describing one phase of a request
///
/// `action_type` is always `<name>/<SUFFIX>`.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleAction {
    /// `<name>/SEND`, `<name>/SUCCESS`, `<name>/FAILURE` or `<name>/CANCEL`
    pub action_type: String,
    /// Phase of the request
    pub status: Status,
    /// Response or error, absent on send
    pub payload: Option<LifecyclePayload>,
    /// Indicator copied from the request action
    pub indicator: Option<Indicator>,
}

impl LifecycleAction {
    /// Build a lifecycle action for request `name`
    ///
    /// An empty `name` falls back to [`DEFAULT_NAME`].
    #[must_use]
    pub fn new(
        name: &str,
        status: Status,
        payload: Option<LifecyclePayload>,
        indicator: Option<Indicator>,
    ) -> Self {
        Self {
            action_type: lifecycle_type(name, status),
            status,
            payload,
            indicator,
        }
    }

    /// Request name this action belongs to (text before the last `/`)
    #[must_use]
    pub fn name(&self) -> &str {
        self.action_type
            .rsplit_once('/')
            .map_or(self.action_type.as_str(), |(name, _)| name)
    }

    /// Response, when this is a success
    #[must_use]
    pub const fn response(&self) -> Option<&HttpResponse> {
        match &self.payload {
            Some(LifecyclePayload::Response(response)) => Some(response),
            _ => None,
        }
    }

    /// Error, when this is a failure or cancel
    #[must_use]
    pub const fn error(&self) -> Option<&HttpError> {
        match &self.payload {
            Some(LifecyclePayload::Error(error)) => Some(error),
            _ => None,
        }
    }
}

/// `<name>/<SUFFIX>` for a lifecycle status
#[must_use]
pub fn lifecycle_type(name: &str, status: Status) -> String {
    let name = if name.is_empty() { DEFAULT_NAME } else { name };
    format!("{name}/{}", status.suffix())
}

/// Action describing an HTTP request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestAction {
    /// Pipeline type, compared against the middleware's type filter
    pub action_type: Option<String>,
    /// Prefix for lifecycle action types
    pub name: Option<String>,
    /// UI marker echoed on every lifecycle action
    pub indicator: Option<Indicator>,
    /// Per-call transport options, `url` included
    pub request: RequestOptions,
}

impl RequestAction {
    /// Request action for `url` with no type, name or indicator
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            request: RequestOptions::get(url),
            ..Self::default()
        }
    }

    /// Set the pipeline type
    #[must_use]
    pub fn with_type(mut self, action_type: impl Into<String>) -> Self {
        self.action_type = Some(action_type.into());
        self
    }

    /// Set the request name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the indicator
    #[must_use]
    pub fn with_indicator(mut self, indicator: Indicator) -> Self {
        self.indicator = Some(indicator);
        self
    }

    /// Replace the transport options (keeps `url` when `options` has none)
    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.request = self.request.merge(&options);
        self
    }

    /// Request URL, if any
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.request.url.as_deref()
    }

    /// Name used for lifecycle types
    ///
    /// Falls back to [`DEFAULT_NAME`] when no (or an empty) name is set.
    #[must_use]
    pub fn lifecycle_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_NAME,
        }
    }
}

/// Value dispatched through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Describes an HTTP request
    Request(RequestAction),
    /// Emitted by the middleware around a request
    Lifecycle(LifecycleAction),
    /// Any other application action
    Custom {
        /// Action type
        action_type: String,
        /// Free-form payload
        payload: serde_json::Value,
    },
}

impl Action {
    /// Application action with a `Null` payload
    #[must_use]
    pub fn custom(action_type: impl Into<String>) -> Self {
        Self::Custom {
            action_type: action_type.into(),
            payload: serde_json::Value::Null,
        }
    }

    /// Pipeline type of the action, if it has one
    #[must_use]
    pub fn action_type(&self) -> Option<&str> {
        match self {
            Self::Request(request) => request.action_type.as_deref(),
            Self::Lifecycle(lifecycle) => Some(&lifecycle.action_type),
            Self::Custom { action_type, .. } => Some(action_type),
        }
    }

    /// The lifecycle action, if this is one
    #[must_use]
    pub const fn as_lifecycle(&self) -> Option<&LifecycleAction> {
        match self {
            Self::Lifecycle(lifecycle) => Some(lifecycle),
            _ => None,
        }
    }
}

impl From<RequestAction> for Action {
    fn from(request: RequestAction) -> Self {
        Self::Request(request)
    }
}

impl From<LifecycleAction> for Action {
    fn from(lifecycle: LifecycleAction) -> Self {
        Self::Lifecycle(lifecycle)
    }
}
