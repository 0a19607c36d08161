//! Transport seam
//!
//! The middleware never talks to the network itself. It hands merged
//! [`RequestOptions`] to an injected [`HttpClient`] and treats dropping the
//! returned future as aborting the request.

use crate::error::HttpError;
use crate::options::RequestOptions;
use futures::future::BoxFuture;
use std::collections::BTreeMap;

/// Result of a transport call
pub type HttpResult = Result<HttpResponse, HttpError>;

/// Response of a successful request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lower-case names)
    pub headers: BTreeMap<String, String>,
    /// Decoded body: parsed JSON, a string for non-JSON text, `Null` when empty
    pub data: serde_json::Value,
}

impl HttpResponse {
    /// Response with `status` and JSON `data`, no headers
    #[must_use]
    pub fn new(status: u16, data: serde_json::Value) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            data,
        }
    }

    /// Whether `status` is in `200..=299`
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// HTTP client injected into the middleware
///
/// Implementations resolve with a response for 2xx statuses and with
/// [`HttpError::Status`] otherwise. Dropping the future must abort the
/// in-flight request.
///
/// # Example
///
/// ```ignore
/// struct Fixed;
///
/// impl HttpClient for Fixed {
///     fn request(&self, _options: RequestOptions) -> BoxFuture<'static, HttpResult> {
///         Box::pin(async { Ok(HttpResponse::new(200, serde_json::json!({}))) })
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Perform the request described by `options`
    ///
    /// `options` already has the middleware defaults merged in.
    fn request(&self, options: RequestOptions) -> BoxFuture<'static, HttpResult>;
}

impl<C: HttpClient + ?Sized> HttpClient for std::sync::Arc<C> {
    fn request(&self, options: RequestOptions) -> BoxFuture<'static, HttpResult> {
        (**self).request(options)
    }
}
