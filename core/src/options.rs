//! Request options and the defaults-then-overrides merge
//!
//! The middleware holds one set of default options for its whole lifetime and
//! every request action brings its own. [`RequestOptions::merge`] combines the
//! two in a fixed order: defaults first, call site second.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// HTTP method of a request action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET` (used when no method is given)
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl Method {
    /// Upper-case wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport options of one request
///
/// Every field is optional so the same type describes both the middleware
/// defaults and the per-action options. Header names are stored lower-cased.
///
/// # Example
///
/// ```
/// use action_http_core::options::{Method, RequestOptions};
///
/// let defaults = RequestOptions::new()
///     .with_base_url("http://api.domain.com")
///     .with_header("Accept", "application/json");
///
/// let call = RequestOptions::get("/somepath").with_method(Method::Post);
///
/// let merged = defaults.merge(&call);
/// assert_eq!(merged.resolved_url().as_deref(), Some("http://api.domain.com/somepath"));
/// assert_eq!(merged.method(), Method::Post);
/// assert_eq!(merged.headers.get("accept").map(String::as_str), Some("application/json"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Request path or absolute URL
    pub url: Option<String>,
    /// HTTP method (`GET` when unset)
    pub method: Option<Method>,
    /// Prefix joined in front of relative `url`s
    #[serde(alias = "baseURL", alias = "baseUrl")]
    pub base_url: Option<String>,
    /// Request headers (lower-case names)
    pub headers: BTreeMap<String, String>,
    /// Query string parameters
    pub params: BTreeMap<String, String>,
    /// JSON request body
    pub data: Option<serde_json::Value>,
    /// Timeout in milliseconds
    #[serde(alias = "timeout")]
    pub timeout_ms: Option<u64>,
}

impl RequestOptions {
    /// Empty options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a `GET` of `url`
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the request URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the method
    #[must_use]
    pub const fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a header (name is lower-cased)
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the JSON body
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the timeout
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // u64 milliseconds covers any practical timeout
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Effective method
    #[must_use]
    pub fn method(&self) -> Method {
        self.method.unwrap_or_default()
    }

    /// Effective timeout
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Merge `overrides` on top of `self`
    ///
    /// Scalar fields from `overrides` replace those of `self` when set.
    /// Headers and params merge per key, `overrides` winning on conflicts.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        let mut headers: BTreeMap<String, String> = self
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        headers.extend(
            overrides
                .headers
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.clone())),
        );

        let mut params = self.params.clone();
        params.extend(overrides.params.clone());

        Self {
            url: overrides.url.clone().or_else(|| self.url.clone()),
            method: overrides.method.or(self.method),
            base_url: overrides.base_url.clone().or_else(|| self.base_url.clone()),
            headers,
            params,
            data: overrides.data.clone().or_else(|| self.data.clone()),
            timeout_ms: overrides.timeout_ms.or(self.timeout_ms),
        }
    }

    /// Target URL after joining `base_url` and `url`
    ///
    /// Absolute URLs (`scheme://...` or `//host`) ignore the base. Returns
    /// `None` when no `url` is set.
    #[must_use]
    pub fn resolved_url(&self) -> Option<String> {
        let url = self.url.as_deref()?;
        match self.base_url.as_deref() {
            Some(base) if !is_absolute_url(url) => Some(combine_urls(base, url)),
            _ => Some(url.to_string()),
        }
    }
}

fn combine_urls(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

fn is_absolute_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid_scheme && rest.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base_url_joins_relative_path() {
        let options = RequestOptions::get("/somepath").with_base_url("http://api.domain.com");
        assert_eq!(
            options.resolved_url().as_deref(),
            Some("http://api.domain.com/somepath")
        );

        let options = RequestOptions::get("somepath").with_base_url("http://api.domain.com/");
        assert_eq!(
            options.resolved_url().as_deref(),
            Some("http://api.domain.com/somepath")
        );
    }

    #[test]
    fn test_absolute_url_ignores_base() {
        let options =
            RequestOptions::get("https://other.com/x").with_base_url("http://api.domain.com");
        assert_eq!(options.resolved_url().as_deref(), Some("https://other.com/x"));

        let options = RequestOptions::get("//cdn.com/x").with_base_url("http://api.domain.com");
        assert_eq!(options.resolved_url().as_deref(), Some("//cdn.com/x"));
    }

    #[test]
    fn test_missing_url_resolves_to_none() {
        let options = RequestOptions::new().with_base_url("http://api.domain.com");
        assert_eq!(options.resolved_url(), None);
    }

    #[test]
    fn test_merge_call_site_wins() {
        let defaults = RequestOptions::new()
            .with_base_url("http://a.com")
            .with_method(Method::Post)
            .with_timeout(Duration::from_secs(5))
            .with_header("X-Token", "default")
            .with_header("Accept", "application/json")
            .with_param("page", "1");
        let call = RequestOptions::get("/p")
            .with_header("x-token", "call")
            .with_param("limit", "10");

        let merged = defaults.merge(&call);

        assert_eq!(merged.method(), Method::Post);
        assert_eq!(merged.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(merged.headers.get("x-token").map(String::as_str), Some("call"));
        assert_eq!(
            merged.headers.get("accept").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(merged.params.len(), 2);
        assert_eq!(merged.resolved_url().as_deref(), Some("http://a.com/p"));
    }

    #[test]
    fn test_deserialize_accepts_axios_style_keys() {
        let options: RequestOptions = serde_json::from_value(serde_json::json!({
            "baseURL": "http://api.domain.com",
            "method": "DELETE",
            "timeout": 250
        }))
        .unwrap();
        assert_eq!(options.base_url.as_deref(), Some("http://api.domain.com"));
        assert_eq!(options.method(), Method::Delete);
        assert_eq!(options.timeout_ms, Some(250));
    }

    proptest! {
        #[test]
        fn prop_base_plus_path(host in "[a-z]{1,10}", path in "[a-z0-9]{1,10}") {
            let base = format!("http://{host}.com");
            let options = RequestOptions::get(format!("/{path}")).with_base_url(base.clone());
            prop_assert_eq!(options.resolved_url(), Some(format!("{base}/{path}")));
        }

        #[test]
        fn prop_merge_with_empty_is_identity(
            url in proptest::option::of("/[a-z]{0,8}"),
            timeout in proptest::option::of(0u64..10_000),
        ) {
            let options = RequestOptions { url, timeout_ms: timeout, ..RequestOptions::default() };
            prop_assert_eq!(&options.merge(&RequestOptions::new()), &options);
            prop_assert_eq!(&RequestOptions::new().merge(&options), &options);
        }
    }
}
