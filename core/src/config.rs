//! Middleware configuration.
//!
//! A [`HttpConfig`] is created once, handed to the middleware factory, and never
//! changes afterwards.

use crate::options::RequestOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the default base URL.
pub const ENV_BASE_URL: &str = "ACTION_HTTP_BASE_URL";
/// Environment variable holding the default timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "ACTION_HTTP_TIMEOUT_MS";
/// Environment variable holding the action type filter.
pub const ENV_TYPE: &str = "ACTION_HTTP_TYPE";

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

/// Which lifecycle action the cancel path dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelDispatch {
    /// `<name>/CANCEL` with status `cancel`
    #[default]
    Cancel,
    /// `<name>/FAILURE` with status `failure`, carrying the cancellation error
    ///
    /// For hosts whose reducers only know send/success/failure.
    Failure,
}

/// HTTP middleware configuration.
///
/// Deserializes from the flat shape `{ "type": ..., "baseURL": ..., ... }`:
/// `type` is the action type filter, every other key is a default
/// [`RequestOptions`] field.
///
/// # Example
///
/// ```
/// use action_http_core::config::HttpConfig;
///
/// let config = HttpConfig::default()
///     .with_type("@@http/SEND")
///     .with_base_url("http://api.domain.com");
///
/// assert_eq!(config.action_type.as_deref(), Some("@@http/SEND"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Only request actions with this type are intercepted, when set
    #[serde(rename = "type")]
    pub action_type: Option<String>,

    /// Transport defaults, overridden by each request's own options
    #[serde(flatten)]
    pub defaults: RequestOptions,

    /// Lifecycle action emitted on cancellation
    pub cancel_dispatch: CancelDispatch,
}

impl HttpConfig {
    /// Configuration with the given transport defaults
    #[must_use]
    pub fn new(defaults: RequestOptions) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// Load from `ACTION_HTTP_*` environment variables
    ///
    /// Unset variables leave the default in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `ACTION_HTTP_TIMEOUT_MS` is not a
    /// number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the timeout is not a number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.defaults.base_url = Some(base_url);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let timeout = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            config.defaults.timeout_ms = Some(timeout);
        }
        if let Some(action_type) = lookup(ENV_TYPE) {
            config.action_type = Some(action_type);
        }

        Ok(config)
    }

    /// Set the action type filter
    #[must_use]
    pub fn with_type(mut self, action_type: impl Into<String>) -> Self {
        self.action_type = Some(action_type.into());
        self
    }

    /// Set the default base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.defaults.base_url = Some(base_url.into());
        self
    }

    /// Replace the transport defaults
    #[must_use]
    pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the cancel dispatch mode
    #[must_use]
    pub const fn with_cancel_dispatch(mut self, cancel_dispatch: CancelDispatch) -> Self {
        self.cancel_dispatch = cancel_dispatch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_deserialize_flat_shape() {
        let config: HttpConfig = serde_json::from_value(serde_json::json!({
            "type": "@@http/SEND",
            "baseURL": "http://api.domain.com",
            "headers": { "accept": "application/json" }
        }))
        .unwrap();

        assert_eq!(config.action_type.as_deref(), Some("@@http/SEND"));
        assert_eq!(config.defaults.base_url.as_deref(), Some("http://api.domain.com"));
        assert_eq!(config.defaults.headers.len(), 1);
        assert_eq!(config.cancel_dispatch, CancelDispatch::Cancel);
    }

    #[test]
    fn test_deserialize_empty_is_default() {
        let config: HttpConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(config, HttpConfig::default());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URL, "http://localhost:8080"),
            (ENV_TIMEOUT_MS, "1500"),
            (ENV_TYPE, "@@http/SEND"),
        ]
        .into_iter()
        .collect();

        let config = HttpConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string())).unwrap();
        assert_eq!(config.defaults.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.defaults.timeout_ms, Some(1500));
        assert_eq!(config.action_type.as_deref(), Some("@@http/SEND"));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let result = HttpConfig::from_lookup(|k| (k == ENV_TIMEOUT_MS).then(|| "soon".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: ENV_TIMEOUT_MS, .. })
        ));
    }

    #[test]
    fn test_from_lookup_nothing_set() {
        let config = HttpConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, HttpConfig::default());
    }
}
