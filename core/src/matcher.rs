//! Action matcher
//!
//! Decides whether a pipeline action is a request the middleware intercepts.

use crate::action::{Action, RequestAction};
use crate::config::HttpConfig;

/// Whether `action` is an HTTP request action the middleware should handle.
///
/// Only [`Action::Request`] values carrying a `url` can match. With no type
/// filter configured every such action matches; with a filter, the action's
/// own type must equal it (a missing type never matches).
///
/// # Example
///
/// ```
/// use action_http_core::{Action, HttpConfig, RequestAction, matcher::matches};
///
/// let config = HttpConfig::default().with_type("@@http/SEND");
///
/// assert!(!matches(&config, &RequestAction::new("/p").into()));
/// assert!(matches(&config, &RequestAction::new("/p").with_type("@@http/SEND").into()));
/// assert!(!matches(&config, &Action::custom("@@http/SEND")));
/// ```
#[must_use]
pub fn matches(config: &HttpConfig, action: &Action) -> bool {
    match action {
        Action::Request(request) => request_matches(config, request),
        _ => false,
    }
}

/// [`matches`] for an action already known to be a request
#[must_use]
pub fn request_matches(config: &HttpConfig, request: &RequestAction) -> bool {
    if request.url().is_none() {
        return false;
    }
    match config.action_type.as_deref() {
        None => true,
        Some(filter) => request.action_type.as_deref() == Some(filter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{LifecycleAction, RequestAction, Status};
    use crate::options::RequestOptions;
    use proptest::prelude::*;

    #[test]
    fn test_no_filter_matches_any_request_with_url() {
        let config = HttpConfig::default();
        assert!(matches(&config, &RequestAction::new("/somepath").into()));
        assert!(matches(
            &config,
            &RequestAction::new("/somepath").with_type("someType").into()
        ));
    }

    #[test]
    fn test_request_without_url_never_matches() {
        let action = Action::Request(RequestAction {
            request: RequestOptions::new().with_base_url("http://a.com"),
            ..RequestAction::default()
        });
        assert!(!matches(&HttpConfig::default(), &action));
        assert!(!matches(&HttpConfig::default().with_type("t"), &action));
    }

    #[test]
    fn test_filter_requires_equal_type() {
        let config = HttpConfig::default().with_type("@@http/SEND");
        assert!(!matches(&config, &RequestAction::new("/somepath").into()));
        assert!(!matches(
            &config,
            &RequestAction::new("/somepath").with_type("sometype").into()
        ));
        assert!(matches(
            &config,
            &RequestAction::new("/otherpath").with_type("@@http/SEND").into()
        ));
    }

    #[test]
    fn test_non_request_actions_never_match() {
        let config = HttpConfig::default();
        assert!(!matches(&config, &Action::custom("sometype")));
        assert!(!matches(
            &config,
            &LifecycleAction::new("x", Status::Send, None, None).into()
        ));
    }

    proptest! {
        #[test]
        fn prop_filter_matches_only_equal_type(
            filter in "[a-z@/]{1,12}",
            action_type in proptest::option::of("[a-z@/]{1,12}"),
            url in "/[a-z]{0,8}",
        ) {
            let config = HttpConfig::default().with_type(filter.clone());
            let mut request = RequestAction::new(url);
            request.action_type = action_type.clone();
            prop_assert_eq!(
                matches(&config, &request.into()),
                action_type.as_deref() == Some(filter.as_str())
            );
        }

        #[test]
        fn prop_custom_actions_pass_through(action_type in "[a-zA-Z/]{0,16}") {
            prop_assert!(!matches(&HttpConfig::default(), &Action::custom(action_type)));
        }
    }
}
