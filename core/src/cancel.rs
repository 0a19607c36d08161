//! One-shot cancellation tokens and the cancellation predicate
//!
//! A [`CancelToken`] is shared by the caller, who may cancel, and the
//! middleware, which settles it when the transport finishes. Whichever side
//! gets there first wins; the other becomes a no-op.
//!
//! # Example
//!
//! ```
//! use action_http_core::cancel::{CancelToken, cancel, is_cancel};
//! use std::sync::{Arc, Mutex};
//!
//! let token = CancelToken::new();
//! let seen = Arc::new(Mutex::new(None));
//! let sink = Arc::clone(&seen);
//! token.on_cancel(move |error| *sink.lock().unwrap() = Some(error));
//!
//! assert!(cancel(&token));
//! assert!(!cancel(&token)); // already cancelled
//! assert!(!token.try_settle()); // transport lost the race
//!
//! let error = seen.lock().unwrap().take().unwrap();
//! assert!(is_cancel(&error));
//! ```

use crate::error::{DEFAULT_CANCEL_MESSAGE, HttpError};
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

const PENDING: u8 = 0;
const SETTLED: u8 = 1;
const CANCELLED: u8 = 2;

type CancelHook = Box<dyn FnOnce(HttpError) + Send>;

struct TokenInner {
    state: AtomicU8,
    hook: Mutex<Option<CancelHook>>,
}

impl TokenInner {
    fn take_hook(&self) -> Option<CancelHook> {
        self.hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// One-shot handle deciding the race between settle and cancel
///
/// Cloning shares the same token.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    /// Create a pending token
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner {
                state: AtomicU8::new(PENDING),
                hook: Mutex::new(None),
            }),
        }
    }

    /// Register the cancellation path
    ///
    /// `hook` runs at most once, synchronously inside the winning
    /// [`cancel`](Self::cancel_with) call, with the cancellation error. A hook
    /// registered after the token was cancelled runs immediately; one
    /// registered after settle never runs. Registering again replaces a hook
    /// that has not run yet.
    pub fn on_cancel<F>(&self, hook: F)
    where
        F: FnOnce(HttpError) + Send + 'static,
    {
        if self.is_settled() {
            return;
        }
        *self
            .inner
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Box::new(hook));

        // The state may have moved while the hook was being stored.
        if self.is_cancelled() {
            if let Some(hook) = self.inner.take_hook() {
                hook(HttpError::cancelled());
            }
        } else if self.is_settled() {
            drop(self.inner.take_hook());
        }
    }

    /// Claim the token for the transport's own result
    ///
    /// Returns `true` if the request had neither settled nor been cancelled;
    /// the caller then owns the terminal dispatch. Drops the cancel hook.
    pub fn try_settle(&self) -> bool {
        let won = self
            .inner
            .state
            .compare_exchange(PENDING, SETTLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            drop(self.inner.take_hook());
        }
        won
    }

    /// Cancel with the default message
    ///
    /// See [`cancel_with`](Self::cancel_with).
    pub fn cancel(&self) -> bool {
        self.cancel_with(DEFAULT_CANCEL_MESSAGE)
    }

    /// Cancel with a reason
    ///
    /// Returns `true` if this call won the race and ran the cancel hook;
    /// `false` if the token was already settled or cancelled.
    pub fn cancel_with(&self, message: impl Into<String>) -> bool {
        let won = self
            .inner
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            if let Some(hook) = self.inner.take_hook() {
                hook(HttpError::Cancelled {
                    message: message.into(),
                });
            }
        }
        won
    }

    /// Neither settled nor cancelled yet
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == PENDING
    }

    /// Settled by the transport
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == SETTLED
    }

    /// Cancelled by a caller
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == CANCELLED
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner.state.load(Ordering::Acquire) {
            PENDING => "pending",
            SETTLED => "settled",
            _ => "cancelled",
        };
        f.debug_struct("CancelToken")
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

/// Anything that can locate the token of an in-flight request
pub trait Cancellable {
    /// The request's cancellation token
    fn cancel_token(&self) -> &CancelToken;
}

impl Cancellable for CancelToken {
    fn cancel_token(&self) -> &CancelToken {
        self
    }
}

/// Cancel the request behind `target`
///
/// Idempotent. Cancelling a settled or already cancelled request does
/// nothing and returns `false`.
pub fn cancel<C: Cancellable + ?Sized>(target: &C) -> bool {
    target.cancel_token().cancel()
}

/// Whether `error` was produced by the cancellation path
///
/// Looks at `error` and its [`source`](Error::source) chain, so a
/// cancellation wrapped by an application error is still recognised. Status,
/// network and any other errors return `false`.
#[must_use]
pub fn is_cancel(error: &(dyn Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(error) = current {
        if error
            .downcast_ref::<HttpError>()
            .is_some_and(HttpError::is_cancel)
        {
            return true;
        }
        current = error.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_hook(token: &CancelToken) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        token.on_cancel(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        calls
    }

    #[test]
    fn test_cancel_runs_hook_once() {
        let token = CancelToken::new();
        let calls = counting_hook(&token);

        assert!(token.cancel());
        assert!(!token.cancel());
        assert!(!cancel(&token));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_settle_then_cancel_is_noop() {
        let token = CancelToken::new();
        let calls = counting_hook(&token);

        assert!(token.try_settle());
        assert!(!token.cancel());
        assert!(!token.try_settle());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(token.is_settled());
    }

    #[test]
    fn test_hook_after_cancel_runs_immediately() {
        let token = CancelToken::new();
        assert!(token.cancel());
        let calls = counting_hook(&token);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hook_after_settle_never_runs() {
        let token = CancelToken::new();
        assert!(token.try_settle());
        let calls = counting_hook(&token);
        assert!(!token.cancel());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(clone.cancel());
        assert!(!token.is_pending());
        assert!(!token.try_settle());
    }

    #[test]
    fn test_cancel_with_message() {
        let token = CancelToken::new();
        let message = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&message);
        token.on_cancel(move |error| {
            if let HttpError::Cancelled { message } = error {
                *sink.lock().unwrap() = message;
            }
        });
        assert!(token.cancel_with("user navigated away"));
        assert_eq!(*message.lock().unwrap(), "user navigated away");
    }

    #[test]
    fn test_concurrent_race_has_single_winner() {
        for _ in 0..200 {
            let token = CancelToken::new();
            let a = token.clone();
            let b = token.clone();
            let settle = std::thread::spawn(move || a.try_settle());
            let cancel = std::thread::spawn(move || b.cancel());
            let settled = settle.join().unwrap();
            let cancelled = cancel.join().unwrap();
            assert!(settled ^ cancelled);
        }
    }

    #[test]
    fn test_hook_is_not_retained_once_settled() {
        let token = CancelToken::new();
        assert!(token.try_settle());
        let captured = Arc::new(());
        let held = Arc::clone(&captured);
        token.on_cancel(move |_| drop(held));
        assert_eq!(Arc::strong_count(&captured), 1);
    }

    #[test]
    fn test_hook_registered_during_settle_is_released() {
        for _ in 0..200 {
            let token = CancelToken::new();
            let captured = Arc::new(());
            let settler = token.clone();
            let settle = std::thread::spawn(move || settler.try_settle());
            let held = Arc::clone(&captured);
            token.on_cancel(move |_| drop(held));
            assert!(settle.join().unwrap());
            assert_eq!(Arc::strong_count(&captured), 1);
        }
    }

    #[derive(Debug)]
    struct Wrapped(HttpError);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "loading flows failed")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_is_cancel_predicate() {
        assert!(is_cancel(&HttpError::cancelled()));
        assert!(is_cancel(&Wrapped(HttpError::cancelled())));

        assert!(!is_cancel(&HttpError::Status {
            status: 400,
            data: serde_json::Value::Null,
        }));
        assert!(!is_cancel(&HttpError::Network("reset".into())));
        assert!(!is_cancel(&Wrapped(HttpError::Timeout(10))));
        assert!(!is_cancel(&std::io::Error::other("boom")));
    }
}
