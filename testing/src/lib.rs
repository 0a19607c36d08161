//! # Action HTTP Testing
//!
//! Testing utilities for the cancellable HTTP action middleware.
//!
//! This crate provides:
//! - A scripted [`HttpClient`](action_http_core::HttpClient) ([`MockClient`])
//! - A recording pipeline `dispatch` and a minimal store
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use action_http_testing::{MockClient, MockResponse, RecordingDispatch};
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_cancelled_request() {
//!     let client = MockClient::new()
//!         .fallback(MockResponse::default().with_delay(Duration::from_secs(10)));
//!     let recorder = RecordingDispatch::new();
//!     let handler = HttpMiddleware::new(HttpConfig::default(), client)
//!         .bind(recorder.api())
//!         .wrap(|_| ());
//!
//!     let handle = handler.handle(RequestAction::new("/slow").into()).into_request().unwrap();
//!     cancel(&handle);
//!
//!     assert_eq!(recorder.types(), vec!["@@http/SEND", "@@http/CANCEL"]);
//! }
//! ```

/// Mock transport, recording dispatch and test store
pub mod mocks;

/// Given-When-Then reducer tests
pub mod reducer_test;

pub use mocks::{MockClient, MockResponse, RecordingDispatch, TestStore};
pub use reducer_test::{ReducerTest, assertions};

/// Install a `tracing` subscriber for tests
///
/// Honors `RUST_LOG` and defaults to `debug` for the middleware crates.
/// Output goes through the test writer so it is captured per test. Calling
/// it more than once is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "action_http_runtime=debug,action_http_core=debug".into());
    // Another test may have installed the subscriber already.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
