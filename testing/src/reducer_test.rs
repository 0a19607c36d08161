//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use action_http_core::reducer::Reducer;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Actions given to [`when_action`](Self::when_action) are applied in order,
/// so a whole lifecycle (`SEND` then `SUCCESS`) can be replayed in one test.
///
/// # Example
///
/// ```ignore
/// use action_http_testing::ReducerTest;
///
/// ReducerTest::new(handle_http("query", HttpHandlers::new()))
///     .given_state(FlowState::default())
///     .when_action(lifecycle("flows/query", Status::Send))
///     .then_state(|state| {
///         assert!(state.ui.is_loading("query"));
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A>
where
    R: Reducer<State = S, Action = A>,
{
    reducer: R,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
}

impl<R, S, A> ReducerTest<R, S, A>
where
    R: Reducer<State = S, Action = A>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
        }
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to apply (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if the initial state or the action is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        for action in &self.actions {
            self.reducer.reduce(&mut state, action);
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }
    }
}

/// Helper assertions for dispatched actions
pub mod assertions {
    use action_http_core::{Action, Status};

    /// Assert the lifecycle statuses found in `actions`, in order
    ///
    /// Non-lifecycle actions are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the statuses differ from `expected`.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_lifecycle(actions: &[Action], expected: &[Status]) {
        let statuses: Vec<Status> = actions
            .iter()
            .filter_map(Action::as_lifecycle)
            .map(|lifecycle| lifecycle.status)
            .collect();
        assert_eq!(
            statuses, expected,
            "Expected lifecycle {expected:?}, but found {statuses:?}"
        );
    }

    /// Assert that no lifecycle action was dispatched
    ///
    /// # Panics
    ///
    /// Panics if any action in `actions` is a lifecycle action.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_lifecycle(actions: &[Action]) {
        assert!(
            actions.iter().all(|a| a.as_lifecycle().is_none()),
            "Expected no lifecycle actions, but found {actions:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_http_core::indicator::{HasUi, HttpHandlers, UiState, handle_http};
    use action_http_core::{Action, HttpError, LifecycleAction, LifecyclePayload, Status};

    #[derive(Debug, Default)]
    struct TestState {
        ui: UiState,
        errors: usize,
    }

    impl HasUi for TestState {
        fn ui(&self) -> &UiState {
            &self.ui
        }

        fn ui_mut(&mut self) -> &mut UiState {
            &mut self.ui
        }
    }

    fn lifecycle(status: Status, payload: Option<LifecyclePayload>) -> Action {
        LifecycleAction::new("test/load", status, payload, None).into()
    }

    #[test]
    fn test_reducer_test_send_then_failure() {
        ReducerTest::new(
            handle_http(
                "load",
                HttpHandlers::new().on_failure(|state: &mut TestState, _| state.errors += 1),
            )
            .scoped("test/load"),
        )
        .given_state(TestState::default())
        .when_action(lifecycle(Status::Send, None))
        .when_action(lifecycle(
            Status::Failure,
            Some(LifecyclePayload::Error(HttpError::Network("down".into()))),
        ))
        .then_state(|state| {
            assert_eq!(state.ui.get("load"), Some(Status::Failure));
            assert_eq!(state.errors, 1);
        })
        .run();
    }

    #[test]
    fn test_reducer_test_ignores_custom_actions() {
        ReducerTest::new(handle_http("load", HttpHandlers::<TestState>::new()))
            .given_state(TestState::default())
            .when_action(Action::custom("other"))
            .then_state(|state| assert_eq!(state.ui, UiState::default()))
            .run();
    }

    #[test]
    fn test_assertions_lifecycle() {
        let actions = vec![
            Action::custom("other"),
            lifecycle(Status::Send, None),
            lifecycle(Status::Cancel, None),
        ];
        assertions::assert_lifecycle(&actions, &[Status::Send, Status::Cancel]);
        assertions::assert_no_lifecycle(&actions[..1]);
    }
}
