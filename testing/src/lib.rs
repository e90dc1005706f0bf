//! # Loading Store Testing
//!
//! Testing utilities for code built on the loading store.
//!
//! This crate provides:
//! - [`MockAction`]: a scripted async action that counts its invocations
//! - Status fixtures for the common outcomes of a single attempt
//! - [`TestStore`]: a store wired to three mock actions with distinct delays
//! - Tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use loading_store_testing::{fixtures, TestStore};
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_single_request() {
//!     let store = TestStore::new();
//!
//!     let response = store.make_request(RequestOptions::new()).await?;
//!
//!     assert_eq!(response, "response");
//!     assert_eq!(store.status(TestRequestType::Request), fixtures::SINGLE_SUCCESS);
//!     assert_eq!(store.request.calls(), 1);
//! }
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use loading_store_core::{HttpResponseError, RequestStatus};
use loading_store_runtime::{LoadingStore, LoadingStoreError, RequestOptions};

/// Mock actions for driving the store in tests
pub mod mocks {
    use super::{
        Arc, AtomicUsize, BoxFuture, Duration, HttpResponseError, Mutex, Ordering, PoisonError,
        VecDeque,
    };
    use thiserror::Error;

    /// Failure produced by a [`MockAction`]
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    #[error("{0}")]
    pub struct MockError(pub String);

    /// Scripted result of one [`MockAction`] call
    #[derive(Debug, Clone)]
    pub enum MockOutcome<R> {
        /// Resolve with the response
        Respond(R),

        /// Fail with a [`MockError`] carrying the message
        Fail(String),

        /// Fail with an HTTP-like error
        FailHttp {
            /// Response status
            status: u16,
            /// Response body
            data: serde_json::Value,
        },
    }

    impl<R> MockOutcome<R> {
        fn into_result(self) -> anyhow::Result<R> {
            match self {
                Self::Respond(response) => Ok(response),
                Self::Fail(message) => Err(MockError(message).into()),
                Self::FailHttp { status, data } => Err(HttpResponseError::new(status, data).into()),
            }
        }
    }

    #[derive(Debug)]
    struct Script<R> {
        delay: Duration,
        default: MockOutcome<R>,
        once: VecDeque<(Duration, MockOutcome<R>)>,
    }

    /// Async action that sleeps, then resolves with a scripted outcome
    ///
    /// Clones share the call counter and the script, so a clone can be handed
    /// to the store while the test keeps one for assertions.
    ///
    /// # Example
    ///
    /// ```
    /// use loading_store_testing::mocks::{MockAction, MockOutcome};
    /// use std::time::Duration;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let action = MockAction::new(Duration::ZERO, "response");
    /// action.once(Duration::ZERO, MockOutcome::Fail("nope".to_string()));
    ///
    /// assert!(action.call().await.is_err());
    /// assert_eq!(action.call().await.ok(), Some("response"));
    /// assert_eq!(action.calls(), 2);
    /// # }
    /// ```
    #[derive(Debug)]
    pub struct MockAction<R> {
        calls: Arc<AtomicUsize>,
        script: Arc<Mutex<Script<R>>>,
    }

    impl<R> Clone for MockAction<R> {
        fn clone(&self) -> Self {
            Self {
                calls: Arc::clone(&self.calls),
                script: Arc::clone(&self.script),
            }
        }
    }

    impl<R> MockAction<R>
    where
        R: Clone + Send + 'static,
    {
        /// Action that resolves with `response` after `delay`
        #[must_use]
        pub fn new(delay: Duration, response: R) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                script: Arc::new(Mutex::new(Script {
                    delay,
                    default: MockOutcome::Respond(response),
                    once: VecDeque::new(),
                })),
            }
        }

        /// Override the outcome of the next unscripted call
        ///
        /// Queued overrides are consumed in order.
        pub fn once(&self, delay: Duration, outcome: MockOutcome<R>) {
            self.lock().once.push_back((delay, outcome));
        }

        /// Number of times the action was invoked
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Forget recorded calls and queued overrides
        pub fn reset(&self) {
            self.calls.store(0, Ordering::SeqCst);
            self.lock().once.clear();
        }

        /// Invoke the action
        ///
        /// The call is counted and its outcome chosen immediately; the
        /// returned future only sleeps and resolves.
        pub fn call(&self) -> BoxFuture<'static, anyhow::Result<R>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, outcome) = {
                let mut script = self.lock();
                let default = (script.delay, script.default.clone());
                script.once.pop_front().unwrap_or(default)
            };

            Box::pin(async move {
                tokio::time::sleep(delay).await;
                outcome.into_result()
            })
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Script<R>> {
            self.script.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}

/// Canonical statuses and request types used across tests
pub mod fixtures {
    use super::RequestStatus;
    use std::fmt;

    /// Request types of the [`TestStore`](crate::TestStore)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum TestRequestType {
        /// 100ms action
        Request,
        /// 200ms action
        AnotherRequest,
        /// 300ms action
        YetAnotherRequest,
    }

    impl fmt::Display for TestRequestType {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Request => write!(f, "request"),
                Self::AnotherRequest => write!(f, "anotherRequest"),
                Self::YetAnotherRequest => write!(f, "yetAnotherRequest"),
            }
        }
    }

    /// Never touched
    pub const INITIAL: RequestStatus = RequestStatus::INITIAL;

    /// First attempt in flight
    pub const INITIAL_LOADING: RequestStatus = RequestStatus {
        loading: true,
        ..RequestStatus::INITIAL
    };

    /// One attempt, succeeded
    pub const SINGLE_SUCCESS: RequestStatus = RequestStatus {
        requested: true,
        loading: false,
        loaded: true,
        loaded_once: true,
        error: false,
        error_once: false,
    };

    /// One attempt, failed
    pub const SINGLE_ERROR: RequestStatus = RequestStatus {
        requested: true,
        loading: false,
        loaded: false,
        loaded_once: false,
        error: true,
        error_once: true,
    };
}

/// Test helpers and utilities
pub mod helpers {
    use super::{
        Duration, LoadingStore, LoadingStoreError, RequestOptions, RequestStatus,
        fixtures::TestRequestType, mocks::MockAction,
    };

    /// Install a `tracing` subscriber honoring `RUST_LOG`, once per process
    ///
    /// Later calls are no-ops, so every test can call it.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// A store over [`TestRequestType`] wired to one mock action per type
    ///
    /// Delays are 100ms, 200ms and 300ms; responses are `"response"`,
    /// `"another-response"` and `"yet-another-response"`.
    #[derive(Debug, Clone)]
    pub struct TestStore {
        /// The store under test
        pub store: LoadingStore<TestRequestType>,
        /// Action behind [`TestRequestType::Request`]
        pub request: MockAction<String>,
        /// Action behind [`TestRequestType::AnotherRequest`]
        pub another_request: MockAction<String>,
        /// Action behind [`TestRequestType::YetAnotherRequest`]
        pub yet_another_request: MockAction<String>,
    }

    impl Default for TestStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestStore {
        /// Fresh store and fresh actions
        #[must_use]
        pub fn new() -> Self {
            Self::with_store(LoadingStore::new())
        }

        /// Wrap an existing store (e.g. one with a custom extractor)
        #[must_use]
        pub fn with_store(store: LoadingStore<TestRequestType>) -> Self {
            Self {
                store,
                request: MockAction::new(Duration::from_millis(100), "response".to_string()),
                another_request: MockAction::new(
                    Duration::from_millis(200),
                    "another-response".to_string(),
                ),
                yet_another_request: MockAction::new(
                    Duration::from_millis(300),
                    "yet-another-response".to_string(),
                ),
            }
        }

        /// Run [`TestRequestType::Request`]
        ///
        /// # Errors
        ///
        /// Propagates the store's wait timeout and request errors.
        pub async fn make_request(
            &self,
            options: RequestOptions<String>,
        ) -> Result<String, LoadingStoreError<TestRequestType>> {
            self.store
                .request(TestRequestType::Request, || self.request.call(), options)
                .await
        }

        /// Run [`TestRequestType::AnotherRequest`]
        ///
        /// # Errors
        ///
        /// Propagates the store's wait timeout and request errors.
        pub async fn make_another_request(
            &self,
            options: RequestOptions<String>,
        ) -> Result<String, LoadingStoreError<TestRequestType>> {
            self.store
                .request(TestRequestType::AnotherRequest, || self.another_request.call(), options)
                .await
        }

        /// Run [`TestRequestType::YetAnotherRequest`]
        ///
        /// # Errors
        ///
        /// Propagates the store's wait timeout and request errors.
        pub async fn make_yet_another_request(
            &self,
            options: RequestOptions<String>,
        ) -> Result<String, LoadingStoreError<TestRequestType>> {
            self.store
                .request(
                    TestRequestType::YetAnotherRequest,
                    || self.yet_another_request.call(),
                    options,
                )
                .await
        }

        /// Run [`TestRequestType::Request`] through `request_undefined`
        ///
        /// # Errors
        ///
        /// Propagates the store's wait timeout.
        pub async fn make_request_undefined(
            &self,
            options: RequestOptions<String>,
        ) -> Result<Option<String>, LoadingStoreError<TestRequestType>> {
            self.store
                .request_undefined(TestRequestType::Request, || self.request.call(), options)
                .await
        }

        /// Current status of one request type
        #[must_use]
        pub fn status(&self, request_type: TestRequestType) -> RequestStatus {
            self.store.request_status(&request_type)
        }
    }
}

pub use fixtures::TestRequestType;
pub use helpers::{init_test_tracing, TestStore};
pub use mocks::{MockAction, MockError, MockOutcome};
