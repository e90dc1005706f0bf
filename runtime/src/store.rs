//! The loading store: request coordination over a status table.
//!
//! # Wait Gate
//!
//! Before an attempt starts, the store waits until no attempt of the same
//! request type is loading, bounded by a timeout. Once the type is idle the
//! attempt claims it by setting `loading` in the same table update that
//! observed it idle, so two waiters woken by the same completion cannot both
//! start. The loser goes back to waiting under its original deadline.
//!
//! Attempts of different request types never wait on each other.
//!
//! # Publishing
//!
//! The table lives in a `tokio::sync::watch` channel. Every mutation goes
//! through the sender, so subscribers always see whole updates and are woken
//! after each one.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use loading_store_core::{
    default_request_error_extractor, ErrorInstance, Lifecycle, RequestError,
    RequestErrorExtractor, RequestStatus, RequestType,
};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::LoadingStoreConfig;
use crate::error::LoadingStoreError;
use crate::lifecycle::LifecycleState;
use crate::metrics::RequestMetrics;
use crate::table::StatusTable;

type SuccessCallback<R> = Box<dyn FnOnce(&R) + Send>;
type ErrorCallback = Box<dyn FnOnce(&RequestError) + Send>;

/// Per-call request options
///
/// # Example
///
/// ```
/// use loading_store_runtime::RequestOptions;
/// use std::time::Duration;
///
/// let options = RequestOptions::<String>::new()
///     .with_wait_timeout(Duration::from_millis(25))
///     .on_success(|response| println!("got {response}"))
///     .on_error(|error| eprintln!("failed with code {}", error.code));
/// ```
pub struct RequestOptions<R> {
    wait_timeout: Option<Duration>,
    on_success: Option<SuccessCallback<R>>,
    on_error: Option<ErrorCallback>,
}

impl<R> RequestOptions<R> {
    /// Options with no overrides and no callbacks
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wait_timeout: None,
            on_success: None,
            on_error: None,
        }
    }

    /// Override the store's default wait timeout for this call
    #[must_use]
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    /// Called with the response after the success status is recorded
    #[must_use]
    pub fn on_success(mut self, f: impl FnOnce(&R) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Called with the extracted error after the failure status is recorded
    #[must_use]
    pub fn on_error(mut self, f: impl FnOnce(&RequestError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// The per-call wait timeout, if overridden
    #[must_use]
    pub const fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout
    }
}

impl<R> Default for RequestOptions<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for RequestOptions<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("wait_timeout", &self.wait_timeout)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Per-key request status store
///
/// The store owns a [`StatusTable`], publishes every change to subscribers,
/// and runs caller actions through [`request`](Self::request) and
/// [`request_undefined`](Self::request_undefined).
///
/// Clones are handles to the same store.
///
/// # Example
///
/// ```ignore
/// let store: LoadingStore<&'static str> = LoadingStore::new();
///
/// let user = store.request("user", || client.get_user(id), RequestOptions::new()).await?;
/// assert_eq!(store.request_status(&"user").loaded, true);
/// ```
pub struct LoadingStore<K: RequestType> {
    table: Arc<watch::Sender<StatusTable<K>>>,
    request_error_extractor: RequestErrorExtractor,
    config: LoadingStoreConfig,
    lifecycle: LifecycleState,
}

impl<K: RequestType> Clone for LoadingStore<K> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            request_error_extractor: Arc::clone(&self.request_error_extractor),
            config: self.config,
            lifecycle: self.lifecycle.clone(),
        }
    }
}

impl<K: RequestType> Default for LoadingStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RequestType> std::fmt::Debug for LoadingStore<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingStore")
            .field("table", &*self.table.borrow())
            .field("config", &self.config)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

/// Delegates read-only views to the current table.
macro_rules! table_views {
    ($( $(#[$meta:meta])* fn $name:ident($($arg:ident: $ty:ty),*) -> $ret:ty; )*) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $name(&self, $($arg: $ty),*) -> $ret {
                self.table.borrow().$name($($arg),*)
            }
        )*
    };
}

/// Delegates mutators to the table, publishing the change.
macro_rules! table_mutators {
    ($( $(#[$meta:meta])* fn $name:ident($key:ident: &K, $value:ident: $ty:ty); )*) => {
        $(
            $(#[$meta])*
            pub fn $name(&self, $key: &K, $value: $ty) {
                self.table.send_modify(|table| table.$name($key, $value));
            }
        )*
    };
}

impl<K: RequestType> LoadingStore<K> {
    /// Create a store with default configuration and the default error extractor
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoadingStoreConfig::default())
    }

    /// Create a store with the given configuration
    #[must_use]
    pub fn with_config(config: LoadingStoreConfig) -> Self {
        Self {
            table: Arc::new(watch::Sender::new(StatusTable::new())),
            request_error_extractor: Arc::new(default_request_error_extractor),
            config,
            lifecycle: LifecycleState::new(),
        }
    }

    /// Replace the error extractor
    ///
    /// The extractor maps an action failure to a [`RequestError`]. When it
    /// returns `None`, the failure itself is recorded with code `-1`.
    #[must_use]
    pub fn with_request_error_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&anyhow::Error) -> Option<RequestError> + Send + Sync + 'static,
    {
        self.request_error_extractor = Arc::new(extractor);
        self
    }

    /// Store configuration
    #[must_use]
    pub const fn config(&self) -> &LoadingStoreConfig {
        &self.config
    }

    /// Init/dispose flags
    #[must_use]
    pub const fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }

    /// Subscribe to table changes
    ///
    /// The receiver is marked changed after every mutation; derived views can
    /// be recomputed from `borrow()`.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StatusTable<K>> {
        self.table.subscribe()
    }

    /// Clone of the current table
    #[must_use]
    pub fn snapshot(&self) -> StatusTable<K> {
        self.table.borrow().clone()
    }

    /// Read the current table via a closure
    ///
    /// The closure runs while the table's read lock is held, so mutations
    /// from other threads wait until it returns.
    ///
    /// # Deadlocks
    ///
    /// The closure must not call any store mutator (`set_*`,
    /// `reset_request_status`) or start a request. Those take the write lock
    /// and block forever on the read lock held by the same thread.
    ///
    /// ```ignore
    /// let failed: Vec<_> = store.state(|t| t.keys().filter(|k| t.error(k)).cloned().collect());
    /// ```
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&StatusTable<K>) -> T,
    {
        f(&self.table.borrow())
    }

    table_views! {
        /// At least one attempt completed
        fn requested(key: &K) -> bool;
        /// An attempt is executing
        fn loading(key: &K) -> bool;
        /// Requested, not loading, and the last attempt did not fail
        fn loaded(key: &K) -> bool;
        /// Succeeded at least once
        fn loaded_once(key: &K) -> bool;
        /// The last completed attempt failed
        fn error(key: &K) -> bool;
        /// Failed at least once
        fn error_once(key: &K) -> bool;
        /// Classification code of the last attempt's failure
        fn error_code(key: &K) -> Option<i64>;
        /// Snapshot of one key
        fn request_status(key: &K) -> RequestStatus;
        /// Any key completed an attempt
        fn any_requested() -> bool;
        /// Any key is loading
        fn any_loading() -> bool;
        /// Any key is loaded
        fn any_loaded() -> bool;
        /// Any key succeeded at least once
        fn any_loaded_once() -> bool;
        /// Any key's last attempt failed
        fn any_error() -> bool;
        /// Any key failed at least once
        fn any_error_once() -> bool;
        /// Aggregate snapshot over all keys
        fn request_any_status() -> RequestStatus;
        /// Any listed key completed an attempt
        fn any_of_requested(keys: &[K]) -> bool;
        /// Any listed key is loading
        fn any_of_loading(keys: &[K]) -> bool;
        /// Any listed key is loaded
        fn any_of_loaded(keys: &[K]) -> bool;
        /// Any listed key succeeded at least once
        fn any_of_loaded_once(keys: &[K]) -> bool;
        /// Any listed key's last attempt failed
        fn any_of_error(keys: &[K]) -> bool;
        /// Any listed key failed at least once
        fn any_of_error_once(keys: &[K]) -> bool;
        /// Aggregate snapshot over the listed keys
        fn request_any_of_status(keys: &[K]) -> RequestStatus;
    }

    /// Original failure value of the last attempt
    #[must_use]
    pub fn error_instance(&self, key: &K) -> Option<ErrorInstance> {
        self.table.borrow().error_instance(key).cloned()
    }

    /// Recorded failure of the last attempt
    #[must_use]
    pub fn request_error(&self, key: &K) -> Option<RequestError> {
        self.table.borrow().request_error(key).cloned()
    }

    table_mutators! {
        /// Set whether the key completed at least one attempt
        fn set_requested(key: &K, requested: bool);
        /// Set whether an attempt for the key is executing
        fn set_loading(key: &K, loading: bool);
        /// Set the sticky success flag
        fn set_loaded_once(key: &K, loaded_once: bool);
        /// Record or clear the failure of the last attempt
        fn set_error(key: &K, error: Option<RequestError>);
        /// Set the sticky failure flag
        fn set_error_once(key: &K, error_once: bool);
    }

    /// Clear recorded status
    ///
    /// An empty slice clears every key. Otherwise only the listed keys are
    /// cleared. Attempts in flight are not cancelled; they record their
    /// outcome when they finish.
    pub fn reset_request_status(&self, keys: &[K]) {
        tracing::debug!(keys = ?keys, "Resetting request status");
        self.table.send_modify(|table| table.reset(keys));
    }

    /// Wait until no attempt of `request_type` is loading
    ///
    /// Returns `true` once the type is idle, `false` if `timeout` elapsed
    /// first. Other request types are unaffected.
    pub async fn wait_for_request(&self, request_type: &K, timeout: Duration) -> bool {
        let mut rx = self.table.subscribe();
        tokio::time::timeout(timeout, rx.wait_for(|table| !table.loading(request_type)))
            .await
            .is_ok_and(|idle| idle.is_ok())
    }

    /// Run `action` as an attempt of `request_type`
    ///
    /// Waits for any in-flight attempt of the same type, marks the type as
    /// loading, runs the action and records the outcome. Callbacks from
    /// `options` run after the outcome is recorded.
    ///
    /// # Errors
    ///
    /// - [`LoadingStoreError::WaitTimeout`] if an in-flight attempt of the same
    ///   type did not finish within the wait timeout. The action is not run.
    /// - [`LoadingStoreError::Request`] if the action failed.
    ///
    /// # Cancellation
    ///
    /// Dropping the returned future while the action runs clears `loading`
    /// for the type and records nothing else.
    #[tracing::instrument(skip(self, action, options), fields(request_type = %request_type), name = "loading_store_request")]
    pub async fn request<R, F, Fut, E>(
        &self,
        request_type: K,
        action: F,
        options: RequestOptions<R>,
    ) -> Result<R, LoadingStoreError<K>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Into<anyhow::Error>,
    {
        match self.attempt(&request_type, action, options).await? {
            Ok(response) => Ok(response),
            Err(error) => Err(LoadingStoreError::Request {
                request_type,
                error,
            }),
        }
    }

    /// Like [`request`](Self::request), but a failed action yields `Ok(None)`
    ///
    /// Status updates and the `on_error` callback are identical to
    /// [`request`](Self::request).
    ///
    /// # Errors
    ///
    /// Returns [`LoadingStoreError::WaitTimeout`] if an in-flight attempt of
    /// the same type did not finish within the wait timeout.
    #[tracing::instrument(skip(self, action, options), fields(request_type = %request_type), name = "loading_store_request_undefined")]
    pub async fn request_undefined<R, F, Fut, E>(
        &self,
        request_type: K,
        action: F,
        options: RequestOptions<R>,
    ) -> Result<Option<R>, LoadingStoreError<K>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Into<anyhow::Error>,
    {
        Ok(self.attempt(&request_type, action, options).await?.ok())
    }

    /// Shared protocol of `request` and `request_undefined`
    ///
    /// The outer `Result` is the wait gate, the inner one the action outcome.
    async fn attempt<R, F, Fut, E>(
        &self,
        request_type: &K,
        action: F,
        options: RequestOptions<R>,
    ) -> Result<Result<R, RequestError>, LoadingStoreError<K>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Into<anyhow::Error>,
    {
        let RequestOptions {
            wait_timeout,
            on_success,
            on_error,
        } = options;
        let wait_timeout = wait_timeout.unwrap_or(self.config.default_wait_timeout);

        RequestMetrics::record_request();

        let Some(guard) = self.claim(request_type, wait_timeout).await else {
            tracing::debug!(?wait_timeout, "Wait for in-flight request timed out");
            RequestMetrics::record_wait_timeout();
            return Err(LoadingStoreError::WaitTimeout {
                request_type: request_type.clone(),
            });
        };

        RequestMetrics::record_started();
        tracing::debug!("Request started");
        let start = Instant::now();

        match action().await.map_err(Into::<anyhow::Error>::into) {
            Ok(response) => {
                guard.succeed();
                RequestMetrics::record_success(start.elapsed());
                tracing::debug!("Request succeeded");

                if let Some(on_success) = on_success {
                    on_success(&response);
                }
                Ok(Ok(response))
            },
            Err(cause) => {
                let error = (self.request_error_extractor)(&cause)
                    .unwrap_or_else(|| RequestError::unclassified(cause));
                guard.fail(error.clone());
                RequestMetrics::record_failure(start.elapsed());
                tracing::debug!(code = error.code, "Request failed");

                if let Some(on_error) = on_error {
                    on_error(&error);
                }
                Ok(Err(error))
            },
        }
    }

    /// Wait until `request_type` is idle and mark it loading
    ///
    /// Returns `None` if the deadline passes first; the table is then untouched.
    /// A timeout too large to represent as a deadline waits without limit.
    async fn claim(&self, request_type: &K, wait_timeout: Duration) -> Option<LoadingGuard<'_, K>> {
        let deadline = Instant::now().checked_add(wait_timeout);
        let mut rx = self.table.subscribe();

        loop {
            // Drop the borrow returned by `wait_for` before writing.
            let idle = match deadline {
                Some(deadline) => tokio::time::timeout_at(
                    deadline,
                    rx.wait_for(|table| !table.loading(request_type)),
                )
                .await
                .is_ok_and(|idle| idle.is_ok()),
                None => rx
                    .wait_for(|table| !table.loading(request_type))
                    .await
                    .is_ok(),
            };

            if !idle {
                return None;
            }

            let claimed = self.table.send_if_modified(|table| {
                if table.loading(request_type) {
                    false
                } else {
                    table.set_loading(request_type, true);
                    true
                }
            });

            if claimed {
                return Some(LoadingGuard {
                    store: self,
                    request_type: request_type.clone(),
                    armed: true,
                });
            }

            tracing::trace!("Another waiter claimed the request type first, waiting again");
        }
    }
}

impl<K: RequestType> Lifecycle for LoadingStore<K> {
    fn init(&self) -> BoxFuture<'_, ()> {
        Lifecycle::init(&self.lifecycle)
    }

    fn dispose(&self) -> BoxFuture<'_, ()> {
        Lifecycle::dispose(&self.lifecycle)
    }

    fn when_initialized(&self) -> BoxFuture<'_, ()> {
        Lifecycle::when_initialized(&self.lifecycle)
    }

    fn when_disposed(&self) -> BoxFuture<'_, ()> {
        Lifecycle::when_disposed(&self.lifecycle)
    }
}

/// Claim on a request type's `loading` flag
///
/// Recording an outcome consumes the guard. Dropping it unconsumed (the
/// request future was dropped mid-action) clears `loading` so waiters are
/// not stranded.
struct LoadingGuard<'a, K: RequestType> {
    store: &'a LoadingStore<K>,
    request_type: K,
    armed: bool,
}

impl<K: RequestType> LoadingGuard<'_, K> {
    fn succeed(mut self) {
        self.armed = false;
        let request_type = &self.request_type;
        self.store
            .table
            .send_modify(|table| table.record_success(request_type));
    }

    fn fail(mut self, error: RequestError) {
        self.armed = false;
        let request_type = &self.request_type;
        self.store
            .table
            .send_modify(|table| table.record_failure(request_type, error));
    }
}

impl<K: RequestType> Drop for LoadingGuard<'_, K> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!(request_type = %self.request_type, "Request dropped before completion");
            RequestMetrics::record_cancelled();
            let request_type = &self.request_type;
            self.store
                .table
                .send_modify(|table| table.set_loading(request_type, false));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn store() -> LoadingStore<&'static str> {
        LoadingStore::new()
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = store();

        assert_eq!(store.request_status(&"request"), RequestStatus::INITIAL);
        assert_eq!(store.request_any_status(), RequestStatus::INITIAL);
        assert_eq!(store.config().default_wait_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_successful_request_records_status_and_calls_back() {
        let store = store();
        let seen = Arc::new(Mutex::new(None));

        let response = store
            .request(
                "request",
                || async { Ok::<_, anyhow::Error>("response".to_string()) },
                RequestOptions::<String>::new().on_success({
                    let seen = Arc::clone(&seen);
                    move |r| *seen.lock().unwrap() = Some(r.clone())
                }),
            )
            .await
            .unwrap();

        assert_eq!(response, "response");
        assert_eq!(seen.lock().unwrap().as_deref(), Some("response"));
        assert!(store.loaded(&"request"));
        assert!(store.loaded_once(&"request"));
        assert!(!store.error_once(&"request"));
    }

    #[tokio::test]
    async fn test_failed_request_records_error_and_calls_back() {
        let store = store();
        let codes = Arc::new(Mutex::new(Vec::new()));

        let result = store
            .request(
                "request",
                || async { Err::<(), _>(anyhow::anyhow!("Something's going wrong")) },
                RequestOptions::<()>::new().on_error({
                    let codes = Arc::clone(&codes);
                    move |e| codes.lock().unwrap().push(e.code)
                }),
            )
            .await;

        let (request_type, error) = match result {
            Err(LoadingStoreError::Request { request_type, error }) => (request_type, error),
            other => panic!("expected a request error, got {other:?}"),
        };
        assert_eq!(request_type, "request");
        assert_eq!(error.code, -1);
        assert_eq!(*codes.lock().unwrap(), vec![-1]);
        assert_eq!(
            store.error_instance(&"request").map(|i| i.to_string()),
            Some("Something's going wrong".to_string())
        );
        assert!(store.error(&"request"));
        assert!(store.error_once(&"request"));
        assert!(!store.loaded(&"request"));
    }

    #[tokio::test]
    async fn test_request_undefined_swallows_failure() {
        let store = store();

        let result = store
            .request_undefined(
                "request",
                || async { Err::<u8, _>(anyhow::anyhow!("nope")) },
                RequestOptions::new(),
            )
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(store.error(&"request"));
        assert!(store.requested(&"request"));
    }

    #[tokio::test]
    async fn test_custom_extractor() {
        let store = store().with_request_error_extractor(|e| {
            Some(RequestError::new(ErrorInstance::Body(serde_json::json!(e.to_string())), 418))
        });

        let _ = store
            .request(
                "request",
                || async { Err::<(), _>(anyhow::anyhow!("teapot")) },
                RequestOptions::new(),
            )
            .await;

        assert_eq!(store.error_code(&"request"), Some(418));
        assert_eq!(
            store.error_instance(&"request").and_then(|i| i.as_body().cloned()),
            Some(serde_json::json!("teapot"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_wait_timeout_is_accepted() {
        let store = store();

        let response = store
            .request(
                "request",
                || async { Ok::<_, anyhow::Error>(1) },
                RequestOptions::new().with_wait_timeout(Duration::MAX),
            )
            .await
            .unwrap();
        assert_eq!(response, 1);

        store.set_loading(&"request", true);
        let waiter = tokio::spawn({
            let store = store.clone();
            async move {
                store
                    .request_undefined(
                        "request",
                        || async { Ok::<_, anyhow::Error>(2) },
                        RequestOptions::new().with_wait_timeout(Duration::MAX),
                    )
                    .await
            }
        });

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!waiter.is_finished());

        store.set_loading(&"request", false);
        assert_eq!(waiter.await.unwrap().unwrap(), Some(2));
        assert!(store.loaded(&"request"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_request_on_idle_type_returns_immediately() {
        let store = store();
        assert!(store.wait_for_request(&"request", Duration::from_millis(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_request_times_out_while_loading() {
        let store = store();
        store.set_loading(&"request", true);

        assert!(!store.wait_for_request(&"request", Duration::from_millis(25)).await);
        assert!(store.wait_for_request(&"another", Duration::from_millis(25)).await);

        store.set_loading(&"request", false);
        assert!(store.wait_for_request(&"request", Duration::from_millis(25)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_timeout_does_not_run_action_or_touch_status() {
        let store = store();
        store.set_loading(&"request", true);
        let calls = AtomicUsize::new(0);

        let result = store
            .request(
                "request",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, anyhow::Error>(())
                },
                RequestOptions::new().with_wait_timeout(Duration::from_millis(25)),
            )
            .await;

        assert!(matches!(result, Err(LoadingStoreError::WaitTimeout { request_type: "request" })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            store.request_status(&"request"),
            RequestStatus {
                loading: true,
                ..RequestStatus::INITIAL
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_request_clears_loading() {
        let store = store();

        let pending = store.request(
            "request",
            || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, anyhow::Error>(())
            },
            RequestOptions::new(),
        );
        let timed_out = tokio::time::timeout(Duration::from_millis(50), pending).await;

        assert!(timed_out.is_err());
        assert_eq!(store.request_status(&"request"), RequestStatus::INITIAL);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_transition() {
        let store = store();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.set_loading(&"request", true);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().loading(&"request"));

        store.reset_request_status(&[]);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_lifecycle_is_independent_of_requests() {
        let store = store();

        Lifecycle::init(&store).await;
        Lifecycle::when_initialized(&store).await;

        assert!(store.lifecycle().is_initialized());
        assert_eq!(store.request_any_status(), RequestStatus::INITIAL);
    }

    #[test]
    fn test_options_debug_hides_callbacks() {
        let options = RequestOptions::<()>::new()
            .with_wait_timeout(Duration::from_millis(5))
            .on_error(|_| {});

        assert_eq!(options.wait_timeout(), Some(Duration::from_millis(5)));
        assert_eq!(
            format!("{options:?}"),
            "RequestOptions { wait_timeout: Some(5ms), on_success: false, on_error: true }"
        );
    }
}
