//! # Loading Store Runtime
//!
//! Runtime for tracking the status of asynchronous requests per request type.
//!
//! ## Core Components
//!
//! - **Status Table**: Per-key `requested` / `loading` / `loaded_once` / `error` /
//!   `error_once` fields with derived and aggregate views
//! - **Loading Store**: Owns the table, publishes every change to subscribers and
//!   coordinates requests through a single-flight wait gate
//! - **Lifecycle**: Init/dispose flags, independent of request tracking
//!
//! ## Example
//!
//! ```ignore
//! use loading_store_runtime::{LoadingStore, RequestOptions};
//! use std::time::Duration;
//!
//! let store: LoadingStore<&'static str> = LoadingStore::new();
//!
//! let profile = store
//!     .request("profile", || api.fetch_profile(), RequestOptions::new())
//!     .await?;
//!
//! // A concurrent call for "profile" waits for the first to finish
//! let again = store
//!     .request(
//!         "profile",
//!         || api.fetch_profile(),
//!         RequestOptions::new().with_wait_timeout(Duration::from_secs(5)),
//!     )
//!     .await?;
//!
//! assert!(store.loaded(&"profile"));
//! ```

pub use loading_store_core::{
    ErrorInstance, HttpResponseError, Lifecycle, RequestError, RequestErrorExtractor,
    RequestStatus, RequestType,
};

/// Per-key status table and its derived views
pub mod table;

/// Store runtime: request coordination and subscriptions
pub mod store;

/// Store configuration
pub mod config;

/// Init/dispose lifecycle flags
pub mod lifecycle;

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the store runtime
pub mod error {
    use loading_store_core::{RequestError, RequestType};
    use thiserror::Error;

    /// Errors returned by request coordination
    ///
    /// The two variants are never conflated: a wait timeout means no attempt
    /// started, a request error means the attempt ran and its action failed.
    #[derive(Error, Debug)]
    pub enum LoadingStoreError<K> {
        /// A previous attempt for the same request type did not finish in time
        ///
        /// No action was invoked and no status was changed.
        #[error("Request \"{request_type}\" is timed out")]
        WaitTimeout {
            /// Request type that could not start
            request_type: K,
        },

        /// The action ran and failed
        ///
        /// Only returned by `request`; `request_undefined` swallows it.
        #[error("Request \"{request_type}\" failed")]
        Request {
            /// Request type whose attempt failed
            request_type: K,

            /// Extracted failure, also recorded in the status table
            #[source]
            error: RequestError,
        },
    }

    impl<K> LoadingStoreError<K> {
        /// Request type the error refers to
        #[must_use]
        pub const fn request_type(&self) -> &K {
            match self {
                Self::WaitTimeout { request_type } | Self::Request { request_type, .. } => {
                    request_type
                },
            }
        }

        /// Recorded failure, for request errors
        #[must_use]
        pub const fn request_error(&self) -> Option<&RequestError> {
            match self {
                Self::Request { error, .. } => Some(error),
                Self::WaitTimeout { .. } => None,
            }
        }

        /// Check whether the wait gate timed out
        #[must_use]
        pub const fn is_wait_timeout(&self) -> bool {
            matches!(self, Self::WaitTimeout { .. })
        }
    }

    /// Check whether an arbitrary error is a failed request for keys of type `K`
    ///
    /// Useful behind `anyhow::Error` or `Box<dyn Error>` where the concrete
    /// type was erased.
    ///
    /// ```
    /// use loading_store_runtime::error::{is_request_error, LoadingStoreError};
    ///
    /// let timeout: LoadingStoreError<&'static str> =
    ///     LoadingStoreError::WaitTimeout { request_type: "request" };
    /// assert!(!is_request_error::<&'static str>(&timeout));
    /// ```
    #[must_use]
    pub fn is_request_error<K: RequestType>(error: &(dyn std::error::Error + 'static)) -> bool {
        matches!(
            error.downcast_ref::<LoadingStoreError<K>>(),
            Some(LoadingStoreError::Request { .. })
        )
    }
}

pub use config::LoadingStoreConfig;
pub use error::{is_request_error, LoadingStoreError};
pub use lifecycle::LifecycleState;
pub use store::{LoadingStore, RequestOptions};
pub use table::{StatusEntry, StatusTable};
