//! # Loading Store Core
//!
//! Core types for tracking the status of asynchronous requests per request type.
//!
//! This crate provides the vocabulary shared by the runtime and by callers:
//!
//! ## Core Concepts
//!
//! - **Request type**: A caller-defined key identifying a category of async operation
//! - **Request status**: Snapshot of the six status booleans for one key (or an aggregate)
//! - **Request error**: The recorded failure of the last attempt (`instance` + `code`)
//! - **Error extractor**: Pluggable mapping from an action failure to a [`RequestError`]
//! - **Lifecycle**: Init/dispose contract for stores, independent of request tracking
//!
//! ## Example
//!
//! ```
//! use loading_store_core::{RequestError, RequestStatus, default_request_error_extractor};
//!
//! let cause = anyhow::anyhow!("connection reset");
//! let error = default_request_error_extractor(&cause)
//!     .unwrap_or_else(|| RequestError::unclassified(cause));
//! assert_eq!(error.code, -1);
//!
//! assert_eq!(RequestStatus::default(), RequestStatus::INITIAL);
//! ```

pub use serde::{Deserialize, Serialize};

/// Request errors, the HTTP-like error shape, and error extraction
pub mod error;

pub use error::{
    default_request_error_extractor, ErrorInstance, HttpResponseError, RequestError,
    RequestErrorExtractor, UNCLASSIFIED_ERROR_CODE,
};

/// Request type keys
///
/// Any comparable, hashable, displayable value can identify a request type.
/// String slices, integers and fieldless enums are the common choices.
pub mod request_type {
    use std::fmt::{Debug, Display};
    use std::hash::Hash;

    /// Key identifying a logical request category
    ///
    /// Blanket-implemented for every type meeting the bounds, so callers
    /// never implement it by hand.
    ///
    /// # Example
    ///
    /// ```
    /// use loading_store_core::RequestType;
    ///
    /// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    /// enum Api {
    ///     Profile,
    /// }
    ///
    /// impl std::fmt::Display for Api {
    ///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    ///         write!(f, "profile")
    ///     }
    /// }
    ///
    /// fn accepts<K: RequestType>(_key: K) {}
    /// accepts(Api::Profile);
    /// accepts("profile");
    /// accepts(42_u32);
    /// ```
    pub trait RequestType: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}

    impl<T> RequestType for T where T: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}
}

pub use request_type::RequestType;

/// Status snapshots
pub mod status {
    use serde::{Deserialize, Serialize};

    /// Snapshot of the status of one request type, or an aggregate over many
    ///
    /// `loaded` is derived: `requested && !loading && !error`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[allow(clippy::struct_excessive_bools)]
    pub struct RequestStatus {
        /// At least one attempt completed (success or failure)
        pub requested: bool,

        /// An attempt is currently executing
        pub loading: bool,

        /// Requested, not loading, and the last attempt did not fail
        pub loaded: bool,

        /// Succeeded at least once since the last reset
        pub loaded_once: bool,

        /// The last completed attempt failed
        pub error: bool,

        /// Failed at least once since the last reset
        pub error_once: bool,
    }

    impl RequestStatus {
        /// Status of a request type that was never touched
        pub const INITIAL: Self = Self {
            requested: false,
            loading: false,
            loaded: false,
            loaded_once: false,
            error: false,
            error_once: false,
        };

        /// Check whether nothing has been recorded
        #[must_use]
        pub const fn is_initial(&self) -> bool {
            !self.requested
                && !self.loading
                && !self.loaded
                && !self.loaded_once
                && !self.error
                && !self.error_once
        }
    }
}

pub use status::RequestStatus;

/// Lifecycle contract for stores
///
/// Initialization and disposal are flags only. Request tracking never
/// consults them.
pub mod lifecycle {
    use futures::future::BoxFuture;

    /// Init/dispose contract shared by long-lived stores
    pub trait Lifecycle: Send + Sync {
        /// Mark the store initialized
        fn init(&self) -> BoxFuture<'_, ()>;

        /// Mark the store disposed
        fn dispose(&self) -> BoxFuture<'_, ()>;

        /// Resolve once the store is initialized
        fn when_initialized(&self) -> BoxFuture<'_, ()>;

        /// Resolve once the store is disposed
        fn when_disposed(&self) -> BoxFuture<'_, ()>;
    }
}

pub use lifecycle::Lifecycle;
