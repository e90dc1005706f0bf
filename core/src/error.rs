//! Request errors and error extraction.
//!
//! An action reports failure as an [`anyhow::Error`]. The store turns that
//! failure into a [`RequestError`] through a [`RequestErrorExtractor`]. When the
//! extractor does not recognize the failure, the failure itself becomes the
//! error instance and the code is [`UNCLASSIFIED_ERROR_CODE`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Code recorded when a failure does not match the extractor's recognized shape
pub const UNCLASSIFIED_ERROR_CODE: i64 = -1;

/// The original failure value stored with a [`RequestError`]
#[derive(Debug, Clone)]
pub enum ErrorInstance {
    /// Response body carried by an HTTP-like failure
    Body(Value),

    /// The action's failure, kept as-is
    Cause(Arc<anyhow::Error>),
}

impl ErrorInstance {
    /// Response body, if this instance came from an HTTP-like failure
    #[must_use]
    pub const fn as_body(&self) -> Option<&Value> {
        match self {
            Self::Body(body) => Some(body),
            Self::Cause(_) => None,
        }
    }

    /// The raw failure, if no extractor classified it
    #[must_use]
    pub fn as_cause(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Body(_) => None,
            Self::Cause(cause) => Some(cause),
        }
    }

    /// Downcast the raw failure to a concrete error type
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.as_cause()?.downcast_ref::<E>()
    }
}

impl fmt::Display for ErrorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(body) => write!(f, "{body}"),
            Self::Cause(cause) => write!(f, "{cause}"),
        }
    }
}

impl PartialEq for ErrorInstance {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Body(a), Self::Body(b)) => a == b,
            (Self::Cause(a), Self::Cause(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Failure recorded for the last attempt of a request type
///
/// `instance` holds the original failure (or the extracted response body) and
/// `code` its numeric classification.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("request error (code {code}): {instance}")]
pub struct RequestError {
    /// Original failure value
    pub instance: ErrorInstance,

    /// Numeric classification, [`UNCLASSIFIED_ERROR_CODE`] when unknown
    pub code: i64,
}

impl RequestError {
    /// Create a request error from an instance and a code
    #[must_use]
    pub const fn new(instance: ErrorInstance, code: i64) -> Self {
        Self { instance, code }
    }

    /// Wrap a failure no extractor recognized
    #[must_use]
    pub fn unclassified(cause: anyhow::Error) -> Self {
        Self {
            instance: ErrorInstance::Cause(Arc::new(cause)),
            code: UNCLASSIFIED_ERROR_CODE,
        }
    }

    /// Check whether the code is the unclassified sentinel
    #[must_use]
    pub const fn is_unclassified(&self) -> bool {
        self.code == UNCLASSIFIED_ERROR_CODE
    }
}

/// HTTP-like failure exposing a response status and body
///
/// Actions that talk to HTTP services return this (directly or wrapped in
/// context) so the default extractor can classify it by status.
///
/// # Example
///
/// ```
/// use loading_store_core::{default_request_error_extractor, HttpResponseError};
/// use serde_json::json;
///
/// let failure = anyhow::Error::new(HttpResponseError::new(403, json!({"reason": "forbidden"})));
/// let error = default_request_error_extractor(&failure);
/// assert_eq!(error.map(|e| e.code), Some(403));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("HTTP request failed with status {status}")]
pub struct HttpResponseError {
    /// Response status code
    pub status: u16,

    /// Response body
    pub data: Value,
}

impl HttpResponseError {
    /// Create an HTTP-like failure
    #[must_use]
    pub const fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }
}

/// Pluggable mapping from an action failure to a [`RequestError`]
///
/// Returning `None` makes the store fall back to
/// [`RequestError::unclassified`].
pub type RequestErrorExtractor = Arc<dyn Fn(&anyhow::Error) -> Option<RequestError> + Send + Sync>;

/// Default extractor: recognizes [`HttpResponseError`] anywhere in the error chain
///
/// Maps it to `{ instance: data, code: status }`; anything else yields `None`.
#[must_use]
pub fn default_request_error_extractor(error: &anyhow::Error) -> Option<RequestError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<HttpResponseError>())
        .map(|http| RequestError::new(ErrorInstance::Body(http.data.clone()), i64::from(http.status)))
}
