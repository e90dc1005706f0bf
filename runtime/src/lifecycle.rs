//! Init/dispose flags.
//!
//! Request tracking never consults these flags; they exist so a store can be
//! plugged into code that expects the [`Lifecycle`] contract.

use std::sync::Arc;

use futures::future::BoxFuture;
use loading_store_core::Lifecycle;
use tokio::sync::watch;

/// Observable initialized/disposed flags
///
/// Clones share the same flags.
#[derive(Debug, Clone)]
pub struct LifecycleState {
    initialized: Arc<watch::Sender<bool>>,
    disposed: Arc<watch::Sender<bool>>,
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleState {
    /// Create flags that are neither initialized nor disposed
    #[must_use]
    pub fn new() -> Self {
        Self {
            initialized: Arc::new(watch::Sender::new(false)),
            disposed: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Mark initialized and wake every `when_initialized` waiter
    pub fn init(&self) {
        tracing::debug!("Store initialized");
        self.initialized.send_replace(true);
    }

    /// Mark disposed and wake every `when_disposed` waiter
    pub fn dispose(&self) {
        tracing::debug!("Store disposed");
        self.disposed.send_replace(true);
    }

    /// Check whether `init` was called
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        *self.initialized.borrow()
    }

    /// Check whether `dispose` was called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        *self.disposed.borrow()
    }

    /// Resolve once `init` was called
    pub async fn when_initialized(&self) {
        Self::when_set(&self.initialized).await;
    }

    /// Resolve once `dispose` was called
    pub async fn when_disposed(&self) {
        Self::when_set(&self.disposed).await;
    }

    async fn when_set(flag: &watch::Sender<bool>) {
        let mut rx = flag.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|set| *set).await;
    }
}

impl Lifecycle for LifecycleState {
    fn init(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move { Self::init(self) })
    }

    fn dispose(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move { Self::dispose(self) })
    }

    fn when_initialized(&self) -> BoxFuture<'_, ()> {
        Box::pin(Self::when_initialized(self))
    }

    fn when_disposed(&self) -> BoxFuture<'_, ()> {
        Box::pin(Self::when_disposed(self))
    }
}
