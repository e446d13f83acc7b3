// Cancellable execution context shared between the restore engine and the interrupt bridge
use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation flag with no deadline. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    tx: Arc<watch::Sender<bool>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Mark the context cancelled.
    ///
    /// Returns `true` only for the call that actually flipped the flag.
    pub fn cancel(&self) -> bool {
        self.tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the context has been cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this only errors if it is dropped,
        // which cannot happen while we hold `&self`.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
