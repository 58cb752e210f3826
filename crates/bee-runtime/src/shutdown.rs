//! Cooperative shutdown signal shared by every task.

use std::sync::Arc;

use tokio::sync::watch;

/// Owner side: call [`trigger`][Shutdown::trigger] once to stop all tasks.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }
}

/// Task side of a [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolve once shutdown has been triggered (immediately if it already
    /// was).  Cancel-safe.
    pub async fn wait(&mut self) {
        // An error means every sender is gone: nobody can trigger any more,
        // so treat it as a shutdown too.
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}
