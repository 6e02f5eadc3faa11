//! Shutdown coordination.
//!
//! One `Shutdown` is shared by every server a process hosts (usually one
//! container, several in tests). Triggering it stops all of them; a server
//! that subscribes afterwards can ask [`Shutdown::is_triggered`] instead of
//! waiting for a message it already missed.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: AtomicBool,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: AtomicBool::new(false),
        }
    }

    /// Receiver for a server's graceful-shutdown future.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscribed server. Only the first call broadcasts; it
    /// returns `true`, later calls return `false`.
    pub fn trigger(&self) -> bool {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return false;
        }
        tracing::info!(servers = self.tx.receiver_count(), "Stopping servers");
        let _ = self.tx.send(());
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Servers still waiting on the signal.
    pub fn servers(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_server() {
        let shutdown = Shutdown::new();
        let mut api = shutdown.subscribe();
        let mut store = shutdown.subscribe();
        assert_eq!(shutdown.servers(), 2);

        assert!(shutdown.trigger());
        assert!(api.recv().await.is_ok());
        assert!(store.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_fires_once() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());
        assert!(shutdown.trigger());
        assert!(!shutdown.trigger());
        assert!(shutdown.is_triggered());
    }
}
