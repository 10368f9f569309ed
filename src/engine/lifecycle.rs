//! Shutdown signalling shared by both loops.

use tokio::sync::watch;

/// Owns the cancellation state. Cancelling is one-way.
#[derive(Debug)]
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A new receiver for the shutdown signal.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Cancel every loop holding a signal.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn shutdown(&self) -> bool {
        self.tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of the shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been requested.
    ///
    /// [`ShutdownController::shutdown`] is the only way to get here; a
    /// dropped controller leaves waiters pending.
    pub async fn cancelled(&mut self) {
        // wait_for checks the current value first, so an earlier
        // shutdown is observed immediately
        let closed = self.rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_shutdown_transitions_once() {
        let controller = ShutdownController::new();
        assert!(!controller.is_shutdown());

        assert!(controller.shutdown());
        assert!(!controller.shutdown());
        assert!(controller.is_shutdown());
    }

    #[tokio::test]
    async fn test_all_signals_observe_shutdown() {
        let controller = ShutdownController::new();
        let mut a = controller.signal();
        let mut b = a.clone();
        assert!(!a.is_cancelled());

        controller.shutdown();

        tokio::time::timeout(Duration::from_secs(1), a.cancelled())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), b.cancelled())
            .await
            .unwrap();
        assert!(b.is_cancelled());
    }

    #[tokio::test]
    async fn test_signal_created_after_shutdown_is_cancelled() {
        let controller = ShutdownController::new();
        controller.shutdown();

        let mut late = controller.signal();
        assert!(late.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), late.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_controller_does_not_cancel() {
        let controller = ShutdownController::new();
        let mut signal = controller.signal();
        drop(controller);

        let waited = tokio::time::timeout(Duration::from_millis(50), signal.cancelled()).await;
        assert!(waited.is_err());
        assert!(!signal.is_cancelled());
    }
}
