//! Drain trigger shared by the signal handler and the HTTP server.
//!
//! A subscriber created after the trigger still observes it.

use tokio::sync::watch;

/// Owner side of the drain trigger. Dropping it counts as a trigger.
pub struct Shutdown {
    draining: watch::Sender<bool>,
}

/// Subscriber side, handed to [`crate::HttpServer::run`].
#[derive(Clone)]
pub struct ShutdownSignal {
    draining: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (draining, _) = watch::channel(false);
        Self { draining }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            draining: self.draining.subscribe(),
        }
    }

    /// Ask every subscriber to stop accepting and drain. Idempotent.
    pub fn trigger(&self) {
        self.draining.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.draining.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once a drain has been requested or the owner is gone.
    pub async fn triggered(mut self) {
        let _ = self.draining.wait_for(|draining| *draining).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe();
        let b = a.clone();
        assert!(!shutdown.is_triggered());

        shutdown.trigger();
        shutdown.trigger();

        assert!(shutdown.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), a.triggered()).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), b.triggered()).await.unwrap();
    }

    #[tokio::test]
    async fn late_subscriber_sees_earlier_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let late = shutdown.subscribe();
        tokio::time::timeout(Duration::from_secs(1), late.triggered()).await.unwrap();
    }

    #[tokio::test]
    async fn dropped_owner_releases_subscribers() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), signal.triggered()).await.unwrap();
    }

    #[tokio::test]
    async fn untriggered_signal_stays_pending() {
        let shutdown = Shutdown::new();
        let pending = tokio::time::timeout(Duration::from_millis(50), shutdown.subscribe().triggered()).await;
        assert!(pending.is_err());
    }
}
