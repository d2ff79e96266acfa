//! Feeds registry snapshots into the bounded work channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::registry::DomainRegistry;

/// Default pause between full passes (30 minutes)
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1800);

/// Single task that pushes every registered domain to the workers.
///
/// Sends block while the channel is full, so the dispatcher runs at the pace
/// of the workers. The channel is never closed from this side.
pub struct Dispatcher {
    registry: Arc<DomainRegistry>,
    queue: mpsc::Sender<String>,
    pause: Duration,
}

impl Dispatcher {
    /// Create a dispatcher
    pub fn new(registry: Arc<DomainRegistry>, queue: mpsc::Sender<String>, pause: Duration) -> Self {
        Self {
            registry,
            queue,
            pause,
        }
    }

    /// Send one snapshot of the registry.
    ///
    /// Returns the number of domains sent, or `None` once every receiver has
    /// gone away.
    pub async fn dispatch_pass(&self) -> Option<usize> {
        let snapshot = self.registry.snapshot();
        for fqdn in snapshot.iter() {
            self.queue.send(fqdn.clone()).await.ok()?;
        }
        Some(snapshot.len())
    }

    /// Dispatch, pause, repeat.
    pub async fn run(self) {
        loop {
            let Some(sent) = self.dispatch_pass().await else {
                debug!("work channel closed, dispatcher stopping");
                return;
            };
            debug!(
                total = sent,
                pause_secs = self.pause.as_secs(),
                "domains list processed, pausing until next iteration"
            );
            tokio::time::sleep(self.pause).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(domains: &[&str]) -> Arc<DomainRegistry> {
        let registry = Arc::new(DomainRegistry::new());
        registry.replace(domains.iter().map(ToString::to_string).collect());
        registry
    }

    #[tokio::test]
    async fn test_pass_sends_in_registry_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let dispatcher = Dispatcher::new(
            registry(&["a.example", "b.example", "c.example:8443"]),
            tx,
            DEFAULT_PAUSE,
        );

        assert_eq!(dispatcher.dispatch_pass().await, Some(3));
        let mut got = Vec::new();
        while let Ok(fqdn) = rx.try_recv() {
            got.push(fqdn);
        }
        assert_eq!(got, vec!["a.example", "b.example", "c.example:8443"]);
    }

    #[tokio::test]
    async fn test_empty_registry_sends_nothing() {
        let (tx, mut rx) = mpsc::channel(1);
        let dispatcher = Dispatcher::new(registry(&[]), tx, DEFAULT_PAUSE);

        assert_eq!(dispatcher.dispatch_pass().await, Some(0));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_waits_for_free_slot() {
        let (tx, mut rx) = mpsc::channel(1);
        let dispatcher = Dispatcher::new(registry(&["a.example", "b.example"]), tx, DEFAULT_PAUSE);

        let mut pass = tokio_test::task::spawn(dispatcher.dispatch_pass());
        tokio_test::assert_pending!(pass.poll());

        assert_eq!(rx.recv().await.as_deref(), Some("a.example"));
        assert!(pass.is_woken());
        assert_eq!(tokio_test::assert_ready!(pass.poll()), Some(2));
        assert_eq!(rx.recv().await.as_deref(), Some("b.example"));
    }

    #[tokio::test]
    async fn test_stops_when_receivers_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let dispatcher = Dispatcher::new(registry(&["a.example"]), tx, DEFAULT_PAUSE);
        assert_eq!(dispatcher.dispatch_pass().await, None);
        dispatcher.run().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_backpressure_and_pause() {
        let (tx, mut rx) = mpsc::channel(2);
        let registry = registry(&["a.example", "b.example", "c.example"]);
        let pause = Duration::from_secs(1800);
        let handle = tokio::spawn(Dispatcher::new(Arc::clone(&registry), tx, pause).run());

        // Capacity 2: the third send waits for a receive
        tokio::task::yield_now().await;
        assert_eq!(rx.recv().await.as_deref(), Some("a.example"));
        assert_eq!(rx.recv().await.as_deref(), Some("b.example"));
        assert_eq!(rx.recv().await.as_deref(), Some("c.example"));

        // Nothing more until the pause elapses
        tokio::time::sleep(pause - Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());

        registry.replace(vec!["d.example".into()]);
        assert_eq!(rx.recv().await.as_deref(), Some("d.example"));

        handle.abort();
    }
}
