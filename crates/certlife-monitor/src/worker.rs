//! Fixed-size pool of probe workers sharing one bounded channel.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::probe::Prober;
use crate::registry::DomainRegistry;
use crate::results::ResultsStore;

/// Default worker count
pub const DEFAULT_WORKERS: usize = 10;

/// `W` tasks, each running one probe at a time.
///
/// Workers never exit on a probe error; they stop only when the channel is
/// closed and drained. Outcomes for domains that left the registry while
/// being probed are discarded.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` tasks pulling from `queue`
    pub fn spawn(
        workers: usize,
        queue: mpsc::Receiver<String>,
        prober: Arc<dyn Prober>,
        registry: Arc<DomainRegistry>,
        results: Arc<ResultsStore>,
    ) -> Self {
        let queue = Arc::new(Mutex::new(queue));
        let handles = (0..workers)
            .map(|id| {
                tokio::spawn(work(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&prober),
                    Arc::clone(&registry),
                    Arc::clone(&results),
                ))
            })
            .collect();

        Self { handles }
    }

    /// Number of workers
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if the pool has no workers
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to finish
    pub async fn join(self) {
        join_all(self.handles).await;
    }

    /// Stop every worker immediately
    pub fn abort(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

async fn work(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<String>>>,
    prober: Arc<dyn Prober>,
    registry: Arc<DomainRegistry>,
    results: Arc<ResultsStore>,
) {
    loop {
        // Hold the lock only for the receive
        let next = queue.lock().await.recv().await;
        let Some(fqdn) = next else {
            debug!(worker = id, "work channel closed, worker stopping");
            return;
        };

        trace!(worker = id, domain = %fqdn, "probing");
        if let Some(outcome) = prober.probe(&fqdn).await {
            debug!(
                domain = %fqdn,
                check = %outcome.status,
                remaining_seconds = outcome.remaining_seconds,
                "probe finished"
            );
            if !results.put_observed(&fqdn, outcome, &registry) {
                debug!(domain = %fqdn, "domain dropped during probe, outcome discarded");
            }
        }
    }
}
