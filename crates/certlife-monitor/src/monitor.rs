//! Wires the refresher, dispatcher, workers and exposer into one process.

use std::sync::Arc;
use std::time::Duration;

use certlife_core::ZoneSource;
use tokio::sync::mpsc;
use tracing::info;

use crate::dispatcher::{Dispatcher, DEFAULT_PAUSE};
use crate::error::{MonitorError, MonitorResult};
use crate::exclusion::ExclusionFilter;
use crate::exposer::{MetricsServer, DEFAULT_LISTEN, DEFAULT_METRICS_PATH};
use crate::probe::{HttpsProber, Prober, DEFAULT_PROBE_TIMEOUT};
use crate::refresher::{Refresher, DEFAULT_REFRESH_INTERVAL};
use crate::registry::DomainRegistry;
use crate::results::ResultsStore;
use crate::worker::{WorkerPool, DEFAULT_WORKERS};

/// Runtime settings for the pipeline
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Worker count, also the work channel capacity
    pub workers: usize,
    /// Sleep after each full dispatch pass
    pub pause: Duration,
    /// Period between registry rebuilds
    pub refresh_interval: Duration,
    /// Per-probe timeout
    pub probe_timeout: Duration,
    /// Metrics bind address
    pub listen: String,
    /// Metrics path
    pub metrics_path: String,
    /// Regular expressions of domains to drop
    pub exclude_patterns: Vec<String>,
    /// Domains appended after filtering
    pub static_domains: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            pause: DEFAULT_PAUSE,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            listen: DEFAULT_LISTEN.to_string(),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
            exclude_patterns: Vec::new(),
            static_domains: Vec::new(),
        }
    }
}

/// The whole monitor.
///
/// ```no_run
/// # async fn example() -> certlife_monitor::MonitorResult<()> {
/// use certlife_monitor::{Monitor, MonitorConfig};
///
/// let config = MonitorConfig {
///     static_domains: vec!["example.com".into()],
///     ..MonitorConfig::default()
/// };
/// Monitor::new(config, Vec::new()).run().await
/// # }
/// ```
pub struct Monitor {
    config: MonitorConfig,
    sources: Vec<Box<dyn ZoneSource>>,
    prober: Option<Arc<dyn Prober>>,
    results: Arc<ResultsStore>,
}

impl Monitor {
    /// Create a monitor over the enabled zone sources
    pub fn new(config: MonitorConfig, sources: Vec<Box<dyn ZoneSource>>) -> Self {
        Self {
            config,
            sources,
            prober: None,
            results: Arc::new(ResultsStore::new()),
        }
    }

    /// Replace the HTTPS prober
    #[must_use]
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = Some(prober);
        self
    }

    /// Shared results store, readable while the monitor runs
    pub fn results(&self) -> Arc<ResultsStore> {
        Arc::clone(&self.results)
    }

    /// Run until a fatal error.
    ///
    /// Returns `Ok(())` without serving anything when no zone source is
    /// enabled.
    pub async fn run(self) -> MonitorResult<()> {
        let Self {
            config,
            sources,
            prober,
            results,
        } = self;

        if config.workers == 0 {
            return Err(MonitorError::Config("worker count must be at least 1".into()));
        }

        let exclusions = ExclusionFilter::new(&config.exclude_patterns)?;
        if !exclusions.is_empty() {
            info!(patterns = exclusions.len(), "exclusion patterns compiled");
        }
        let registry = Arc::new(DomainRegistry::new());
        let refresher = Refresher::new(
            sources,
            exclusions,
            config.static_domains.clone(),
            Arc::clone(&registry),
            Arc::clone(&results),
        );

        match refresher.refresh().await {
            Ok(_) => {}
            Err(MonitorError::NoSourcesEnabled) => {
                info!("all DNS providers are disabled, exiting");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let prober = match prober {
            Some(prober) => prober,
            None => Arc::new(HttpsProber::new(config.probe_timeout)?),
        };

        let server =
            MetricsServer::bind(&config.listen, &config.metrics_path, Arc::clone(&results)).await?;

        let (tx, rx) = mpsc::channel(config.workers);
        let pool = WorkerPool::spawn(
            config.workers,
            rx,
            prober,
            Arc::clone(&registry),
            Arc::clone(&results),
        );
        let dispatcher = tokio::spawn(Dispatcher::new(Arc::clone(&registry), tx, config.pause).run());

        info!(
            addr = %server.local_addr()?,
            path = %config.metrics_path,
            workers = pool.len(),
            "serving metrics"
        );

        let outcome = tokio::select! {
            result = refresher.run_periodic(config.refresh_interval) => match result {
                Err(MonitorError::NoSourcesEnabled) => {
                    info!("all DNS providers are disabled, exiting");
                    Ok(())
                }
                other => other,
            },
            () = server.serve() => Ok(()),
        };

        dispatcher.abort();
        pool.abort();
        outcome
    }
}
