//! Periodic rebuild of the domain registry from the zone sources.

use std::sync::Arc;
use std::time::Duration;

use certlife_core::ZoneSource;
use tracing::{debug, info, warn};

use crate::error::{MonitorError, MonitorResult};
use crate::exclusion::ExclusionFilter;
use crate::registry::DomainRegistry;
use crate::results::ResultsStore;

/// Default period between refresh passes (120 minutes)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(120 * 60);

/// What a single refresh pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Size of the registry after the pass
    pub domains: usize,
    /// Sources whose fetch failed this pass
    pub failed_sources: Vec<&'static str>,
    /// Whether a new list was installed
    pub installed: bool,
    /// Results entries dropped because their domain disappeared
    pub pruned: usize,
}

/// Builds the registry from zone sources, exclusions, and static additions.
pub struct Refresher {
    sources: Vec<Box<dyn ZoneSource>>,
    exclusions: ExclusionFilter,
    additions: Vec<String>,
    registry: Arc<DomainRegistry>,
    results: Arc<ResultsStore>,
}

impl Refresher {
    /// Create a refresher.
    ///
    /// `sources` are queried in the given order on every pass.
    pub fn new(
        sources: Vec<Box<dyn ZoneSource>>,
        exclusions: ExclusionFilter,
        additions: Vec<String>,
        registry: Arc<DomainRegistry>,
        results: Arc<ResultsStore>,
    ) -> Self {
        Self {
            sources,
            exclusions,
            additions,
            registry,
            results,
        }
    }

    /// Run one refresh pass.
    ///
    /// A failing source is logged and contributes nothing. When every source
    /// fails and the registry already holds domains, the current list is kept.
    pub async fn refresh(&self) -> MonitorResult<RefreshReport> {
        if self.sources.is_empty() {
            return Err(MonitorError::NoSourcesEnabled);
        }

        let mut discovered = Vec::new();
        let mut failed_sources = Vec::new();

        for source in &self.sources {
            match source.fetch_domains().await {
                Ok(domains) => {
                    debug!(provider = source.name(), total = domains.len(), "zone source fetched");
                    discovered.extend(domains);
                }
                Err(e) => {
                    warn!(
                        provider = source.name(),
                        error = %e,
                        status = ?e.status_code(),
                        retryable = e.is_retryable(),
                        auth = e.is_auth_error(),
                        "zone source failed, skipping"
                    );
                    failed_sources.push(source.name());
                }
            }
        }

        if failed_sources.len() == self.sources.len() && !self.registry.is_empty() {
            let kept = self.registry.len();
            warn!(total = kept, "every zone source failed, keeping current domains list");
            return Ok(RefreshReport {
                domains: kept,
                failed_sources,
                installed: false,
                pruned: 0,
            });
        }

        let mut domains = self.exclusions.apply(discovered);
        domains.extend(self.additions.iter().cloned());

        info!(total = domains.len(), domains = ?domains, "got domains list");

        let total = domains.len();
        self.registry.replace(domains);
        let pruned = self.results.retain_domains(&self.registry.snapshot());
        if pruned > 0 {
            debug!(pruned, "dropped results for domains no longer observed");
        }

        Ok(RefreshReport {
            domains: total,
            failed_sources,
            installed: true,
            pruned,
        })
    }

    /// Refresh every `interval`, forever.
    ///
    /// The first pass is expected to have run already; this waits before each
    /// pass. Only returns if a pass reports that no source is enabled.
    pub async fn run_periodic(&self, interval: Duration) -> MonitorResult<()> {
        loop {
            tokio::time::sleep(interval).await;
            info!("refreshing tokens, zones and domains list");
            self.refresh().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use certlife_core::{CertlifeError, ProbeOutcome, Result};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StaticSource {
        name: &'static str,
        domains: Vec<&'static str>,
        failing: AtomicBool,
    }

    impl StaticSource {
        fn boxed(name: &'static str, domains: &[&'static str]) -> Box<dyn ZoneSource> {
            Box::new(Self {
                name,
                domains: domains.to_vec(),
                failing: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl ZoneSource for StaticSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch_domains(&self) -> Result<Vec<String>> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CertlifeError::Connection("refused".into()));
            }
            Ok(self.domains.iter().map(ToString::to_string).collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ZoneSource for FailingSource {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn fetch_domains(&self) -> Result<Vec<String>> {
            Err(CertlifeError::Unauthorized("bad token".into()))
        }
    }

    fn refresher(
        sources: Vec<Box<dyn ZoneSource>>,
        patterns: &[&str],
        additions: &[&str],
    ) -> (Refresher, Arc<DomainRegistry>, Arc<ResultsStore>) {
        let registry = Arc::new(DomainRegistry::new());
        let results = Arc::new(ResultsStore::new());
        let refresher = Refresher::new(
            sources,
            ExclusionFilter::new(patterns).unwrap(),
            additions.iter().map(ToString::to_string).collect(),
            Arc::clone(&registry),
            Arc::clone(&results),
        );
        (refresher, registry, results)
    }

    #[tokio::test]
    async fn test_sources_then_static_additions() {
        let (refresher, registry, _) = refresher(
            vec![StaticSource::boxed("one", &["a.example", "b.example"])],
            &[],
            &["c.example:8443"],
        );

        let report = refresher.refresh().await.unwrap();
        assert!(report.installed);
        assert_eq!(report.domains, 3);
        assert_eq!(
            *registry.snapshot(),
            vec!["a.example", "b.example", "c.example:8443"]
        );
    }

    #[tokio::test]
    async fn test_exclusions_skip_additions() {
        let (refresher, registry, _) = refresher(
            vec![StaticSource::boxed(
                "one",
                &["foo.com", "bar.org", "baz.ru", "qux.io"],
            )],
            &[r"^foo\.com$", r"^ba(r|z)\.(org|ru)"],
            &["foo.com"],
        );

        refresher.refresh().await.unwrap();
        assert_eq!(*registry.snapshot(), vec!["qux.io", "foo.com"]);
    }

    #[tokio::test]
    async fn test_match_all_leaves_additions() {
        let (refresher, registry, _) = refresher(
            vec![StaticSource::boxed("one", &["a.example", "b.example"])],
            &[".*"],
            &["static.example"],
        );

        refresher.refresh().await.unwrap();
        assert_eq!(*registry.snapshot(), vec!["static.example"]);
    }

    #[tokio::test]
    async fn test_source_order_and_duplicates() {
        let (refresher, registry, _) = refresher(
            vec![
                StaticSource::boxed("nic", &["x.example", "shared.example"]),
                StaticSource::boxed("pdd", &["shared.example", "y.example"]),
            ],
            &[],
            &["shared.example:8443"],
        );

        refresher.refresh().await.unwrap();
        assert_eq!(
            *registry.snapshot(),
            vec![
                "x.example",
                "shared.example",
                "shared.example",
                "y.example",
                "shared.example:8443"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_source_contributes_nothing() {
        let (refresher, registry, _) = refresher(
            vec![
                Box::new(FailingSource) as Box<dyn ZoneSource>,
                StaticSource::boxed("pdd", &["ok.example"]),
            ],
            &[],
            &[],
        );

        let report = refresher.refresh().await.unwrap();
        assert_eq!(report.failed_sources, vec!["broken"]);
        assert_eq!(*registry.snapshot(), vec!["ok.example"]);
    }

    #[tokio::test]
    async fn test_all_sources_failing_keeps_registry() {
        let registry = Arc::new(DomainRegistry::new());
        let results = Arc::new(ResultsStore::new());
        let source = Arc::new(StaticSource {
            name: "nic",
            domains: vec!["a.example"],
            failing: AtomicBool::new(false),
        });

        struct Shared(Arc<StaticSource>);

        #[async_trait]
        impl ZoneSource for Shared {
            fn name(&self) -> &'static str {
                self.0.name()
            }

            async fn fetch_domains(&self) -> Result<Vec<String>> {
                self.0.fetch_domains().await
            }
        }

        let refresher = Refresher::new(
            vec![Box::new(Shared(Arc::clone(&source))) as Box<dyn ZoneSource>],
            ExclusionFilter::empty(),
            vec!["static.example".into()],
            Arc::clone(&registry),
            results,
        );

        refresher.refresh().await.unwrap();
        assert_eq!(registry.len(), 2);

        source.failing.store(true, Ordering::SeqCst);
        let report = refresher.refresh().await.unwrap();
        assert!(!report.installed);
        assert_eq!(*registry.snapshot(), vec!["a.example", "static.example"]);
    }

    #[tokio::test]
    async fn test_first_pass_with_all_sources_failing_installs_additions() {
        let (refresher, registry, _) =
            refresher(vec![Box::new(FailingSource) as Box<dyn ZoneSource>], &[], &["static.example"]);

        let report = refresher.refresh().await.unwrap();
        assert!(report.installed);
        assert_eq!(*registry.snapshot(), vec!["static.example"]);
    }

    #[tokio::test]
    async fn test_empty_everything_yields_empty_registry() {
        let (refresher, registry, _) = refresher(vec![StaticSource::boxed("one", &[])], &[], &[]);

        let report = refresher.refresh().await.unwrap();
        assert!(report.installed);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_no_sources_enabled() {
        let (refresher, _, _) = refresher(Vec::new(), &[], &["static.example"]);
        assert!(matches!(
            refresher.refresh().await,
            Err(MonitorError::NoSourcesEnabled)
        ));
    }

    #[tokio::test]
    async fn test_identical_passes_are_idempotent() {
        let (refresher, registry, _) = refresher(
            vec![StaticSource::boxed("one", &["a.example", "b.example"])],
            &["^b"],
            &["c.example"],
        );

        refresher.refresh().await.unwrap();
        let first = registry.snapshot();
        refresher.refresh().await.unwrap();
        assert_eq!(*first, *registry.snapshot());
    }

    #[tokio::test]
    async fn test_prunes_results_of_dropped_domains() {
        let (refresher, _, results) = refresher(
            vec![StaticSource::boxed("one", &["a.example"])],
            &[],
            &[],
        );
        results.put("a.example", ProbeOutcome::ok(100.0));
        results.put("old.example", ProbeOutcome::fail());

        let report = refresher.refresh().await.unwrap();
        assert_eq!(report.pruned, 1);
        assert!(results.get("old.example").is_none());
        assert!(results.get("a.example").is_some());
    }
}
