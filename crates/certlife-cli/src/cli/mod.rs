//! CLI argument parsing and process lifecycle.

pub mod args;

use anyhow::{Context, Result};
use args::Cli;
use certlife_monitor::{Monitor, MonitorConfig};
use clap::Parser;
use tracing::info;

use crate::config::Config;
use crate::logging::init_logging;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.sample {
        let sample = serde_json::to_string_pretty(&Config::sample())?;
        println!("{sample}");
        return Ok(());
    }

    init_logging(cli.verbose);

    let config = Config::load(&cli.config)?;
    if config.all_disabled() {
        info!("all DNS providers are disabled, exiting");
        return Ok(());
    }

    let sources = config.zone_sources()?;
    info!(
        config = %cli.config.display(),
        providers = sources.len(),
        workers = cli.concur,
        "starting certlife"
    );

    Monitor::new(monitor_config(&cli, config), sources)
        .run()
        .await
        .context("monitor stopped")
}

/// Merge command-line settings with the configuration file
pub fn monitor_config(cli: &Cli, config: Config) -> MonitorConfig {
    MonitorConfig {
        workers: usize::from(cli.concur),
        pause: cli.pause(),
        refresh_interval: cli.refresh_interval(),
        probe_timeout: cli.probe_timeout(),
        listen: cli.listen.clone(),
        metrics_path: cli.location.clone(),
        exclude_patterns: config.global.exclude_domains,
        static_domains: config.global.add_domains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_monitor_config_merges_sources() {
        let cli = Cli::try_parse_from(["certlife", "--concur", "3", "--refresh", "5"]).unwrap();
        let monitor = monitor_config(&cli, Config::sample());

        assert_eq!(monitor.workers, 3);
        assert_eq!(monitor.refresh_interval, Duration::from_secs(300));
        assert_eq!(monitor.metrics_path, "/metrics");
        assert_eq!(
            monitor.exclude_patterns,
            vec![r"^foo\.com$", r"^ba(r|z)\.(org|ru)"]
        );
        assert_eq!(
            monitor.static_domains,
            vec!["baz.io:3000", "fiz.svc.cluster.local:8080"]
        );
    }
}
