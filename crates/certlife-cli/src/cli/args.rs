//! Command-line argument definitions using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Export TLS certificate lifetimes for Prometheus
///
/// Domains are discovered through the DNS provider APIs enabled in the
/// configuration file, probed over HTTPS, and exposed as
/// `certificate_lifetime{domain,check}` gauges.
#[derive(Parser, Debug)]
#[command(name = "certlife")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, env = "CERTLIFE_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Number of concurrent probe workers
    #[arg(long, env = "CERTLIFE_CONCUR", default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
    pub concur: u16,

    /// Seconds to pause after each full probe pass
    #[arg(long, env = "CERTLIFE_PAUSE", default_value_t = 1800)]
    pub pause: u64,

    /// Minutes between domain list refreshes
    #[arg(long, env = "CERTLIFE_REFRESH", default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh: u64,

    /// Per-probe timeout in seconds
    #[arg(long, env = "CERTLIFE_TIMEOUT", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Log every probe
    #[arg(short, long, env = "CERTLIFE_VERBOSE")]
    pub verbose: bool,

    /// Address to serve metrics on
    #[arg(long, env = "CERTLIFE_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Path to serve metrics on
    #[arg(long, env = "CERTLIFE_LOCATION", default_value = "/metrics")]
    pub location: String,

    /// Print a sample configuration and exit
    #[arg(long)]
    pub sample: bool,
}

impl Cli {
    /// Pause between passes
    pub const fn pause(&self) -> Duration {
        Duration::from_secs(self.pause)
    }

    /// Period between refreshes
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh * 60)
    }

    /// Per-probe timeout
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
