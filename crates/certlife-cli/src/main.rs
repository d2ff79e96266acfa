//! certlife - TLS certificate lifetime exporter
//!
//! Discovers domains through DNS provider APIs and exposes the remaining
//! lifetime of their certificates for Prometheus.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    certlife_cli::run().await
}
