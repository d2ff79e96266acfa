//! The certlife probe pipeline.
//!
//! Data flows in one direction:
//!
//! ```text
//! Refresher -> DomainRegistry -> Dispatcher -> channel(W) -> WorkerPool -> ResultsStore -> MetricsServer
//! ```
//!
//! - [`Refresher`] queries every [`ZoneSource`](certlife_core::ZoneSource),
//!   drops excluded names, appends static additions, and swaps the registry.
//! - [`Dispatcher`] feeds registry snapshots into a bounded channel whose
//!   capacity equals the worker count, then pauses.
//! - [`WorkerPool`] runs `W` workers, each doing one TLS probe at a time.
//! - [`MetricsServer`] renders the [`ResultsStore`] for scrapers.
//!
//! [`Monitor`] wires all of the above from a [`MonitorConfig`].

#![doc(html_root_url = "https://docs.rs/certlife-monitor/1.0.0")]

mod error;

pub mod dispatcher;
pub mod exclusion;
pub mod exposer;
pub mod monitor;
pub mod probe;
pub mod refresher;
pub mod registry;
pub mod results;
pub mod worker;

pub use dispatcher::Dispatcher;
pub use error::{MonitorError, MonitorResult};
pub use exclusion::ExclusionFilter;
pub use exposer::{render, MetricsServer};
pub use monitor::{Monitor, MonitorConfig};
pub use probe::{outcome_from_certificate, HttpsProber, Prober};
pub use refresher::{RefreshReport, Refresher};
pub use registry::DomainRegistry;
pub use results::ResultsStore;
pub use worker::WorkerPool;
