//! # certlife-cli
//!
//! Command-line entry point for the certlife exporter.
//!
//! - **Configuration**: JSON file with per-provider sections and global
//!   exclusion and addition lists (`--sample` prints one)
//! - **Providers**: RU-CENTER NIC and Yandex PDD zone sources
//! - **Exposition**: `certificate_lifetime{domain,check}` on `--listen`

pub mod cli;
pub mod config;
pub mod logging;

pub use cli::run;
