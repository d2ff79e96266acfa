//! Core types and traits for the certlife certificate lifetime monitor.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - **Types**: probe outcomes and DNS zone records
//! - **Sources**: the [`ZoneSource`] trait every DNS provider implements
//! - **Errors**: provider-facing error handling with [`CertlifeError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use certlife_core::{Result, ZoneSource};
//!
//! async fn count(source: &dyn ZoneSource) -> Result<usize> {
//!     Ok(source.fetch_domains().await?.len())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/certlife-core/1.0.0")]

mod error;
mod source;
pub mod types;

pub use error::{CertlifeError, Result};
pub use source::ZoneSource;
pub use types::*;
