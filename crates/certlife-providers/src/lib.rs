//! Zone sources for the DNS providers certlife can discover domains from.
//!
//! Each source implements [`certlife_core::ZoneSource`] and hides its own
//! authentication handshake, pagination, and wire format:
//!
//! - [`NicSource`]: RU-CENTER (api.nic.ru), OAuth password grant + XML
//! - [`PddSource`]: Yandex PDD (pddimp.yandex.ru), static token + paged JSON

#![doc(html_root_url = "https://docs.rs/certlife-providers/1.0.0")]

mod config;
mod http;
mod nic;
mod pdd;

pub use certlife_core::{CertlifeError, Result, ZoneSource};
pub use config::ClientOptions;
pub use nic::{NicCredentials, NicSource};
pub use pdd::PddSource;
