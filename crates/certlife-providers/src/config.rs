//! Client configuration shared by all providers.

use std::time::Duration;

use certlife_core::{CertlifeError, Result};
use url::Url;

/// Default request timeout for provider APIs
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport options for a provider client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Override for the provider's API base URL (useful for testing)
    pub base_url: Option<String>,

    /// Timeout for each request
    pub timeout: Duration,

    /// User-Agent header
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("certlife/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Resolve the base URL against a provider default, without a trailing slash.
    pub(crate) fn resolve_base_url(&self, default: &str) -> Result<String> {
        let raw = self.base_url.as_deref().unwrap_or(default);
        let parsed = Url::parse(raw).map_err(|e| CertlifeError::InvalidUrl(format!("{raw}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CertlifeError::InvalidUrl(format!(
                "{raw}: unsupported scheme {}",
                parsed.scheme()
            )));
        }
        Ok(raw.trim_end_matches('/').to_string())
    }
}
