//! Yandex PDD (pddimp.yandex.ru) zone source.

use std::sync::Arc;

use async_trait::async_trait;
use certlife_core::{CertlifeError, Result, ZoneRecord, ZoneSource};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::config::ClientOptions;
use crate::http::ApiClient;

/// The PDD API base URL
const DEFAULT_BASE_URL: &str = "https://pddimp.yandex.ru";

/// Header carrying the administrator token
const TOKEN_HEADER: &str = "PddToken";

/// Zone source backed by the Yandex PDD admin API
#[derive(Clone)]
pub struct PddSource {
    inner: Arc<PddInner>,
}

struct PddInner {
    api: ApiClient,
    token: String,
}

/// One page of `/api2/admin/domain/domains`
#[derive(Debug, Default, Deserialize)]
struct DomainPage {
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    on_page: u32,
    #[serde(default)]
    found: u32,
    #[serde(default)]
    domains: Vec<PddDomain>,
}

#[derive(Debug, Deserialize)]
struct PddDomain {
    name: String,
}

/// Response of `/api2/admin/dns/list`
#[derive(Debug, Default, Deserialize)]
struct RecordList {
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    records: Vec<PddRecord>,
}

#[derive(Debug, Deserialize)]
struct PddRecord {
    fqdn: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    subdomain: Option<String>,
}

impl PddRecord {
    fn is_probe_target(&self) -> bool {
        ZoneRecord::new(self.subdomain.as_deref().unwrap_or_default(), self.record_type.as_str())
            .is_probe_target()
    }
}

/// PDD reports failures in-band with `success: "error"`
fn check_success(success: Option<&str>, error: Option<&str>) -> Result<()> {
    if success != Some("error") {
        return Ok(());
    }
    let reason = error.unwrap_or("unknown").to_string();
    match reason.as_str() {
        "no_auth" | "bad_token" | "no_access" | "bad_login" => {
            Err(CertlifeError::Unauthorized(reason))
        }
        _ => Err(CertlifeError::Api {
            code: 200,
            message: reason,
        }),
    }
}

impl PddSource {
    /// Create a source against the public PDD API
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_options(token, &ClientOptions::default())
    }

    /// Create a source with custom transport options
    pub fn with_options(token: impl Into<String>, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(PddInner {
                api: ApiClient::new(options, DEFAULT_BASE_URL)?,
                token: token.into(),
            }),
        })
    }

    /// Walk the paginated domain list
    async fn zones(&self) -> Result<Vec<String>> {
        let api = &self.inner.api;
        let mut zones = Vec::new();

        for page in 1u32.. {
            let request = api
                .get("/api2/admin/domain/domains")
                .query(&[("page", page.to_string())])
                .header(TOKEN_HEADER, &self.inner.token);
            let body: DomainPage = api.send_json(request).await?;
            check_success(body.success.as_deref(), body.error.as_deref())?;

            let last = body.domains.is_empty() || body.found < body.on_page;
            zones.extend(body.domains.into_iter().map(|d| d.name));
            if last {
                break;
            }
        }

        info!(total = zones.len(), zones = ?zones, "got pdd zones");
        Ok(zones)
    }

    async fn zone_domains(&self, zone: &str) -> Result<Vec<String>> {
        let api = &self.inner.api;
        let request = api
            .get("/api2/admin/dns/list")
            .query(&[("domain", zone)])
            .header(TOKEN_HEADER, &self.inner.token);
        let body: RecordList = api.send_json(request).await?;
        check_success(body.success.as_deref(), body.error.as_deref())?;

        Ok(body
            .records
            .into_iter()
            .filter(PddRecord::is_probe_target)
            .map(|r| r.fqdn)
            .collect())
    }
}

#[async_trait]
impl ZoneSource for PddSource {
    fn name(&self) -> &'static str {
        "pdd"
    }

    #[instrument(skip(self), fields(provider = "pdd"))]
    async fn fetch_domains(&self) -> Result<Vec<String>> {
        let zones = self.zones().await?;

        let mut domains = Vec::new();
        for zone in &zones {
            domains.extend(self.zone_domains(zone).await?);
        }
        Ok(domains)
    }
}
