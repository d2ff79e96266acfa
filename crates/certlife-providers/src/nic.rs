//! RU-CENTER (api.nic.ru) zone source.
//!
//! Every fetch runs the full handshake: an OAuth password grant for a bearer
//! token scoped to `GET:/dns-master/.+`, the zone list, then the records of
//! each zone. Token lifetime (4h) comfortably covers one fetch.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use certlife_core::{probe_targets, CertlifeError, Result, ZoneRecord, ZoneSource};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::ClientOptions;
use crate::http::ApiClient;

/// The RU-CENTER API base URL
const DEFAULT_BASE_URL: &str = "https://api.nic.ru";

/// OAuth scope needed to read DNS-master data
const TOKEN_SCOPE: &str = "GET:/dns-master/.+";

/// Account and application credentials for the NIC API
#[derive(Debug, Clone, Default)]
pub struct NicCredentials {
    /// Account login (contract number)
    pub login: String,
    /// Account password
    pub password: String,
    /// OAuth application id
    pub app_login: String,
    /// OAuth application secret
    pub app_password: String,
}

/// Zone source backed by the NIC DNS-master API
#[derive(Clone)]
pub struct NicSource {
    inner: Arc<NicInner>,
}

struct NicInner {
    api: ApiClient,
    credentials: NicCredentials,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ZonesResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Option<ErrorList>,
    #[serde(default)]
    data: ZoneList,
}

#[derive(Debug, Default, Deserialize)]
struct ZoneList {
    #[serde(rename = "zone", default)]
    zones: Vec<NicZone>,
}

#[derive(Debug, Deserialize)]
struct NicZone {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@service")]
    service: String,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Option<ErrorList>,
    #[serde(default)]
    data: Option<RecordsData>,
}

#[derive(Debug, Deserialize)]
struct RecordsData {
    zone: RecordsZone,
}

#[derive(Debug, Deserialize)]
struct RecordsZone {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "rr", default)]
    records: Vec<ResourceRecord>,
}

#[derive(Debug, Deserialize)]
struct ResourceRecord {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorList {
    #[serde(rename = "error", default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(rename = "@code", default)]
    code: Option<String>,
    #[serde(rename = "$text", default)]
    message: Option<String>,
}

/// Turn a non-success `<status>` into an error
fn check_status(status: &str, errors: Option<&ErrorList>) -> Result<()> {
    if status.is_empty() || status.eq_ignore_ascii_case("success") {
        return Ok(());
    }

    let message = errors
        .map(|list| {
            list.errors
                .iter()
                .map(|e| {
                    format!(
                        "{} ({})",
                        e.message.as_deref().unwrap_or("unknown error"),
                        e.code.as_deref().unwrap_or("-")
                    )
                })
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("status {status}"));

    Err(CertlifeError::Api { code: 200, message })
}

impl NicSource {
    /// Create a source against the public NIC API
    pub fn new(credentials: NicCredentials) -> Result<Self> {
        Self::with_options(credentials, &ClientOptions::default())
    }

    /// Create a source with custom transport options
    pub fn with_options(credentials: NicCredentials, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(NicInner {
                api: ApiClient::new(options, DEFAULT_BASE_URL)?,
                credentials,
            }),
        })
    }

    /// Acquire a bearer token via the OAuth password grant
    async fn token(&self) -> Result<String> {
        let creds = &self.inner.credentials;
        let app_auth = URL_SAFE.encode(format!("{}:{}", creds.app_login, creds.app_password));

        let request = self
            .inner
            .api
            .post("/oauth/token")
            .query(&[
                ("grant_type", "password"),
                ("scope", TOKEN_SCOPE),
                ("username", creds.login.as_str()),
                ("password", creds.password.as_str()),
            ])
            .header(AUTHORIZATION, format!("Basic {app_auth}"))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");

        let token: TokenResponse = self.inner.api.send_json(request).await?;
        if token.access_token.is_empty() {
            return Err(CertlifeError::Unauthorized(
                "empty access token in NIC response".to_string(),
            ));
        }
        debug!("acquired nic token");
        Ok(token.access_token)
    }

    async fn zones(&self, token: &str) -> Result<Vec<NicZone>> {
        let request = self
            .inner
            .api
            .get("/dns-master/zones")
            .bearer_auth(token);
        let response: ZonesResponse = self.inner.api.send_xml(request).await?;
        check_status(&response.status, response.errors.as_ref())?;

        let zones = response.data.zones;
        info!(
            total = zones.len(),
            zones = ?zones.iter().map(|z| z.name.as_str()).collect::<Vec<_>>(),
            "got nic zones"
        );
        Ok(zones)
    }

    async fn zone_domains(&self, token: &str, zone: &NicZone) -> Result<Vec<String>> {
        let path = format!(
            "/dns-master/services/{}/zones/{}/records",
            zone.service, zone.name
        );
        let request = self.inner.api.get(&path).bearer_auth(token);
        let response: RecordsResponse = self.inner.api.send_xml(request).await?;
        check_status(&response.status, response.errors.as_ref())?;

        let Some(data) = response.data else {
            return Ok(Vec::new());
        };

        let records: Vec<ZoneRecord> = data
            .zone
            .records
            .into_iter()
            .map(|rr| ZoneRecord::new(rr.name, rr.record_type))
            .collect();
        Ok(probe_targets(&records, &data.zone.name))
    }
}

#[async_trait]
impl ZoneSource for NicSource {
    fn name(&self) -> &'static str {
        "nic"
    }

    #[instrument(skip(self), fields(provider = "nic"))]
    async fn fetch_domains(&self) -> Result<Vec<String>> {
        let token = self.token().await?;
        let zones = self.zones(&token).await?;

        let mut domains = Vec::new();
        for zone in &zones {
            domains.extend(self.zone_domains(&token, zone).await?);
        }
        Ok(domains)
    }
}
