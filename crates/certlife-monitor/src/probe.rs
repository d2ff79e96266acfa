//! TLS probe: one HTTPS `HEAD` per domain, certificate validation disabled.

use std::time::Duration;

use async_trait::async_trait;
use certlife_core::ProbeOutcome;
use chrono::{DateTime, Utc};
use reqwest::tls::TlsInfo;
use tracing::{debug, instrument};
use x509_parser::extensions::GeneralName;
use x509_parser::parse_x509_certificate;

use crate::error::{MonitorError, MonitorResult};

/// Default per-probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can measure a domain's certificate lifetime.
///
/// `None` means the probe completed but produced nothing worth recording.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `fqdn` once
    async fn probe(&self, fqdn: &str) -> Option<ProbeOutcome>;
}

/// Probes `https://<fqdn>` with reqwest.
///
/// Invalid, expired and self-signed certificates are accepted so that
/// their expiry is still observed. Redirects are not followed.
#[derive(Clone)]
pub struct HttpsProber {
    http: reqwest::Client,
}

impl HttpsProber {
    /// Build a prober whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> MonitorResult<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .tls_info(true)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("certlife/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MonitorError::Config(format!("failed to build probe client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Prober for HttpsProber {
    #[instrument(skip(self))]
    async fn probe(&self, fqdn: &str) -> Option<ProbeOutcome> {
        let url = format!("https://{fqdn}");
        let response = match self.http.head(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "probe failed");
                return Some(ProbeOutcome::fail());
            }
        };

        let leaf = response
            .extensions()
            .get::<TlsInfo>()
            .and_then(TlsInfo::peer_certificate)
            .map(<[u8]>::to_vec);
        drop(response);

        let Some(der) = leaf else {
            debug!("no peer certificate presented");
            return None;
        };

        match outcome_from_certificate(&der, Utc::now()) {
            Ok(Some(outcome)) => {
                debug!(
                    remaining_seconds = outcome.remaining_seconds,
                    remaining_days = outcome.remaining_days(),
                    "certificate observed"
                );
                Some(outcome)
            }
            Ok(None) => {
                debug!("certificate has no SAN DNS names, nothing recorded");
                None
            }
            Err(e) => {
                debug!(error = %e, "unusable peer certificate");
                None
            }
        }
    }
}

/// Compute the outcome for a DER-encoded certificate observed at `now`.
///
/// Returns `Ok(None)` when the certificate carries no SAN DNS names.
pub fn outcome_from_certificate(
    der: &[u8],
    now: DateTime<Utc>,
) -> MonitorResult<Option<ProbeOutcome>> {
    let (_, cert) =
        parse_x509_certificate(der).map_err(|e| MonitorError::Certificate(e.to_string()))?;

    let dns_names = cert
        .subject_alternative_name()
        .map_err(|e| MonitorError::Certificate(e.to_string()))?
        .map_or(0, |san| {
            san.value
                .general_names
                .iter()
                .filter(|name| matches!(name, GeneralName::DNSName(_)))
                .count()
        });
    if dns_names == 0 {
        return Ok(None);
    }

    #[allow(clippy::cast_precision_loss)]
    let remaining = cert.validity().not_after.timestamp() as f64
        - now.timestamp_millis() as f64 / 1000.0;

    Ok(Some(ProbeOutcome::ok(remaining)))
}
