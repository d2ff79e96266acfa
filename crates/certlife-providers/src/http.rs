//! Thin HTTP layer shared by the provider clients.

use certlife_core::{CertlifeError, Result};
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientOptions;

/// HTTP client bound to one provider API
#[derive(Clone)]
pub(crate) struct ApiClient {
    http: HttpClient,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the provider whose default API root is `default_base`
    pub(crate) fn new(options: &ClientOptions, default_base: &str) -> Result<Self> {
        let base_url = options.resolve_base_url(default_base)?;
        let http = HttpClient::builder()
            .timeout(options.timeout)
            .user_agent(&options.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| CertlifeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    /// Absolute URL for an API path
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(url = %url, "GET request");
        self.http.get(url)
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(url = %url, "POST request");
        self.http.post(url)
    }

    /// Send a request and return the body of a successful response
    pub(crate) async fn send_text(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(status_error(status.as_u16(), body))
        }
    }

    /// Send a request and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send_text(request).await?;
        serde_json::from_str(&body).map_err(CertlifeError::Json)
    }

    /// Send a request and decode an XML body
    pub(crate) async fn send_xml<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send_text(request).await?;
        quick_xml::de::from_str(&body).map_err(|e| CertlifeError::Xml(e.to_string()))
    }
}

/// Classify a transport-level failure
fn map_transport_error(err: reqwest::Error) -> CertlifeError {
    if err.is_timeout() {
        CertlifeError::Timeout(err.to_string())
    } else if err.is_connect() {
        CertlifeError::Connection(err.to_string())
    } else {
        CertlifeError::Http(err.to_string())
    }
}

/// Convert a non-success response into a `CertlifeError`
fn status_error(status: u16, body: String) -> CertlifeError {
    // Try to pull an error message out of a JSON body
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(body);

    match status {
        401 | 403 => {
            warn!(status, "provider rejected credentials");
            CertlifeError::Unauthorized(message)
        }
        _ => CertlifeError::Api {
            code: status,
            message,
        },
    }
}
