//! Text exposition of the results store over plain HTTP.

use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use certlife_core::ProbeOutcome;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use crate::error::{MonitorError, MonitorResult};
use crate::results::ResultsStore;

/// Default listen address
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Default scrape path
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Name of the exported series
pub const METRIC_NAME: &str = "certificate_lifetime";

const CONTENT_TYPE: &str = "text/plain; version=0.0.4";
const MAX_REQUEST_HEAD: usize = 8192;

/// Default time a client gets to send its request head
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Backoff after a failed accept, e.g. when file descriptors run out
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Render entries in the text exposition format, one line each
pub fn render(entries: &[(String, ProbeOutcome)]) -> String {
    let mut out = String::with_capacity(entries.len() * 64);
    for (fqdn, outcome) in entries {
        let _ = writeln!(
            out,
            "{METRIC_NAME}{{domain=\"{}\",check=\"{}\"}} {:.6}",
            escape_label(fqdn),
            outcome.status,
            outcome.remaining_seconds
        );
    }
    out
}

fn escape_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Minimal HTTP/1.1 listener that serves the rendered store on one path
pub struct MetricsServer {
    listener: TcpListener,
    path: Arc<str>,
    results: Arc<ResultsStore>,
    read_timeout: Duration,
}

impl MetricsServer {
    /// Bind the listener.
    ///
    /// Failure to bind is fatal for the process.
    pub async fn bind(addr: &str, path: &str, results: Arc<ResultsStore>) -> MonitorResult<Self> {
        if !path.starts_with('/') {
            return Err(MonitorError::Config(format!(
                "metrics path must start with '/': {path:?}"
            )));
        }

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| MonitorError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        Ok(Self {
            listener,
            path: Arc::from(path),
            results,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Drop connections that have not sent a request head within `timeout`
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Address actually bound
    pub fn local_addr(&self) -> MonitorResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and answer scrapes forever
    pub async fn serve(self) {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "failed to accept metrics connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            let path = Arc::clone(&self.path);
            let results = Arc::clone(&self.results);
            let read_timeout = self.read_timeout;
            tokio::spawn(async move {
                if let Err(e) = handle(stream, &path, &results, read_timeout).await {
                    debug!(peer = %peer, error = %e, "metrics connection dropped");
                }
            });
        }
    }
}

/// Read until the end of the request head, EOF, or a full buffer
async fn read_head(stream: &mut TcpStream, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        let n = stream.read(&mut buf[read..]).await?;
        if n == 0 {
            break;
        }
        read += n;
        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    Ok(read)
}

async fn handle(
    mut stream: TcpStream,
    path: &str,
    results: &ResultsStore,
    read_timeout: Duration,
) -> std::io::Result<()> {
    let mut buf = vec![0u8; MAX_REQUEST_HEAD];
    let read = tokio::time::timeout(read_timeout, read_head(&mut stream, &mut buf))
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "no request head"))??;

    let head = String::from_utf8_lossy(&buf[..read]);
    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default();
    let target = request_line.next().unwrap_or("/");
    let target = target.split_once('?').map_or(target, |(p, _)| p);

    let (status, body) = if target != path {
        ("404 Not Found", "404 page not found\n".to_string())
    } else if method == "GET" || method == "HEAD" {
        ("200 OK", render(&results.iterate()))
    } else {
        ("405 Method Not Allowed", "method not allowed\n".to_string())
    };

    let mut response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {CONTENT_TYPE}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    if method != "HEAD" {
        response.push_str(&body);
    }

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
