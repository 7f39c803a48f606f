//! HTTP client for the device's local control endpoint
//!
//! The device exposes a single plain-HTTP endpoint at `http://{host}/` and
//! takes one query parameter per operation. Responses are `text/plain`. The
//! client performs exactly one exchange per call and never retries; retry
//! policy belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::command::Command;
use crate::error::{ApiError, Result};
use crate::status::StatusUpdate;

/// Timeouts applied to every exchange
///
/// Both bounds are mandatory so a wedged device cannot hang the poll loop.
#[derive(Debug, Clone, Copy)]
pub struct ClientConfig {
    /// Time allowed to establish the TCP connection
    pub connect_timeout: Duration,
    /// Time allowed for the whole request/response exchange
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

/// Transport seam for a single device exchange
///
/// Implemented by [`DeviceClient`]; sessions and tests can substitute their
/// own implementation.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Send one mutating command, returning the raw response body
    async fn send(&self, command: &Command) -> Result<String>;

    /// Fetch and parse the full status snapshot
    async fn status(&self) -> Result<StatusUpdate>;

    /// Fetch the device serial number
    async fn serial_number(&self) -> Result<String>;

    /// Fetch the device software version
    async fn software_version(&self) -> Result<String>;
}

/// HTTP transport for one device, addressed by host
#[derive(Debug, Clone)]
pub struct DeviceClient {
    host: String,
    http: reqwest::Client,
}

impl DeviceClient {
    /// Create a client with default timeouts
    pub fn new(host: impl Into<String>) -> Result<Self> {
        Self::with_config(host, ClientConfig::default())
    }

    /// Create a client with explicit timeouts
    pub fn with_config(host: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Ok(Self {
            host: host.into(),
            http,
        })
    }

    /// Host this client talks to
    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self) -> String {
        // These devices are plain HTTP, no TLS
        format!("http://{}/", self.host)
    }

    async fn get(&self, key: &str, value: &str) -> Result<String> {
        debug!(host = %self.host, "GET {key}={value}");
        let response = self
            .http
            .get(self.url())
            .query(&[(key, value)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Protocol(format!("HTTP {status}")));
        }
        let body = response.text().await?;
        debug!(host = %self.host, "Result: {body}");
        Ok(body)
    }

    /// Fetch the device MAC address
    pub async fn mac_address(&self) -> Result<String> {
        Ok(self.get("GETMAC", "").await?.trim().to_string())
    }

    /// Fetch the IP address the device believes it has
    pub async fn ip_address(&self) -> Result<String> {
        Ok(self.get("GETIP", "").await?.trim().to_string())
    }
}

#[async_trait]
impl DeviceTransport for DeviceClient {
    async fn send(&self, command: &Command) -> Result<String> {
        command.validate()?;
        let (key, value) = command.query_param();
        self.get(key, &value).await
    }

    async fn status(&self) -> Result<StatusUpdate> {
        self.get("GETSTATUS", "").await?.parse()
    }

    async fn serial_number(&self) -> Result<String> {
        Ok(self.get("GETOASISID", "").await?.trim().to_string())
    }

    async fn software_version(&self) -> Result<String> {
        Ok(self.get("GETSOFTWAREVER", "").await?.trim().to_string())
    }
}
