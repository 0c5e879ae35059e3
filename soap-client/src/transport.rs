//! HTTP transport used for description fetches and SOAP invocations.
//!
//! The [`HttpTransport`] trait is the seam between the SOAP layer and the
//! network. [`ReqwestTransport`] is the production implementation; tests and
//! embedders can supply their own.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::SoapError;

/// Status code and raw body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Minimal asynchronous HTTP capability needed by a control point
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    /// Fetch `url` with a GET request
    async fn get(&self, url: &str) -> Result<HttpResponse, SoapError>;

    /// POST `body` to `url` with the given extra headers
    async fn post(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: String,
    ) -> Result<HttpResponse, SoapError>;
}

/// Transport settings
///
/// The defaults leave timeouts to the underlying HTTP stack.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum time to establish a TCP connection
    /// Default: none
    pub connect_timeout: Option<Duration>,

    /// Maximum time for a whole request, from connect to the last body byte
    /// Default: none
    pub request_timeout: Option<Duration>,

    /// Value of the `User-Agent` header
    /// Default: "igd-client/<version> UPnP/1.1"
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            request_timeout: None,
            user_agent: format!("igd-client/{} UPnP/1.1", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl TransportConfig {
    /// Create a TransportConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings suited to a router on the local network: short connect,
    /// bounded request time
    pub fn local_network() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(5)),
            request_timeout: Some(Duration::from_secs(10)),
            ..Default::default()
        }
    }
}

/// [`HttpTransport`] backed by an async `reqwest` client
///
/// Idle connections are never pooled and every request carries
/// `Connection: close`, so each exchange runs on a fresh connection.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from `config`
    pub fn with_config(config: &TransportConfig) -> Result<Self, SoapError> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .user_agent(config.user_agent.as_str());

        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| SoapError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn finish(response: reqwest::Response) -> Result<HttpResponse, SoapError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SoapError::Network(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::with_config(&TransportConfig::default()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to a pooled default HTTP client");
            Self {
                client: reqwest::Client::new(),
            }
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, SoapError> {
        tracing::trace!(url, "GET");

        let response = self
            .client
            .get(url)
            .header("Connection", "close")
            .send()
            .await
            .map_err(|e| SoapError::Network(e.to_string()))?;

        Self::finish(response).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: String,
    ) -> Result<HttpResponse, SoapError> {
        tracing::trace!(url, bytes = body.len(), "POST");

        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| SoapError::Network(e.to_string()))?;

        Self::finish(response).await
    }
}
