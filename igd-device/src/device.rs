//! The control point: resolves a WAN connection service and invokes actions on it.

use std::sync::Arc;

use soap_client::{HttpTransport, SoapClient, TransportConfig};
use xmltree::Element;

use crate::description::DeviceDescription;
use crate::error::{IgdError, Result};
use crate::location::{base_url, resolve};

/// WAN connection service types accepted by default, in preference order
pub const WAN_CONNECTION_SERVICES: [&str; 3] = [
    "urn:schemas-upnp-org:service:WANIPConnection:1",
    "urn:schemas-upnp-org:service:WANIPConnection:2",
    "urn:schemas-upnp-org:service:WANPPPConnection:1",
];

/// Configuration for a [`Device`]
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Acceptable service types
    /// Default: [`WAN_CONNECTION_SERVICES`]
    pub service_types: Vec<String>,

    /// Settings for the HTTP transport
    /// Default: no timeouts
    pub transport: TransportConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            service_types: WAN_CONNECTION_SERVICES.iter().map(|s| s.to_string()).collect(),
            transport: TransportConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// Create a DeviceConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only the given service types
    pub fn with_service_types<I, S>(mut self, service_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service_types = service_types.into_iter().map(Into::into).collect();
        self
    }

    /// Use the given transport settings
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}

/// The service selected from a description, URLs made absolute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedService {
    /// Service type URI, used as the action namespace
    pub service_type: String,
    /// Absolute URL actions are POSTed to
    pub control_url: String,
    /// Absolute URL of the service's SCPD document
    pub scpd_url: String,
}

/// A UPnP gateway reachable through its device description URL.
///
/// Immutable after construction and cheap to clone; clones can run actions
/// concurrently. Nothing is cached: every [`run`](Device::run) re-fetches the
/// description and re-resolves the service before posting the action.
///
/// # Example
///
/// ```no_run
/// use igd_device::Device;
///
/// # async fn example() -> igd_device::Result<()> {
/// let device = Device::new("http://192.168.1.1:5431/dyndev/uuid:0000e0b8-60a0-00e0-a0a0-48a0000808e0");
/// let body = device
///     .run(
///         "DeletePortMapping",
///         &[("NewRemoteHost", ""), ("NewExternalPort", "8080"), ("NewProtocol", "TCP")],
///     )
///     .await?;
/// println!("{:?}", body);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Device {
    url: String,
    service_types: Arc<[String]>,
    soap_client: SoapClient,
}

impl Device {
    /// Create a device accepting the default WAN connection services
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_soap_client(url, DeviceConfig::default().service_types, SoapClient::new())
    }

    /// Create a device from a configuration
    pub fn with_config(url: impl Into<String>, config: DeviceConfig) -> Result<Self> {
        let soap_client = SoapClient::with_config(&config.transport)?;
        Ok(Self::with_soap_client(url, config.service_types, soap_client))
    }

    /// Create a device over a caller-supplied transport
    pub fn with_transport(
        url: impl Into<String>,
        service_types: Vec<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self::with_soap_client(url, service_types, SoapClient::with_transport(transport))
    }

    fn with_soap_client(
        url: impl Into<String>,
        service_types: Vec<String>,
        soap_client: SoapClient,
    ) -> Self {
        Self {
            url: url.into(),
            service_types: service_types.into(),
            soap_client,
        }
    }

    /// Description URL this device was created with
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Acceptable service types
    pub fn service_types(&self) -> &[String] {
        &self.service_types
    }

    /// Fetch and parse the device description
    pub async fn description(&self) -> Result<DeviceDescription> {
        let xml = self.soap_client.get_xml(&self.url).await?;
        DeviceDescription::from_xml(&xml)
    }

    /// Fetch the description and resolve the first acceptable service.
    ///
    /// # Errors
    ///
    /// `IgdError::ServiceNotFound` when no acceptable service is declared, or
    /// when the first one lacks a control URL or SCPD URL.
    pub async fn service(&self) -> Result<ResolvedService> {
        let description = self.description().await?;
        self.resolve_service(&description)
    }

    /// Resolve the first acceptable service of an already fetched description
    pub fn resolve_service(&self, description: &DeviceDescription) -> Result<ResolvedService> {
        let service = description
            .find_service(&self.service_types[..])
            .ok_or(IgdError::ServiceNotFound)?;

        let (control_url, scpd_url) = match (service.control_url(), service.scpd_url()) {
            (Some(control), Some(scpd)) => (control, scpd),
            _ => {
                tracing::debug!(
                    service_type = %service.service_type,
                    "matched service lacks controlURL or SCPDURL"
                );
                return Err(IgdError::ServiceNotFound);
            }
        };

        let base = base_url(description.base_url(), &self.url)?;
        let resolved = ResolvedService {
            service_type: service.service_type.trim().to_string(),
            control_url: resolve(&base, control_url)?.to_string(),
            scpd_url: resolve(&base, scpd_url)?.to_string(),
        };

        tracing::debug!(
            service_type = %resolved.service_type,
            control_url = %resolved.control_url,
            "resolved gateway service"
        );

        Ok(resolved)
    }

    /// Invoke `action` with ordered `(name, value)` arguments and return the
    /// SOAP response `Body`.
    ///
    /// Issues exactly two requests: the description fetch and the action
    /// POST. The first error encountered is returned; nothing is retried.
    /// A SOAP fault is returned as an ordinary body.
    pub async fn run<N, V>(&self, action: &str, args: &[(N, V)]) -> Result<Element>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let service = self.service().await?;

        let body = self
            .soap_client
            .call(&service.control_url, &service.service_type, action, args)
            .await?;

        Ok(body)
    }
}
