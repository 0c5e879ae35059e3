//! Typed WAN connection actions: external address and port mappings.
//!
//! [`Device::run`] hands back raw SOAP bodies and treats faults as ordinary
//! responses. [`Gateway`] sits on top of it, turns `Fault` bodies into
//! [`IgdError::Fault`] and reads the action-specific output arguments.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use xmltree::Element;

use crate::device::Device;
use crate::error::{IgdError, Result};

/// `SpecifiedArrayIndexInvalid`, returned past the last mapping
const ARRAY_INDEX_INVALID: u16 = 713;
/// `NoSuchEntryInArray`, returned by some firmwares instead of 713
const NO_SUCH_ENTRY: u16 = 714;
/// Upper bound on listed mappings, one per external port and protocol
const MAX_PORT_MAPPINGS: usize = 2 * 65536;

/// Transport protocol of a port mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = IgdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            other => Err(IgdError::UnexpectedResponse(format!(
                "Unknown protocol: {}",
                other
            ))),
        }
    }
}

/// A port mapping as added to, or listed by, the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    /// Remote host the mapping is restricted to, empty for any
    pub remote_host: String,
    pub external_port: u16,
    pub protocol: Protocol,
    pub internal_port: u16,
    /// LAN address traffic is forwarded to
    pub internal_client: String,
    pub enabled: bool,
    pub description: String,
    /// Lease in seconds, 0 for a static mapping
    pub lease_duration: u32,
}

impl PortMapping {
    /// Enabled, static mapping from any remote host
    pub fn new(
        protocol: Protocol,
        external_port: u16,
        internal_client: impl Into<String>,
        internal_port: u16,
    ) -> Self {
        Self {
            remote_host: String::new(),
            external_port,
            protocol,
            internal_port,
            internal_client: internal_client.into(),
            enabled: true,
            description: String::new(),
            lease_duration: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_lease_duration(mut self, seconds: u32) -> Self {
        self.lease_duration = seconds;
        self
    }

    pub fn with_remote_host(mut self, remote_host: impl Into<String>) -> Self {
        self.remote_host = remote_host.into();
        self
    }

    fn arguments(&self) -> Vec<(&'static str, String)> {
        vec![
            ("NewRemoteHost", self.remote_host.clone()),
            ("NewExternalPort", self.external_port.to_string()),
            ("NewProtocol", self.protocol.to_string()),
            ("NewInternalPort", self.internal_port.to_string()),
            ("NewInternalClient", self.internal_client.clone()),
            ("NewEnabled", if self.enabled { "1" } else { "0" }.to_string()),
            ("NewPortMappingDescription", self.description.clone()),
            ("NewLeaseDuration", self.lease_duration.to_string()),
        ]
    }

    fn from_response(response: &Element) -> Result<Self> {
        Ok(Self {
            remote_host: argument(response, "NewRemoteHost")?,
            external_port: parse_argument(response, "NewExternalPort")?,
            protocol: argument(response, "NewProtocol")?.parse()?,
            internal_port: parse_argument(response, "NewInternalPort")?,
            internal_client: argument(response, "NewInternalClient")?,
            enabled: matches!(
                argument(response, "NewEnabled")?.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
            description: argument(response, "NewPortMappingDescription")?,
            lease_duration: parse_argument(response, "NewLeaseDuration")?,
        })
    }
}

/// Typed access to the WAN connection service of a [`Device`]
#[derive(Debug, Clone)]
pub struct Gateway {
    device: Device,
}

impl Gateway {
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    /// Gateway for a description URL with default settings
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(Device::new(url))
    }

    /// Underlying control point, for actions not wrapped here
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Public address of the gateway (`GetExternalIPAddress`)
    pub async fn external_ip_address(&self) -> Result<IpAddr> {
        let body = self
            .device
            .run("GetExternalIPAddress", &[] as &[(&str, &str)])
            .await?;
        let response = action_response(&body, "GetExternalIPAddress")?;

        let address = argument(response, "NewExternalIPAddress")?;
        address.parse().map_err(|_| {
            IgdError::UnexpectedResponse(format!("Invalid external address: {:?}", address))
        })
    }

    /// Create or replace a mapping (`AddPortMapping`)
    pub async fn add_port_mapping(&self, mapping: &PortMapping) -> Result<()> {
        tracing::debug!(
            protocol = %mapping.protocol,
            external_port = mapping.external_port,
            internal = %format!("{}:{}", mapping.internal_client, mapping.internal_port),
            "adding port mapping"
        );

        let args = mapping.arguments();
        let body = self.device.run("AddPortMapping", &args[..]).await?;
        action_response(&body, "AddPortMapping").map(|_| ())
    }

    /// Remove a mapping (`DeletePortMapping`); `remote_host` is empty for
    /// mappings that accept any host
    pub async fn delete_port_mapping(
        &self,
        protocol: Protocol,
        external_port: u16,
        remote_host: &str,
    ) -> Result<()> {
        let external_port = external_port.to_string();
        let args = [
            ("NewRemoteHost", remote_host),
            ("NewExternalPort", external_port.as_str()),
            ("NewProtocol", protocol.as_str()),
        ];

        let body = self.device.run("DeletePortMapping", &args).await?;
        action_response(&body, "DeletePortMapping").map(|_| ())
    }

    /// Mapping at `index` (`GetGenericPortMappingEntry`).
    ///
    /// `None` when the gateway answers past the end with a 713/714 fault in
    /// an HTTP 200 response. Standard gateways send that fault with HTTP 500,
    /// which surfaces as `IgdError::HttpStatus(500)` instead.
    pub async fn port_mapping_entry(&self, index: u32) -> Result<Option<PortMapping>> {
        let index = index.to_string();
        let body = self
            .device
            .run("GetGenericPortMappingEntry", &[("NewPortMappingIndex", index.as_str())])
            .await?;

        match action_response(&body, "GetGenericPortMappingEntry") {
            Ok(response) => PortMapping::from_response(response).map(Some),
            Err(IgdError::Fault { code, .. })
                if code == ARRAY_INDEX_INVALID || code == NO_SUCH_ENTRY =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Every mapping, walking indexes from 0 until the gateway reports the end.
    ///
    /// Gateways deliver the terminating fault with HTTP 500, which surfaces
    /// as `HttpStatus(500)` before the body is read, so that status ends the
    /// list at any index; an empty table yields an empty list. Firmwares that
    /// ignore the index and repeat an entry end the list at the repetition.
    pub async fn port_mappings(&self) -> Result<Vec<PortMapping>> {
        let mut mappings: Vec<PortMapping> = Vec::new();

        while mappings.len() < MAX_PORT_MAPPINGS {
            let index = mappings.len() as u32;
            match self.port_mapping_entry(index).await {
                Ok(Some(mapping)) => {
                    if mappings.last() == Some(&mapping) {
                        tracing::warn!(index, "gateway repeated the previous mapping, stopping");
                        break;
                    }
                    mappings.push(mapping);
                }
                Ok(None) | Err(IgdError::HttpStatus(500)) => break,
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(count = mappings.len(), "listed port mappings");
        Ok(mappings)
    }
}

/// The `<{action}Response>` element of a body, or the fault it carries
fn action_response<'a>(body: &'a Element, action: &str) -> Result<&'a Element> {
    if let Some(fault) = body.get_child("Fault") {
        return Err(fault_error(fault));
    }

    let response_name = format!("{}Response", action);
    body.get_child(response_name.as_str())
        .ok_or_else(|| IgdError::UnexpectedResponse(format!("Missing {} element", response_name)))
}

fn fault_error(fault: &Element) -> IgdError {
    let upnp_error = fault.get_child("detail").and_then(|detail| {
        detail
            .get_child("UPnPError")
            .or_else(|| detail.get_child("UpnPError"))
    });

    let code = upnp_error
        .and_then(|e| child_text(e, "errorCode"))
        .and_then(|t| t.parse::<u16>().ok())
        .unwrap_or(500);

    let description = upnp_error
        .and_then(|e| child_text(e, "errorDescription"))
        .or_else(|| child_text(fault, "faultstring"))
        .unwrap_or_default();

    tracing::warn!(code, %description, "gateway returned SOAP fault");

    IgdError::Fault { code, description }
}

fn child_text(element: &Element, name: &str) -> Option<String> {
    element
        .get_child(name)
        .and_then(|child| child.get_text())
        .map(|text| text.trim().to_string())
}

/// Text of an output argument; present but empty reads as ""
fn argument(response: &Element, name: &str) -> Result<String> {
    let element = response
        .get_child(name)
        .ok_or_else(|| IgdError::UnexpectedResponse(format!("Missing {} argument", name)))?;

    Ok(element
        .get_text()
        .map(|text| text.trim().to_string())
        .unwrap_or_default())
}

fn parse_argument<T: FromStr>(response: &Element, name: &str) -> Result<T> {
    let value = argument(response, name)?;
    value
        .parse()
        .map_err(|_| IgdError::UnexpectedResponse(format!("Invalid {}: {:?}", name, value)))
}
