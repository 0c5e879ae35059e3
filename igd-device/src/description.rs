//! Device description parsing and service tree traversal.
//!
//! An IGD describes itself as a tree: the root `InternetGatewayDevice`
//! embeds a `WANDevice`, which embeds a `WANConnectionDevice`, which finally
//! lists the `WANIPConnection`/`WANPPPConnection` service we want. This
//! module deserializes that document and flattens the tree.

use serde::Deserialize;

use crate::error::{IgdError, Result};

/// UPnP device description document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceDescription {
    /// Base for relative URLs, deprecated in UDA 1.1 but still common
    #[serde(rename = "URLBase", alias = "baseURL", default)]
    pub url_base: Option<String>,
    /// Root device
    #[serde(default)]
    pub device: Option<DeviceNode>,
}

/// One (possibly embedded) device of the description tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceNode {
    pub device_type: Option<String>,
    pub friendly_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    #[serde(rename = "UDN")]
    pub udn: Option<String>,
    #[serde(default)]
    pub service_list: Option<ServiceList>,
    #[serde(default)]
    pub device_list: Option<DeviceList>,
}

/// `<serviceList>`; a single `<service>` still yields a one-element list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceList {
    #[serde(rename = "service", default)]
    pub services: Vec<ServiceEntry>,
}

/// `<deviceList>`; a single `<device>` still yields a one-element list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceList {
    #[serde(rename = "device", default)]
    pub devices: Vec<DeviceNode>,
}

/// A `<service>` entry as declared, URLs possibly relative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceEntry {
    #[serde(rename = "serviceType", default)]
    pub service_type: String,
    #[serde(rename = "serviceId")]
    pub service_id: Option<String>,
    #[serde(rename = "controlURL")]
    pub control_url: Option<String>,
    #[serde(rename = "SCPDURL")]
    pub scpd_url: Option<String>,
    #[serde(rename = "eventSubURL")]
    pub event_sub_url: Option<String>,
}

impl ServiceEntry {
    /// Control URL, if declared and non-empty
    pub fn control_url(&self) -> Option<&str> {
        non_empty(&self.control_url)
    }

    /// SCPD URL, if declared and non-empty
    pub fn scpd_url(&self) -> Option<&str> {
        non_empty(&self.scpd_url)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl DeviceDescription {
    /// Parse a device description from XML.
    ///
    /// # Errors
    ///
    /// Returns `IgdError::Xml` if the document is malformed.
    pub fn from_xml(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml)
            .map_err(|e| IgdError::Xml(format!("Failed to parse device description: {}", e)))
    }

    /// Declared base URL, if present and non-empty
    pub fn base_url(&self) -> Option<&str> {
        non_empty(&self.url_base)
    }

    /// Every device in depth-first preorder, starting with the root.
    pub fn devices(&self) -> Vec<&DeviceNode> {
        let mut devices = Vec::new();
        if let Some(root) = &self.device {
            root.collect(&mut devices, &mut Vec::new());
        }
        devices
    }

    /// Every service in depth-first preorder: a device's own services in
    /// list order, then those of each embedded device.
    pub fn services(&self) -> Vec<&ServiceEntry> {
        let mut services = Vec::new();
        if let Some(root) = &self.device {
            root.collect(&mut Vec::new(), &mut services);
        }
        services
    }

    /// First service, in traversal order, whose type is one of `service_types`.
    pub fn find_service<S: AsRef<str>>(&self, service_types: &[S]) -> Option<&ServiceEntry> {
        self.services().into_iter().find(|service| {
            service_types
                .iter()
                .any(|wanted| wanted.as_ref() == service.service_type.trim())
        })
    }
}

impl DeviceNode {
    /// Services declared directly on this device
    pub fn services(&self) -> &[ServiceEntry] {
        self.service_list
            .as_ref()
            .map(|list| list.services.as_slice())
            .unwrap_or_default()
    }

    /// Devices embedded directly in this device
    pub fn children(&self) -> &[DeviceNode] {
        self.device_list
            .as_ref()
            .map(|list| list.devices.as_slice())
            .unwrap_or_default()
    }

    fn collect<'a>(&'a self, devices: &mut Vec<&'a DeviceNode>, services: &mut Vec<&'a ServiceEntry>) {
        devices.push(self);
        services.extend(self.services());
        for child in self.children() {
            child.collect(devices, services);
        }
    }
}
