//! UPnP Internet Gateway Device control point
//!
//! Given the description URL of a home router, this crate finds its WAN
//! connection service (`WANIPConnection` or `WANPPPConnection`), sends SOAP
//! actions to it and hands back the response body. Finding that URL in the
//! first place (SSDP) is up to the caller.
//!
//! # Quick Start
//!
//! ```no_run
//! use igd_device::{Gateway, PortMapping, Protocol};
//!
//! # async fn example() -> igd_device::Result<()> {
//! let gateway = Gateway::from_url("http://192.168.1.1:5000/rootDesc.xml");
//!
//! println!("external address: {}", gateway.external_ip_address().await?);
//!
//! let mapping = PortMapping::new(Protocol::Tcp, 2222, "192.168.1.10", 22)
//!     .with_description("ssh");
//! gateway.add_port_mapping(&mapping).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Raw Actions
//!
//! [`Device::run`] invokes any action with ordered arguments and returns the
//! unwrapped SOAP `Body`:
//!
//! ```no_run
//! use igd_device::Device;
//!
//! # async fn example() -> igd_device::Result<()> {
//! let device = Device::new("http://192.168.1.1:5000/rootDesc.xml");
//! let body = device
//!     .run("GetStatusInfo", &[] as &[(&str, &str)])
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod location;
pub mod description;
mod device;
mod gateway;

pub use error::{IgdError, Result};
pub use device::{Device, DeviceConfig, ResolvedService, WAN_CONNECTION_SERVICES};
pub use gateway::{Gateway, PortMapping, Protocol};
pub use location::{base_url, resolve};

pub use soap_client::{HttpResponse, HttpTransport, TransportConfig};
