//! Show the external address and port mappings of a gateway.
//!
//! Usage: `cargo run --example port_mapping -- <description-url> [add <port> [client]]`
//!
//! Set `RUST_LOG=igd_device=debug,soap_client=trace` to see the requests.

use igd_device::{Device, DeviceConfig, Gateway, PortMapping, Protocol, TransportConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .ok_or("usage: port_mapping <description-url> [add <port> [client]]")?;

    let config = DeviceConfig::new().with_transport(TransportConfig::local_network());
    let gateway = Gateway::new(Device::with_config(url, config)?);

    let service = gateway.device().service().await?;
    println!("Service:     {}", service.service_type);
    println!("Control URL: {}", service.control_url);
    println!("External IP: {}", gateway.external_ip_address().await?);

    if let (Some(cmd), Some(port)) = (args.next(), args.next()) {
        if cmd == "add" {
            let port: u16 = port.parse()?;
            let client = args.next().unwrap_or_else(|| "192.168.1.2".to_string());
            let mapping = PortMapping::new(Protocol::Tcp, port, client, port)
                .with_description("igd-client example")
                .with_lease_duration(3600);
            gateway.add_port_mapping(&mapping).await?;
            println!("Added TCP {} -> {}:{}", port, mapping.internal_client, port);
        }
    }

    println!();
    println!("Port mappings:");
    for mapping in gateway.port_mappings().await? {
        println!(
            "  {:<3} {:>5} -> {}:{:<5} {}{}",
            mapping.protocol,
            mapping.external_port,
            mapping.internal_client,
            mapping.internal_port,
            mapping.description,
            if mapping.enabled { "" } else { " (disabled)" },
        );
    }

    Ok(())
}
