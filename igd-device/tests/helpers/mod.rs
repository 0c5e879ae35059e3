//! Test helpers for fixture-based gateway tests

use std::fs;
use std::path::PathBuf;

use mockito::{Matcher, Mock, ServerGuard};

/// A captured device description
#[derive(Debug, Clone)]
pub struct DescriptionFixture {
    pub name: String,
    pub xml_content: String,
}

impl DescriptionFixture {
    /// Load a fixture from the fixtures directory
    pub fn load(filename: &str) -> Self {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests/fixtures");
        path.push(filename);

        let xml_content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e));

        Self {
            name: filename.to_string(),
            xml_content,
        }
    }

    /// Fixture text with the `{{BASE}}` placeholder pointing at `base`
    pub fn with_base(&self, base: &str) -> String {
        self.xml_content.replace("{{BASE}}", base)
    }
}

/// Description URL served by [`serve_description`]
pub fn description_url(server: &ServerGuard) -> String {
    format!("{}/rootDesc.xml", server.url())
}

/// Serve `fixture` as the device description of `server`
pub async fn serve_description(server: &mut ServerGuard, fixture: &str) -> Mock {
    let xml = DescriptionFixture::load(fixture).with_base(&server.url());
    server
        .mock("GET", "/rootDesc.xml")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(xml)
        .create_async()
        .await
}

/// SOAP response envelope using `prefix` for the envelope namespace
pub fn soap_response(prefix: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<{p}:Envelope xmlns:{p}="http://schemas.xmlsoap.org/soap/envelope/" {p}:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<{p}:Body>{body}</{p}:Body>
</{p}:Envelope>"#,
        p = prefix,
        body = body
    )
}

/// SOAP fault envelope carrying a UPnP error
pub fn soap_fault(code: u16, description: &str) -> String {
    soap_response(
        "s",
        &format!(
            r#"<s:Fault>
<faultcode>s:Client</faultcode>
<faultstring>UPnPError</faultstring>
<detail>
<UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
<errorCode>{}</errorCode>
<errorDescription>{}</errorDescription>
</UPnPError>
</detail>
</s:Fault>"#,
            code, description
        ),
    )
}

/// Matcher for a request body containing `<name>value</name>`
pub fn has_argument(name: &str, value: &str) -> Matcher {
    Matcher::Regex(format!("<{name}>{value}</{name}>", name = name, value = value))
}
