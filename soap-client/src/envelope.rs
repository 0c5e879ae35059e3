//! SOAP 1.1 request envelope construction.
//!
//! IGD firmware is picky about the request shape, so the envelope is emitted
//! as one whitespace-free string with the `s:encodingStyle` attribute that
//! the UPnP Device Architecture examples use.

use quick_xml::escape::escape;

/// Namespace URI of the SOAP 1.1 envelope
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.1 encoding style URI
pub const SOAP_ENCODING_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Build the envelope for invoking `action` on a service of `service_type`.
///
/// Arguments are emitted as `<name>value</name>` in the given order. An
/// empty value produces an empty element pair, never a self-closing tag.
///
/// # Example
///
/// ```
/// use soap_client::envelope::build_envelope;
///
/// let body = build_envelope(
///     "urn:schemas-upnp-org:service:WANIPConnection:1",
///     "DeletePortMapping",
///     &[("NewRemoteHost", ""), ("NewExternalPort", "8080"), ("NewProtocol", "TCP")],
/// );
/// assert!(body.contains("<NewRemoteHost></NewRemoteHost><NewExternalPort>8080</NewExternalPort>"));
/// ```
pub fn build_envelope<N, V>(service_type: &str, action: &str, args: &[(N, V)]) -> String
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    let payload: String = args
        .iter()
        .map(|(name, value)| {
            let name = name.as_ref();
            format!("<{name}>{}</{name}>", escape(value.as_ref()))
        })
        .collect();

    format!(
        concat!(
            r#"<?xml version="1.0"?>"#,
            r#"<s:Envelope xmlns:s="{envelope_ns}" s:encodingStyle="{encoding_ns}">"#,
            "<s:Body>",
            r#"<u:{action} xmlns:u="{service_type}">"#,
            "{payload}",
            "</u:{action}>",
            "</s:Body>",
            "</s:Envelope>"
        ),
        envelope_ns = SOAP_ENVELOPE_NS,
        encoding_ns = SOAP_ENCODING_NS,
        action = action,
        service_type = escape(service_type),
        payload = payload,
    )
}

/// Value of the `SOAPAction` header, quotes included
pub fn soap_action_header(service_type: &str, action: &str) -> String {
    format!("\"{}#{}\"", service_type, action)
}
