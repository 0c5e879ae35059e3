//! SOAP client for UPnP Internet Gateway Device control
//!
//! This crate provides the protocol plumbing a control point needs to talk
//! to a WAN connection service: an HTTP transport seam, SOAP 1.1 envelope
//! construction and unwrapping of the response `Body`.
//!
//! SOAP faults are not interpreted here. A fault is an ordinary `Body` whose
//! child is `Fault`; callers that care inspect it themselves.

mod error;
pub mod envelope;
pub mod namespace;
pub mod transport;

pub use error::SoapError;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportConfig};

use std::sync::Arc;

use xmltree::Element;

use crate::envelope::{build_envelope, soap_action_header};
use crate::namespace::unwrap_body;

/// A minimal asynchronous SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    transport: Arc<dyn HttpTransport>,
}

impl SoapClient {
    /// Create a new SOAP client over a default [`ReqwestTransport`]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::default()))
    }

    /// Create a SOAP client whose transport is built from `config`
    pub fn with_config(config: &TransportConfig) -> Result<Self, SoapError> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::with_config(config)?)))
    }

    /// Create a SOAP client over a caller-supplied transport
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Fetch an XML document, failing on any status other than 200
    ///
    /// The body is returned unparsed.
    pub async fn get_xml(&self, url: &str) -> Result<String, SoapError> {
        let response = self.transport.get(url).await?;

        if response.status != 200 {
            tracing::debug!(url, status = response.status, "GET rejected");
            return Err(SoapError::Status(response.status));
        }

        Ok(response.body)
    }

    /// Invoke `action` on the service at `control_url` and return the
    /// response `Body` element
    ///
    /// # Arguments
    /// * `control_url` - Absolute control URL of the service
    /// * `service_type` - Service type URI, used as the action namespace
    /// * `action` - Action name, e.g. "AddPortMapping"
    /// * `args` - Ordered `(name, value)` argument pairs
    pub async fn call<N, V>(
        &self,
        control_url: &str,
        service_type: &str,
        action: &str,
        args: &[(N, V)],
    ) -> Result<Element, SoapError>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let body = build_envelope(service_type, action, args);
        let headers = [
            ("Content-Type", "text/xml; charset=\"utf-8\"".to_string()),
            ("Content-Length", body.len().to_string()),
            ("Connection", "close".to_string()),
            ("SOAPAction", soap_action_header(service_type, action)),
        ];

        tracing::debug!(control_url, service_type, action, "invoking SOAP action");

        let response = self.transport.post(control_url, &headers, body).await?;

        if response.status != 200 {
            tracing::debug!(control_url, action, status = response.status, "SOAP action rejected");
            return Err(SoapError::Status(response.status));
        }

        let xml = Element::parse(response.body.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        unwrap_body(&xml)
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct RecordedPost {
        url: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    #[derive(Debug)]
    struct FakeTransport {
        response: HttpResponse,
        posts: Mutex<Vec<RecordedPost>>,
    }

    impl FakeTransport {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: HttpResponse {
                    status,
                    body: body.to_string(),
                },
                posts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get(&self, _url: &str) -> Result<HttpResponse, SoapError> {
            Ok(self.response.clone())
        }

        async fn post(
            &self,
            url: &str,
            headers: &[(&str, String)],
            body: String,
        ) -> Result<HttpResponse, SoapError> {
            self.posts.lock().unwrap().push(RecordedPost {
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(n, v)| (n.to_string(), v.clone()))
                    .collect(),
                body,
            });
            Ok(self.response.clone())
        }
    }

    const WAN_IP: &str = "urn:schemas-upnp-org:service:WANIPConnection:1";

    const OK_RESPONSE: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:AddPortMappingResponse xmlns:u="urn:schemas-upnp-org:service:WANIPConnection:1"/>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn test_soap_client_creation() {
        let _client = SoapClient::new();
        let _default_client = SoapClient::default();
        assert!(SoapClient::with_config(&TransportConfig::local_network()).is_ok());
    }

    #[tokio::test]
    async fn test_call_sends_expected_request() {
        let transport = FakeTransport::replying(200, OK_RESPONSE);
        let client = SoapClient::with_transport(transport.clone());

        let body = client
            .call(
                "http://192.168.1.1:5431/upnp/control/WANIPConn1",
                WAN_IP,
                "AddPortMapping",
                &[("NewRemoteHost", ""), ("NewExternalPort", "12345")],
            )
            .await
            .unwrap();
        assert!(body.get_child("AddPortMappingResponse").is_some());

        let posts = transport.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.url, "http://192.168.1.1:5431/upnp/control/WANIPConn1");

        let header = |name: &str| {
            post.headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(header("Content-Type"), "text/xml; charset=\"utf-8\"");
        assert_eq!(header("Content-Length"), post.body.len().to_string());
        assert_eq!(header("Connection"), "close");
        assert_eq!(
            header("SOAPAction"),
            "\"urn:schemas-upnp-org:service:WANIPConnection:1#AddPortMapping\""
        );
        assert!(post
            .body
            .contains("<NewRemoteHost></NewRemoteHost><NewExternalPort>12345</NewExternalPort>"));
    }

    #[tokio::test]
    async fn test_non_200_is_error_without_parsing() {
        let transport = FakeTransport::replying(500, "this is not xml");
        let client = SoapClient::with_transport(transport);

        let err = client
            .call("http://gw/ctl", WAN_IP, "GetExternalIPAddress", &[] as &[(&str, &str)])
            .await
            .unwrap_err();
        assert!(matches!(err, SoapError::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_response_is_parse_error() {
        let transport = FakeTransport::replying(200, "<s:Envelope><unclosed>");
        let client = SoapClient::with_transport(transport);

        let err = client
            .call("http://gw/ctl", WAN_IP, "GetExternalIPAddress", &[] as &[(&str, &str)])
            .await
            .unwrap_err();
        assert!(matches!(err, SoapError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fault_is_returned_as_body() {
        let fault = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>UPnPError</faultstring>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;
        let client = SoapClient::with_transport(FakeTransport::replying(200, fault));

        let body = client
            .call("http://gw/ctl", WAN_IP, "GetExternalIPAddress", &[] as &[(&str, &str)])
            .await
            .unwrap();
        assert!(body.get_child("Fault").is_some());
    }

    #[tokio::test]
    async fn test_get_xml_status_handling() {
        let ok = SoapClient::with_transport(FakeTransport::replying(200, "<root/>"));
        assert_eq!(ok.get_xml("http://gw/desc.xml").await.unwrap(), "<root/>");

        let missing = SoapClient::with_transport(FakeTransport::replying(404, "<root/>"));
        assert!(matches!(
            missing.get_xml("http://gw/desc.xml").await.unwrap_err(),
            SoapError::Status(404)
        ));
    }
}
