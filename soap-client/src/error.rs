//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or transport failure (DNS, refused connection, timeout)
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The device answered with a status other than 200 OK
    #[error("Request failed: HTTP {0}")]
    Status(u16),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_error_display() {
        assert_eq!(
            SoapError::Network("connection refused".to_string()).to_string(),
            "Network/HTTP error: connection refused"
        );
        assert_eq!(SoapError::Status(500).to_string(), "Request failed: HTTP 500");
        assert_eq!(
            SoapError::Parse("unexpected EOF".to_string()).to_string(),
            "XML parsing error: unexpected EOF"
        );
    }
}
