//! Error types for IGD control operations.

use soap_client::SoapError;

/// Errors that can occur while resolving a gateway service or invoking an action.
///
/// Every variant is terminal for the call that produced it; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum IgdError {
    /// Transport failure (DNS, refused connection, transport-enforced timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The description fetch or the SOAP POST returned a status other than 200
    #[error("Request failed: HTTP {0}")]
    HttpStatus(u16),

    /// Malformed XML in the description or the SOAP response
    #[error("XML parse error: {0}")]
    Xml(String),

    /// No whitelisted service, or the match lacks a control or SCPD URL
    #[error("Service not found")]
    ServiceNotFound,

    /// A description or service URL could not be parsed or resolved
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The gateway answered an action with a SOAP fault
    #[error("UPnP error {code}: {description}")]
    Fault {
        /// UPnP error code, 500 when the fault carried none
        code: u16,
        /// Error description reported by the gateway
        description: String,
    },

    /// The response body did not carry the fields the action defines
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<SoapError> for IgdError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => IgdError::Transport(msg),
            SoapError::Status(code) => IgdError::HttpStatus(code),
            SoapError::Parse(msg) => IgdError::Xml(msg),
        }
    }
}

/// Convenience type alias for Results using IgdError.
pub type Result<T> = std::result::Result<T, IgdError>;
