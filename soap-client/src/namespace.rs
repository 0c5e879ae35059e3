//! Response unwrapping: locate the SOAP `Body` by its declared prefix.

use xmltree::{Element, XMLNode};

use crate::envelope::SOAP_ENVELOPE_NS;
use crate::SoapError;

/// Return the prefix bound to `uri` among `bindings` (prefix, uri pairs).
///
/// The default namespace (empty prefix) is not a prefix binding and is
/// skipped, as are the reserved `xml`/`xmlns` prefixes since they can never
/// be bound to a SOAP URI.
pub fn namespace_prefix<'a, I>(bindings: I, uri: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    bindings
        .into_iter()
        .find(|(prefix, bound)| {
            !prefix.is_empty() && *prefix != "xml" && *prefix != "xmlns" && *bound == uri
        })
        .map(|(prefix, _)| prefix)
}

/// Prefix the envelope root declares for the SOAP envelope namespace
pub fn envelope_prefix(envelope: &Element) -> Option<&str> {
    let namespaces = envelope.namespaces.as_ref()?;
    namespace_prefix(
        namespaces.0.iter().map(|(p, u)| (p.as_str(), u.as_str())),
        SOAP_ENVELOPE_NS,
    )
}

/// Extract the `<prefix:Body>` subtree from a parsed SOAP envelope.
///
/// When the envelope namespace is not bound to any prefix, an unprefixed
/// `Body` is looked up instead. The subtree is returned unmodified.
pub fn unwrap_body(envelope: &Element) -> Result<Element, SoapError> {
    let prefix = envelope_prefix(envelope);

    envelope
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Element(element) => Some(element),
            _ => None,
        })
        .find(|child| child.name == "Body" && child.prefix.as_deref() == prefix)
        .cloned()
        .ok_or_else(|| match prefix {
            Some(prefix) => SoapError::Parse(format!("Missing {}:Body", prefix)),
            None => SoapError::Parse("Missing SOAP Body".to_string()),
        })
}
