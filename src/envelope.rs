//! SOAP envelope interceptors.
//!
//! [`SoapInInterceptor`] splits a wire envelope into the header map and the
//! body payload; [`SoapOutInterceptor`] puts them back together.

use crate::config::SoapVersion;
use crate::error::Result;
use crate::fault::{parse_fault, write_fault, Fault, ENVELOPE_PREFIX};
use crate::interceptor::{Interceptor, Phase};
use crate::message::{Content, Message};
use crate::parser::{child_elements, new_element};
use crate::qname::QName;
use tracing::debug;
use xmltree::{Element, XMLNode};

/// Transport header carrying the payload media type.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Assemble an `Envelope` from header entries and an optional body entry.
pub fn build_envelope(
    version: SoapVersion,
    headers: Vec<Element>,
    body: Option<Element>,
) -> Element {
    let ns = version.namespace();
    let mut envelope = new_element(&QName::new(ns, "Envelope"), Some(ENVELOPE_PREFIX));

    if !headers.is_empty() {
        let mut header = envelope_child(ns, "Header");
        header
            .children
            .extend(headers.into_iter().map(XMLNode::Element));
        envelope.children.push(XMLNode::Element(header));
    }

    let mut body_element = envelope_child(ns, "Body");
    if let Some(body) = body {
        body_element.children.push(XMLNode::Element(body));
    }
    envelope.children.push(XMLNode::Element(body_element));
    envelope
}

fn envelope_child(ns: &str, local: &str) -> Element {
    let mut element = Element::new(local);
    element.namespace = Some(ns.to_string());
    element.prefix = Some(ENVELOPE_PREFIX.to_string());
    element
}

/// Reads the wire envelope.
#[derive(Debug, Default)]
pub struct SoapInInterceptor;

impl SoapInInterceptor {
    pub const NAME: &'static str = "SoapInInterceptor";

    pub fn new() -> Self {
        Self
    }
}

impl Interceptor for SoapInInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn phase(&self) -> Phase {
        Phase::READ
    }

    fn handle(&self, message: &mut Message) -> Result<()> {
        let envelope = message
            .take_tree()?
            .ok_or_else(|| Fault::sender("Missing SOAP envelope"))?;

        let namespace = envelope.namespace.as_deref().unwrap_or("");
        let version = SoapVersion::from_namespace(namespace).ok_or_else(|| {
            Fault::version_mismatch(format!("Unsupported envelope namespace '{}'", namespace))
        })?;
        if envelope.name != "Envelope" {
            return Err(Fault::sender(format!(
                "Expected Envelope element, found {}",
                QName::of(&envelope)
            ))
            .into());
        }
        message.put(version);

        let ns = version.namespace();
        let mut body = None;
        for child in child_elements(&envelope) {
            if child.namespace.as_deref() != Some(ns) {
                return Err(Fault::sender(format!("Unexpected element {}", QName::of(child))).into());
            }
            match (child.name.as_str(), body.is_some()) {
                ("Header", false) => {
                    for header in child_elements(child) {
                        message.insert_soap_header(header.clone());
                    }
                }
                ("Body", false) => body = Some(child),
                _ => {
                    return Err(
                        Fault::sender(format!("Unexpected element {}", QName::of(child))).into(),
                    )
                }
            }
        }
        let body = body.ok_or_else(|| Fault::sender("Missing SOAP Body"))?;

        match child_elements(body).next() {
            Some(entry) if entry.name == "Fault" && entry.namespace.as_deref() == Some(ns) => {
                let fault = parse_fault(entry)?;
                debug!(code = %fault.code(), reason = fault.reason(), "Received SOAP fault");
                message.set_fault(fault);
                message.clear_content();
            }
            Some(entry) => message.set_content(Content::Tree(entry.clone())),
            None => message.clear_content(),
        }

        debug!(
            version = ?version,
            headers = message.soap_headers().len(),
            "Read SOAP envelope"
        );
        Ok(())
    }
}

/// Writes the wire envelope.
#[derive(Debug, Default)]
pub struct SoapOutInterceptor {
    version: SoapVersion,
}

impl SoapOutInterceptor {
    pub const NAME: &'static str = "SoapOutInterceptor";

    /// `version` is used unless the exchange recorded one on the way in.
    pub fn new(version: SoapVersion) -> Self {
        Self { version }
    }
}

impl Interceptor for SoapOutInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn phase(&self) -> Phase {
        Phase::WRITE
    }

    fn handle(&self, message: &mut Message) -> Result<()> {
        let version = message.get::<SoapVersion>().copied().unwrap_or(self.version);
        let fault = message.fault().map(|fault| write_fault(fault, version));
        let body = match fault {
            Some(fault) => Some(fault),
            None => message.take_tree()?,
        };
        let headers = message.drain_soap_headers();
        let envelope = build_envelope(version, headers, body);
        message.set_content(Content::Tree(envelope));
        message.set_transport_header(CONTENT_TYPE, version.content_type());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SoapError;
    use crate::fault::codes;
    use crate::message::XmlStream;
    use crate::parser::{parse_document, write_element, SOAP_12_NS};

    const REQUEST: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Header>
    <h:Auth xmlns:h="urn:auth" soap:mustUnderstand="1">secret</h:Auth>
  </soap:Header>
  <soap:Body>
    <m:GetPrice xmlns:m="urn:stock"><m:Item>Apples</m:Item></m:GetPrice>
  </soap:Body>
</soap:Envelope>"#;

    fn read(xml: &str) -> (Message, Result<()>) {
        let mut message = Message::with_stream(XmlStream::from_bytes(xml));
        let result = SoapInInterceptor::new().handle(&mut message);
        (message, result)
    }

    #[test]
    fn test_read_envelope() {
        let (mut message, result) = read(REQUEST);
        result.unwrap();
        assert_eq!(message.get::<SoapVersion>(), Some(&SoapVersion::Soap11));
        assert!(message.soap_header(&QName::new("urn:auth", "Auth")).is_some());
        let body = message.content_tree().unwrap().unwrap();
        assert_eq!(QName::of(body), QName::new("urn:stock", "GetPrice"));
    }

    #[test]
    fn test_version_mismatch() {
        let (_, result) = read(r#"<e:Envelope xmlns:e="urn:not-soap"><e:Body/></e:Envelope>"#);
        let err = result.unwrap_err();
        assert_eq!(err.as_fault().unwrap().code(), &codes::version_mismatch());
    }

    #[test]
    fn test_missing_body() {
        let (_, result) = read(r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"/>"#);
        let fault = result.unwrap_err();
        assert!(fault.as_fault().unwrap().is_sender());
    }

    #[test]
    fn test_body_fault_is_decoded() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
<s:Fault><faultcode>s:Client</faultcode><faultstring>bad</faultstring></s:Fault>
</s:Body></s:Envelope>"#;
        let (message, result) = read(xml);
        result.unwrap();
        assert_eq!(message.fault().unwrap().reason(), "bad");
        assert!(!message.has_content());
    }

    #[test]
    fn test_malformed_envelope() {
        let (_, result) = read("<soap:Envelope");
        assert!(matches!(result, Err(SoapError::XmlParse(_))));
    }

    #[test]
    fn test_write_envelope() {
        let (mut message, result) = read(REQUEST);
        result.unwrap();
        message.put(SoapVersion::Soap12);
        SoapOutInterceptor::new(SoapVersion::Soap11)
            .handle(&mut message)
            .unwrap();

        assert!(message.soap_headers().is_empty());
        assert_eq!(
            message.transport_header("content-type"),
            Some(SoapVersion::Soap12.content_type())
        );
        let xml = message.take_stream().unwrap().read_to_string().unwrap();
        let envelope = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(QName::of(&envelope), QName::new(SOAP_12_NS, "Envelope"));
        let names: Vec<&str> = child_elements(&envelope).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Header", "Body"]);
    }

    #[test]
    fn test_write_fault_envelope() {
        let mut message = Message::new();
        message.set_fault(Fault::sender("bad input"));
        SoapOutInterceptor::new(SoapVersion::Soap11)
            .handle(&mut message)
            .unwrap();
        let envelope = message.take_tree().unwrap().unwrap();
        let xml = write_element(&envelope).unwrap();
        assert!(xml.contains("faultstring"));
        assert!(xml.contains("bad input"));
    }
}
