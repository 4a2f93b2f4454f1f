//! Canonical wrapper to wire body and headers.

use super::{bypass, message_qname, wrapper_parts};
use crate::binding::{rpc_wrapper_name, BoundOperation, Direction, Part, Placement};
use crate::config::EndpointRole;
use crate::error::Result;
use crate::fault::Fault;
use crate::interceptor::{Interceptor, Phase};
use crate::message::{Content, Message};
use crate::parser::{new_element, significant_children};
use crate::qname::QName;
use crate::wsdl::Style;
use tracing::debug;
use xmltree::{Element, XMLNode};

/// Prefix of the generated RPC wrapper element.
const RPC_PREFIX: &str = "m";

/// Turns a canonical wrapper back into a wire payload.
#[derive(Debug)]
pub struct JbiOutInterceptor {
    role: EndpointRole,
    enabled: bool,
}

impl JbiOutInterceptor {
    pub const NAME: &'static str = "JbiOutInterceptor";

    pub fn new(role: EndpointRole) -> Self {
        Self {
            role,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Interceptor for JbiOutInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn phase(&self) -> Phase {
        Phase::MARSHAL
    }

    fn handle(&self, message: &mut Message) -> Result<()> {
        if bypass(self.enabled, message) {
            return Ok(());
        }

        let operation = BoundOperation::of(message)
            .cloned()
            .ok_or_else(|| Fault::sender("No operation bound to message"))?;
        let info = operation.outbound_message(self.role).ok_or_else(|| {
            Fault::sender(format!(
                "Operation {} has no outbound message",
                operation.name()
            ))
        })?;

        // Checked on a copy; the message changes only once every part fits.
        let root = message
            .content_tree()?
            .filter(|r| message_qname().matches(r))
            .cloned()
            .ok_or_else(|| Fault::sender(format!("Expected {} element", message_qname())))?;

        let parts: Vec<&Element> = wrapper_parts(&root).collect();
        if parts.len() != info.parts().len() {
            return Err(Fault::sender(format!(
                "Expected {} parts, found {}",
                info.parts().len(),
                parts.len()
            ))
            .into());
        }

        let mut rpc_wrapper = match operation.style() {
            Style::Rpc => {
                let local = rpc_wrapper_name(&operation, self.role, Direction::Outbound);
                let namespace = info.body_namespace().unwrap_or("");
                Some(new_element(
                    &QName::new(namespace, local),
                    Some(RPC_PREFIX),
                ))
            }
            Style::Document => None,
        };
        let mut document_body = None;
        let mut headers = Vec::new();

        for (part, jbi_part) in info.parts().iter().zip(parts) {
            match (part.placement(), rpc_wrapper.as_mut()) {
                (Placement::Body, Some(wrapper)) => {
                    let mut accessor = Element::new(part.name());
                    accessor.children.extend(jbi_part.children.iter().cloned());
                    wrapper.children.push(XMLNode::Element(accessor));
                }
                (Placement::Body, None) => {
                    document_body = Some(single_element(part, jbi_part)?);
                }
                (Placement::Header, _) => {
                    headers.extend(header_elements(part, jbi_part)?);
                }
            }
        }

        for header in headers {
            message.insert_soap_header(header);
        }

        match rpc_wrapper.or(document_body) {
            Some(body) => message.set_content(Content::Tree(body)),
            None => message.clear_content(),
        }

        debug!(
            operation = %operation.name(),
            message_type = %info.message_type(),
            parts = info.parts().len(),
            "Unwrapped outbound message"
        );
        Ok(())
    }
}

/// The only element of a part, checked against the declared element name.
fn single_element(part: &Part, jbi_part: &Element) -> Result<Element> {
    let mut nodes = significant_children(jbi_part);
    let element = match (nodes.next(), nodes.next()) {
        (Some(XMLNode::Element(element)), None) => element,
        _ => {
            return Err(Fault::sender(format!(
                "Part '{}' must contain exactly one element",
                part.name()
            ))
            .into())
        }
    };
    check_element(part, element)?;
    Ok(element.clone())
}

/// The entries of a header part: one or more elements of the declared name.
fn header_elements(part: &Part, jbi_part: &Element) -> Result<Vec<Element>> {
    let mut elements = Vec::new();
    for node in significant_children(jbi_part) {
        match node {
            XMLNode::Element(element) => {
                check_element(part, element)?;
                elements.push(element.clone());
            }
            _ => {
                return Err(Fault::sender(format!(
                    "Header part '{}' must contain only elements",
                    part.name()
                ))
                .into())
            }
        }
    }
    if elements.is_empty() {
        return Err(Fault::sender(format!(
            "Header part '{}' must contain at least one element",
            part.name()
        ))
        .into());
    }
    Ok(elements)
}

fn check_element(part: &Part, element: &Element) -> Result<()> {
    match part.element() {
        Some(expected) if !expected.matches(element) => Err(Fault::sender(format!(
            "Part '{}' expects element {}, found {}",
            part.name(),
            expected,
            QName::of(element)
        ))
        .into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::tests::{stock_model, TNS, TYPES};
    use crate::parser::{child_elements, parse_document, text_of};
    use crate::wrapper::JBI_WRAPPER_NS;

    fn bound(xml: String, operation: &str) -> Message {
        let model = stock_model("rpc");
        let op = model.operation(&QName::new(TNS, operation)).unwrap().clone();
        let mut message = Message::with_tree(parse_document(xml.as_bytes()).unwrap());
        message.put(BoundOperation(op));
        message
    }

    fn response(parts: &str) -> String {
        format!(
            r#"<jbi:message xmlns:jbi="{JBI_WRAPPER_NS}" version="1.0" name="x">{parts}</jbi:message>"#
        )
    }

    #[test]
    fn test_unwrap_document() {
        let xml = response(&format!(
            r#"<jbi:part><t:GetPriceResponse xmlns:t="{TYPES}"><t:Price>1.5</t:Price></t:GetPriceResponse></jbi:part>"#
        ));
        let mut message = bound(xml, "GetPrice");
        JbiOutInterceptor::new(EndpointRole::Provider)
            .handle(&mut message)
            .unwrap();
        let body = message.content_tree().unwrap().unwrap();
        assert_eq!(QName::of(body), QName::new(TYPES, "GetPriceResponse"));
    }

    #[test]
    fn test_unwrap_rpc_response() {
        let xml = response("<jbi:part>12.5</jbi:part>");
        let mut message = bound(xml, "Quote");
        JbiOutInterceptor::new(EndpointRole::Provider)
            .handle(&mut message)
            .unwrap();
        let body = message.content_tree().unwrap().unwrap();
        assert_eq!(QName::of(body), QName::new("urn:quotes", "QuoteResponse"));
        let price = child_elements(body).next().unwrap();
        assert_eq!(price.name, "price");
        assert!(price.namespace.is_none());
        assert_eq!(text_of(price), "12.5");
    }

    #[test]
    fn test_consumer_request_with_header() {
        let xml = response(&format!(
            r#"<jbi:part><t:GetPrice xmlns:t="{TYPES}"/></jbi:part><jbi:part><t:Auth xmlns:t="{TYPES}">k</t:Auth></jbi:part>"#
        ));
        let mut message = bound(xml, "GetPrice");
        JbiOutInterceptor::new(EndpointRole::Consumer)
            .handle(&mut message)
            .unwrap();
        assert!(message.soap_header(&QName::new(TYPES, "Auth")).is_some());
        assert_eq!(message.content_tree().unwrap().unwrap().name, "GetPrice");
    }

    #[test]
    fn test_part_count_mismatch() {
        let mut message = bound(response(""), "GetPrice");
        let err = JbiOutInterceptor::new(EndpointRole::Provider)
            .handle(&mut message)
            .unwrap_err();
        assert!(err.as_fault().unwrap().reason().contains("Expected 1 parts, found 0"));
    }

    #[test]
    fn test_wrong_root() {
        let mut message = bound("<other/>".to_string(), "GetPrice");
        let err = JbiOutInterceptor::new(EndpointRole::Provider)
            .handle(&mut message)
            .unwrap_err();
        assert!(err.as_fault().unwrap().is_sender());
    }

    #[test]
    fn test_wrong_element() {
        let xml = response(&format!(r#"<jbi:part><t:Nope xmlns:t="{TYPES}"/></jbi:part>"#));
        let mut message = bound(xml, "GetPrice");
        let err = JbiOutInterceptor::new(EndpointRole::Provider)
            .handle(&mut message)
            .unwrap_err();
        assert!(err.as_fault().unwrap().reason().contains("Nope"));

        // The canonical payload is still there.
        let root = message.content_tree().unwrap().unwrap();
        assert_eq!(root.name, "message");
    }

    #[test]
    fn test_header_part_with_repeated_entries() {
        let xml = response(&format!(
            r#"<jbi:part><t:GetPrice xmlns:t="{TYPES}"/></jbi:part><jbi:part><t:Auth xmlns:t="{TYPES}">a</t:Auth><t:Auth xmlns:t="{TYPES}">b</t:Auth></jbi:part>"#
        ));
        let mut message = bound(xml, "GetPrice");
        JbiOutInterceptor::new(EndpointRole::Consumer)
            .handle(&mut message)
            .unwrap();
        let values: Vec<String> = message
            .soap_header_entries(&QName::new(TYPES, "Auth"))
            .iter()
            .map(text_of)
            .collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_bad_header_part_adds_no_headers() {
        let xml = response(&format!(
            r#"<jbi:part><t:GetPrice xmlns:t="{TYPES}"/></jbi:part><jbi:part><t:Other xmlns:t="{TYPES}"/></jbi:part>"#
        ));
        let mut message = bound(xml, "GetPrice");
        assert!(JbiOutInterceptor::new(EndpointRole::Consumer)
            .handle(&mut message)
            .is_err());
        assert!(message.soap_headers().is_empty());
    }

    #[test]
    fn test_multiple_elements_in_document_part() {
        let xml = response(&format!(
            r#"<jbi:part><t:GetPriceResponse xmlns:t="{TYPES}"/><t:GetPriceResponse xmlns:t="{TYPES}"/></jbi:part>"#
        ));
        let mut message = bound(xml, "GetPrice");
        let err = JbiOutInterceptor::new(EndpointRole::Provider)
            .handle(&mut message)
            .unwrap_err();
        assert!(err.as_fault().unwrap().reason().contains("exactly one element"));
    }
}
