//! XML parsing and construction utilities.
//!
//! Trees are `xmltree` elements. Incoming documents are pre-scanned with
//! quick-xml so that DOCTYPE declarations are rejected before the tree parser
//! ever sees them.

use crate::error::{Result, SoapError};
use crate::qname::QName;
use quick_xml::events::Event;
use quick_xml::Reader;
use xmltree::{Element, EmitterConfig, Namespace, XMLNode};

/// SOAP namespace URIs.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Role URIs that always target the ultimate receiver.
pub const SOAP_11_ACTOR_NEXT: &str = "http://schemas.xmlsoap.org/soap/actor/next";
pub const SOAP_12_ROLE_NEXT: &str = "http://www.w3.org/2003/05/soap-envelope/role/next";
pub const SOAP_12_ROLE_ULTIMATE_RECEIVER: &str =
    "http://www.w3.org/2003/05/soap-envelope/role/ultimateReceiver";

/// Parse raw bytes into an element tree.
pub fn parse_document(data: &[u8]) -> Result<Element> {
    std::str::from_utf8(data)
        .map_err(|e| SoapError::XmlParse(format!("Invalid UTF-8: {}", e)))?;

    check_xxe_patterns(data)?;

    Ok(Element::parse(data)?)
}

/// Reject DOCTYPE declarations (and with them every entity declaration).
fn check_xxe_patterns(data: &[u8]) -> Result<()> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::DocType(_)) => {
                return Err(SoapError::XmlParse(
                    "DOCTYPE declarations are not allowed".to_string(),
                ));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SoapError::XmlParse(format!("XML parse error: {}", e)));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Serialize an element without an XML declaration.
pub fn write_element(element: &Element) -> Result<String> {
    write_with(element, false)
}

/// Serialize an element as an indented document with an XML declaration.
pub fn write_document(element: &Element) -> Result<String> {
    write_with(element, true)
}

fn write_with(element: &Element, document: bool) -> Result<String> {
    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .write_document_declaration(document)
        .perform_indent(document)
        .indent_string("  ");
    element.write_with_config(&mut buf, config)?;
    String::from_utf8(buf).map_err(|e| SoapError::XmlWrite(e.to_string()))
}

/// Create an element named `name`, declaring its namespace under `prefix`.
///
/// Without a prefix a namespaced element declares the default namespace.
pub fn new_element(name: &QName, prefix: Option<&str>) -> Element {
    let mut element = Element::new(name.local_part());
    if !name.is_unqualified() {
        element.namespace = Some(name.namespace().to_string());
        element.prefix = prefix.map(str::to_string);
        declare_namespace(&mut element, prefix.unwrap_or(""), name.namespace());
    }
    element
}

/// Create an element holding a single text node.
pub fn text_element(name: &QName, prefix: Option<&str>, text: &str) -> Element {
    let mut element = new_element(name, prefix);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

/// Add a namespace declaration to an element.
pub fn declare_namespace(element: &mut Element, prefix: &str, uri: &str) {
    element
        .namespaces
        .get_or_insert_with(Namespace::empty)
        .put(prefix, uri);
}

/// Element children, skipping text, comments and processing instructions.
pub fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(XMLNode::as_element)
}

/// Children that carry meaning: elements and non-blank text.
pub fn significant_children(element: &Element) -> impl Iterator<Item = &XMLNode> {
    element.children.iter().filter(|node| match node {
        XMLNode::Element(_) => true,
        XMLNode::Text(text) | XMLNode::CData(text) => !text.trim().is_empty(),
        _ => false,
    })
}

/// Concatenated, trimmed text content of an element.
pub fn text_of(element: &Element) -> String {
    element
        .get_text()
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// Look up an attribute by local name.
pub fn attribute<'a>(element: &'a Element, local_name: &str) -> Option<&'a str> {
    element.attributes.get(local_name).map(String::as_str)
}

/// Structural XML equivalence: names, attributes, element children and
/// trimmed text must agree. Namespace prefixes and blank text are ignored.
pub fn xml_equivalent(a: &Element, b: &Element) -> bool {
    if QName::of(a) != QName::of(b) || a.attributes != b.attributes {
        return false;
    }

    let left: Vec<&XMLNode> = significant_children(a).collect();
    let right: Vec<&XMLNode> = significant_children(b).collect();
    left.len() == right.len()
        && left.iter().zip(right.iter()).all(|pair| match pair {
            (XMLNode::Element(x), XMLNode::Element(y)) => xml_equivalent(x, y),
            (
                XMLNode::Text(x) | XMLNode::CData(x),
                XMLNode::Text(y) | XMLNode::CData(y),
            ) => x.trim() == y.trim(),
            _ => false,
        })
}

/// Extract SOAPAction from HTTP header value (removes quotes).
pub fn parse_soap_action(header_value: &str) -> String {
    header_value.trim().trim_matches('"').to_string()
}

/// Extract the `action` parameter of a SOAP 1.2 `Content-Type` header.
pub fn content_type_action(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("action") {
            Some(parse_soap_action(value))
        } else {
            None
        }
    })
}
