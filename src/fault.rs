//! SOAP fault model and the SOAP 1.1 / 1.2 fault codec.
//!
//! A [`Fault`] is version independent. The codec reads and writes the two
//! incompatible wire shapes:
//!
//! - SOAP 1.1: `faultcode`, `faultstring`, `faultactor?`, `detail?`
//! - SOAP 1.2: `Code/Value`, `Code/Subcode/Value?`, `Reason/Text`, `Node?`,
//!   `Role?`, `Detail?`
//!
//! Parsing is a strict sequential walk over the children of the `Fault`
//! element. Missing, unexpected or misplaced elements raise a Sender fault;
//! shapes this codec does not support (several reasons, nested subcodes,
//! several detail entries) raise a Receiver fault.

use crate::config::SoapVersion;
use crate::error::{Result, SoapError};
use crate::parser::{
    child_elements, declare_namespace, new_element, text_element, text_of, write_document,
    SOAP_11_NS, SOAP_12_NS,
};
use crate::qname::QName;
use std::fmt;
use xmltree::{Element, XMLNode};

/// Prefix used for the envelope namespace in generated documents.
pub const ENVELOPE_PREFIX: &str = "soap";

/// Standard fault codes, in the SOAP 1.2 envelope namespace.
pub mod codes {
    use super::*;

    pub fn sender() -> QName {
        QName::new(SOAP_12_NS, "Sender")
    }

    pub fn receiver() -> QName {
        QName::new(SOAP_12_NS, "Receiver")
    }

    pub fn must_understand() -> QName {
        QName::new(SOAP_12_NS, "MustUnderstand")
    }

    pub fn version_mismatch() -> QName {
        QName::new(SOAP_12_NS, "VersionMismatch")
    }

    pub fn data_encoding_unknown() -> QName {
        QName::new(SOAP_12_NS, "DataEncodingUnknown")
    }
}

/// A SOAP fault.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    code: QName,
    subcode: Option<QName>,
    reason: String,
    node: Option<String>,
    role: Option<String>,
    detail: Option<Element>,
}

impl Fault {
    pub fn new(code: QName, reason: impl Into<String>) -> Self {
        Self {
            code,
            subcode: None,
            reason: reason.into(),
            node: None,
            role: None,
            detail: None,
        }
    }

    /// A fault caused by the message sender.
    pub fn sender(reason: impl Into<String>) -> Self {
        Self::new(codes::sender(), reason)
    }

    /// A fault caused by the receiver while processing a valid message.
    pub fn receiver(reason: impl Into<String>) -> Self {
        Self::new(codes::receiver(), reason)
    }

    pub fn must_understand(reason: impl Into<String>) -> Self {
        Self::new(codes::must_understand(), reason)
    }

    pub fn version_mismatch(reason: impl Into<String>) -> Self {
        Self::new(codes::version_mismatch(), reason)
    }

    pub fn with_subcode(mut self, subcode: QName) -> Self {
        self.subcode = Some(subcode);
        self
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_detail(mut self, detail: Element) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn code(&self) -> &QName {
        &self.code
    }

    pub fn subcode(&self) -> Option<&QName> {
        self.subcode.as_ref()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn detail(&self) -> Option<&Element> {
        self.detail.as_ref()
    }

    /// True for Sender / Client faults of either SOAP version.
    pub fn is_sender(&self) -> bool {
        self.code == codes::sender() || self.code == QName::new(SOAP_11_NS, "Client")
    }

    /// True for Receiver / Server faults of either SOAP version.
    pub fn is_receiver(&self) -> bool {
        self.code == codes::receiver() || self.code == QName::new(SOAP_11_NS, "Server")
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.reason)
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Parse a `Fault` element of either SOAP version.
pub fn parse_fault(element: &Element) -> Result<Fault> {
    if element.name != "Fault" {
        return Err(Fault::sender(format!("Expected Fault element, found {}", QName::of(element))).into());
    }
    match element.namespace.as_deref() {
        Some(SOAP_12_NS) => parse_fault_12(element),
        _ => parse_fault_11(element),
    }
}

fn parse_fault_11(fault: &Element) -> Result<Fault> {
    let mut children = child_elements(fault);

    let code_element = expect_11(children.next(), "faultcode")?;
    let code = parse_code(code_element)?;

    let reason_element = expect_11(children.next(), "faultstring")?;
    let mut result = Fault::new(code, text_of(reason_element));

    let mut next = children.next();
    if let Some(actor) = next.filter(|e| e.name == "faultactor") {
        result.role = Some(text_of(actor));
        next = children.next();
    }
    if let Some(detail) = next.filter(|e| e.name == "detail") {
        result.detail = single_detail(detail)?;
        next = children.next();
    }

    match next {
        None => Ok(result),
        Some(extra) if extra.name == "faultstring" => {
            Err(Fault::receiver("unsupported multiple reasons").into())
        }
        Some(extra) if extra.name == "detail" => {
            Err(Fault::receiver("unsupported multiple details").into())
        }
        Some(extra) => Err(unexpected(extra)),
    }
}

fn parse_fault_12(fault: &Element) -> Result<Fault> {
    let mut children = child_elements(fault);

    let code_element = expect_12(children.next(), "Code")?;
    let (code, subcode) = parse_code_12(code_element)?;

    let reason_element = expect_12(children.next(), "Reason")?;
    let reason = parse_reason_12(reason_element)?;

    let mut result = Fault::new(code, reason);
    result.subcode = subcode;

    let mut next = children.next();
    if let Some(node) = next.filter(|e| is_12(e, "Node")) {
        result.node = Some(text_of(node));
        next = children.next();
    }
    if let Some(role) = next.filter(|e| is_12(e, "Role")) {
        result.role = Some(text_of(role));
        next = children.next();
    }
    if let Some(detail) = next.filter(|e| is_12(e, "Detail")) {
        result.detail = single_detail(detail)?;
        next = children.next();
    }

    match next {
        None => Ok(result),
        Some(extra) if is_12(extra, "Reason") => {
            Err(Fault::receiver("unsupported multiple reasons").into())
        }
        Some(extra) if is_12(extra, "Detail") => {
            Err(Fault::receiver("unsupported multiple details").into())
        }
        Some(extra) => Err(unexpected(extra)),
    }
}

fn parse_code_12(code: &Element) -> Result<(QName, Option<QName>)> {
    let mut children = child_elements(code);

    let value = parse_code(expect_12(children.next(), "Value")?)?;

    let subcode = match children.next() {
        None => None,
        Some(sub) if is_12(sub, "Subcode") => {
            let mut inner = child_elements(sub);
            let subvalue = parse_code(expect_12(inner.next(), "Value")?)?;
            match inner.next() {
                None => {}
                Some(nested) if is_12(nested, "Subcode") => {
                    return Err(Fault::receiver("unsupported nested subcodes").into());
                }
                Some(extra) => return Err(unexpected(extra)),
            }
            if let Some(extra) = children.next() {
                return Err(if is_12(extra, "Subcode") {
                    Fault::receiver("unsupported multiple subcodes").into()
                } else {
                    unexpected(extra)
                });
            }
            Some(subvalue)
        }
        Some(extra) => return Err(unexpected(extra)),
    };

    Ok((value, subcode))
}

fn parse_reason_12(reason: &Element) -> Result<String> {
    let mut texts = Vec::new();
    for child in child_elements(reason) {
        if !is_12(child, "Text") {
            return Err(unexpected(child));
        }
        texts.push(text_of(child));
    }
    match texts.len() {
        0 => Err(Fault::sender("Expected Text element in Reason").into()),
        1 => Ok(texts.remove(0)),
        _ => Err(Fault::receiver("unsupported multiple reasons").into()),
    }
}

fn parse_code(element: &Element) -> Result<QName> {
    let text = text_of(element);
    QName::resolve(&text, element)
        .ok_or_else(|| Fault::sender(format!("Invalid fault code '{}'", text)).into())
}

fn single_detail(detail: &Element) -> Result<Option<Element>> {
    let mut entries = child_elements(detail);
    let first = entries.next().cloned();
    if entries.next().is_some() {
        return Err(Fault::receiver("unsupported multiple detail elements").into());
    }
    Ok(first)
}

fn expect_11<'a>(element: Option<&'a Element>, name: &str) -> Result<&'a Element> {
    match element {
        Some(e) if e.name == name => Ok(e),
        Some(e) => Err(Fault::sender(format!("Expected {} element, found {}", name, QName::of(e))).into()),
        None => Err(Fault::sender(format!("Expected {} element", name)).into()),
    }
}

fn expect_12<'a>(element: Option<&'a Element>, name: &str) -> Result<&'a Element> {
    match element {
        Some(e) if is_12(e, name) => Ok(e),
        Some(e) => Err(Fault::sender(format!("Expected {} element, found {}", name, QName::of(e))).into()),
        None => Err(Fault::sender(format!("Expected {} element", name)).into()),
    }
}

fn is_12(element: &Element, name: &str) -> bool {
    element.name == name && element.namespace.as_deref() == Some(SOAP_12_NS)
}

fn unexpected(element: &Element) -> SoapError {
    Fault::sender(format!("Unexpected element {}", QName::of(element))).into()
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Build the `Fault` element for the given SOAP version.
pub fn write_fault(fault: &Fault, version: SoapVersion) -> Element {
    match version {
        SoapVersion::Soap11 => write_fault_11(fault),
        SoapVersion::Soap12 => write_fault_12(fault),
    }
}

fn write_fault_11(fault: &Fault) -> Element {
    let mut root = new_element(&QName::new(SOAP_11_NS, "Fault"), Some(ENVELOPE_PREFIX));

    let mut code = Element::new("faultcode");
    let value = code_text(&mut code, &to_soap_11(&fault.code));
    code.children.push(XMLNode::Text(value));
    root.children.push(XMLNode::Element(code));

    root.children.push(XMLNode::Element(plain_text_element("faultstring", &fault.reason)));

    if let Some(ref role) = fault.role {
        root.children.push(XMLNode::Element(plain_text_element("faultactor", role)));
    }
    if let Some(ref detail) = fault.detail {
        let mut element = Element::new("detail");
        element.children.push(XMLNode::Element(detail.clone()));
        root.children.push(XMLNode::Element(element));
    }
    root
}

fn write_fault_12(fault: &Fault) -> Element {
    let soap = |local: &str| QName::new(SOAP_12_NS, local);
    let mut root = new_element(&soap("Fault"), Some(ENVELOPE_PREFIX));

    let mut code = soap_child(&soap("Code"));
    code.children.push(XMLNode::Element(code_value(&to_soap_12(&fault.code))));
    if let Some(ref subcode) = fault.subcode {
        let mut sub = soap_child(&soap("Subcode"));
        sub.children.push(XMLNode::Element(code_value(subcode)));
        code.children.push(XMLNode::Element(sub));
    }
    root.children.push(XMLNode::Element(code));

    let mut reason = soap_child(&soap("Reason"));
    let mut text = soap_child(&soap("Text"));
    text.attributes.insert("xml:lang".to_string(), "en".to_string());
    text.children.push(XMLNode::Text(fault.reason.clone()));
    reason.children.push(XMLNode::Element(text));
    root.children.push(XMLNode::Element(reason));

    if let Some(ref node) = fault.node {
        root.children.push(XMLNode::Element(soap_text(&soap("Node"), node)));
    }
    if let Some(ref role) = fault.role {
        root.children.push(XMLNode::Element(soap_text(&soap("Role"), role)));
    }
    if let Some(ref detail) = fault.detail {
        let mut element = soap_child(&soap("Detail"));
        element.children.push(XMLNode::Element(detail.clone()));
        root.children.push(XMLNode::Element(element));
    }
    root
}

/// Wrap a fault in a complete SOAP envelope document.
pub fn fault_envelope(fault: &Fault, version: SoapVersion) -> Result<String> {
    let ns = version.namespace();
    let mut envelope = new_element(&QName::new(ns, "Envelope"), Some(ENVELOPE_PREFIX));
    let mut body = soap_child(&QName::new(ns, "Body"));
    body.children.push(XMLNode::Element(write_fault(fault, version)));
    envelope.children.push(XMLNode::Element(body));
    write_document(&envelope)
}

/// A child in the envelope namespace, relying on the parent's declaration.
fn soap_child(name: &QName) -> Element {
    let mut element = Element::new(name.local_part());
    element.namespace = Some(name.namespace().to_string());
    element.prefix = Some(ENVELOPE_PREFIX.to_string());
    element
}

fn soap_text(name: &QName, text: &str) -> Element {
    let mut element = soap_child(name);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

fn plain_text_element(name: &str, text: &str) -> Element {
    text_element(&QName::local(name), None, text)
}

fn code_value(code: &QName) -> Element {
    let mut value = soap_child(&QName::new(SOAP_12_NS, "Value"));
    let text = code_text(&mut value, code);
    value.children.push(XMLNode::Text(text));
    value
}

/// Render a code as prefixed text, declaring its namespace on `holder` when
/// it is not the envelope namespace.
fn code_text(holder: &mut Element, code: &QName) -> String {
    if code.is_unqualified() {
        code.local_part().to_string()
    } else if code.namespace() == SOAP_11_NS || code.namespace() == SOAP_12_NS {
        format!("{}:{}", ENVELOPE_PREFIX, code.local_part())
    } else {
        declare_namespace(holder, "fc", code.namespace());
        format!("fc:{}", code.local_part())
    }
}

fn to_soap_11(code: &QName) -> QName {
    if code.namespace() != SOAP_12_NS {
        return code.clone();
    }
    let local = match code.local_part() {
        "Sender" => "Client",
        "Receiver" | "DataEncodingUnknown" => "Server",
        other => other,
    };
    QName::new(SOAP_11_NS, local)
}

fn to_soap_12(code: &QName) -> QName {
    if code.namespace() != SOAP_11_NS {
        return code.clone();
    }
    let local = match code.local_part() {
        "Client" => "Sender",
        "Server" => "Receiver",
        other => other,
    };
    QName::new(SOAP_12_NS, local)
}
