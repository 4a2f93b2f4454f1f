//! Canonical message wrapper.
//!
//! The canonical form of a payload is a `jbi:message` document holding one
//! `jbi:part` per WSDL part, independent of the SOAP style the part travels
//! with:
//!
//! ```xml
//! <jbi:message xmlns:jbi="http://java.sun.com/xml/ns/jbi/wsdl-11-wrapper"
//!              xmlns:msg="http://example.org/stock"
//!              version="1.0" type="msg:GetPriceRequest" name="GetPriceRequest">
//!   <jbi:part><t:GetPrice xmlns:t="...">...</t:GetPrice></jbi:part>
//!   <jbi:part><t:Auth xmlns:t="...">...</t:Auth></jbi:part>
//! </jbi:message>
//! ```

pub mod inbound;
pub mod outbound;

pub use inbound::JbiInInterceptor;
pub use outbound::JbiOutInterceptor;

use crate::message::Message;
use crate::parser::{child_elements, declare_namespace, new_element};
use crate::qname::QName;
use xmltree::Element;

/// Namespace of the canonical wrapper.
pub const JBI_WRAPPER_NS: &str = "http://java.sun.com/xml/ns/jbi/wsdl-11-wrapper";
pub const JBI_PREFIX: &str = "jbi";
pub const WRAPPER_VERSION: &str = "1.0";

/// Prefix bound to the message type namespace on the wrapper root.
const MESSAGE_TYPE_PREFIX: &str = "msg";

/// Per-exchange switch turning both wrapper directions off.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapperDisabled;

pub fn message_qname() -> QName {
    QName::new(JBI_WRAPPER_NS, "message")
}

pub fn part_qname() -> QName {
    QName::new(JBI_WRAPPER_NS, "part")
}

/// Whether a wrapper interceptor should leave the message alone.
pub(crate) fn bypass(enabled: bool, message: &Message) -> bool {
    !enabled || message.fault().is_some() || message.contains::<WrapperDisabled>()
}

/// Create an empty wrapper root for a message type.
pub fn new_wrapper(message_type: &QName, name: &str) -> Element {
    let mut root = new_element(&message_qname(), Some(JBI_PREFIX));
    root.attributes
        .insert("version".to_string(), WRAPPER_VERSION.to_string());
    let type_value = if message_type.is_unqualified() {
        message_type.local_part().to_string()
    } else {
        declare_namespace(&mut root, MESSAGE_TYPE_PREFIX, message_type.namespace());
        format!("{}:{}", MESSAGE_TYPE_PREFIX, message_type.local_part())
    };
    root.attributes.insert("type".to_string(), type_value);
    root.attributes.insert("name".to_string(), name.to_string());
    root
}

/// A `jbi:part` element, relying on the root's namespace declaration.
pub fn new_part() -> Element {
    let mut part = Element::new("part");
    part.namespace = Some(JBI_WRAPPER_NS.to_string());
    part.prefix = Some(JBI_PREFIX.to_string());
    part
}

/// The `jbi:part` children of a wrapper root.
pub fn wrapper_parts(root: &Element) -> impl Iterator<Item = &Element> {
    let part = part_qname();
    child_elements(root).filter(move |e| part.matches(e))
}
