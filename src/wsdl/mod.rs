//! WSDL 1.1 definition model with SOAP 1.1 / 1.2 binding extensions.
//!
//! This is the input of both the binding model resolution and the WS-I
//! validator. It can be built directly, deserialized with serde (qualified
//! names are `{ns}local` strings) or read from a WSDL document with
//! [`reader::read_definition`].

pub mod reader;

use crate::config::SoapVersion;
use crate::qname::QName;
use serde::{Deserialize, Serialize};

pub use reader::read_definition;

/// WSDL 1.1 namespace.
pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";
/// SOAP 1.1 binding extension namespace.
pub const WSDL_SOAP_11_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
/// SOAP 1.2 binding extension namespace.
pub const WSDL_SOAP_12_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap12/";
/// SOAP over HTTP transport URI.
pub const SOAP_HTTP_TRANSPORT: &str = "http://schemas.xmlsoap.org/soap/http";

/// A WSDL definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Definition {
    pub name: Option<String>,
    pub target_namespace: String,
    pub messages: Vec<MessageDef>,
    pub port_types: Vec<PortType>,
    pub bindings: Vec<Binding>,
    pub services: Vec<Service>,
}

impl Definition {
    pub fn message(&self, name: &QName) -> Option<&MessageDef> {
        self.messages.iter().find(|m| &m.name == name)
    }

    pub fn port_type(&self, name: &QName) -> Option<&PortType> {
        self.port_types.iter().find(|p| &p.name == name)
    }

    pub fn binding(&self, name: &QName) -> Option<&Binding> {
        self.bindings.iter().find(|b| &b.name == name)
    }

    pub fn service(&self, name: &QName) -> Option<&Service> {
        self.services.iter().find(|s| &s.name == name)
    }
}

/// A `wsdl:message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: QName,
    #[serde(default)]
    pub parts: Vec<PartDef>,
}

impl MessageDef {
    pub fn part(&self, name: &str) -> Option<&PartDef> {
        self.parts.iter().find(|p| p.name == name)
    }
}

/// A `wsdl:part`, typed either by `element` or by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDef {
    pub name: String,
    pub element: Option<QName>,
    #[serde(rename = "type")]
    pub type_name: Option<QName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortType {
    pub name: QName,
    #[serde(default)]
    pub operations: Vec<PortTypeOperation>,
}

impl PortType {
    pub fn operation(&self, name: &str) -> Option<&PortTypeOperation> {
        self.operations.iter().find(|o| o.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortTypeOperation {
    pub name: String,
    pub input: Option<OperationIo>,
    pub output: Option<OperationIo>,
    #[serde(default)]
    pub faults: Vec<OperationFault>,
    #[serde(default)]
    pub parameter_order: Vec<String>,
}

/// `wsdl:input` / `wsdl:output` of a port type operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationIo {
    pub name: Option<String>,
    pub message: QName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationFault {
    pub name: String,
    pub message: QName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub name: QName,
    pub port_type: QName,
    /// The `soap:binding` extension; absent for non-SOAP bindings.
    pub soap: Option<SoapBinding>,
    #[serde(default)]
    pub operations: Vec<BindingOperation>,
}

impl Binding {
    pub fn operation(&self, name: &str) -> Option<&BindingOperation> {
        self.operations.iter().find(|o| o.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapBinding {
    pub version: SoapVersion,
    pub style: Option<Style>,
    pub transport: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingOperation {
    pub name: String,
    pub soap_action: Option<String>,
    pub style: Option<Style>,
    pub input: Option<BindingIo>,
    pub output: Option<BindingIo>,
    #[serde(default)]
    pub faults: Vec<BindingFault>,
}

/// `wsdl:input` / `wsdl:output` of a binding operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingIo {
    pub name: Option<String>,
    pub body: Option<SoapBody>,
    pub headers: Vec<SoapHeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapBody {
    /// Explicit `parts` list; `None` means every part not bound elsewhere.
    pub parts: Option<Vec<String>>,
    #[serde(rename = "use")]
    pub use_: Use,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoapHeader {
    pub message: QName,
    pub part: String,
    #[serde(default, rename = "use")]
    pub use_: Use,
    pub namespace: Option<String>,
    #[serde(default)]
    pub header_faults: Vec<SoapHeaderFault>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoapHeaderFault {
    pub message: QName,
    pub part: String,
    #[serde(default, rename = "use")]
    pub use_: Use,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingFault {
    pub name: String,
    pub soap_fault: Option<SoapFaultBinding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapFaultBinding {
    pub name: Option<String>,
    #[serde(rename = "use")]
    pub use_: Use,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: QName,
    #[serde(default)]
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub binding: QName,
    pub address: Option<String>,
}

/// SOAP binding style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Document,
    Rpc,
}

/// SOAP body/header/fault `use`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Use {
    #[default]
    Literal,
    Encoded,
}
