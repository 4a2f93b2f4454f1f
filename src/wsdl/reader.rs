//! WSDL 1.1 document reader.
//!
//! Reads messages, port types, SOAP 1.1 / 1.2 bindings and services. Schema
//! types, imports and documentation are skipped.

use super::{
    Binding, BindingFault, BindingIo, BindingOperation, Definition, MessageDef, OperationFault,
    OperationIo, PartDef, Port, PortType, PortTypeOperation, Service, SoapBinding, SoapBody,
    SoapFaultBinding, SoapHeader, SoapHeaderFault, Style, Use, WSDL_NS, WSDL_SOAP_11_NS,
    WSDL_SOAP_12_NS,
};
use crate::config::SoapVersion;
use crate::error::{Result, SoapError};
use crate::parser::{attribute, child_elements, parse_document};
use crate::qname::QName;
use tracing::debug;
use xmltree::Element;

/// Read a WSDL 1.1 document.
pub fn read_definition(data: &[u8]) -> Result<Definition> {
    let root = parse_document(data)?;
    if !is_wsdl(&root, "definitions") {
        return Err(SoapError::InvalidWsdl(format!(
            "expected wsdl:definitions root, found {}",
            QName::of(&root)
        )));
    }

    let target_namespace = attribute(&root, "targetNamespace").unwrap_or("").to_string();
    let mut definition = Definition {
        name: attribute(&root, "name").map(str::to_string),
        target_namespace: target_namespace.clone(),
        ..Default::default()
    };

    for child in child_elements(&root) {
        if child.namespace.as_deref() != Some(WSDL_NS) {
            continue;
        }
        match child.name.as_str() {
            "message" => definition.messages.push(read_message(child, &target_namespace)?),
            "portType" => definition.port_types.push(read_port_type(child, &target_namespace)?),
            "binding" => definition.bindings.push(read_binding(child, &target_namespace)?),
            "service" => definition.services.push(read_service(child, &target_namespace)?),
            other => debug!(element = other, "Skipping WSDL element"),
        }
    }

    Ok(definition)
}

fn read_message(element: &Element, tns: &str) -> Result<MessageDef> {
    let parts = wsdl_children(element, "part")
        .map(|part| -> Result<PartDef> {
            Ok(PartDef {
                name: required(part, "name")?.to_string(),
                element: optional_qname(part, "element")?,
                type_name: optional_qname(part, "type")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MessageDef {
        name: QName::new(tns, required(element, "name")?),
        parts,
    })
}

fn read_port_type(element: &Element, tns: &str) -> Result<PortType> {
    let mut operations = Vec::new();
    for op in wsdl_children(element, "operation") {
        let mut operation = PortTypeOperation {
            name: required(op, "name")?.to_string(),
            input: None,
            output: None,
            faults: Vec::new(),
            parameter_order: attribute(op, "parameterOrder")
                .map(|order| order.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        };
        for child in child_elements(op) {
            if child.namespace.as_deref() != Some(WSDL_NS) {
                continue;
            }
            match child.name.as_str() {
                "input" => operation.input = Some(read_operation_io(child)?),
                "output" => operation.output = Some(read_operation_io(child)?),
                "fault" => operation.faults.push(OperationFault {
                    name: required(child, "name")?.to_string(),
                    message: required_qname(child, "message")?,
                }),
                _ => {}
            }
        }
        operations.push(operation);
    }

    Ok(PortType {
        name: QName::new(tns, required(element, "name")?),
        operations,
    })
}

fn read_operation_io(element: &Element) -> Result<OperationIo> {
    Ok(OperationIo {
        name: attribute(element, "name").map(str::to_string),
        message: required_qname(element, "message")?,
    })
}

fn read_binding(element: &Element, tns: &str) -> Result<Binding> {
    let mut binding = Binding {
        name: QName::new(tns, required(element, "name")?),
        port_type: required_qname(element, "type")?,
        soap: None,
        operations: Vec::new(),
    };

    for child in child_elements(element) {
        if let Some(version) = soap_extension(child, "binding") {
            binding.soap = Some(SoapBinding {
                version,
                style: read_style(child)?,
                transport: attribute(child, "transport").map(str::to_string),
            });
        } else if is_wsdl(child, "operation") {
            binding.operations.push(read_binding_operation(child)?);
        }
    }

    Ok(binding)
}

fn read_binding_operation(element: &Element) -> Result<BindingOperation> {
    let mut operation = BindingOperation {
        name: required(element, "name")?.to_string(),
        soap_action: None,
        style: None,
        input: None,
        output: None,
        faults: Vec::new(),
    };

    for child in child_elements(element) {
        if soap_extension(child, "operation").is_some() {
            operation.soap_action = attribute(child, "soapAction").map(str::to_string);
            operation.style = read_style(child)?;
        } else if is_wsdl(child, "input") {
            operation.input = Some(read_binding_io(child)?);
        } else if is_wsdl(child, "output") {
            operation.output = Some(read_binding_io(child)?);
        } else if is_wsdl(child, "fault") {
            let soap_fault = child_elements(child)
                .find(|e| soap_extension(e, "fault").is_some())
                .map(|e| -> Result<SoapFaultBinding> {
                    Ok(SoapFaultBinding {
                        name: attribute(e, "name").map(str::to_string),
                        use_: read_use(e)?,
                        namespace: attribute(e, "namespace").map(str::to_string),
                    })
                })
                .transpose()?;
            operation.faults.push(BindingFault {
                name: required(child, "name")?.to_string(),
                soap_fault,
            });
        }
    }

    Ok(operation)
}

fn read_binding_io(element: &Element) -> Result<BindingIo> {
    let mut io = BindingIo {
        name: attribute(element, "name").map(str::to_string),
        ..Default::default()
    };

    for child in child_elements(element) {
        if soap_extension(child, "body").is_some() {
            io.body = Some(SoapBody {
                parts: attribute(child, "parts")
                    .map(|parts| parts.split_whitespace().map(str::to_string).collect()),
                use_: read_use(child)?,
                namespace: attribute(child, "namespace").map(str::to_string),
            });
        } else if soap_extension(child, "header").is_some() {
            let header_faults = child_elements(child)
                .filter(|e| soap_extension(e, "headerfault").is_some())
                .map(|e| -> Result<SoapHeaderFault> {
                    Ok(SoapHeaderFault {
                        message: required_qname(e, "message")?,
                        part: required(e, "part")?.to_string(),
                        use_: read_use(e)?,
                        namespace: attribute(e, "namespace").map(str::to_string),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            io.headers.push(SoapHeader {
                message: required_qname(child, "message")?,
                part: required(child, "part")?.to_string(),
                use_: read_use(child)?,
                namespace: attribute(child, "namespace").map(str::to_string),
                header_faults,
            });
        }
    }

    Ok(io)
}

fn read_service(element: &Element, tns: &str) -> Result<Service> {
    let ports = wsdl_children(element, "port")
        .map(|port| -> Result<Port> {
            Ok(Port {
                name: required(port, "name")?.to_string(),
                binding: required_qname(port, "binding")?,
                address: child_elements(port)
                    .find(|e| soap_extension(e, "address").is_some())
                    .and_then(|e| attribute(e, "location"))
                    .map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Service {
        name: QName::new(tns, required(element, "name")?),
        ports,
    })
}

fn read_style(element: &Element) -> Result<Option<Style>> {
    match attribute(element, "style") {
        None => Ok(None),
        Some("document") => Ok(Some(Style::Document)),
        Some("rpc") => Ok(Some(Style::Rpc)),
        Some(other) => Err(SoapError::InvalidWsdl(format!("unknown style '{}'", other))),
    }
}

fn read_use(element: &Element) -> Result<Use> {
    match attribute(element, "use") {
        None | Some("literal") => Ok(Use::Literal),
        Some("encoded") => Ok(Use::Encoded),
        Some(other) => Err(SoapError::InvalidWsdl(format!("unknown use '{}'", other))),
    }
}

/// SOAP version of a binding extension element with the given local name.
fn soap_extension(element: &Element, name: &str) -> Option<SoapVersion> {
    if element.name != name {
        return None;
    }
    match element.namespace.as_deref() {
        Some(WSDL_SOAP_11_NS) => Some(SoapVersion::Soap11),
        Some(WSDL_SOAP_12_NS) => Some(SoapVersion::Soap12),
        _ => None,
    }
}

fn is_wsdl(element: &Element, name: &str) -> bool {
    element.name == name && element.namespace.as_deref() == Some(WSDL_NS)
}

fn wsdl_children<'a>(element: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    child_elements(element).filter(move |e| is_wsdl(e, name))
}

fn required<'a>(element: &'a Element, name: &str) -> Result<&'a str> {
    attribute(element, name).ok_or_else(|| {
        SoapError::InvalidWsdl(format!(
            "missing '{}' attribute on wsdl:{}",
            name, element.name
        ))
    })
}

fn required_qname(element: &Element, name: &str) -> Result<QName> {
    optional_qname(element, name)?.ok_or_else(|| {
        SoapError::InvalidWsdl(format!(
            "missing '{}' attribute on wsdl:{}",
            name, element.name
        ))
    })
}

fn optional_qname(element: &Element, name: &str) -> Result<Option<QName>> {
    attribute(element, name)
        .map(|value| {
            QName::resolve(value, element).ok_or_else(|| {
                SoapError::InvalidWsdl(format!("unresolved prefix in '{}'", value))
            })
        })
        .transpose()
}
