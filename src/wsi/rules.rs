//! Basic Profile rules.

use super::{Locator, ValidationReport};
use crate::config::SoapVersion;
use crate::wsdl::{
    Binding, BindingIo, BindingOperation, Definition, MessageDef, PortType, Style, Use,
    SOAP_HTTP_TRANSPORT,
};
use std::collections::HashSet;

/// A named rule check.
#[derive(Clone, Copy)]
pub struct Rule {
    pub code: &'static str,
    pub check: fn(&Definition, &mut ValidationReport),
}

/// Every rule, in evaluation order.
pub static RULES: &[Rule] = &[
    Rule { code: "R2101", check: r2101_references_resolve },
    Rule { code: "R2201", check: r2201_document_literal_body_parts },
    Rule { code: "R2203", check: r2203_rpc_literal_parts_use_type },
    Rule { code: "R2204", check: r2204_document_literal_parts_use_element },
    Rule { code: "R2205", check: r2205_header_parts_use_element },
    Rule { code: "R2304", check: r2304_no_overloaded_operations },
    Rule { code: "R2401", check: r2401_soap_11_binding },
    Rule { code: "R2701", check: r2701_transport_present },
    Rule { code: "R2702", check: r2702_http_transport },
    Rule { code: "R2705", check: r2705_uniform_style },
    Rule { code: "R2706", check: r2706_literal_use },
    Rule { code: "R2716", check: r2716_document_literal_no_namespace },
    Rule { code: "R2717", check: r2717_rpc_literal_body_namespace },
    Rule { code: "R2718", check: r2718_operation_sets_match },
    Rule { code: "R2720", check: r2720_header_part_names },
    Rule { code: "R2721", check: r2721_fault_has_name },
    Rule { code: "R2726", check: r2726_rpc_literal_no_header_namespace },
    Rule { code: "R2754", check: r2754_fault_names_match },
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn binding_name(binding: &Binding) -> &str {
    binding.name.local_part()
}

fn operation_name(binding: &Binding, operation: &BindingOperation) -> String {
    format!("{}.{}", binding_name(binding), operation.name)
}

/// Effective style of a binding operation.
fn style_of(binding: &Binding, operation: &BindingOperation) -> Style {
    operation
        .style
        .or_else(|| binding.soap.as_ref().and_then(|s| s.style))
        .unwrap_or_default()
}

fn soap_bindings(definition: &Definition) -> impl Iterator<Item = &Binding> {
    definition.bindings.iter().filter(|b| b.soap.is_some())
}

/// Binding operations of SOAP bindings with their effective style.
fn operations(
    definition: &Definition,
) -> impl Iterator<Item = (&Binding, &BindingOperation, Style)> {
    soap_bindings(definition).flat_map(|binding| {
        binding
            .operations
            .iter()
            .map(move |op| (binding, op, style_of(binding, op)))
    })
}

fn port_type_of<'a>(definition: &'a Definition, binding: &Binding) -> Option<&'a PortType> {
    definition.port_type(&binding.port_type)
}

/// Input and output of a binding operation, each with its abstract message.
fn bound_messages<'a>(
    definition: &'a Definition,
    binding: &Binding,
    operation: &'a BindingOperation,
) -> Vec<(&'a BindingIo, &'a MessageDef)> {
    let Some(pop) = port_type_of(definition, binding).and_then(|pt| pt.operation(&operation.name))
    else {
        return Vec::new();
    };
    let pairs = [
        (operation.input.as_ref(), pop.input.as_ref()),
        (operation.output.as_ref(), pop.output.as_ref()),
    ];
    pairs
        .into_iter()
        .filter_map(|(bio, io)| {
            let bio = bio?;
            let message = definition.message(&io?.message)?;
            Some((bio, message))
        })
        .collect()
}

/// Names of the parts carried in the SOAP body.
fn body_part_names<'a>(io: &'a BindingIo, message: &'a MessageDef) -> Vec<&'a str> {
    if let Some(parts) = io.body.as_ref().and_then(|b| b.parts.as_ref()) {
        return parts.iter().map(String::as_str).collect();
    }
    message
        .parts
        .iter()
        .filter(|p| {
            !io.headers
                .iter()
                .any(|h| h.message == message.name && h.part == p.name)
        })
        .map(|p| p.name.as_str())
        .collect()
}

fn is_absolute_uri(value: &str) -> bool {
    match value.split_once(':') {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn r2101_references_resolve(definition: &Definition, report: &mut ValidationReport) {
    for port_type in &definition.port_types {
        for op in &port_type.operations {
            let messages = op
                .input
                .iter()
                .chain(op.output.iter())
                .map(|io| &io.message)
                .chain(op.faults.iter().map(|f| &f.message));
            for message in messages {
                if definition.message(message).is_none() {
                    report.add(
                        Locator::PortType,
                        port_type.name.local_part(),
                        "R2101",
                        &format!("operation '{}' references undefined message {}", op.name, message),
                    );
                }
            }
        }
    }

    for binding in &definition.bindings {
        if definition.port_type(&binding.port_type).is_none() {
            report.add(
                Locator::Binding,
                binding_name(binding),
                "R2101",
                &format!("references undefined portType {}", binding.port_type),
            );
        }
        for op in &binding.operations {
            let headers = op
                .input
                .iter()
                .chain(op.output.iter())
                .flat_map(|io| io.headers.iter());
            for header in headers {
                let resolved = definition
                    .message(&header.message)
                    .map_or(false, |m| m.part(&header.part).is_some());
                if !resolved {
                    report.add(
                        Locator::Operation,
                        &operation_name(binding, op),
                        "R2101",
                        &format!(
                            "soap:header references undefined part {}#{}",
                            header.message, header.part
                        ),
                    );
                }
            }
        }
    }

    for service in &definition.services {
        for port in &service.ports {
            if definition.binding(&port.binding).is_none() {
                report.add(
                    Locator::Port,
                    &port.name,
                    "R2101",
                    &format!("references undefined binding {}", port.binding),
                );
            }
        }
    }
}

fn r2201_document_literal_body_parts(definition: &Definition, report: &mut ValidationReport) {
    for (binding, op, style) in operations(definition) {
        if style != Style::Document {
            continue;
        }
        for (io, message) in bound_messages(definition, binding, op) {
            let explicit = io.body.as_ref().and_then(|b| b.parts.as_ref());
            match explicit {
                Some(parts) if parts.len() > 1 => report.add(
                    Locator::Operation,
                    &operation_name(binding, op),
                    "R2201",
                    "document-literal soap:body must reference at most one part",
                ),
                None if message.parts.len() > 1 => report.add(
                    Locator::Operation,
                    &operation_name(binding, op),
                    "R2210",
                    &format!(
                        "soap:body without parts attribute but message {} defines {} parts",
                        message.name.local_part(),
                        message.parts.len()
                    ),
                ),
                _ => {}
            }
        }
    }
}

fn r2203_rpc_literal_parts_use_type(definition: &Definition, report: &mut ValidationReport) {
    for (binding, op, style) in operations(definition) {
        if style != Style::Rpc {
            continue;
        }
        for (io, message) in bound_messages(definition, binding, op) {
            for name in body_part_names(io, message) {
                if message.part(name).map_or(false, |p| p.type_name.is_none()) {
                    report.add(
                        Locator::Message,
                        message.name.local_part(),
                        "R2203",
                        &format!("rpc-literal part '{}' must use the type attribute", name),
                    );
                }
            }
        }
    }
}

fn r2204_document_literal_parts_use_element(
    definition: &Definition,
    report: &mut ValidationReport,
) {
    for (binding, op, style) in operations(definition) {
        if style != Style::Document {
            continue;
        }
        for (io, message) in bound_messages(definition, binding, op) {
            for name in body_part_names(io, message) {
                if message.part(name).map_or(false, |p| p.element.is_none()) {
                    report.add(
                        Locator::Message,
                        message.name.local_part(),
                        "R2204",
                        &format!("document-literal part '{}' must use the element attribute", name),
                    );
                }
            }
        }
    }
}

fn r2205_header_parts_use_element(definition: &Definition, report: &mut ValidationReport) {
    for (binding, op, _) in operations(definition) {
        let references = op
            .input
            .iter()
            .chain(op.output.iter())
            .flat_map(|io| io.headers.iter())
            .flat_map(|h| {
                std::iter::once((&h.message, &h.part))
                    .chain(h.header_faults.iter().map(|f| (&f.message, &f.part)))
            });
        for (message, part) in references {
            let Some(part_def) = definition.message(message).and_then(|m| m.part(part)) else {
                continue;
            };
            if part_def.element.is_none() {
                report.add(
                    Locator::Operation,
                    &operation_name(binding, op),
                    "R2205",
                    &format!(
                        "header part {}#{} must use the element attribute",
                        message, part
                    ),
                );
            }
        }
    }
}

fn r2304_no_overloaded_operations(definition: &Definition, report: &mut ValidationReport) {
    for port_type in &definition.port_types {
        let mut seen = HashSet::new();
        for op in &port_type.operations {
            if !seen.insert(op.name.as_str()) {
                report.add(
                    Locator::PortType,
                    port_type.name.local_part(),
                    "R2304",
                    &format!("operation '{}' is overloaded", op.name),
                );
            }
        }
    }
}

fn r2401_soap_11_binding(definition: &Definition, report: &mut ValidationReport) {
    for binding in &definition.bindings {
        match binding.soap.as_ref().map(|s| s.version) {
            Some(SoapVersion::Soap11) => {}
            Some(SoapVersion::Soap12) => report.add(
                Locator::Binding,
                binding_name(binding),
                "R2401",
                "binding must use the SOAP 1.1 binding extension",
            ),
            None => report.add(
                Locator::Binding,
                binding_name(binding),
                "R2401",
                "binding has no soap:binding element",
            ),
        }
    }
}

fn r2701_transport_present(definition: &Definition, report: &mut ValidationReport) {
    for binding in soap_bindings(definition) {
        let missing = binding
            .soap
            .as_ref()
            .map_or(true, |s| s.transport.as_deref().map_or(true, str::is_empty));
        if missing {
            report.add(
                Locator::Binding,
                binding_name(binding),
                "R2701",
                "soap:binding must specify the transport attribute",
            );
        }
    }
}

fn r2702_http_transport(definition: &Definition, report: &mut ValidationReport) {
    for binding in soap_bindings(definition) {
        let transport = binding
            .soap
            .as_ref()
            .and_then(|s| s.transport.as_deref())
            .filter(|t| !t.is_empty());
        if let Some(transport) = transport {
            if transport != SOAP_HTTP_TRANSPORT {
                report.add(
                    Locator::Binding,
                    binding_name(binding),
                    "R2702",
                    &format!("transport '{}' is not {}", transport, SOAP_HTTP_TRANSPORT),
                );
            }
        }
    }
}

fn r2705_uniform_style(definition: &Definition, report: &mut ValidationReport) {
    for binding in soap_bindings(definition) {
        let styles: HashSet<Style> = binding
            .operations
            .iter()
            .map(|op| style_of(binding, op))
            .collect();
        if styles.len() > 1 {
            report.add(
                Locator::Binding,
                binding_name(binding),
                "R2705",
                "operations mix rpc and document styles",
            );
        }
    }
}

fn r2706_literal_use(definition: &Definition, report: &mut ValidationReport) {
    for (binding, op, _) in operations(definition) {
        let ios = op.input.iter().chain(op.output.iter());
        let uses = ios
            .flat_map(|io| {
                io.body.iter().map(|b| b.use_).chain(io.headers.iter().flat_map(|h| {
                    std::iter::once(h.use_).chain(h.header_faults.iter().map(|f| f.use_))
                }))
            })
            .chain(op.faults.iter().filter_map(|f| f.soap_fault.as_ref().map(|s| s.use_)));
        for use_ in uses {
            if use_ == Use::Encoded {
                report.add(
                    Locator::Operation,
                    &operation_name(binding, op),
                    "R2706",
                    "use must be literal",
                );
            }
        }
    }
}

/// `namespace` attributes of the header, headerfault and fault extensions.
fn extension_namespaces(op: &BindingOperation) -> impl Iterator<Item = &str> {
    op.input
        .iter()
        .chain(op.output.iter())
        .flat_map(|io| io.headers.iter())
        .flat_map(|h| {
            h.namespace
                .as_deref()
                .into_iter()
                .chain(h.header_faults.iter().filter_map(|f| f.namespace.as_deref()))
        })
        .chain(
            op.faults
                .iter()
                .filter_map(|f| f.soap_fault.as_ref().and_then(|s| s.namespace.as_deref())),
        )
}

fn r2716_document_literal_no_namespace(definition: &Definition, report: &mut ValidationReport) {
    for (binding, op, style) in operations(definition) {
        if style != Style::Document {
            continue;
        }
        let on_body = op
            .input
            .iter()
            .chain(op.output.iter())
            .any(|io| io.body.as_ref().map_or(false, |b| b.namespace.is_some()));
        if on_body || extension_namespaces(op).next().is_some() {
            report.add(
                Locator::Operation,
                &operation_name(binding, op),
                "R2716",
                "document-literal binding must not specify a namespace attribute",
            );
        }
    }
}

fn r2717_rpc_literal_body_namespace(definition: &Definition, report: &mut ValidationReport) {
    for (binding, op, style) in operations(definition) {
        if style != Style::Rpc {
            continue;
        }
        for io in op.input.iter().chain(op.output.iter()) {
            let Some(ref body) = io.body else { continue };
            match body.namespace.as_deref() {
                Some(ns) if is_absolute_uri(ns) => {}
                Some(ns) => report.add(
                    Locator::Operation,
                    &operation_name(binding, op),
                    "R2717",
                    &format!("soap:body namespace '{}' is not an absolute URI", ns),
                ),
                None => report.add(
                    Locator::Operation,
                    &operation_name(binding, op),
                    "R2717",
                    "rpc-literal soap:body must specify the namespace attribute",
                ),
            }
        }
    }
}

fn r2718_operation_sets_match(definition: &Definition, report: &mut ValidationReport) {
    for binding in &definition.bindings {
        let Some(port_type) = port_type_of(definition, binding) else {
            continue;
        };
        let bound: HashSet<&str> = binding.operations.iter().map(|o| o.name.as_str()).collect();
        let declared: HashSet<&str> = port_type.operations.iter().map(|o| o.name.as_str()).collect();
        if bound != declared {
            let mut missing: Vec<&str> = declared.difference(&bound).copied().collect();
            let mut extra: Vec<&str> = bound.difference(&declared).copied().collect();
            missing.sort_unstable();
            extra.sort_unstable();
            report.add(
                Locator::Binding,
                binding_name(binding),
                "R2718",
                &format!(
                    "operations differ from portType {} (missing: [{}], extra: [{}])",
                    port_type.name.local_part(),
                    missing.join(", "),
                    extra.join(", ")
                ),
            );
        }
    }
}

fn r2720_header_part_names(definition: &Definition, report: &mut ValidationReport) {
    let is_nmtoken = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ':'))
    };
    for (binding, op, _) in operations(definition) {
        let parts = op
            .input
            .iter()
            .chain(op.output.iter())
            .flat_map(|io| io.headers.iter())
            .flat_map(|h| {
                std::iter::once(h.part.as_str())
                    .chain(h.header_faults.iter().map(|f| f.part.as_str()))
            });
        for part in parts {
            if !is_nmtoken(part) {
                report.add(
                    Locator::Operation,
                    &operation_name(binding, op),
                    "R2720",
                    &format!("header part reference '{}' is not a part name", part),
                );
            }
        }
    }
}

fn r2721_fault_has_name(definition: &Definition, report: &mut ValidationReport) {
    for (binding, op, _) in operations(definition) {
        for fault in &op.faults {
            let unnamed = fault
                .soap_fault
                .as_ref()
                .map_or(false, |s| s.name.as_deref().map_or(true, str::is_empty));
            if unnamed {
                report.add(
                    Locator::Operation,
                    &operation_name(binding, op),
                    "R2721",
                    &format!("soap:fault of '{}' must have a name attribute", fault.name),
                );
            }
        }
    }
}

fn r2726_rpc_literal_no_header_namespace(definition: &Definition, report: &mut ValidationReport) {
    for (binding, op, style) in operations(definition) {
        if style == Style::Rpc && extension_namespaces(op).next().is_some() {
            report.add(
                Locator::Operation,
                &operation_name(binding, op),
                "R2726",
                "rpc-literal header, headerfault and fault must not specify a namespace",
            );
        }
    }
}

fn r2754_fault_names_match(definition: &Definition, report: &mut ValidationReport) {
    for (binding, op, _) in operations(definition) {
        for fault in &op.faults {
            let soap_name = fault.soap_fault.as_ref().and_then(|s| s.name.as_deref());
            if let Some(name) = soap_name.filter(|n| !n.is_empty()) {
                if name != fault.name {
                    report.add(
                        Locator::Operation,
                        &operation_name(binding, op),
                        "R2754",
                        &format!(
                            "soap:fault name '{}' differs from wsdl:fault name '{}'",
                            name, fault.name
                        ),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wsdl::read_definition;
    use crate::wsi::{validate, validate_with};

    const COMPLIANT: &str = r#"<wsdl:definitions targetNamespace="http://example.org/stock"
    xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:tns="http://example.org/stock" xmlns:t="http://example.org/stock/types">
  <wsdl:message name="In"><wsdl:part name="body" element="t:GetPrice"/></wsdl:message>
  <wsdl:message name="Out"><wsdl:part name="body" element="t:GetPriceResponse"/></wsdl:message>
  <wsdl:message name="Err"><wsdl:part name="fault" element="t:PriceError"/></wsdl:message>
  <wsdl:portType name="PT">
    <wsdl:operation name="GetPrice">
      <wsdl:input message="tns:In"/>
      <wsdl:output message="tns:Out"/>
      <wsdl:fault name="PriceFault" message="tns:Err"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="B" type="tns:PT">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="GetPrice">
      <soap:operation soapAction="urn:GetPrice"/>
      <wsdl:input><soap:body use="literal"/></wsdl:input>
      <wsdl:output><soap:body use="literal"/></wsdl:output>
      <wsdl:fault name="PriceFault"><soap:fault name="PriceFault" use="literal"/></wsdl:fault>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="S">
    <wsdl:port name="P" binding="tns:B"><soap:address location="http://localhost/"/></wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#;

    fn compliant() -> Definition {
        read_definition(COMPLIANT.as_bytes()).unwrap()
    }

    fn check(definition: &Definition, code: &str) -> ValidationReport {
        let rules: Vec<Rule> = RULES.iter().copied().filter(|r| r.code == code).collect();
        validate_with(definition, &rules)
    }

    #[test]
    fn test_rule_list_is_ordered_and_unique() {
        let codes: Vec<&str> = RULES.iter().map(|r| r.code).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_compliant_definition() {
        let report = validate(&compliant());
        assert!(report.is_valid(), "Expected no violations, got: {:?}", report.violations());
    }

    #[test]
    fn test_r2101_unresolved_references() {
        let mut definition = compliant();
        definition.messages.retain(|m| m.name.local_part() != "Err");
        definition.services[0].ports[0].binding = crate::qname::QName::new("urn:x", "Nope");
        let report = check(&definition, "R2101");
        assert_eq!(report.violations().len(), 2);
    }

    #[test]
    fn test_r2201_r2210_body_parts() {
        let mut definition = compliant();
        let first_part = definition.messages[0].parts[0].clone();
        definition.messages[0].parts.push(first_part);
        definition.messages[0].parts[1].name = "second".to_string();
        let report = check(&definition, "R2201");
        assert!(report.has_violation("R2210"));

        let input = definition.bindings[0].operations[0].input.as_mut().unwrap();
        input.body.as_mut().unwrap().parts = Some(vec!["body".into(), "second".into()]);
        let report = check(&definition, "R2201");
        assert!(report.has_violation("R2201"));
    }

    #[test]
    fn test_r2203_and_r2204_part_typing() {
        let mut definition = compliant();
        assert!(check(&definition, "R2203").is_valid());
        definition.bindings[0].soap.as_mut().unwrap().style = Some(Style::Rpc);
        let report = check(&definition, "R2203");
        assert!(report.has_violation("R2203"));

        let mut definition = compliant();
        definition.messages[0].parts[0].element = None;
        assert!(check(&definition, "R2204").has_violation("R2204"));
    }

    #[test]
    fn test_r2304_overloaded_operation() {
        let mut definition = compliant();
        let op = definition.port_types[0].operations[0].clone();
        definition.port_types[0].operations.push(op);
        assert!(check(&definition, "R2304").has_violation("R2304"));
    }

    #[test]
    fn test_r2401_soap12_binding() {
        let mut definition = compliant();
        definition.bindings[0].soap.as_mut().unwrap().version = SoapVersion::Soap12;
        assert!(check(&definition, "R2401").has_violation("R2401"));
    }

    #[test]
    fn test_r2701_missing_transport() {
        let mut definition = compliant();
        definition.bindings[0].soap.as_mut().unwrap().transport = None;
        let report = validate(&definition);
        assert_eq!(
            report.violations().iter().collect::<Vec<_>>(),
            vec!["binding \"B\": Basic Profile Violation #R2701: soap:binding must specify the transport attribute"]
        );
    }

    #[test]
    fn test_r2702_non_http_transport() {
        let mut definition = compliant();
        definition.bindings[0].soap.as_mut().unwrap().transport =
            Some("http://example.org/jms".to_string());
        assert!(check(&definition, "R2702").has_violation("R2702"));
    }

    #[test]
    fn test_r2705_mixed_styles() {
        let mut definition = compliant();
        let mut op = definition.bindings[0].operations[0].clone();
        op.name = "Other".to_string();
        op.style = Some(Style::Rpc);
        definition.bindings[0].operations.push(op);
        assert!(check(&definition, "R2705").has_violation("R2705"));
    }

    #[test]
    fn test_r2706_encoded_use() {
        let mut definition = compliant();
        let output = definition.bindings[0].operations[0].output.as_mut().unwrap();
        output.body.as_mut().unwrap().use_ = Use::Encoded;
        assert!(check(&definition, "R2706").has_violation("R2706"));
    }

    #[test]
    fn test_r2716_and_r2717_namespaces() {
        let mut definition = compliant();
        let input = definition.bindings[0].operations[0].input.as_mut().unwrap();
        input.body.as_mut().unwrap().namespace = Some("urn:ns".to_string());
        assert!(check(&definition, "R2716").has_violation("R2716"));

        definition.bindings[0].soap.as_mut().unwrap().style = Some(Style::Rpc);
        // Input carries an absolute namespace, output none.
        let report = check(&definition, "R2717");
        assert_eq!(report.violations().len(), 1);

        let input = definition.bindings[0].operations[0].input.as_mut().unwrap();
        input.body.as_mut().unwrap().namespace = Some("relative/path".to_string());
        let report = check(&definition, "R2717");
        assert!(report
            .violations()
            .iter()
            .any(|v| v.contains("not an absolute URI")));
    }

    #[test]
    fn test_r2718_operation_sets() {
        let mut definition = compliant();
        definition.bindings[0].operations[0].name = "Renamed".to_string();
        let report = check(&definition, "R2718");
        let violation = report.violations().first().unwrap();
        assert!(violation.contains("missing: [GetPrice]"));
        assert!(violation.contains("extra: [Renamed]"));
    }

    #[test]
    fn test_fault_naming_rules() {
        let mut definition = compliant();
        definition.bindings[0].operations[0].faults[0]
            .soap_fault
            .as_mut()
            .unwrap()
            .name = Some("Other".to_string());
        assert!(check(&definition, "R2754").has_violation("R2754"));

        definition.bindings[0].operations[0].faults[0]
            .soap_fault
            .as_mut()
            .unwrap()
            .name = None;
        assert!(check(&definition, "R2721").has_violation("R2721"));
        assert!(check(&definition, "R2754").is_valid());
    }

    #[test]
    fn test_header_rules() {
        use crate::wsdl::SoapHeader;
        let mut definition = compliant();
        definition.messages[0].parts.push(crate::wsdl::PartDef {
            name: "auth".to_string(),
            element: None,
            type_name: Some(crate::qname::QName::new("urn:xsd", "string")),
        });
        let message = definition.messages[0].name.clone();
        let input = definition.bindings[0].operations[0].input.as_mut().unwrap();
        input.body.as_mut().unwrap().parts = Some(vec!["body".to_string()]);
        input.headers.push(SoapHeader {
            message,
            part: "auth".to_string(),
            use_: Use::Literal,
            namespace: Some("urn:ns".to_string()),
            header_faults: Vec::new(),
        });
        assert!(check(&definition, "R2205").has_violation("R2205"));
        assert!(check(&definition, "R2716").has_violation("R2716"));
        assert!(check(&definition, "R2720").is_valid());

        definition.bindings[0].soap.as_mut().unwrap().style = Some(Style::Rpc);
        assert!(check(&definition, "R2726").has_violation("R2726"));
    }

    #[test]
    fn test_absolute_uri() {
        assert!(is_absolute_uri("http://example.org/ns"));
        assert!(is_absolute_uri("urn:quotes"));
        assert!(!is_absolute_uri("quotes"));
        assert!(!is_absolute_uri("1x:y"));
        assert!(!is_absolute_uri("urn:"));
    }
}
