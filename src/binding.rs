//! Resolved binding model.
//!
//! Built once per endpoint from a WSDL [`Definition`] and shared read-only
//! (`Arc`) by every exchange afterward.

use crate::config::{EndpointConfig, EndpointRole, SoapVersion};
use crate::error::{Result, SoapError};
use crate::message::Message;
use crate::qname::QName;
use crate::wsdl::{self, Definition, Style, Use};
use std::sync::Arc;
use tracing::debug;

/// Message exchange patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mep {
    InOnly,
    RobustInOnly,
    InOut,
}

impl Mep {
    /// WSDL 2.0 pattern URI.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::InOnly => "http://www.w3.org/2004/08/wsdl/in-only",
            Self::RobustInOnly => "http://www.w3.org/2004/08/wsdl/robust-in-only",
            Self::InOut => "http://www.w3.org/2004/08/wsdl/in-out",
        }
    }
}

/// Where a part travels in the SOAP envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Body,
    Header,
}

/// A message part.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    name: String,
    placement: Placement,
    element: Option<QName>,
    type_name: Option<QName>,
}

impl Part {
    pub fn body(name: impl Into<String>, element: Option<QName>) -> Self {
        Self {
            name: name.into(),
            placement: Placement::Body,
            element,
            type_name: None,
        }
    }

    pub fn header(name: impl Into<String>, element: QName) -> Self {
        Self {
            name: name.into(),
            placement: Placement::Header,
            element: Some(element),
            type_name: None,
        }
    }

    pub fn with_type(mut self, type_name: QName) -> Self {
        self.type_name = Some(type_name);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn is_body(&self) -> bool {
        self.placement == Placement::Body
    }

    pub fn is_header(&self) -> bool {
        self.placement == Placement::Header
    }

    pub fn element(&self) -> Option<&QName> {
        self.element.as_ref()
    }

    pub fn type_name(&self) -> Option<&QName> {
        self.type_name.as_ref()
    }
}

/// An input or output message of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageInfo {
    name: Option<String>,
    message_type: QName,
    parts: Vec<Part>,
    body_namespace: Option<String>,
    declared_headers: Vec<QName>,
}

impl MessageInfo {
    pub fn new(message_type: QName, parts: Vec<Part>) -> Self {
        let declared_headers = parts
            .iter()
            .filter(|p| p.is_header())
            .filter_map(|p| p.element.clone())
            .collect();
        Self {
            name: None,
            message_type,
            parts,
            body_namespace: None,
            declared_headers,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Namespace of the RPC wrapper element.
    pub fn with_body_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.body_namespace = Some(namespace.into());
        self
    }

    /// Declare a header bound from another message.
    pub fn with_declared_header(mut self, header: QName) -> Self {
        if !self.declared_headers.contains(&header) {
            self.declared_headers.push(header);
        }
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn message_type(&self) -> &QName {
        &self.message_type
    }

    /// All parts in declaration order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn body_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_body())
    }

    pub fn header_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_header())
    }

    pub fn body_namespace(&self) -> Option<&str> {
        self.body_namespace.as_deref()
    }

    /// Every header element the WSDL binds for this message.
    pub fn declared_headers(&self) -> &[QName] {
        &self.declared_headers
    }
}

/// A declared operation fault.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultInfo {
    pub name: String,
    pub message_type: QName,
    pub element: Option<QName>,
}

/// A bound operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    name: QName,
    style: Style,
    soap_action: Option<String>,
    mep: Mep,
    input: Option<MessageInfo>,
    output: Option<MessageInfo>,
    faults: Vec<FaultInfo>,
}

impl Operation {
    pub fn new(name: QName, style: Style) -> Self {
        Self {
            name,
            style,
            soap_action: None,
            mep: Mep::InOnly,
            input: None,
            output: None,
            faults: Vec::new(),
        }
    }

    pub fn with_soap_action(mut self, action: impl Into<String>) -> Self {
        self.soap_action = Some(action.into());
        self
    }

    pub fn with_input(mut self, input: MessageInfo) -> Self {
        self.input = Some(input);
        self.mep = self.derive_mep();
        self
    }

    pub fn with_output(mut self, output: MessageInfo) -> Self {
        self.output = Some(output);
        self.mep = self.derive_mep();
        self
    }

    pub fn with_fault(mut self, fault: FaultInfo) -> Self {
        self.faults.push(fault);
        self.mep = self.derive_mep();
        self
    }

    fn derive_mep(&self) -> Mep {
        match (&self.output, self.faults.is_empty()) {
            (Some(_), _) => Mep::InOut,
            (None, false) => Mep::RobustInOnly,
            (None, true) => Mep::InOnly,
        }
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn soap_action(&self) -> Option<&str> {
        self.soap_action.as_deref()
    }

    pub fn mep(&self) -> Mep {
        self.mep
    }

    pub fn input(&self) -> Option<&MessageInfo> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&MessageInfo> {
        self.output.as_ref()
    }

    pub fn faults(&self) -> &[FaultInfo] {
        &self.faults
    }

    /// The message received by an endpoint in the given role.
    pub fn inbound_message(&self, role: EndpointRole) -> Option<&MessageInfo> {
        match role {
            EndpointRole::Provider => self.input(),
            EndpointRole::Consumer => self.output(),
        }
    }

    /// The message sent by an endpoint in the given role.
    pub fn outbound_message(&self, role: EndpointRole) -> Option<&MessageInfo> {
        match role {
            EndpointRole::Provider => self.output(),
            EndpointRole::Consumer => self.input(),
        }
    }
}

/// The operation an exchange has been dispatched to.
#[derive(Debug, Clone)]
pub struct BoundOperation(pub Arc<Operation>);

impl BoundOperation {
    /// The operation bound to a message, if any.
    pub fn of(message: &Message) -> Option<&Arc<Operation>> {
        message.get::<BoundOperation>().map(|bound| &bound.0)
    }
}

/// The resolved model of one SOAP binding.
#[derive(Debug, Clone)]
pub struct BindingModel {
    name: QName,
    version: SoapVersion,
    style: Style,
    transport: Option<String>,
    operations: Vec<Arc<Operation>>,
}

impl BindingModel {
    /// Assemble a model from already resolved operations.
    pub fn new(name: QName, version: SoapVersion, operations: Vec<Operation>) -> Self {
        Self {
            name,
            version,
            style: Style::Document,
            transport: None,
            operations: operations.into_iter().map(Arc::new).collect(),
        }
    }

    /// Resolve the binding selected by an endpoint configuration.
    pub fn from_definition(definition: &Definition, endpoint: &EndpointConfig) -> Result<Self> {
        let binding_name = select_binding(definition, endpoint)?;
        Self::from_binding(definition, &binding_name)
    }

    /// Resolve a named binding.
    pub fn from_binding(definition: &Definition, name: &QName) -> Result<Self> {
        let binding = definition
            .binding(name)
            .ok_or_else(|| SoapError::Deployment(format!("binding {} not found", name)))?;
        let soap = binding.soap.as_ref().ok_or_else(|| {
            SoapError::Deployment(format!("binding {} is not a SOAP binding", name))
        })?;
        let port_type = definition.port_type(&binding.port_type).ok_or_else(|| {
            SoapError::Deployment(format!(
                "port type {} of binding {} not found",
                binding.port_type, name
            ))
        })?;

        let binding_style = soap.style.unwrap_or_default();
        let mut operations = Vec::with_capacity(binding.operations.len());
        for bop in &binding.operations {
            let pop = port_type.operation(&bop.name).ok_or_else(|| {
                SoapError::Deployment(format!(
                    "operation '{}' of binding {} is not declared by port type {}",
                    bop.name, name, port_type.name
                ))
            })?;
            let operation = resolve_operation(
                definition,
                QName::new(port_type.name.namespace(), pop.name.clone()),
                bop.style.unwrap_or(binding_style),
                bop,
                pop,
            )?;
            debug!(
                binding = %name,
                operation = %operation.name(),
                style = ?operation.style(),
                mep = ?operation.mep(),
                "Resolved operation"
            );
            operations.push(Arc::new(operation));
        }

        Ok(Self {
            name: name.clone(),
            version: soap.version,
            style: binding_style,
            transport: soap.transport.clone(),
            operations,
        })
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn version(&self) -> SoapVersion {
        self.version
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn transport(&self) -> Option<&str> {
        self.transport.as_deref()
    }

    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    pub fn operation(&self, name: &QName) -> Option<&Arc<Operation>> {
        self.operations.iter().find(|op| op.name() == name)
    }

    /// The single operation whose inbound body would have `payload` as root.
    ///
    /// Document operations match on their body part element, RPC operations
    /// on their wrapper name. Ambiguous payloads resolve to nothing.
    pub fn operation_for_payload(
        &self,
        payload: &QName,
        role: EndpointRole,
    ) -> Option<&Arc<Operation>> {
        let mut matches = self.operations.iter().filter(|op| {
            let Some(info) = op.inbound_message(role) else {
                return false;
            };
            match op.style() {
                Style::Document => info.body_parts().any(|p| p.element() == Some(payload)),
                Style::Rpc => {
                    let local = rpc_wrapper_name(op, role, Direction::Inbound);
                    payload.local_part() == local
                        && info.body_namespace().map_or(true, |ns| ns == payload.namespace())
                }
            }
        });
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }

    /// Operations whose literal SOAPAction equals `action`.
    pub fn operations_for_action<'a>(
        &'a self,
        action: &'a str,
    ) -> impl Iterator<Item = &'a Arc<Operation>> + 'a {
        self.operations
            .iter()
            .filter(move |op| op.soap_action() == Some(action))
    }
}

/// Direction of a message relative to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Local name of the RPC wrapper element.
///
/// Requests are named after the operation, responses after the operation
/// with a `Response` suffix.
pub fn rpc_wrapper_name(operation: &Operation, role: EndpointRole, direction: Direction) -> String {
    let is_response = matches!(
        (role, direction),
        (EndpointRole::Provider, Direction::Outbound) | (EndpointRole::Consumer, Direction::Inbound)
    );
    let local = operation.name().local_part();
    if is_response {
        format!("{}Response", local)
    } else {
        local.to_string()
    }
}

fn select_binding(definition: &Definition, endpoint: &EndpointConfig) -> Result<QName> {
    if let Some(ref binding) = endpoint.binding {
        return definition
            .bindings
            .iter()
            .find(|b| name_matches(&b.name, binding))
            .map(|b| b.name.clone())
            .ok_or_else(|| SoapError::Config(format!("binding '{}' not found", binding)));
    }

    if let Some(ref port_name) = endpoint.port {
        let port = definition
            .services
            .iter()
            .filter(|s| {
                endpoint
                    .service
                    .as_deref()
                    .map_or(true, |wanted| name_matches(&s.name, wanted))
            })
            .flat_map(|s| s.ports.iter())
            .find(|p| &p.name == port_name)
            .ok_or_else(|| SoapError::Config(format!("port '{}' not found", port_name)))?;
        return Ok(port.binding.clone());
    }

    match definition.bindings.as_slice() {
        [only] => Ok(only.name.clone()),
        [] => Err(SoapError::Config("definition declares no binding".to_string())),
        _ => Err(SoapError::Config(
            "definition declares several bindings; select one with endpoint.binding or endpoint.port"
                .to_string(),
        )),
    }
}

/// Match a name against `{ns}local` or a bare local name.
fn name_matches(name: &QName, wanted: &str) -> bool {
    if wanted.starts_with('{') {
        wanted.parse::<QName>().map_or(false, |q| &q == name)
    } else {
        name.local_part() == wanted
    }
}

fn resolve_operation(
    definition: &Definition,
    name: QName,
    style: Style,
    bop: &wsdl::BindingOperation,
    pop: &wsdl::PortTypeOperation,
) -> Result<Operation> {
    let mut operation = Operation::new(name, style);
    if let Some(action) = bop.soap_action.as_deref().filter(|a| !a.is_empty()) {
        operation = operation.with_soap_action(action);
    }

    let default_names = default_message_names(pop);
    if let Some(ref input) = pop.input {
        let info = resolve_message(
            definition,
            &operation,
            input,
            bop.input.as_ref(),
            &pop.parameter_order,
            default_names.0,
        )?;
        operation = operation.with_input(info);
    }
    if let Some(ref output) = pop.output {
        let info = resolve_message(
            definition,
            &operation,
            output,
            bop.output.as_ref(),
            &pop.parameter_order,
            default_names.1,
        )?;
        operation = operation.with_output(info);
    }

    for fault in &pop.faults {
        let binding_fault = bop.faults.iter().find(|f| f.name == fault.name);
        if let Some(soap_fault) = binding_fault.and_then(|f| f.soap_fault.as_ref()) {
            require_literal(soap_fault.use_, operation.name(), "soap:fault")?;
        }
        let message = definition.message(&fault.message).ok_or_else(|| {
            SoapError::Deployment(format!("fault message {} not found", fault.message))
        })?;
        operation = operation.with_fault(FaultInfo {
            name: fault.name.clone(),
            message_type: message.name.clone(),
            element: message.parts.first().and_then(|p| p.element.clone()),
        });
    }

    Ok(operation)
}

/// WSDL 1.1 section 2.4.5 default input/output names.
fn default_message_names(pop: &wsdl::PortTypeOperation) -> (String, String) {
    if pop.output.is_some() {
        (format!("{}Request", pop.name), format!("{}Response", pop.name))
    } else {
        (pop.name.clone(), format!("{}Response", pop.name))
    }
}

fn resolve_message(
    definition: &Definition,
    operation: &Operation,
    io: &wsdl::OperationIo,
    binding_io: Option<&wsdl::BindingIo>,
    parameter_order: &[String],
    default_name: String,
) -> Result<MessageInfo> {
    let message = definition.message(&io.message).ok_or_else(|| {
        SoapError::Deployment(format!(
            "message {} of operation {} not found",
            io.message,
            operation.name()
        ))
    })?;

    let mut header_parts: Vec<&str> = Vec::new();
    let mut foreign_headers = Vec::new();
    let mut body_namespace = None;
    let mut listed_body_parts: Option<&[String]> = None;

    if let Some(bio) = binding_io {
        if let Some(ref body) = bio.body {
            require_literal(body.use_, operation.name(), "soap:body")?;
            body_namespace = body.namespace.clone();
            listed_body_parts = body.parts.as_deref();
        }
        for header in &bio.headers {
            require_literal(header.use_, operation.name(), "soap:header")?;
            for header_fault in &header.header_faults {
                require_literal(header_fault.use_, operation.name(), "soap:headerfault")?;
            }
            if header.message == message.name {
                header_parts.push(header.part.as_str());
            } else {
                let element = definition
                    .message(&header.message)
                    .and_then(|m| m.part(&header.part))
                    .and_then(|p| p.element.clone())
                    .ok_or_else(|| {
                        SoapError::Deployment(format!(
                            "header part {}#{} of operation {} must reference an element",
                            header.message,
                            header.part,
                            operation.name()
                        ))
                    })?;
                foreign_headers.push(element);
            }
        }
    }

    let mut parts = Vec::with_capacity(message.parts.len());
    for part in &message.parts {
        if header_parts.contains(&part.name.as_str()) {
            let element = part.element.clone().ok_or_else(|| {
                SoapError::Deployment(format!(
                    "header part '{}' of message {} must reference an element",
                    part.name, message.name
                ))
            })?;
            parts.push(Part::header(part.name.clone(), element));
        } else if listed_body_parts.map_or(true, |listed| listed.contains(&part.name)) {
            let mut body = Part::body(part.name.clone(), part.element.clone());
            if let Some(ref type_name) = part.type_name {
                body = body.with_type(type_name.clone());
            }
            parts.push(body);
        }
    }

    for declared in &header_parts {
        if message.part(declared).is_none() {
            return Err(SoapError::Deployment(format!(
                "soap:header references unknown part '{}' of message {}",
                declared, message.name
            )));
        }
    }

    if operation.style() == Style::Rpc && !parameter_order.is_empty() {
        apply_parameter_order(&mut parts, parameter_order);
    }

    if operation.style() == Style::Document && parts.iter().filter(|p| p.is_body()).count() > 1 {
        return Err(SoapError::Deployment(format!(
            "document style message {} of operation {} binds more than one body part",
            message.name,
            operation.name()
        )));
    }

    let name = io
        .name
        .clone()
        .or_else(|| binding_io.and_then(|b| b.name.clone()))
        .unwrap_or(default_name);
    let mut info = MessageInfo::new(message.name.clone(), parts).with_name(name);
    if let Some(namespace) = body_namespace {
        info = info.with_body_namespace(namespace);
    } else if operation.style() == Style::Rpc {
        info = info.with_body_namespace(definition.target_namespace.clone());
    }
    for header in foreign_headers {
        info = info.with_declared_header(header);
    }
    Ok(info)
}

/// Reorder the body parts by `parameterOrder`, leaving header parts in place.
///
/// Parts not named in the order keep their relative position after the
/// named ones.
fn apply_parameter_order(parts: &mut [Part], order: &[String]) {
    let slots: Vec<usize> = (0..parts.len()).filter(|&i| parts[i].is_body()).collect();
    let mut body: Vec<Part> = slots.iter().map(|&i| parts[i].clone()).collect();
    body.sort_by_key(|part| {
        order
            .iter()
            .position(|name| name == part.name())
            .unwrap_or(usize::MAX)
    });
    for (slot, part) in slots.into_iter().zip(body) {
        parts[slot] = part;
    }
}

fn require_literal(use_: Use, operation: &QName, what: &str) -> Result<()> {
    match use_ {
        Use::Literal => Ok(()),
        Use::Encoded => Err(SoapError::Deployment(format!(
            "{} of operation {} uses encoded use; only literal is supported",
            what, operation
        ))),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::wsdl::read_definition;

    pub(crate) const TNS: &str = "http://example.org/stock";
    pub(crate) const TYPES: &str = "http://example.org/stock/types";

    pub(crate) fn stock_wsdl(style: &str, body_use: &str) -> String {
        format!(
            r#"<wsdl:definitions targetNamespace="{TNS}"
    xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:tns="{TNS}" xmlns:t="{TYPES}" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <wsdl:message name="GetPriceRequest">
    <wsdl:part name="body" element="t:GetPrice"/>
    <wsdl:part name="auth" element="t:Auth"/>
  </wsdl:message>
  <wsdl:message name="GetPriceResponse">
    <wsdl:part name="body" element="t:GetPriceResponse"/>
  </wsdl:message>
  <wsdl:message name="QuoteRequest">
    <wsdl:part name="symbol" type="xsd:string"/>
    <wsdl:part name="currency" type="xsd:string"/>
  </wsdl:message>
  <wsdl:message name="QuoteResponse">
    <wsdl:part name="price" type="xsd:decimal"/>
  </wsdl:message>
  <wsdl:portType name="StockPortType">
    <wsdl:operation name="GetPrice">
      <wsdl:input message="tns:GetPriceRequest"/>
      <wsdl:output message="tns:GetPriceResponse"/>
    </wsdl:operation>
    <wsdl:operation name="Quote">
      <wsdl:input message="tns:QuoteRequest"/>
      <wsdl:output message="tns:QuoteResponse"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="StockBinding" type="tns:StockPortType">
    <soap:binding style="{style}" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="GetPrice">
      <soap:operation soapAction="urn:GetPrice" style="document"/>
      <wsdl:input>
        <soap:body parts="body" use="{body_use}"/>
        <soap:header message="tns:GetPriceRequest" part="auth" use="literal"/>
      </wsdl:input>
      <wsdl:output><soap:body use="literal"/></wsdl:output>
    </wsdl:operation>
    <wsdl:operation name="Quote">
      <soap:operation soapAction="urn:Quote" style="rpc"/>
      <wsdl:input><soap:body use="literal" namespace="urn:quotes"/></wsdl:input>
      <wsdl:output><soap:body use="literal" namespace="urn:quotes"/></wsdl:output>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="StockService">
    <wsdl:port name="StockPort" binding="tns:StockBinding">
      <soap:address location="http://localhost/stock"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#
        )
    }

    pub(crate) fn stock_model(style: &str) -> BindingModel {
        let definition = read_definition(stock_wsdl(style, "literal").as_bytes()).unwrap();
        BindingModel::from_definition(&definition, &EndpointConfig::default()).unwrap()
    }

    #[test]
    fn test_style_resolution() {
        let model = stock_model("rpc");
        let get_price = model.operation(&QName::new(TNS, "GetPrice")).unwrap();
        let quote = model.operation(&QName::new(TNS, "Quote")).unwrap();
        // Operation overrides win over the binding style.
        assert_eq!(get_price.style(), Style::Document);
        assert_eq!(quote.style(), Style::Rpc);

        let model = stock_model("document");
        assert_eq!(model.style(), Style::Document);
    }

    #[test]
    fn test_style_defaults_to_document() {
        let mut definition = read_definition(stock_wsdl("document", "literal").as_bytes()).unwrap();
        definition.bindings[0].soap.as_mut().unwrap().style = None;
        definition.bindings[0].operations[1].style = None;
        // Quote now has two type parts under document style: rejected.
        let err = BindingModel::from_binding(&definition, &QName::new(TNS, "StockBinding"))
            .unwrap_err();
        assert!(matches!(err, SoapError::Deployment(ref msg) if msg.contains("more than one body part")));
    }

    #[test]
    fn test_part_partitioning() {
        let model = stock_model("rpc");
        let op = model.operation(&QName::new(TNS, "GetPrice")).unwrap();
        let input = op.input().unwrap();
        assert_eq!(input.parts().len(), 2);
        let body: Vec<&str> = input.body_parts().map(Part::name).collect();
        let headers: Vec<&str> = input.header_parts().map(Part::name).collect();
        assert_eq!(body, vec!["body"]);
        assert_eq!(headers, vec!["auth"]);
        assert_eq!(input.declared_headers(), &[QName::new(TYPES, "Auth")]);
        assert_eq!(input.name(), Some("GetPriceRequest"));
        assert_eq!(op.mep(), Mep::InOut);
        assert_eq!(op.soap_action(), Some("urn:GetPrice"));
    }

    #[test]
    fn test_rpc_body_namespace() {
        let model = stock_model("rpc");
        let quote = model.operation(&QName::new(TNS, "Quote")).unwrap();
        assert_eq!(quote.input().unwrap().body_namespace(), Some("urn:quotes"));
        assert_eq!(quote.input().unwrap().body_parts().count(), 2);
    }

    #[test]
    fn test_encoded_use_is_deployment_error() {
        let definition = read_definition(stock_wsdl("rpc", "encoded").as_bytes()).unwrap();
        let err = BindingModel::from_definition(&definition, &EndpointConfig::default()).unwrap_err();
        assert!(matches!(err, SoapError::Deployment(ref msg) if msg.contains("literal")));
    }

    #[test]
    fn test_select_by_port_and_binding() {
        let definition = read_definition(stock_wsdl("rpc", "literal").as_bytes()).unwrap();
        let by_port = EndpointConfig {
            service: Some("StockService".to_string()),
            port: Some("StockPort".to_string()),
            ..Default::default()
        };
        let model = BindingModel::from_definition(&definition, &by_port).unwrap();
        assert_eq!(model.name(), &QName::new(TNS, "StockBinding"));
        assert_eq!(model.version(), SoapVersion::Soap11);

        let by_binding = EndpointConfig {
            binding: Some(format!("{{{}}}StockBinding", TNS)),
            ..Default::default()
        };
        assert!(BindingModel::from_definition(&definition, &by_binding).is_ok());

        let missing = EndpointConfig {
            port: Some("Nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            BindingModel::from_definition(&definition, &missing),
            Err(SoapError::Config(_))
        ));
    }

    #[test]
    fn test_operations_for_action() {
        let model = stock_model("rpc");
        let found: Vec<_> = model.operations_for_action("urn:Quote").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name().local_part(), "Quote");
        assert_eq!(model.operations_for_action("urn:Nope").count(), 0);
    }

    #[test]
    fn test_operation_for_payload() {
        let model = stock_model("rpc");
        let doc = model
            .operation_for_payload(&QName::new(TYPES, "GetPrice"), EndpointRole::Provider)
            .unwrap();
        assert_eq!(doc.name().local_part(), "GetPrice");

        let rpc = model
            .operation_for_payload(&QName::new("urn:quotes", "Quote"), EndpointRole::Provider)
            .unwrap();
        assert_eq!(rpc.name().local_part(), "Quote");
        assert!(model
            .operation_for_payload(&QName::new("urn:quotes", "QuoteResponse"), EndpointRole::Consumer)
            .is_some());
        assert!(model
            .operation_for_payload(&QName::new("urn:other", "Quote"), EndpointRole::Provider)
            .is_none());
    }

    #[test]
    fn test_rpc_parameter_order() {
        let mut definition = read_definition(stock_wsdl("rpc", "literal").as_bytes()).unwrap();
        definition.port_types[0].operations[1].parameter_order =
            vec!["currency".to_string(), "symbol".to_string()];
        let model = BindingModel::from_definition(&definition, &EndpointConfig::default()).unwrap();
        let quote = model.operation(&QName::new(TNS, "Quote")).unwrap();
        let names: Vec<&str> = quote.input().unwrap().parts().iter().map(Part::name).collect();
        assert_eq!(names, vec!["currency", "symbol"]);
        // Parts missing from the order stay behind the named ones.
        let names: Vec<&str> = quote.output().unwrap().parts().iter().map(Part::name).collect();
        assert_eq!(names, vec!["price"]);
    }

    #[test]
    fn test_rpc_wrapper_name() {
        let op = Operation::new(QName::new(TNS, "Quote"), Style::Rpc);
        assert_eq!(rpc_wrapper_name(&op, EndpointRole::Provider, Direction::Inbound), "Quote");
        assert_eq!(
            rpc_wrapper_name(&op, EndpointRole::Provider, Direction::Outbound),
            "QuoteResponse"
        );
        assert_eq!(rpc_wrapper_name(&op, EndpointRole::Consumer, Direction::Outbound), "Quote");
    }

    #[test]
    fn test_mep_derivation() {
        let op = Operation::new(QName::local("Notify"), Style::Document)
            .with_input(MessageInfo::new(QName::local("N"), vec![]));
        assert_eq!(op.mep(), Mep::InOnly);
        let op = op.with_fault(FaultInfo {
            name: "F".to_string(),
            message_type: QName::local("F"),
            element: None,
        });
        assert_eq!(op.mep(), Mep::RobustInOnly);
        assert_eq!(op.mep().uri(), "http://www.w3.org/2004/08/wsdl/robust-in-only");
    }
}
