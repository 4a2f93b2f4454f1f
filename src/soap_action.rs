//! SOAPAction based dispatch.
//!
//! Inbound, the `SOAPAction` transport header (or the `action` parameter of
//! a SOAP 1.2 `Content-Type`) selects the bound operation. Outbound, the
//! bound operation's action is written back as a header.

use crate::binding::{BindingModel, BoundOperation};
use crate::config::SoapVersion;
use crate::envelope::CONTENT_TYPE;
use crate::error::Result;
use crate::interceptor::{Interceptor, Phase};
use crate::message::Message;
use crate::parser::{content_type_action, parse_soap_action};
use std::sync::Arc;
use tracing::debug;

pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// Binds the operation named by the inbound SOAPAction.
pub struct SoapActionInInterceptor {
    model: Arc<BindingModel>,
}

impl SoapActionInInterceptor {
    pub const NAME: &'static str = "SoapActionInInterceptor";

    pub fn new(model: Arc<BindingModel>) -> Self {
        Self { model }
    }
}

/// The action requested by the peer, if any.
fn requested_action(message: &Message) -> Option<String> {
    let from_header = message
        .transport_header(SOAP_ACTION_HEADER)
        .map(parse_soap_action)
        .filter(|a| !a.is_empty());
    if from_header.is_some() {
        return from_header;
    }
    if message.get::<SoapVersion>() == Some(&SoapVersion::Soap12) {
        return message
            .transport_header(CONTENT_TYPE)
            .and_then(content_type_action)
            .filter(|a| !a.is_empty());
    }
    None
}

impl Interceptor for SoapActionInInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn phase(&self) -> Phase {
        Phase::PROTOCOL
    }

    fn handle(&self, message: &mut Message) -> Result<()> {
        if message.contains::<BoundOperation>() {
            return Ok(());
        }
        let Some(action) = requested_action(message) else {
            return Ok(());
        };

        let mut candidates = self.model.operations_for_action(&action);
        match (candidates.next(), candidates.next()) {
            (Some(operation), None) => {
                debug!(action = %action, operation = %operation.name(), "Bound operation from SOAPAction");
                let operation = Arc::clone(operation);
                message.put(BoundOperation(operation));
            }
            (Some(_), Some(_)) => {
                debug!(action = %action, "SOAPAction matches several operations");
            }
            (None, _) => {
                debug!(action = %action, "SOAPAction matches no operation");
            }
        }
        Ok(())
    }
}

/// Writes the bound operation's SOAPAction.
#[derive(Debug, Default)]
pub struct SoapActionOutInterceptor;

impl SoapActionOutInterceptor {
    pub const NAME: &'static str = "SoapActionOutInterceptor";

    pub fn new() -> Self {
        Self
    }
}

impl Interceptor for SoapActionOutInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn phase(&self) -> Phase {
        Phase::PRE_WRITE
    }

    fn handle(&self, message: &mut Message) -> Result<()> {
        let action = BoundOperation::of(message)
            .and_then(|op| op.soap_action())
            .filter(|a| !a.is_empty())
            .map(|a| format!("\"{}\"", a));
        if let Some(action) = action {
            message.set_transport_header(SOAP_ACTION_HEADER, action);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::tests::{stock_model, TNS};
    use crate::binding::{MessageInfo, Operation};
    use crate::qname::QName;
    use crate::wsdl::Style;

    fn dispatcher() -> SoapActionInInterceptor {
        SoapActionInInterceptor::new(Arc::new(stock_model("rpc")))
    }

    fn bound_name(message: &Message) -> Option<String> {
        BoundOperation::of(message).map(|op| op.name().local_part().to_string())
    }

    #[test]
    fn test_quoted_header_binds_operation() {
        let mut message = Message::new();
        message.set_transport_header("soapaction", " \"urn:Quote\" ");
        dispatcher().handle(&mut message).unwrap();
        assert_eq!(bound_name(&message).as_deref(), Some("Quote"));
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let mut message = Message::new();
        message.set_transport_header(SOAP_ACTION_HEADER, "urn:Unknown");
        dispatcher().handle(&mut message).unwrap();
        assert!(bound_name(&message).is_none());

        let mut message = Message::new();
        dispatcher().handle(&mut message).unwrap();
        assert!(bound_name(&message).is_none());
    }

    #[test]
    fn test_ambiguous_action_is_left_unbound() {
        let input = || MessageInfo::new(QName::local("In"), vec![]);
        let model = BindingModel::new(
            QName::new(TNS, "B"),
            SoapVersion::Soap11,
            vec![
                Operation::new(QName::new(TNS, "A"), Style::Document)
                    .with_soap_action("urn:same")
                    .with_input(input()),
                Operation::new(QName::new(TNS, "B"), Style::Document)
                    .with_soap_action("urn:same")
                    .with_input(input()),
            ],
        );
        let mut message = Message::new();
        message.set_transport_header(SOAP_ACTION_HEADER, "urn:same");
        SoapActionInInterceptor::new(Arc::new(model))
            .handle(&mut message)
            .unwrap();
        assert!(bound_name(&message).is_none());
    }

    #[test]
    fn test_existing_binding_wins() {
        let model = stock_model("rpc");
        let op = model.operation(&QName::new(TNS, "GetPrice")).unwrap().clone();
        let mut message = Message::new();
        message.put(BoundOperation(op));
        message.set_transport_header(SOAP_ACTION_HEADER, "urn:Quote");
        dispatcher().handle(&mut message).unwrap();
        assert_eq!(bound_name(&message).as_deref(), Some("GetPrice"));
    }

    #[test]
    fn test_soap12_content_type_action() {
        let mut message = Message::new();
        message.put(SoapVersion::Soap12);
        message.set_transport_header(
            "Content-Type",
            "application/soap+xml; charset=utf-8; action=\"urn:GetPrice\"",
        );
        dispatcher().handle(&mut message).unwrap();
        assert_eq!(bound_name(&message).as_deref(), Some("GetPrice"));

        // Only consulted for SOAP 1.2.
        let mut message = Message::new();
        message.put(SoapVersion::Soap11);
        message.set_transport_header("Content-Type", "text/xml; action=urn:GetPrice");
        dispatcher().handle(&mut message).unwrap();
        assert!(bound_name(&message).is_none());
    }

    #[test]
    fn test_outbound_sets_quoted_header() {
        let model = stock_model("rpc");
        let op = model.operation(&QName::new(TNS, "Quote")).unwrap().clone();
        let mut message = Message::new();
        message.put(BoundOperation(op));
        SoapActionOutInterceptor::new().handle(&mut message).unwrap();
        assert_eq!(message.transport_header("SOAPAction"), Some("\"urn:Quote\""));

        let mut unbound = Message::new();
        SoapActionOutInterceptor::new().handle(&mut unbound).unwrap();
        assert!(unbound.transport_header("SOAPAction").is_none());
    }
}
