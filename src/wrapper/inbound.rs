//! Wire body and headers to canonical wrapper.

use super::{bypass, new_part, new_wrapper};
use crate::binding::{BindingModel, Operation, Placement};
use crate::config::EndpointRole;
use crate::dispatch::bind_from_payload;
use crate::error::Result;
use crate::fault::Fault;
use crate::interceptor::{Interceptor, Phase};
use crate::message::{Content, Message};
use crate::parser::child_elements;
use crate::qname::QName;
use crate::wsdl::Style;
use std::sync::Arc;
use tracing::debug;
use xmltree::XMLNode;

/// Wraps an inbound payload into the canonical form.
pub struct JbiInInterceptor {
    model: Arc<BindingModel>,
    role: EndpointRole,
    enabled: bool,
}

impl JbiInInterceptor {
    pub const NAME: &'static str = "JbiInInterceptor";

    pub fn new(model: Arc<BindingModel>, role: EndpointRole) -> Self {
        Self {
            model,
            role,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The bound operation, falling back to dispatch on the body root.
    fn operation(&self, message: &mut Message) -> Result<Arc<Operation>> {
        if let Some(op) = bind_from_payload(&self.model, self.role, message)? {
            return Ok(op);
        }
        let fault = match message.content_tree()?.map(QName::of) {
            Some(name) => Fault::sender(format!("No operation found for payload {}", name)),
            None => Fault::sender("No operation bound to message"),
        };
        Err(fault.into())
    }
}

impl Interceptor for JbiInInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn phase(&self) -> Phase {
        Phase::UNMARSHAL
    }

    fn handle(&self, message: &mut Message) -> Result<()> {
        if bypass(self.enabled, message) {
            return Ok(());
        }

        let operation = self.operation(message)?;
        let info = operation.inbound_message(self.role).ok_or_else(|| {
            Fault::sender(format!(
                "Operation {} has no inbound message",
                operation.name()
            ))
        })?;

        // The message is left untouched until every part is found.
        let body = message.content_tree()?.cloned();
        let name = info
            .name()
            .unwrap_or_else(|| info.message_type().local_part());
        let mut root = new_wrapper(info.message_type(), name);
        let mut consumed_headers = Vec::new();

        for part in info.parts() {
            let mut jbi_part = new_part();
            match (part.placement(), operation.style()) {
                (Placement::Body, Style::Document) => {
                    let element = body.clone().ok_or_else(|| {
                        Fault::sender(format!("missing part '{}'", part.name()))
                    })?;
                    jbi_part.children.push(XMLNode::Element(element));
                }
                (Placement::Body, Style::Rpc) => {
                    let accessor = body
                        .as_ref()
                        .and_then(|wrapper| {
                            child_elements(wrapper).find(|e| e.name == part.name())
                        })
                        .ok_or_else(|| {
                            Fault::sender(format!("missing part '{}'", part.name()))
                        })?;
                    jbi_part.children.extend(accessor.children.iter().cloned());
                }
                (Placement::Header, _) => {
                    let element_name = part.element().cloned().unwrap_or_else(|| {
                        QName::local(part.name())
                    });
                    let entries = message.soap_header_entries(&element_name);
                    if entries.is_empty() {
                        return Err(Fault::sender(format!(
                            "missing required header {}",
                            element_name
                        ))
                        .into());
                    }
                    jbi_part
                        .children
                        .extend(entries.iter().cloned().map(XMLNode::Element));
                    consumed_headers.push(element_name);
                }
            }
            root.children.push(XMLNode::Element(jbi_part));
        }

        for header in &consumed_headers {
            message.remove_soap_header(header);
        }
        debug!(
            operation = %operation.name(),
            message_type = %info.message_type(),
            parts = info.parts().len(),
            "Wrapped inbound message"
        );
        message.set_content(Content::Tree(root));
        Ok(())
    }
}
