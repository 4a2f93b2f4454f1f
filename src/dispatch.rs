//! Operation dispatch on the body root element.
//!
//! Runs in the protocol phase, after SOAPAction dispatch, so later protocol
//! checks see the bound operation even when the peer sent no action.

use crate::binding::{BindingModel, BoundOperation, Operation};
use crate::config::EndpointRole;
use crate::error::Result;
use crate::interceptor::{Interceptor, Phase};
use crate::message::Message;
use crate::qname::QName;
use std::sync::Arc;
use tracing::debug;

/// Bind the operation whose inbound body has the payload's root element.
///
/// Leaves an already bound operation alone. Returns the bound operation, or
/// `None` when the payload is missing or matches no single operation.
pub fn bind_from_payload(
    model: &BindingModel,
    role: EndpointRole,
    message: &mut Message,
) -> Result<Option<Arc<Operation>>> {
    if let Some(op) = BoundOperation::of(message) {
        return Ok(Some(Arc::clone(op)));
    }
    let Some(payload) = message.content_tree()?.map(QName::of) else {
        return Ok(None);
    };
    match model.operation_for_payload(&payload, role) {
        Some(op) => {
            debug!(operation = %op.name(), payload = %payload, "Dispatched on body element");
            let op = Arc::clone(op);
            message.put(BoundOperation(Arc::clone(&op)));
            Ok(Some(op))
        }
        None => {
            debug!(payload = %payload, "No single operation for body element");
            Ok(None)
        }
    }
}

/// Binds the operation from the body root when nothing else has.
pub struct PayloadDispatchInterceptor {
    model: Arc<BindingModel>,
    role: EndpointRole,
}

impl PayloadDispatchInterceptor {
    pub const NAME: &'static str = "PayloadDispatchInterceptor";

    pub fn new(model: Arc<BindingModel>, role: EndpointRole) -> Self {
        Self { model, role }
    }
}

impl Interceptor for PayloadDispatchInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn phase(&self) -> Phase {
        Phase::PROTOCOL
    }

    fn handle(&self, message: &mut Message) -> Result<()> {
        if message.fault().is_some() {
            return Ok(());
        }
        bind_from_payload(&self.model, self.role, message)?;
        Ok(())
    }
}
