//! MustUnderstand header checks.

use crate::binding::BoundOperation;
use crate::config::{EndpointRole, MustUnderstandConfig, SoapVersion};
use crate::error::Result;
use crate::fault::Fault;
use crate::interceptor::{ChainCapabilities, Interceptor, Phase};
use crate::message::Message;
use crate::parser::{
    attribute, SOAP_11_ACTOR_NEXT, SOAP_12_ROLE_NEXT, SOAP_12_ROLE_ULTIMATE_RECEIVER,
};
use crate::qname::QName;
use tracing::{debug, warn};
use xmltree::Element;

/// Rejects mandatory headers nobody in the chain processes.
#[derive(Debug)]
pub struct MustUnderstandInterceptor {
    role: EndpointRole,
    roles: Vec<String>,
    understood: Vec<QName>,
}

impl MustUnderstandInterceptor {
    pub const NAME: &'static str = "MustUnderstandInterceptor";

    pub fn new(role: EndpointRole) -> Self {
        Self {
            role,
            roles: Vec::new(),
            understood: Vec::new(),
        }
    }

    pub fn from_config(role: EndpointRole, config: &MustUnderstandConfig) -> Self {
        Self {
            role,
            roles: config.roles.clone(),
            understood: config.understood_headers.clone(),
        }
    }

    /// Additional role the service acts in.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Whether a header addressed to `role` targets this node.
    fn targets_us(&self, role: Option<&str>) -> bool {
        match role {
            None | Some("") => true,
            Some(SOAP_11_ACTOR_NEXT | SOAP_12_ROLE_NEXT | SOAP_12_ROLE_ULTIMATE_RECEIVER) => true,
            Some(other) => self.roles.iter().any(|r| r == other),
        }
    }
}

fn must_understand(header: &Element) -> bool {
    matches!(
        attribute(header, "mustUnderstand").map(str::trim),
        Some("1" | "true")
    )
}

fn header_role<'a>(header: &'a Element, version: Option<SoapVersion>) -> Option<&'a str> {
    match version {
        Some(SoapVersion::Soap11) => attribute(header, "actor"),
        Some(SoapVersion::Soap12) => attribute(header, "role"),
        None => attribute(header, "role").or_else(|| attribute(header, "actor")),
    }
}

impl Interceptor for MustUnderstandInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn phase(&self) -> Phase {
        Phase::PROTOCOL
    }

    fn handle(&self, message: &mut Message) -> Result<()> {
        let version = message.get::<SoapVersion>().copied();
        let declared: &[QName] = BoundOperation::of(message)
            .and_then(|op| op.inbound_message(self.role))
            .map(|info| info.declared_headers())
            .unwrap_or_default();
        let capabilities = message.get::<ChainCapabilities>();

        // Every entry of a repeated header is checked on its own.
        let mut not_understood: Vec<&QName> = message
            .soap_headers()
            .iter()
            .flat_map(|(name, entries)| entries.iter().map(move |header| (name, header)))
            .filter(|(_, header)| must_understand(header))
            .filter_map(|(name, header)| {
                let role = header_role(header, version);
                if !self.targets_us(role) {
                    return None;
                }
                let understood = declared.contains(name)
                    || self.understood.contains(name)
                    || capabilities.map_or(false, |c| c.understands(name, role));
                (!understood).then_some(name)
            })
            .collect();
        not_understood.dedup();

        if not_understood.is_empty() {
            debug!("All mandatory headers understood");
            return Ok(());
        }

        let names: Vec<String> = not_understood.iter().map(|n| n.to_string()).collect();
        warn!(headers = ?names, "Mandatory headers not understood");
        Err(Fault::must_understand(format!(
            "Can not understand headers: {}",
            names.join(", ")
        ))
        .into())
    }
}
