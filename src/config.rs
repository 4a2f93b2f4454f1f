//! Configuration types for a SOAP binding endpoint.

use crate::parser::{SOAP_11_NS, SOAP_12_NS};
use crate::qname::QName;
use serde::{Deserialize, Serialize};

/// Main configuration for a SOAP binding endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapBindingConfig {
    /// Config version
    pub version: String,

    /// Which WSDL port/binding the endpoint exposes
    pub endpoint: EndpointConfig,

    /// Canonical message wrapping
    pub wrapper: WrapperConfig,

    /// MustUnderstand header checks
    pub must_understand: MustUnderstandConfig,

    /// SOAPAction based dispatch
    pub soap_action: SoapActionConfig,
}

impl Default for SoapBindingConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            endpoint: EndpointConfig::default(),
            wrapper: WrapperConfig::default(),
            must_understand: MustUnderstandConfig::default(),
            soap_action: SoapActionConfig::default(),
        }
    }
}

/// Endpoint selection.
///
/// When `binding` is set it wins; otherwise the binding is taken from the
/// named service port. With nothing set the definition must contain exactly
/// one binding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Service name (`{ns}local` or local name)
    pub service: Option<String>,

    /// Port name within the service
    pub port: Option<String>,

    /// Binding name (`{ns}local` or local name)
    pub binding: Option<String>,

    /// Whether this endpoint provides or consumes the service
    pub role: EndpointRole,
}

/// Side of the exchange the endpoint sits on.
///
/// A provider receives requests (input messages) and sends responses
/// (output messages); a consumer does the opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EndpointRole {
    #[default]
    Provider,
    Consumer,
}

/// Canonical wrapper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    /// Wrap inbound payloads and unwrap outbound payloads
    pub enabled: bool,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// MustUnderstand configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MustUnderstandConfig {
    /// Enable MustUnderstand checks
    pub enabled: bool,

    /// Extra roles (URIs) this service acts in
    pub roles: Vec<String>,

    /// Headers the service processes outside of the WSDL contract
    pub understood_headers: Vec<QName>,
}

impl Default for MustUnderstandConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            roles: Vec::new(),
            understood_headers: Vec::new(),
        }
    }
}

/// SOAPAction dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapActionConfig {
    /// Enable inbound resolution and outbound annotation
    pub enabled: bool,
}

impl Default for SoapActionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// SOAP versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SoapVersion {
    /// SOAP 1.1 (namespace: http://schemas.xmlsoap.org/soap/envelope/)
    #[default]
    #[serde(rename = "1.1")]
    Soap11,
    /// SOAP 1.2 (namespace: http://www.w3.org/2003/05/soap-envelope)
    #[serde(rename = "1.2")]
    Soap12,
}

impl SoapVersion {
    /// Envelope namespace URI.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Soap11 => SOAP_11_NS,
            Self::Soap12 => SOAP_12_NS,
        }
    }

    /// Detect the version from an envelope namespace URI.
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            SOAP_11_NS => Some(Self::Soap11),
            SOAP_12_NS => Some(Self::Soap12),
            _ => None,
        }
    }

    /// Content type used on the wire.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Soap11 => "text/xml; charset=utf-8",
            Self::Soap12 => "application/soap+xml; charset=utf-8",
        }
    }
}
