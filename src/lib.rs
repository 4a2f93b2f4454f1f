//! SOAP binding pipeline for Zentinel
//!
//! Translates between wire-level SOAP messages and a canonical,
//! transport-independent message form, driven by a WSDL 1.1 binding.
//!
//! # Features
//!
//! - WSDL 1.1 reading and binding model resolution (document and RPC literal)
//! - Ordered interceptor chains (phases plus before/after constraints)
//! - Canonical wrapping of body and header parts, in both directions
//! - MustUnderstand header checks and SOAPAction dispatch
//! - SOAP 1.1 and 1.2 fault decoding and encoding
//! - WS-I Basic Profile validation of WSDL bindings
//!
//! # Example
//!
//! ```ignore
//! use zentinel_soap_binding::{read_definition, Message, SoapBindingConfig, SoapEndpoint, XmlStream};
//!
//! let definition = read_definition(&std::fs::read("stock.wsdl")?)?;
//! let endpoint = SoapEndpoint::new(SoapBindingConfig::default(), &definition)?;
//!
//! let mut request = Message::with_stream(XmlStream::from_bytes(body));
//! request.set_transport_header("SOAPAction", "\"urn:GetPrice\"");
//! endpoint.process_inbound(&mut request)?;
//! ```

pub mod binding;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod fault;
pub mod interceptor;
pub mod message;
pub mod must_understand;
pub mod parser;
pub mod qname;
pub mod soap_action;
pub mod wrapper;
pub mod wsdl;
pub mod wsi;

pub use binding::{BindingModel, BoundOperation, Operation};
pub use config::{EndpointRole, SoapBindingConfig, SoapVersion};
pub use endpoint::SoapEndpoint;
pub use error::{Result, SoapError};
pub use fault::Fault;
pub use interceptor::{Chain, ChainBuilder, Interceptor, Phase, UnderstoodHeaders};
pub use message::{Content, Message, XmlStream};
pub use qname::QName;
pub use wsdl::{read_definition, Definition};
pub use wsi::{validate, ValidationReport};
