//! Error types for the SOAP binding pipeline.

use crate::fault::Fault;
use thiserror::Error;

/// SOAP binding errors.
///
/// [`SoapError::Fault`] carries a SOAP fault that the transport is expected to
/// send back to the peer. Every other variant is a processing or configuration
/// error that is not reported as a SOAP fault.
#[derive(Error, Debug)]
pub enum SoapError {
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("XML write error: {0}")]
    XmlWrite(String),

    #[error("Message content has already been consumed")]
    ContentConsumed,

    #[error("Message has no content")]
    MissingContent,

    #[error("Invalid WSDL: {0}")]
    InvalidWsdl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Deployment error: {0}")]
    Deployment(String),

    #[error("SOAP fault: {0}")]
    Fault(Box<Fault>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SoapError {
    /// The SOAP fault carried by this error, if any.
    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            Self::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Whether this error should be reported to the peer as a SOAP fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

impl From<Fault> for SoapError {
    fn from(fault: Fault) -> Self {
        Self::Fault(Box::new(fault))
    }
}

impl From<xmltree::ParseError> for SoapError {
    fn from(err: xmltree::ParseError) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<xmltree::Error> for SoapError {
    fn from(err: xmltree::Error) -> Self {
        Self::XmlWrite(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = SoapError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_conversion() {
        let err: SoapError = Fault::sender("missing part 'body'").into();
        assert!(err.is_fault());
        assert_eq!(err.as_fault().unwrap().reason(), "missing part 'body'");
    }

    #[test]
    fn test_processing_error_is_not_fault() {
        let err = SoapError::XmlParse("unexpected end of stream".to_string());
        assert!(!err.is_fault());
        assert!(err.as_fault().is_none());
        assert_eq!(err.to_string(), "XML parsing error: unexpected end of stream");
    }
}
