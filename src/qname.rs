//! Namespace-qualified XML names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use xmltree::Element;

/// A `{namespace}local` qualified name.
///
/// The empty namespace is represented by an empty string, so `{}` is never
/// printed for unqualified names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QName {
    namespace: String,
    local: String,
}

impl QName {
    /// Create a qualified name.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Create a name without namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new("", local)
    }

    /// Qualified name of an element.
    pub fn of(element: &Element) -> Self {
        Self::new(
            element.namespace.clone().unwrap_or_default(),
            element.name.clone(),
        )
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_part(&self) -> &str {
        &self.local
    }

    /// True when the name has no namespace.
    pub fn is_unqualified(&self) -> bool {
        self.namespace.is_empty()
    }

    /// Check whether an element carries this name.
    pub fn matches(&self, element: &Element) -> bool {
        element.name == self.local
            && element.namespace.as_deref().unwrap_or("") == self.namespace
    }

    /// Resolve a `prefix:local` value (attribute or text content) against the
    /// namespaces in scope at `context`.
    ///
    /// An unprefixed value takes the default namespace, if one is in scope.
    pub fn resolve(value: &str, context: &Element) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let (prefix, local) = match value.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", value),
        };
        let namespace = context
            .namespaces
            .as_ref()
            .and_then(|ns| ns.get(prefix))
            .map(str::to_string);
        match namespace {
            Some(ns) => Some(Self::new(ns, local)),
            None if prefix.is_empty() => Some(Self::local(local)),
            None => None,
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// Error returned when a `{ns}local` string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid qualified name: {0}")]
pub struct QNameParseError(String);

impl FromStr for QName {
    type Err = QNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('{') {
            let (ns, local) = rest
                .split_once('}')
                .ok_or_else(|| QNameParseError(s.to_string()))?;
            if local.is_empty() {
                return Err(QNameParseError(s.to_string()));
            }
            Ok(Self::new(ns, local))
        } else if s.is_empty() || s.contains('}') {
            Err(QNameParseError(s.to_string()))
        } else {
            Ok(Self::local(s))
        }
    }
}

impl TryFrom<String> for QName {
    type Error = QNameParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QName> for String {
    fn from(value: QName) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let name = QName::new("http://example.org/stock", "GetPrice");
        assert_eq!(name.to_string(), "{http://example.org/stock}GetPrice");
        assert_eq!(name.to_string().parse::<QName>().unwrap(), name);

        let plain: QName = "Client".parse().unwrap();
        assert!(plain.is_unqualified());
        assert_eq!(plain.to_string(), "Client");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("{http://example.org".parse::<QName>().is_err());
        assert!("{http://example.org}".parse::<QName>().is_err());
        assert!("".parse::<QName>().is_err());
    }

    #[test]
    fn test_resolve_prefixed_value() {
        let xml = r#"<a xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><b>s:Client</b></a>"#;
        let root = Element::parse(xml.as_bytes()).unwrap();
        let b = root.get_child("b").unwrap();
        let name = QName::resolve("s:Client", b).unwrap();
        assert_eq!(name.namespace(), "http://schemas.xmlsoap.org/soap/envelope/");
        assert_eq!(name.local_part(), "Client");
        assert!(QName::resolve("x:Client", b).is_none());
        assert_eq!(QName::resolve("Client", b).unwrap(), QName::local("Client"));
    }

    #[test]
    fn test_serde_as_string() {
        let name = QName::new("urn:a", "b");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"{urn:a}b\"");
        let back: QName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
