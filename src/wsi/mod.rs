//! WS-I Basic Profile 1.1 checks over a WSDL definition.
//!
//! The validator runs a fixed, ordered list of rule functions (see
//! [`rules::RULES`]). Rules never fail; they record violations of the form
//!
//! ```text
//! binding "StockBinding": Basic Profile Violation #R2701: ...
//! ```

pub mod rules;

use crate::wsdl::Definition;
use indexmap::IndexSet;
use tracing::debug;

pub use rules::{Rule, RULES};

/// Kind of WSDL component a violation points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Message,
    PortType,
    Binding,
    Operation,
    Port,
}

impl Locator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::PortType => "portType",
            Self::Binding => "binding",
            Self::Operation => "operation",
            Self::Port => "port",
        }
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    violations: IndexSet<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation. Duplicates are kept once, in first-seen order.
    pub fn add(&mut self, locator: Locator, name: &str, code: &str, message: &str) {
        self.violations.insert(format!(
            "{} \"{}\": Basic Profile Violation #{}: {}",
            locator.as_str(),
            name,
            code,
            message
        ));
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &IndexSet<String> {
        &self.violations
    }

    pub fn into_violations(self) -> IndexSet<String> {
        self.violations
    }

    /// Whether any violation carries the given rule code.
    pub fn has_violation(&self, code: &str) -> bool {
        let marker = format!("#{}:", code);
        self.violations.iter().any(|v| v.contains(&marker))
    }
}

/// Run every rule against a definition.
pub fn validate(definition: &Definition) -> ValidationReport {
    validate_with(definition, RULES)
}

/// Run a chosen subset of rules.
pub fn validate_with(definition: &Definition, rules: &[Rule]) -> ValidationReport {
    let mut report = ValidationReport::new();
    for rule in rules {
        let before = report.violations.len();
        (rule.check)(definition, &mut report);
        let found = report.violations.len() - before;
        if found > 0 {
            debug!(rule = rule.code, violations = found, "WS-I rule violated");
        }
    }
    report
}
