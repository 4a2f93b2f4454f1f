//! Interceptor chain.
//!
//! Interceptors are grouped by [`Phase`] and may ask to run before or after
//! other interceptors of the same phase. [`ChainBuilder::build`] resolves the
//! order once; the resulting [`Chain`] is immutable and shared across
//! exchanges.

use crate::error::{Result, SoapError};
use crate::message::Message;
use crate::qname::QName;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordinal of a processing stage. Lower phases run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Phase(u16);

impl Phase {
    pub const RECEIVE: Phase = Phase(100);
    pub const READ: Phase = Phase(200);
    pub const PROTOCOL: Phase = Phase(300);
    pub const UNMARSHAL: Phase = Phase(400);
    pub const MARSHAL: Phase = Phase(500);
    pub const PRE_WRITE: Phase = Phase(600);
    pub const WRITE: Phase = Phase(700);

    pub const fn new(ordinal: u16) -> Self {
        Phase(ordinal)
    }

    pub fn ordinal(&self) -> u16 {
        self.0
    }
}

/// Headers an interceptor processes, optionally restricted to roles.
///
/// An empty role list means the headers are understood whatever role they
/// target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnderstoodHeaders {
    pub headers: Vec<QName>,
    pub roles: Vec<String>,
}

impl UnderstoodHeaders {
    pub fn new(headers: Vec<QName>) -> Self {
        Self {
            headers,
            roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Whether `header` targeted at `role` is covered.
    pub fn understands(&self, header: &QName, role: Option<&str>) -> bool {
        self.headers.contains(header)
            && (self.roles.is_empty() || role.map_or(false, |r| self.roles.iter().any(|x| x == r)))
    }
}

/// Understood-header declarations of every interceptor in the running chain.
#[derive(Debug, Clone, Default)]
pub struct ChainCapabilities(pub Arc<[UnderstoodHeaders]>);

impl ChainCapabilities {
    pub fn understands(&self, header: &QName, role: Option<&str>) -> bool {
        self.0.iter().any(|u| u.understands(header, role))
    }
}

/// A processing step.
pub trait Interceptor: Send + Sync {
    /// Unique name within a chain.
    fn name(&self) -> &str;

    fn phase(&self) -> Phase;

    /// Interceptors this one must run before.
    fn before(&self) -> Vec<String> {
        Vec::new()
    }

    /// Interceptors this one must run after.
    fn after(&self) -> Vec<String> {
        Vec::new()
    }

    fn handle(&self, message: &mut Message) -> Result<()>;

    /// Optional capability queried by the MustUnderstand checker.
    fn understood_headers(&self) -> Option<&UnderstoodHeaders> {
        None
    }
}

struct Entry {
    interceptor: Arc<dyn Interceptor>,
    before: Vec<String>,
    after: Vec<String>,
}

/// Collects interceptors and ordering constraints.
#[derive(Default)]
pub struct ChainBuilder {
    entries: Vec<Entry>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(self, interceptor: impl Interceptor + 'static) -> Self {
        self.push(Arc::new(interceptor), None, None)
    }

    pub fn add_shared(self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.push(interceptor, None, None)
    }

    /// Add an interceptor that must run before `name`.
    pub fn add_before(self, name: &str, interceptor: impl Interceptor + 'static) -> Self {
        self.push(Arc::new(interceptor), Some(name), None)
    }

    /// Add an interceptor that must run after `name`.
    pub fn add_after(self, name: &str, interceptor: impl Interceptor + 'static) -> Self {
        self.push(Arc::new(interceptor), None, Some(name))
    }

    fn push(
        mut self,
        interceptor: Arc<dyn Interceptor>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Self {
        let mut entry = Entry {
            before: interceptor.before(),
            after: interceptor.after(),
            interceptor,
        };
        entry.before.extend(before.map(str::to_string));
        entry.after.extend(after.map(str::to_string));
        self.entries.push(entry);
        self
    }

    /// Resolve the execution order.
    pub fn build(self) -> Result<Chain> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(self.entries.len());
        for (i, entry) in self.entries.iter().enumerate() {
            if index.insert(entry.interceptor.name(), i).is_some() {
                return Err(SoapError::Config(format!(
                    "duplicate interceptor '{}'",
                    entry.interceptor.name()
                )));
            }
        }

        // edges[a] holds every b that must run after a, same phase only.
        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); self.entries.len()];
        for (i, entry) in self.entries.iter().enumerate() {
            let name = entry.interceptor.name();
            let constraints = entry
                .before
                .iter()
                .map(|other| (other, true))
                .chain(entry.after.iter().map(|other| (other, false)));
            for (other, is_before) in constraints {
                let j = *index.get(other.as_str()).ok_or_else(|| {
                    SoapError::Config(format!(
                        "interceptor '{}' references unknown interceptor '{}'",
                        name, other
                    ))
                })?;
                let (first, second) = if is_before { (i, j) } else { (j, i) };
                let first_phase = self.entries[first].interceptor.phase();
                let second_phase = self.entries[second].interceptor.phase();
                if first_phase > second_phase {
                    return Err(SoapError::Config(format!(
                        "interceptor '{}' cannot run before '{}': phase {} follows phase {}",
                        self.entries[first].interceptor.name(),
                        self.entries[second].interceptor.name(),
                        first_phase.ordinal(),
                        second_phase.ordinal()
                    )));
                }
                if first_phase == second_phase && !edges[first].contains(&second) {
                    edges[first].push(second);
                }
            }
        }

        let mut phases: Vec<Phase> = self.entries.iter().map(|e| e.interceptor.phase()).collect();
        phases.sort();
        phases.dedup();

        let mut order = Vec::with_capacity(self.entries.len());
        for phase in phases {
            let members: Vec<usize> = (0..self.entries.len())
                .filter(|&i| self.entries[i].interceptor.phase() == phase)
                .collect();
            let mut incoming: HashMap<usize, usize> = members.iter().map(|&i| (i, 0)).collect();
            for &i in &members {
                for &j in &edges[i] {
                    *incoming.entry(j).or_default() += 1;
                }
            }

            let mut remaining = members;
            while !remaining.is_empty() {
                // Lowest insertion index among the ready ones.
                let pos = remaining
                    .iter()
                    .position(|i| incoming[i] == 0)
                    .ok_or_else(|| {
                        let names: Vec<&str> = remaining
                            .iter()
                            .map(|&i| self.entries[i].interceptor.name())
                            .collect();
                        SoapError::Config(format!(
                            "cyclic ordering constraints between interceptors: {}",
                            names.join(", ")
                        ))
                    })?;
                let next = remaining.remove(pos);
                for &j in &edges[next] {
                    if let Some(count) = incoming.get_mut(&j) {
                        *count -= 1;
                    }
                }
                order.push(next);
            }
        }

        let mut slots: Vec<Option<Entry>> = self.entries.into_iter().map(Some).collect();
        let interceptors: Vec<Arc<dyn Interceptor>> = order
            .into_iter()
            .filter_map(|i| slots[i].take().map(|entry| entry.interceptor))
            .collect();
        let understood: Vec<UnderstoodHeaders> = interceptors
            .iter()
            .filter_map(|i| i.understood_headers().cloned())
            .collect();

        debug!(
            interceptors = ?interceptors.iter().map(|i| i.name()).collect::<Vec<_>>(),
            "Built interceptor chain"
        );

        Ok(Chain {
            interceptors: interceptors.into(),
            capabilities: ChainCapabilities(understood.into()),
        })
    }
}

/// An ordered, immutable list of interceptors.
#[derive(Clone)]
pub struct Chain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    capabilities: ChainCapabilities,
}

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    /// Interceptor names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn capabilities(&self) -> &ChainCapabilities {
        &self.capabilities
    }

    /// Run every interceptor in order. The first error aborts the chain.
    pub fn run(&self, message: &mut Message) -> Result<()> {
        message.put(self.capabilities.clone());
        for interceptor in self.interceptors.iter() {
            if let Err(err) = interceptor.handle(message) {
                match err.as_fault() {
                    Some(fault) => debug!(
                        interceptor = interceptor.name(),
                        code = %fault.code(),
                        reason = fault.reason(),
                        "Interceptor raised fault"
                    ),
                    None => warn!(
                        interceptor = interceptor.name(),
                        error = %err,
                        "Interceptor failed"
                    ),
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("interceptors", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Fault;

    #[derive(Default)]
    struct Trace(Vec<String>);

    struct Step {
        name: &'static str,
        phase: Phase,
        after: Vec<String>,
        fail: bool,
    }

    fn step(name: &'static str, phase: u16) -> Step {
        Step {
            name,
            phase: Phase::new(phase),
            after: Vec::new(),
            fail: false,
        }
    }

    impl Interceptor for Step {
        fn name(&self) -> &str {
            self.name
        }

        fn phase(&self) -> Phase {
            self.phase
        }

        fn after(&self) -> Vec<String> {
            self.after.clone()
        }

        fn handle(&self, message: &mut Message) -> Result<()> {
            if message.get::<Trace>().is_none() {
                message.put(Trace::default());
            }
            if let Some(trace) = message.get_mut::<Trace>() {
                trace.0.push(self.name.to_string());
            }
            if self.fail {
                return Err(Fault::sender(format!("{} failed", self.name)).into());
            }
            Ok(())
        }
    }

    fn run(chain: &Chain) -> Vec<String> {
        let mut message = Message::new();
        let _ = chain.run(&mut message);
        message.remove::<Trace>().unwrap_or_default().0
    }

    #[test]
    fn test_phase_then_constraint_order() {
        let chain = Chain::builder()
            .add(step("A", 1))
            .add(step("B", 0))
            .add_after("A", step("C", 1))
            .build()
            .unwrap();
        assert_eq!(chain.names(), vec!["B", "A", "C"]);
        assert_eq!(run(&chain), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_insertion_order_within_phase() {
        let chain = Chain::builder()
            .add(step("first", 5))
            .add(step("second", 5))
            .add(step("third", 5))
            .build()
            .unwrap();
        assert_eq!(chain.names(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_before_moves_interceptor_forward() {
        let chain = Chain::builder()
            .add(step("A", 1))
            .add(step("B", 1))
            .add_before("A", step("C", 1))
            .build()
            .unwrap();
        assert_eq!(chain.names(), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_declared_after_constraint() {
        let mut late = step("late", 1);
        late.after = vec!["early".to_string()];
        let chain = Chain::builder()
            .add(late)
            .add(step("early", 1))
            .build()
            .unwrap();
        assert_eq!(chain.names(), vec!["early", "late"]);
    }

    #[test]
    fn test_unknown_reference() {
        let err = Chain::builder()
            .add_after("missing", step("A", 1))
            .build()
            .unwrap_err();
        assert!(matches!(err, SoapError::Config(ref msg) if msg.contains("missing")));
    }

    #[test]
    fn test_constraint_against_phase_order() {
        let err = Chain::builder()
            .add(step("early", 0))
            .add_before("early", step("late", 1))
            .build()
            .unwrap_err();
        assert!(matches!(err, SoapError::Config(_)));

        // Already implied by phase order.
        let chain = Chain::builder()
            .add(step("late", 1))
            .add_before("late", step("early", 0))
            .build()
            .unwrap();
        assert_eq!(chain.names(), vec!["early", "late"]);
    }

    #[test]
    fn test_cycle() {
        let mut a = step("A", 1);
        a.after = vec!["B".to_string()];
        let err = Chain::builder()
            .add(a)
            .add_after("A", step("B", 1))
            .build()
            .unwrap_err();
        assert!(matches!(err, SoapError::Config(ref msg) if msg.contains("cyclic")));
    }

    #[test]
    fn test_duplicate_name() {
        let err = Chain::builder()
            .add(step("A", 1))
            .add(step("A", 2))
            .build()
            .unwrap_err();
        assert!(matches!(err, SoapError::Config(_)));
    }

    #[test]
    fn test_fault_aborts_chain() {
        let mut failing = step("B", 1);
        failing.fail = true;
        let chain = Chain::builder()
            .add(step("A", 1))
            .add(failing)
            .add(step("C", 1))
            .build()
            .unwrap();

        let mut message = Message::new();
        let err = chain.run(&mut message).unwrap_err();
        assert!(err.is_fault());
        assert_eq!(message.get::<Trace>().unwrap().0, vec!["A", "B"]);
    }

    #[test]
    fn test_understood_headers_roles() {
        let header = QName::new("urn:h", "Trans");
        let any_role = UnderstoodHeaders::new(vec![header.clone()]);
        assert!(any_role.understands(&header, None));
        assert!(any_role.understands(&header, Some("urn:role")));

        let scoped = UnderstoodHeaders::new(vec![header.clone()]).with_roles(vec!["urn:role".into()]);
        assert!(scoped.understands(&header, Some("urn:role")));
        assert!(!scoped.understands(&header, Some("urn:other")));
        assert!(!scoped.understands(&QName::new("urn:h", "Other"), Some("urn:role")));
    }

    #[test]
    fn test_chain_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Chain>();
    }
}
