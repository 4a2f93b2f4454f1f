//! SOAP endpoint.
//!
//! Resolves the binding model and both interceptor chains once, then runs
//! exchanges through them.

use crate::binding::{BindingModel, BoundOperation};
use crate::config::{SoapBindingConfig, SoapVersion};
use crate::dispatch::PayloadDispatchInterceptor;
use crate::envelope::{SoapInInterceptor, SoapOutInterceptor};
use crate::error::Result;
use crate::fault::{fault_envelope, Fault};
use crate::interceptor::{Chain, ChainBuilder, Interceptor};
use crate::message::Message;
use crate::must_understand::MustUnderstandInterceptor;
use crate::soap_action::{SoapActionInInterceptor, SoapActionOutInterceptor};
use crate::wrapper::{JbiInInterceptor, JbiOutInterceptor};
use crate::wsdl::Definition;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A named counter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterMetric {
    pub name: &'static str,
    pub value: u64,
}

/// Snapshot of the endpoint counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsReport {
    pub counters: Vec<CounterMetric>,
}

impl MetricsReport {
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.counters.iter().find(|c| c.name == name).map(|c| c.value)
    }
}

/// A configured SOAP endpoint.
pub struct SoapEndpoint {
    config: SoapBindingConfig,
    model: Arc<BindingModel>,
    inbound: Chain,
    outbound: Chain,
    /// Metrics tracking
    inbound_processed: AtomicU64,
    outbound_processed: AtomicU64,
    faults_raised: AtomicU64,
}

impl SoapEndpoint {
    /// Create an endpoint with the standard chains.
    pub fn new(config: SoapBindingConfig, definition: &Definition) -> Result<Self> {
        Self::with_interceptors(config, definition, Vec::new(), Vec::new())
    }

    /// Create an endpoint with extra inbound and outbound interceptors.
    pub fn with_interceptors(
        config: SoapBindingConfig,
        definition: &Definition,
        extra_inbound: Vec<Arc<dyn Interceptor>>,
        extra_outbound: Vec<Arc<dyn Interceptor>>,
    ) -> Result<Self> {
        let model = Arc::new(BindingModel::from_definition(definition, &config.endpoint)?);
        let inbound = inbound_chain(&config, &model, extra_inbound)?;
        let outbound = outbound_chain(&config, &model, extra_outbound)?;

        info!(
            binding = %model.name(),
            version = ?model.version(),
            operations = model.operations().len(),
            role = ?config.endpoint.role,
            inbound = ?inbound.names(),
            outbound = ?outbound.names(),
            "SOAP endpoint activated"
        );

        Ok(Self {
            config,
            model,
            inbound,
            outbound,
            inbound_processed: AtomicU64::new(0),
            outbound_processed: AtomicU64::new(0),
            faults_raised: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &SoapBindingConfig {
        &self.config
    }

    pub fn model(&self) -> &Arc<BindingModel> {
        &self.model
    }

    pub fn inbound_chain(&self) -> &Chain {
        &self.inbound
    }

    pub fn outbound_chain(&self) -> &Chain {
        &self.outbound
    }

    /// Run a received message through the inbound chain.
    pub fn process_inbound(&self, message: &mut Message) -> Result<()> {
        self.inbound_processed.fetch_add(1, Ordering::Relaxed);
        self.run(&self.inbound, message, "inbound")
    }

    /// Run a message to be sent through the outbound chain.
    pub fn process_outbound(&self, message: &mut Message) -> Result<()> {
        self.outbound_processed.fetch_add(1, Ordering::Relaxed);
        self.run(&self.outbound, message, "outbound")
    }

    fn run(&self, chain: &Chain, message: &mut Message, direction: &'static str) -> Result<()> {
        match chain.run(message) {
            Ok(()) => {
                debug!(
                    direction,
                    operation = ?BoundOperation::of(message).map(|op| op.name().to_string()),
                    "Exchange processed"
                );
                Ok(())
            }
            Err(err) => {
                if let Some(fault) = err.as_fault() {
                    self.faults_raised.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        direction,
                        code = %fault.code(),
                        reason = fault.reason(),
                        "SOAP fault raised"
                    );
                }
                Err(err)
            }
        }
    }

    /// A new outbound message answering `request`.
    ///
    /// Carries over the bound operation and the SOAP version of the request.
    pub fn response_for(&self, request: &Message) -> Message {
        let mut response = Message::new();
        if let Some(bound) = request.get::<BoundOperation>() {
            response.put(bound.clone());
        }
        if let Some(version) = request.get::<SoapVersion>() {
            response.put(*version);
        }
        response
    }

    /// Render a fault as a complete envelope in the binding's SOAP version.
    pub fn fault_response(&self, fault: &Fault) -> Result<String> {
        fault_envelope(fault, self.model.version())
    }

    pub fn metrics_report(&self) -> MetricsReport {
        MetricsReport {
            counters: vec![
                CounterMetric {
                    name: "soap_inbound_processed_total",
                    value: self.inbound_processed.load(Ordering::Relaxed),
                },
                CounterMetric {
                    name: "soap_outbound_processed_total",
                    value: self.outbound_processed.load(Ordering::Relaxed),
                },
                CounterMetric {
                    name: "soap_faults_total",
                    value: self.faults_raised.load(Ordering::Relaxed),
                },
            ],
        }
    }
}

fn inbound_chain(
    config: &SoapBindingConfig,
    model: &Arc<BindingModel>,
    extra: Vec<Arc<dyn Interceptor>>,
) -> Result<Chain> {
    let role = config.endpoint.role;
    let mut builder = ChainBuilder::new().add(SoapInInterceptor::new());
    let dispatch = PayloadDispatchInterceptor::new(Arc::clone(model), role);
    builder = if config.soap_action.enabled {
        builder
            .add(SoapActionInInterceptor::new(Arc::clone(model)))
            .add_after(SoapActionInInterceptor::NAME, dispatch)
    } else {
        builder.add(dispatch)
    };
    if config.must_understand.enabled {
        let checker = MustUnderstandInterceptor::from_config(role, &config.must_understand);
        builder = builder.add_after(PayloadDispatchInterceptor::NAME, checker);
    }
    builder = builder.add(
        JbiInInterceptor::new(Arc::clone(model), role).enabled(config.wrapper.enabled),
    );
    for interceptor in extra {
        builder = builder.add_shared(interceptor);
    }
    builder.build()
}

fn outbound_chain(
    config: &SoapBindingConfig,
    model: &Arc<BindingModel>,
    extra: Vec<Arc<dyn Interceptor>>,
) -> Result<Chain> {
    let mut builder = ChainBuilder::new()
        .add(JbiOutInterceptor::new(config.endpoint.role).enabled(config.wrapper.enabled));
    if config.soap_action.enabled {
        builder = builder.add(SoapActionOutInterceptor::new());
    }
    builder = builder.add(SoapOutInterceptor::new(model.version()));
    for interceptor in extra {
        builder = builder.add_shared(interceptor);
    }
    builder.build()
}
