//! Zentinel SOAP binding tool.
//!
//! Run with: `zentinel-soap-binding --config config.yaml <command>`
//!
//! - `validate <wsdl>` checks a WSDL document against the WS-I Basic Profile
//! - `wrap <wsdl> <envelope>` turns a SOAP request into its canonical form
//! - `unwrap <wsdl> <canonical> --operation <name>` builds the SOAP envelope

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use zentinel_soap_binding::parser::{parse_document, write_document};
use zentinel_soap_binding::{
    read_definition, validate, BoundOperation, Content, Definition, Message, SoapBindingConfig,
    SoapEndpoint, XmlStream,
};

/// SOAP binding tool for Zentinel.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a WSDL document against the WS-I Basic Profile
    Validate {
        wsdl: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a SOAP envelope into the canonical wrapper
    Wrap {
        wsdl: PathBuf,
        envelope: PathBuf,

        /// SOAPAction transport header value
        #[arg(long)]
        soap_action: Option<String>,
    },

    /// Convert a canonical wrapper into a SOAP envelope
    Unwrap {
        wsdl: PathBuf,
        canonical: PathBuf,

        /// Operation name (local part)
        #[arg(long)]
        operation: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Zentinel SOAP binding v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Validate { wsdl, json } => run_validate(&wsdl, json),
        Command::Wrap {
            wsdl,
            envelope,
            soap_action,
        } => {
            let config = load_config(&args.config)?;
            run_wrap(config, &wsdl, &envelope, soap_action)
        }
        Command::Unwrap {
            wsdl,
            canonical,
            operation,
        } => {
            let config = load_config(&args.config)?;
            run_unwrap(config, &wsdl, &canonical, &operation)
        }
    }
}

fn load_config(path: &Path) -> Result<SoapBindingConfig> {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Ok(SoapBindingConfig::default());
    }
    let content = std::fs::read_to_string(path).context("Failed to read config file")?;
    let config: SoapBindingConfig =
        serde_yaml::from_str(&content).context("Failed to parse config file")?;
    info!(
        config = %path.display(),
        role = ?config.endpoint.role,
        wrapper = config.wrapper.enabled,
        must_understand = config.must_understand.enabled,
        soap_action = config.soap_action.enabled,
        "Configuration loaded"
    );
    Ok(config)
}

fn load_definition(path: &Path) -> Result<Definition> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read WSDL {}", path.display()))?;
    read_definition(&data).with_context(|| format!("Failed to parse WSDL {}", path.display()))
}

fn run_validate(wsdl: &Path, json: bool) -> Result<()> {
    let definition = load_definition(wsdl)?;
    let report = validate(&definition);

    if json {
        let violations: Vec<&String> = report.violations().iter().collect();
        let output = serde_json::json!({
            "valid": report.is_valid(),
            "violations": violations,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for violation in report.violations() {
            println!("{}", violation);
        }
    }

    if !report.is_valid() {
        bail!("{} Basic Profile violation(s)", report.violations().len());
    }
    info!("No Basic Profile violations");
    Ok(())
}

fn run_wrap(
    config: SoapBindingConfig,
    wsdl: &Path,
    envelope: &Path,
    soap_action: Option<String>,
) -> Result<()> {
    let definition = load_definition(wsdl)?;
    let endpoint = SoapEndpoint::new(config, &definition).context("Failed to build endpoint")?;

    let data = std::fs::read(envelope).context("Failed to read envelope")?;
    let mut message = Message::with_stream(XmlStream::from_bytes(data));
    if let Some(action) = soap_action {
        message.set_transport_header("SOAPAction", action);
    }

    if let Err(err) = endpoint.process_inbound(&mut message) {
        if let Some(fault) = err.as_fault() {
            println!("{}", endpoint.fault_response(fault)?);
        }
        return Err(err).context("Inbound processing failed");
    }

    match message.take_tree()? {
        Some(canonical) => println!("{}", write_document(&canonical)?),
        None => warn!("Message has no payload"),
    }
    Ok(())
}

fn run_unwrap(
    config: SoapBindingConfig,
    wsdl: &Path,
    canonical: &Path,
    operation: &str,
) -> Result<()> {
    let definition = load_definition(wsdl)?;
    let endpoint = SoapEndpoint::new(config, &definition).context("Failed to build endpoint")?;

    let bound = endpoint
        .model()
        .operations()
        .iter()
        .find(|op| op.name().local_part() == operation)
        .cloned()
        .with_context(|| format!("Operation '{}' not found in binding", operation))?;

    let data = std::fs::read(canonical).context("Failed to read canonical message")?;
    let mut message = Message::new();
    message.set_content(Content::Tree(parse_document(&data)?));
    message.put(BoundOperation(bound));

    endpoint
        .process_outbound(&mut message)
        .context("Outbound processing failed")?;

    if let Some(action) = message.transport_header("SOAPAction") {
        info!(soap_action = action, "SOAPAction header");
    }
    if let Some(envelope) = message.take_tree()? {
        println!("{}", write_document(&envelope)?);
    }
    Ok(())
}
