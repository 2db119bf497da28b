//! Dispatch CLI
//!
//! Resolves an endpoint plus an exchange into the request the producer would
//! send, without talking to an engine.
//!
//! # Usage
//!
//! ```bash
//! # Resolve against an ad-hoc endpoint URI
//! echo '{"properties":{"CamundaBpmBusinessKey":"order-7"},"body":{"amount":3}}' \
//!   | dispatch_cli resolve --uri 'camunda-bpm:message?messageName=OrderReceived'
//!
//! # Resolve against a named endpoint from a config file
//! dispatch_cli resolve --config dispatch.yaml --endpoint approve --file exchange.json
//!
//! # List configured endpoints
//! dispatch_cli endpoints --config dispatch.yaml
//! ```

use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bpmn_dispatch::message_dispatch::{
    EndpointConfig, EndpointConfigIndex, Exchange, MemoryRuntime, MessageProducer,
};
use bpmn_dispatch::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "dispatch_cli")]
#[command(version = "0.1.0")]
#[command(about = "Resolve exchanges into BPMN dispatch requests")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "bpmn_dispatch=warn", env = "DISPATCH_LOG")]
    log: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dispatch request for an exchange (JSON)
    Resolve {
        /// Endpoint URI (camunda-bpm:message?...)
        #[arg(long, conflicts_with_all = ["config", "endpoint"])]
        uri: Option<String>,

        /// Dispatch config YAML
        #[arg(long, requires = "endpoint")]
        config: Option<PathBuf>,

        /// Endpoint name within the config
        #[arg(long, requires = "config")]
        endpoint: Option<String>,

        /// Exchange JSON file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List endpoints in a dispatch config
    Endpoints {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Resolve {
            uri,
            config,
            endpoint,
            file,
        } => {
            let endpoint = match (uri, config, endpoint) {
                (Some(uri), _, _) => EndpointConfig::parse(&uri)?,
                (None, Some(config), Some(name)) => {
                    let index = EndpointConfigIndex::load_from_file(&config)?;
                    index
                        .endpoint(&name)
                        .cloned()
                        .with_context(|| format!("No endpoint named '{}'", name))?
                }
                _ => bail!("either --uri or --config with --endpoint is required"),
            };

            let exchange: Exchange =
                serde_json::from_str(&read_input(file)?).context("Parsing exchange JSON")?;

            let producer = MessageProducer::new(endpoint, Arc::new(MemoryRuntime::new()));
            let request = producer.request_for(&exchange)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Commands::Endpoints { config } => {
            let index = EndpointConfigIndex::load_from_file(&config)?;
            for name in index.endpoint_names() {
                if let Some(endpoint) = index.endpoint(name) {
                    println!("{}\t{}", name, endpoint.uri());
                }
            }
        }
    }
    Ok(())
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Reading {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Reading exchange from stdin")?;
            Ok(buf)
        }
    }
}
