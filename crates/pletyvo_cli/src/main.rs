//! Pletyvo CLI
//!
//! Key management and offline construction, inspection and signing of
//! event envelopes.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use config::CliConfig;
use pletyvo_core::ContentHash;
use pletyvo_dapp::{
    BodyLayout, DataType, Ed25519Signer, EventBody, EventBodyType, EventInput, EventType, Signer,
};
use serde_json::Value;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pletyvo")]
#[command(about = "Pletyvo - signed event envelopes and keys", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data type octet, overrides the config file
    #[arg(long, global = true)]
    data_type: Option<u8>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a fresh Ed25519 seed file
    Keygen {
        /// Destination, defaults to the configured key file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the identity hash of a key file
    Identity {
        /// Key file, defaults to the configured key file
        #[arg(short, long)]
        key: Option<PathBuf>,
    },
    /// Build an envelope and print its text form
    Encode(EnvelopeArgs),
    /// Print the fields of an envelope given in text form
    Decode {
        /// Base64url envelope
        text: String,
    },
    /// Build and sign an envelope, print the submittable JSON
    Sign {
        /// Key file, defaults to the configured key file
        #[arg(short, long)]
        key: Option<PathBuf>,
        #[command(flatten)]
        envelope: EnvelopeArgs,
    },
}

#[derive(Args)]
struct EnvelopeArgs {
    /// Event type as a 16-bit integer (major << 8 | minor)
    #[arg(short, long)]
    event_type: u16,
    /// JSON payload
    #[arg(short, long, value_parser = parse_payload)]
    payload: Value,
    /// Parent hash; makes the envelope linked
    #[arg(long)]
    parent: Option<ContentHash>,
}

fn parse_payload(s: &str) -> serde_json::Result<Value> {
    serde_json::from_str(s)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut config = CliConfig::load_or_default(cli.config.as_deref())?;
    if let Some(data_type) = cli.data_type {
        config.data_type = data_type;
    }
    init_tracing(&config);

    println!("{}", run(cli.command, &config)?);
    Ok(())
}

fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_filter()))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, config: &CliConfig) -> Result<String> {
    match command {
        Commands::Keygen { out } => {
            let path = out.unwrap_or_else(|| config.key_file.clone());
            let signer = Ed25519Signer::generate_key_file(&path)
                .wrap_err_with(|| format!("generating key file {}", path.display()))?;
            Ok(signer.hash().to_text())
        }
        Commands::Identity { key } => Ok(load_signer(key, config)?.hash().to_text()),
        Commands::Encode(args) => Ok(build_body(&args, config)?.to_text()),
        Commands::Decode { text } => {
            let body = EventBody::from_text(text.trim())?;
            describe(&body)
        }
        Commands::Sign { key, envelope } => {
            let signer = load_signer(key, config)?;
            let input = EventInput::sign(build_body(&envelope, config)?, &signer);
            Ok(serde_json::to_string_pretty(&input.to_value())?)
        }
    }
}

fn load_signer(key: Option<PathBuf>, config: &CliConfig) -> Result<Ed25519Signer> {
    let path = key.unwrap_or_else(|| config.key_file.clone());
    Ed25519Signer::from_key_file(&path)
        .wrap_err_with(|| format!("loading key file {}", path.display()))
}

fn build_body(args: &EnvelopeArgs, config: &CliConfig) -> Result<EventBody> {
    let version = if args.parent.is_some() {
        EventBodyType::Linked
    } else {
        EventBodyType::Basic
    };
    let data_type = DataType::from_u8(config.data_type)?;
    let body = EventBody::create(
        version,
        data_type,
        EventType::from(args.event_type),
        args.parent.as_ref(),
        &args.payload,
    )?;
    debug!(?version, len = body.len(), "built envelope");
    Ok(body)
}

fn describe(body: &EventBody) -> Result<String> {
    let layout = body.layout()?;
    let header = layout.header();
    let event_type = header.event_type;

    let mut out = String::new();
    writeln!(out, "version:    {:?}", header.version)?;
    writeln!(out, "data type:  {:?}", header.data_type)?;
    writeln!(
        out,
        "event type: {}.{} ({})",
        event_type.major(),
        event_type.minor(),
        event_type.to_uint16()
    )?;
    if let BodyLayout::Linked { parent, .. } = &layout {
        writeln!(out, "parent:     {parent}")?;
    }
    write!(out, "payload:    {}", String::from_utf8_lossy(layout.payload()))?;
    Ok(out)
}
