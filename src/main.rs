//! CLI entry point for `formrelay`: invoke the relay handler locally
//! against a trigger event JSON file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use formrelay::config::Config;
use formrelay::handler::{Handler, TriggerRequest};
use formrelay::model::message::OutgoingMessage;
use formrelay::transport::smtp::SmtpRelay;
use formrelay::transport::{EmailTransport, SendOutcome};

#[derive(Parser)]
#[command(name = "formrelay", version, about = "Relay a contact-form trigger event to email")]
struct Cli {
    /// Trigger event JSON file (same shape the hosting trigger delivers)
    #[arg(value_name = "EVENT")]
    event: PathBuf,

    /// Decode and compose, but log the message instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level);

    let raw = std::fs::read_to_string(&cli.event)
        .with_context(|| format!("reading event file '{}'", cli.event.display()))?;
    let request: TriggerRequest =
        serde_json::from_str(&raw).context("event file is not a valid trigger event")?;

    let config = Config::from_env();
    let transport: Box<dyn EmailTransport> = if cli.dry_run {
        Box::new(DryRunTransport)
    } else {
        Box::new(SmtpRelay::new(&config.smtp)?)
    };

    let handler = Handler::new(transport, config);
    let response = handler.handle(&request);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

/// Set up tracing with stderr output.
fn setup_logging(level: &str) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

/// Transport that logs the composed message instead of delivering it.
struct DryRunTransport;

impl EmailTransport for DryRunTransport {
    fn send(&self, message: &OutgoingMessage) -> formrelay::error::Result<SendOutcome> {
        match message {
            OutgoingMessage::Simple(simple) => {
                info!(to = %simple.to, subject = %simple.subject, "dry-run: simple message");
            }
            OutgoingMessage::Raw(raw) => {
                info!(
                    from = %raw.from,
                    destinations = raw.destinations.len(),
                    bytes = raw.content.len(),
                    "dry-run: raw MIME message"
                );
            }
        }
        Ok(SendOutcome {
            detail: "dry-run".to_string(),
        })
    }
}
