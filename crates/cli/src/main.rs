//! Skill Router CLI
//!
//! A thin wrapper around skill-router-core: answers one message given on
//! the command line, or reads messages from stdin line by line.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use skill_router_core::collaborators::http_client;
use skill_router_core::llm::{model_from_config, KeywordResponder};
use skill_router_core::{respond, Collaborators, Config, Dispatcher, ModelClient};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "skill-router")]
#[command(about = "Route chat messages to built-in skills or a language model")]
struct Args {
    /// Message to answer; omit to read messages from stdin
    message: Option<String>,

    /// Path to a TOML config file (default: <config dir>/skill-router/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full chat response as JSON
    #[arg(long, conflicts_with = "envelope")]
    json: bool,

    /// Print the raw dispatch envelope as JSON (no language model call)
    #[arg(long)]
    envelope: bool,

    /// Use demo data and canned replies instead of network services
    #[arg(long)]
    offline: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    Json,
    Envelope,
}

impl Args {
    fn output_mode(&self) -> OutputMode {
        if self.envelope {
            OutputMode::Envelope
        } else if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

// ============================================================================
// Answering
// ============================================================================

fn answer(
    dispatcher: &Dispatcher,
    model: &dyn ModelClient,
    text: &str,
    mode: OutputMode,
) -> Result<String> {
    match mode {
        OutputMode::Envelope => {
            let envelope = dispatcher.dispatch(text);
            Ok(serde_json::to_string_pretty(&envelope)?)
        }
        OutputMode::Json => {
            let response = respond(dispatcher, model, text)?;
            Ok(serde_json::to_string_pretty(&response)?)
        }
        OutputMode::Text => Ok(respond(dispatcher, model, text)?.message),
    }
}

fn run_interactive(dispatcher: &Dispatcher, model: &dyn ModelClient, mode: OutputMode) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let text = line.trim_end_matches(['\r', '\n']);
        match text.trim() {
            "" => continue,
            "exit" | "quit" => break,
            _ => {}
        }

        match answer(dispatcher, model, text, mode) {
            Ok(output) => println!("{}\n", output),
            Err(e) => eprintln!("ERROR: {}", e),
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = Config::load(args.config.as_deref())?;
    debug!(routing = ?config.routing, "Loaded configuration");

    let (collaborators, model): (Collaborators, Box<dyn ModelClient>) = if args.offline {
        (Collaborators::offline(), Box::new(KeywordResponder))
    } else {
        let client = http_client(&config.http)?;
        (
            Collaborators::from_config(&config)?,
            model_from_config(&config.model, client),
        )
    };

    let dispatcher = Dispatcher::new(&config.routing, collaborators);
    let mode = args.output_mode();

    match args.message {
        Some(ref text) => {
            println!("{}", answer(&dispatcher, model.as_ref(), text, mode)?);
            Ok(())
        }
        None => run_interactive(&dispatcher, model.as_ref(), mode),
    }
}

// ============================================================================
// Tests
// ============================================================================
