#![forbid(unsafe_code)]

//! Replays a JSON script of Adjustor operations against a fresh in-memory registry and prints
//! one JSON line per operation, then a summary line with the final `hashMap()` view.

mod script;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use adjustor_os::registry::AdjustorRegistry;
use clap::Parser;
use tracing::info;

use crate::script::{replay, resolve_config, ReplayScript};

#[derive(Parser, Debug)]
#[command(name = "adjustor_replay")]
#[command(about = "Replay Adjustor registry operations and print the audit trail")]
struct Args {
    /// Path to the JSON operation script
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Trust authority address (overrides the script and ADJUSTOR_TRUST_AUTHORITY)
    #[arg(short, long, value_name = "ADDRESS")]
    authority: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    setup_tracing(args.verbose);

    let raw = fs::read_to_string(&args.script)?;
    let script: ReplayScript = serde_json::from_str(&raw)?;
    let config = resolve_config(args.authority.as_deref(), &script, |key| {
        std::env::var(key).ok()
    })?;

    let mut registry = AdjustorRegistry::new(&config);
    info!(
        script = %args.script.display(),
        authority = %registry.authority(),
        operations = script.operations.len(),
        "replaying adjustor script"
    );

    let lines = replay(&mut registry, &script.operations);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in &lines {
        writeln!(out, "{}", serde_json::to_string(line)?)?;
    }
    Ok(())
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("adjustor_os=debug,adjustor_replay=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
