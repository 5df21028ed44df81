//! rt-mangle CLI
//!
//! Usage:
//!   rt-mangle [OPTIONS] <INPUT> <COMMANDS>...
//!
//! Options:
//!   -o, --output <FILE>  Output file to create (default: out.json)
//!   --keep-id            Keep the plan's instance identifier
//!   -v, --verbose        Print engine trace output
//!   -h, --help           Print help

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rt_mangle::plan::codec;
use rt_mangle::{apply_command, MangleError};

#[derive(Parser)]
#[command(name = "rt-mangle")]
#[command(about = "Modify a treatment-plan file to add intentional delivery errors")]
struct Cli {
    /// Plan file to modify
    input: PathBuf,

    /// Output file to create
    #[arg(short, long, default_value = "out.json")]
    output: PathBuf,

    /// Keep the plan's instance identifier instead of generating a fresh one
    #[arg(long)]
    keep_id: bool,

    /// Print engine trace output (filters and setters found, match counts)
    #[arg(short, long)]
    verbose: bool,

    /// Command strings describing how to alter the plan, applied in order
    #[arg(required = true)]
    commands: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut plan = match codec::read(&cli.input) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Unless instructed, change the plan's identifier to prevent duplicates.
    if !cli.keep_id {
        plan.uid = codec::generate_uid();
    }

    debug!("found {} command string(s)", cli.commands.len());
    for command in &cli.commands {
        debug!("processing command string: {}", command);
        if let Err(e) = apply_command(&mut plan, command) {
            report(&e, command);
            process::exit(1);
        }
    }

    if let Err(e) = codec::write(&plan, &cli.output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    println!("Output file {} created.", cli.output.display());
}

/// Render a run-aborting error against the command string it came from.
fn report(error: &MangleError, command: &str) {
    match error {
        MangleError::Parse(errors) => {
            for err in errors {
                eprint!("{}", err.format(command, "command"));
            }
        }
        MangleError::Validate(err) => {
            eprint!("{}", err.format(command, "command"));
        }
    }
}
