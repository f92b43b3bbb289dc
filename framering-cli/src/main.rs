//! Framering CLI - debug tool for component definitions.
//!
//! Commands:
//! - `framering fields`: List registered field kinds
//! - `framering components <file>`: List the components in a YAML file
//! - `framering check <file> [--post-type T] [--home] [--archive [T]]`: Evaluate rules
//! - `framering render <file> [--values payload.json] [--html]`: Render fields
//! - `framering process <file> <payload.json>`: Process a submission
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: The submission was rejected by validation

use clap::Parser;
use framering::FrameringError;
use framering_cli::{inspect, list, load_config, Cli, Commands, VALIDATION_EXIT_CODE};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level
    let filter = if cli.debug {
        EnvFilter::new("framering=debug,framering_forms=debug,framering_rules=debug,framering_fields=debug,framering_config=debug,framering_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(result_to_exit(dispatch_command(cli)));
}

/// Dispatch a parsed CLI to the appropriate command handler.
fn dispatch_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Fields { json } => list::run_fields(config, json),
        Commands::Components { file, json } => list::run_components(config, &file, json),
        Commands::Check { file, page } => inspect::run_check(config, &file, &page),
        Commands::Render { file, values, html } => {
            inspect::run_render(config, &file, values.as_deref(), html)
        }
        Commands::Process { file, payload } => inspect::run_process(config, &file, &payload),
    }
}

/// Convert a command result to an exit code.
fn result_to_exit(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let rejected = e
                .downcast_ref::<FrameringError>()
                .is_some_and(FrameringError::is_validation);
            if rejected {
                VALIDATION_EXIT_CODE
            } else {
                1
            }
        }
    }
}
