//! Todoseq CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use todoseq::cli::args::{Cli, Commands};
use todoseq::cli::output::Output;
use todoseq::cli::tasks;
use todoseq::config::Config;
use todoseq::error::{exit_code, TodoseqError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let output = Output::new(cli.output_format(), cli.quiet);
    match run(&cli, &output) {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            if !output.is_quiet() {
                output.error(&e.to_string());
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Logs go to stderr so stdout stays machine readable.
/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("todoseq={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli, output: &Output) -> Result<(), TodoseqError> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match &cli.command {
        Commands::Tasks(args) => tasks::tasks(&config, args, output),
        Commands::Explain(args) => tasks::explain(&config, args, output),
        Commands::Keywords => tasks::keywords(&config, output),
    }
}
