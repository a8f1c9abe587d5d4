//! # spark
//!
//! A small framework-style command line built on the `spark` command system.
//!
//! Try:
//!   spark
//!   spark list --simple
//!   spark help make:model
//!   spark make:model BlogPost --force
//!   spark app:refresh
//!   spark make:modle
//!
//! Set `RUST_LOG=debug` to see dispatch and delegation events.

use clap::Parser;
use spark::{Commands, Config};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Runs framework commands by name
#[derive(Parser)]
#[command(name = "spark", disable_help_flag = true)]
struct Cli {
    /// Show help for the command instead of running it
    #[arg(short, long)]
    help: bool,

    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show the cause chain of failures
    #[arg(short, long)]
    verbose: bool,

    /// Command to run [default: list]
    command: Option<String>,

    /// Parameters passed to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    params: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("spark: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut builder = Commands::builder();
    if let Some(path) = &cli.config {
        builder = builder.config(&Config::load(path)?)?;
    }
    if cli.verbose {
        builder = builder.verbose_errors(true);
    }
    let commands = spark_demo::register(builder).build()?;

    // `-h` after the command name lands in the trailing parameters.
    let help = cli.help || cli.params.iter().any(|p| p == "-h" || p == "--help");
    Ok(spark_demo::invoke(
        &commands,
        cli.command.as_deref(),
        &cli.params,
        help,
    )?)
}
