//! tact — a command-line driver for the tacc compilation pipeline.
//!
//! This is the main entry point for the tact CLI application. It uses clap
//! for argument parsing and dispatches to `run` (execute a program) or
//! `emit` (produce one of the pipeline's intermediate textual artifacts).
//! Per spec.md §1 the driver itself is out of scope — it is a thin wrapper
//! around `tacc_drv::Session` and defines none of the language's semantics.

mod commands;
mod config;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    emit::{run_emit, EmitArgs, EmitKindArg},
    run::{run_run, RunArgs},
};
use config::Config;
use error::{Result, TactError};

/// tact — compile and run tacc programs.
#[derive(Parser, Debug)]
#[command(name = "tact")]
#[command(author = "Tacc Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A CLI tool for the tacc compilation pipeline", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, env = "TACC_VERBOSE")]
    verbose: bool,

    /// Path to a tact.toml configuration file.
    #[arg(short, long, global = true, env = "TACC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile and execute a program, printing its stdout.
    Run(RunCommand),

    /// Emit one intermediate artifact (tokens, AST, symbols, TAC, ...).
    Emit(EmitCommand),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
struct RunCommand {
    /// Source file to run.
    input: PathBuf,

    /// Skip the constant-folding / dead-temporary-elimination optimizer.
    #[arg(long, default_value_t = false)]
    no_optimize: bool,
}

/// Arguments for the `emit` subcommand.
#[derive(Parser, Debug)]
struct EmitCommand {
    /// Source file to compile.
    input: PathBuf,

    /// Which artifact to produce. Falls back to the config file's
    /// `default_emit` (see `tact.toml`) when omitted.
    #[arg(value_enum)]
    kind: Option<EmitKindArg>,

    /// Write the artifact here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the optimizer pass.
    #[arg(long, default_value_t = false)]
    no_optimize: bool,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

/// Exit status convention (spec.md §6): 0 on success, 1 on any phase
/// failure. Errors are printed via `Display` so static-phase diagnostics
/// keep their "Línea N:" prefix and runtime errors their "Error de
/// ejecución:" prefix, rather than Rust's default `Debug` termination
/// formatting.
fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.log_level)?;

    match cli.command {
        Commands::Run(args) => run_run(
            RunArgs {
                input: args.input,
                no_optimize: args.no_optimize,
            },
            cli.verbose,
        ),
        Commands::Emit(args) => {
            let kind = match args.kind {
                Some(kind) => kind.into(),
                None => config.default_emit_kind()?,
            };
            run_emit(
                EmitArgs {
                    input: args.input,
                    kind,
                    output: args.output,
                    no_optimize: args.no_optimize,
                },
                cli.verbose,
            )
        }
    }
}

/// Initialize the `tracing` logging system. `-v`/`--verbose` wins over
/// everything; otherwise `TACC_LOG` wins over the config file's
/// `log_level`, which wins over the hardcoded "info" default.
fn init_logging(verbose: bool, config_log_level: &str) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TACC_LOG")
            .unwrap_or_else(|_| EnvFilter::new(config_log_level.to_string()))
    };

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| TactError::Config(format!("failed to initialize logging: {e}")))?;

    Ok(())
}

/// Load configuration from file or fall back to defaults.
fn load_config(config_path: Option<&std::path::Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::parse_from(["tact", "run", "program.tac"]);
        match cli.command {
            Commands::Run(args) => assert_eq!(args.input, PathBuf::from("program.tac")),
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn parses_run_with_no_optimize() {
        let cli = Cli::parse_from(["tact", "run", "--no-optimize", "program.tac"]);
        match cli.command {
            Commands::Run(args) => assert!(args.no_optimize),
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn parses_emit_with_kind_and_output() {
        let cli = Cli::parse_from(["tact", "emit", "program.tac", "tac", "-o", "out.tac"]);
        match cli.command {
            Commands::Emit(args) => {
                assert_eq!(args.kind, Some(EmitKindArg::Tac));
                assert_eq!(args.output, Some(PathBuf::from("out.tac")));
            }
            other => panic!("expected Emit, got {other:?}"),
        }
    }

    #[test]
    fn parses_emit_with_omitted_kind() {
        let cli = Cli::parse_from(["tact", "emit", "program.tac"]);
        match cli.command {
            Commands::Emit(args) => assert_eq!(args.kind, None),
            other => panic!("expected Emit, got {other:?}"),
        }
    }

    #[test]
    fn parses_global_verbose_before_subcommand() {
        let cli = Cli::parse_from(["tact", "--verbose", "run", "program.tac"]);
        assert!(cli.verbose);
    }
}
