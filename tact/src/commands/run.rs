//! Run command implementation.
//!
//! Reads a source file, drives it through the full pipeline, and prints the
//! interpreter's stdout, per spec.md §6 ("only the interpreter's stdout is
//! part of the externally defined contract").

use std::path::PathBuf;

use tacc_drv::{Config as DrvConfig, EmitKind, Session};

use crate::error::{Result, TactError};

/// Arguments for the `run` subcommand.
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Source file to compile and execute.
    pub input: PathBuf,
    /// Skip the constant-folding / dead-temporary optimizer pass.
    pub no_optimize: bool,
}

pub fn run_run(args: RunArgs, verbose: bool) -> Result<()> {
    let source = read_source(&args.input)?;

    let config = DrvConfig::new(source)
        .with_emit(vec![EmitKind::Run])
        .with_optimize(!args.no_optimize);

    if verbose {
        tracing::info!(path = %args.input.display(), "running");
    }

    let results = Session::new(config).compile()?;
    if let Some(stdout) = results.stdout {
        println!("{stdout}");
    }
    Ok(())
}

fn read_source(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| TactError::ReadSource {
        path: path.display().to_string(),
        source,
    })
}
