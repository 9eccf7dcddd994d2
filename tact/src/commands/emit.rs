//! Emit command implementation.
//!
//! Produces one of the textual artifacts spec.md §6 names as "implementer's
//! choice" (token list, AST dump, symbol table, TAC listing, optimized TAC
//! listing, assembly listing) — everything the pipeline can show besides the
//! interpreter's stdout, which `run` (`commands::run`) handles instead.

use std::path::PathBuf;

use clap::ValueEnum;
use tacc_drv::{Config as DrvConfig, EmitKind, Session};

use crate::error::{Result, TactError};

/// Which artifact to emit, mirrored 1:1 onto `tacc_drv::EmitKind` minus the
/// `Run` variant (that's `run`'s job, not `emit`'s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmitKindArg {
    Tokens,
    Ast,
    Symbols,
    Tac,
    OptimizedTac,
    Asm,
}

impl From<EmitKindArg> for EmitKind {
    fn from(kind: EmitKindArg) -> Self {
        match kind {
            EmitKindArg::Tokens => EmitKind::Tokens,
            EmitKindArg::Ast => EmitKind::Ast,
            EmitKindArg::Symbols => EmitKind::Symbols,
            EmitKindArg::Tac => EmitKind::Tac,
            EmitKindArg::OptimizedTac => EmitKind::OptimizedTac,
            EmitKindArg::Asm => EmitKind::Asm,
        }
    }
}

/// Arguments for the `emit` subcommand.
#[derive(Debug, Clone)]
pub struct EmitArgs {
    /// Source file to compile.
    pub input: PathBuf,
    /// Which artifact to produce. Resolved from `--kind` or, if that was
    /// omitted, the config file's `default_emit` before this struct is built.
    pub kind: EmitKind,
    /// Where to write the artifact; stdout if not given.
    pub output: Option<PathBuf>,
    /// Skip the optimizer pass (irrelevant for `Tokens`/`Ast`/`Symbols`).
    pub no_optimize: bool,
}

pub fn run_emit(args: EmitArgs, verbose: bool) -> Result<()> {
    let source = std::fs::read_to_string(&args.input).map_err(|source| TactError::ReadSource {
        path: args.input.display().to_string(),
        source,
    })?;

    let emit_kind = args.kind;
    let config = DrvConfig::new(source)
        .with_emit(vec![emit_kind])
        .with_optimize(!args.no_optimize);

    if verbose {
        tracing::info!(path = %args.input.display(), kind = %emit_kind, "emitting artifact");
    }

    let results = Session::new(config).compile()?;
    let artifact = match emit_kind {
        EmitKind::Tokens => results.tokens,
        EmitKind::Ast => results.ast,
        EmitKind::Symbols => results.symbols,
        EmitKind::Tac => results.tac,
        EmitKind::OptimizedTac => results.optimized_tac,
        EmitKind::Asm => results.asm,
        EmitKind::Run => unreachable!("emit never requests EmitKind::Run"),
    }
    .unwrap_or_default();

    match &args.output {
        Some(path) => std::fs::write(path, &artifact).map_err(|source| TactError::WriteArtifact {
            path: path.display().to_string(),
            source,
        })?,
        None => println!("{artifact}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    fn write_source(contents: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn emits_tac_listing_to_a_file() {
        let file = write_source("x = 1 + 2\nprint(x)\n");
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.tac");

        let args = EmitArgs {
            input: file.path().to_path_buf(),
            kind: EmitKind::Tac,
            output: Some(out.clone()),
            no_optimize: false,
        };
        run_emit(args, false).unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        assert!(contents.contains("print("));
    }

    #[test]
    fn optimized_tac_is_requested_without_needing_run() {
        let file = write_source("x = 1 + 2\nprint(x)\n");
        let args = EmitArgs {
            input: file.path().to_path_buf(),
            kind: EmitKind::OptimizedTac,
            output: None,
            no_optimize: false,
        };
        assert!(run_emit(args, false).is_ok());
    }

    #[test]
    fn missing_source_file_is_a_read_source_error() {
        let args = EmitArgs {
            input: PathBuf::from("/nonexistent/missing.tac"),
            kind: EmitKind::Tokens,
            output: None,
            no_optimize: true,
        };
        let err = run_emit(args, false).unwrap_err();
        assert!(matches!(err, TactError::ReadSource { .. }));
    }
}
