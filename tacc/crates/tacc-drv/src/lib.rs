//! Compiler driver: orchestrates the lex → parse → analyze → generate →
//! optimize → (interpret | emit assembly) pipeline behind one `Session`
//! entry point, per spec.md §5/§7 and SPEC_FULL.md §4.8.
//!
//! Grounded on `faxc_drv::{Config, Session, CompilationResults, EmitType,
//! CompileError}`: the phase-by-phase shape and the "stop at the first
//! failing phase" policy are kept, but every phase now targets this
//! pipeline's actual crates instead of `faxc-lex`/`faxc-mir`/`faxc-lir`.
//! Two gaps in the teacher's version are closed rather than carried
//! forward: its `main()` the old `main.rs` imported did not exist in that
//! crate, and its MIR optimizer was never wired in (`// TODO: Run
//! optimization passes`) — here every phase runs, including the optimizer,
//! whenever its emit kind (or a later one) is requested.

use std::fmt;

use tracing::info_span;

use tacc_ir::{GeneratedProgram, Generator, Tac};
use tacc_par::ast::Program;
use tacc_par::Parser;
use tacc_sem::{analyze, SymbolTable};
use tacc_util::{LexerError, ParserError, RuntimeError, SemanticError};

/// The unifying error type the driver returns. Each phase's own error type
/// converts in via `#[from]`, matching `faxc-drv::CompileError`'s role but
/// derived with `thiserror` rather than hand-rolled `Display`/`Error` impls
/// (spec.md §7, SPEC_FULL.md §4.8).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error(transparent)]
    Parser(#[from] ParserError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Which textual artifact (or final action) the caller wants out of a
/// compilation. Named after `faxc-drv::EmitType`, with the set of variants
/// replaced by this pipeline's own phases (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitKind {
    Tokens,
    Ast,
    Symbols,
    Tac,
    OptimizedTac,
    Asm,
    /// Not an artifact: run the interpreter and collect its stdout.
    Run,
}

impl fmt::Display for EmitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmitKind::Tokens => "tokens",
            EmitKind::Ast => "ast",
            EmitKind::Symbols => "symbols",
            EmitKind::Tac => "tac",
            EmitKind::OptimizedTac => "optimized-tac",
            EmitKind::Asm => "asm",
            EmitKind::Run => "run",
        };
        f.write_str(s)
    }
}

/// Driver configuration: which source to compile and what to do with it.
/// Grounded on `faxc-drv::Config`, reduced to this pipeline's single-file,
/// single-target-language shape (no cross-compilation target triple, no
/// optimization level knob beyond "run the optimizer or don't").
#[derive(Debug, Clone)]
pub struct Config {
    pub source: String,
    pub emit: Vec<EmitKind>,
    pub optimize: bool,
}

impl Config {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            emit: vec![EmitKind::Run],
            optimize: true,
        }
    }

    pub fn with_emit(mut self, emit: Vec<EmitKind>) -> Self {
        self.emit = emit;
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}

/// Every textual artifact and/or interpreter result the session produced,
/// keyed by the `EmitKind` that requested it. Grounded on
/// `faxc-drv::CompilationResults`.
#[derive(Debug, Clone, Default)]
pub struct CompilationResults {
    pub tokens: Option<String>,
    pub ast: Option<String>,
    pub symbols: Option<String>,
    pub tac: Option<String>,
    pub optimized_tac: Option<String>,
    pub asm: Option<String>,
    pub stdout: Option<String>,
}

/// One compilation run. `compile` drives every phase the requested
/// `EmitKind`s need and stops at the first phase that fails, per spec.md
/// §7's "downstream phases are skipped" policy.
pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn compile(&self) -> Result<CompilationResults> {
        let mut results = CompilationResults::default();

        if self.config.emit.contains(&EmitKind::Tokens) {
            let _span = info_span!("lex").entered();
            let tokens = tacc_lex::Lexer::tokenize(&self.config.source)?;
            results.tokens = Some(
                tokens
                    .iter()
                    .map(|t| format!("{:?}", t))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }

        let program = self.parse()?;

        if self.config.emit.contains(&EmitKind::Ast) {
            results.ast = Some(format!("{:#?}", program));
        }

        let needs_semantics = self.config.emit.iter().any(|k| {
            matches!(
                k,
                EmitKind::Symbols
                    | EmitKind::Tac
                    | EmitKind::OptimizedTac
                    | EmitKind::Asm
                    | EmitKind::Run
            )
        });
        if needs_semantics {
            let table = self.analyze(&program)?;
            if self.config.emit.contains(&EmitKind::Symbols) {
                results.symbols = Some(
                    table
                        .iter()
                        .map(|(name, info)| {
                            format!(
                                "{name}: {} (initialized={}, line={})",
                                info.type_tag, info.initialized, info.first_line
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
            }
        }

        let needs_tac = self.config.emit.iter().any(|k| {
            matches!(
                k,
                EmitKind::Tac | EmitKind::OptimizedTac | EmitKind::Asm | EmitKind::Run
            )
        });
        if !needs_tac {
            return Ok(results);
        }

        let generated = self.generate(&program);
        if self.config.emit.contains(&EmitKind::Tac) {
            results.tac = Some(generated.tac.listing());
        }

        let needs_optimized = self
            .config
            .emit
            .iter()
            .any(|k| matches!(k, EmitKind::OptimizedTac | EmitKind::Asm | EmitKind::Run));
        if !needs_optimized {
            return Ok(results);
        }

        let optimized = self.optimize(&generated.tac);
        if self.config.emit.contains(&EmitKind::OptimizedTac) {
            results.optimized_tac = Some(optimized.listing());
        }

        if self.config.emit.contains(&EmitKind::Asm) {
            let _span = info_span!("codegen").entered();
            results.asm = Some(tacc_gen::AsmGenerator::generate(&optimized));
        }

        if self.config.emit.contains(&EmitKind::Run) {
            let _span = info_span!("interpret").entered();
            results.stdout = Some(tacc_vm::interpret(&optimized)?);
        }

        Ok(results)
    }

    fn parse(&self) -> Result<Program> {
        let _span = info_span!("parse").entered();
        Parser::parse_source(&self.config.source).map_err(CompileError::from)
    }

    fn analyze(&self, program: &Program) -> Result<SymbolTable> {
        let _span = info_span!("analyze").entered();
        analyze(program).into_result().map_err(CompileError::from)
    }

    fn generate(&self, program: &Program) -> GeneratedProgram {
        let _span = info_span!("generate").entered();
        Generator::generate(program)
    }

    fn optimize(&self, tac: &Tac) -> Tac {
        let _span = info_span!("optimize").entered();
        if self.config.optimize {
            tacc_ir::optimize(tac)
        } else {
            tac.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> Result<String> {
        let session = Session::new(Config::new(source));
        session.compile().map(|r| r.stdout.unwrap_or_default())
    }

    #[test]
    fn addition_and_print() {
        assert_eq!(run("x = 1 + 2\nprint(x)\n").unwrap(), "3");
    }

    #[test]
    fn list_append_and_index() {
        let src = "lista = []\nlista.append(5)\nlista.append(7)\nprint(lista[1])\n";
        assert_eq!(run(src).unwrap(), "7");
    }

    #[test]
    fn if_else_chooses_the_true_branch() {
        let src = "x = 10\nif x > 5:\n    print(1)\nelse:\n    print(0)\n";
        assert_eq!(run(src).unwrap(), "1");
    }

    #[test]
    fn len_of_a_string() {
        let src = "n = \"Python\"\nprint(len(n))\n";
        assert_eq!(run(src).unwrap(), "6");
    }

    #[test]
    fn recursive_factorial() {
        let src = "def factorial(n):\n    if n == 0:\n        return 1\n    else:\n        t = n - 1\n        r = factorial(t)\n        return n * r\nprint(factorial(5))\n";
        assert_eq!(run(src).unwrap(), "120");
    }

    #[test]
    fn undefined_variable_is_a_semantic_error_and_skips_later_phases() {
        let err = run("y = undefined + 1\n").unwrap_err();
        match err {
            CompileError::Semantic(e) => {
                assert_eq!(e.diagnostics().len(), 1);
                assert_eq!(
                    e.diagnostics()[0].to_string(),
                    "Línea 1: variable 'undefined' no definida"
                );
            }
            other => panic!("expected a semantic error, got {other:?}"),
        }
    }

    #[test]
    fn tokens_and_ast_artifacts_are_produced_without_running_the_program() {
        let session = Session::new(
            Config::new("x = 1\nprint(x)\n").with_emit(vec![EmitKind::Tokens, EmitKind::Ast]),
        );
        let results = session.compile().unwrap();
        assert!(results.tokens.is_some());
        assert!(results.ast.is_some());
        assert!(results.stdout.is_none());
    }

    #[test]
    fn optimized_tac_is_no_longer_than_unoptimized_tac() {
        let session = Session::new(
            Config::new("x = 1 + 2\ny = x\nprint(y)\n")
                .with_emit(vec![EmitKind::Tac, EmitKind::OptimizedTac]),
        );
        let results = session.compile().unwrap();
        let tac_lines = results.tac.unwrap().lines().count();
        let opt_lines = results.optimized_tac.unwrap().lines().count();
        assert!(opt_lines <= tac_lines);
    }

    #[test]
    fn assembly_emission_includes_function_label_and_stack_access() {
        let session = Session::new(
            Config::new("def f(n):\n    return n + 1\nprint(f(1))\n").with_emit(vec![EmitKind::Asm]),
        );
        let asm = session.compile().unwrap().asm.unwrap();
        assert!(asm.contains("func_f:"));
        assert!(asm.contains("[rbp"));
    }
}
