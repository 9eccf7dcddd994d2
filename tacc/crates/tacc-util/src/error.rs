//! Per-phase error types.
//!
//! One `thiserror`-derived enum per pipeline phase, following the teacher's
//! `faxc_util::error` convention (a small `#[derive(Debug, Error)]` enum per
//! concern rather than one catch-all error type). Every variant carries
//! enough to produce the located message spec.md §7 requires.

use thiserror::Error;

/// Raised by the lexer on an unrecognized character, an unterminated
/// string, or a mismatched dedent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Línea {line}: {message}")]
pub struct LexerError {
    pub line: u32,
    pub message: String,
}

impl LexerError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Raised by the parser on an unexpected token or malformed construct.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Línea {line}: {message}")]
pub struct ParserError {
    pub line: u32,
    pub message: String,
}

impl ParserError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// One located diagnostic produced by the semantic analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticDiagnostic {
    pub line: u32,
    pub message: String,
}

impl std::fmt::Display for SemanticDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Línea {}: {}", self.line, self.message)
    }
}

/// Raised by the semantic analyzer. Unlike the other phases this one
/// accumulates every diagnostic found in a single pass (spec.md §4.3, §7)
/// rather than failing on the first.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
pub struct SemanticError(pub Vec<SemanticDiagnostic>);

impl SemanticError {
    pub fn new(diagnostics: Vec<SemanticDiagnostic>) -> Self {
        Self(diagnostics)
    }

    pub fn diagnostics(&self) -> &[SemanticDiagnostic] {
        &self.0
    }
}

/// Raised by the TAC interpreter; names the offending operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Error de ejecución: {message}")]
pub struct RuntimeError {
    pub message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
