//! Flow-insensitive semantic analysis over the parsed AST, per spec.md §4.3.

pub mod analyze;
pub mod symtab;

pub use analyze::{analyze, AnalysisResult};
pub use symtab::{SymbolInfo, SymbolTable, TypeTag};
pub use tacc_util::{SemanticDiagnostic, SemanticError};
