//! Flow-insensitive semantic analysis, per spec.md §4.3.
//!
//! Two flat passes over the whole program, grounded loosely on the
//! walk-and-look-up shape of `faxc-sem::scope::ScopeTree::resolve`, reduced
//! to a single table with no scope stack (DESIGN.md Open Question 3):
//!
//! 1. `collect_definitions` records every name that is ever *written*
//!    anywhere in the program — assignment targets, function names and
//!    parameters, `for` loop variables, `global`-declared names, and
//!    `except` binding names — regardless of which branch they live in.
//! 2. `check_reads` walks the program again and flags every identifier
//!    *read* that isn't in that set.
//!
//! Because pass 1 runs over the entire program before pass 2 starts, a
//! variable assigned only inside a not-taken branch, or later in the
//! program than a given read, is still "defined" everywhere — the
//! deliberately weak, flow-insensitive rule spec.md §4.3 and §9 describe.

use tacc_par::ast::{Block, Callee, Expr, ExprKind, Program, Stmt};
use tacc_util::{SemanticDiagnostic, SemanticError, Symbol};

use crate::symtab::{SymbolTable, TypeTag};

pub struct AnalysisResult {
    pub table: SymbolTable,
    pub diagnostics: Vec<SemanticDiagnostic>,
}

impl AnalysisResult {
    pub fn into_result(self) -> Result<SymbolTable, SemanticError> {
        if self.diagnostics.is_empty() {
            Ok(self.table)
        } else {
            Err(SemanticError::new(self.diagnostics))
        }
    }
}

pub fn analyze(program: &Program) -> AnalysisResult {
    let mut table = SymbolTable::new();
    for stmt in &program.statements {
        collect_stmt(stmt, &mut table);
    }

    let mut diagnostics = Vec::new();
    for stmt in &program.statements {
        check_stmt(stmt, &table, &mut diagnostics);
    }

    AnalysisResult { table, diagnostics }
}

fn literal_type_tag(expr: &Expr) -> Option<TypeTag> {
    match &expr.kind {
        ExprKind::Int(_) => Some(TypeTag::Integer),
        ExprKind::Float(_) => Some(TypeTag::Float),
        ExprKind::Str(_) => Some(TypeTag::String),
        ExprKind::List(_) => Some(TypeTag::List),
        ExprKind::Dict(_) => Some(TypeTag::Dict),
        _ => None,
    }
}

fn collect_block(block: &Block, table: &mut SymbolTable) {
    for stmt in &block.statements {
        collect_stmt(stmt, table);
    }
}

fn collect_stmt(stmt: &Stmt, table: &mut SymbolTable) {
    match stmt {
        Stmt::Assignment { name, expr, line } => {
            table.define(*name, literal_type_tag(expr), *line);
        }
        Stmt::IndexAssignment { .. } | Stmt::Print { .. } | Stmt::Del { .. } | Stmt::Expr { .. } => {
            // These never introduce a new binding.
        }
        Stmt::If {
            then_block,
            elifs,
            else_block,
            ..
        } => {
            collect_block(then_block, table);
            for (_, elif_block) in elifs {
                collect_block(elif_block, table);
            }
            if let Some(else_block) = else_block {
                collect_block(else_block, table);
            }
        }
        Stmt::While { block, .. } => collect_block(block, table),
        Stmt::For {
            name,
            iterable: _,
            block,
            line,
        } => {
            table.define(*name, None, *line);
            collect_block(block, table);
        }
        Stmt::Function {
            name,
            params,
            body,
            line,
        } => {
            table.define(*name, Some(TypeTag::Function), *line);
            // Declared parameters are pre-inserted as initialized locals of
            // unknown type (spec.md §4.3).
            for param in params {
                table.define(*param, None, *line);
            }
            collect_block(body, table);
        }
        Stmt::Return { .. } => {}
        Stmt::Global { names, line } => {
            // `global x` marks `x` as shared-with-outer-scope, suppressing
            // the would-be use-before-def error for it inside this function
            // (spec.md §4.3). In this flat, non-nested table that is simply
            // "mark it defined here."
            for name in names {
                table.define(*name, None, *line);
            }
        }
        Stmt::Break { .. } | Stmt::Continue { .. } => {}
        Stmt::Try {
            try_block,
            excepts,
            ..
        } => {
            collect_block(try_block, table);
            for (exc_name, except_block) in excepts {
                if let Some(name) = exc_name {
                    table.define(*name, None, except_block.statements.first().map(|s| s.line()).unwrap_or(0));
                }
                collect_block(except_block, table);
            }
        }
    }
}

fn check_block(block: &Block, table: &SymbolTable, diagnostics: &mut Vec<SemanticDiagnostic>) {
    for stmt in &block.statements {
        check_stmt(stmt, table, diagnostics);
    }
}

fn check_stmt(stmt: &Stmt, table: &SymbolTable, diagnostics: &mut Vec<SemanticDiagnostic>) {
    match stmt {
        Stmt::Assignment { expr, .. } => check_expr(expr, table, diagnostics),
        Stmt::IndexAssignment {
            target,
            index,
            value,
            ..
        } => {
            check_expr(target, table, diagnostics);
            check_expr(index, table, diagnostics);
            check_expr(value, table, diagnostics);
        }
        Stmt::Print { expr, .. } => check_expr(expr, table, diagnostics),
        Stmt::If {
            cond,
            then_block,
            elifs,
            else_block,
            ..
        } => {
            check_expr(cond, table, diagnostics);
            check_block(then_block, table, diagnostics);
            for (elif_cond, elif_block) in elifs {
                check_expr(elif_cond, table, diagnostics);
                check_block(elif_block, table, diagnostics);
            }
            if let Some(else_block) = else_block {
                check_block(else_block, table, diagnostics);
            }
        }
        Stmt::While { cond, block, .. } => {
            check_expr(cond, table, diagnostics);
            check_block(block, table, diagnostics);
        }
        Stmt::For {
            iterable, block, ..
        } => {
            check_expr(iterable, table, diagnostics);
            check_block(block, table, diagnostics);
        }
        Stmt::Function { body, .. } => check_block(body, table, diagnostics),
        Stmt::Return { expr, .. } => {
            if let Some(expr) = expr {
                check_expr(expr, table, diagnostics);
            }
        }
        Stmt::Global { .. } => {}
        Stmt::Del { target, .. } => check_expr(target, table, diagnostics),
        Stmt::Break { .. } | Stmt::Continue { .. } => {}
        Stmt::Try {
            try_block, excepts, ..
        } => {
            check_block(try_block, table, diagnostics);
            for (_, except_block) in excepts {
                check_block(except_block, table, diagnostics);
            }
        }
        Stmt::Expr { expr, .. } => check_expr(expr, table, diagnostics),
    }
}

fn check_expr(expr: &Expr, table: &SymbolTable, diagnostics: &mut Vec<SemanticDiagnostic>) {
    match &expr.kind {
        ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Str(_) | ExprKind::Bool(_) => {}
        ExprKind::Identifier(name) => check_identifier(*name, expr.line, table, diagnostics),
        ExprKind::List(elements) => {
            for element in elements {
                check_expr(element, table, diagnostics);
            }
        }
        ExprKind::Dict(items) => {
            for (key, value) in items {
                check_expr(key, table, diagnostics);
                check_expr(value, table, diagnostics);
            }
        }
        ExprKind::Index { target, index } => {
            check_expr(target, table, diagnostics);
            check_expr(index, table, diagnostics);
        }
        ExprKind::Call { callee, args } => {
            // A dotted call's base (`lista.append(...)`) reads the variable
            // it's called on; a plain call name may be a builtin
            // (`len`, `range`) or a user function and is not itself
            // required to appear as a read-checked variable.
            if let Callee::Dotted(base, _) = callee {
                check_identifier(*base, expr.line, table, diagnostics);
            }
            for arg in args {
                check_expr(arg, table, diagnostics);
            }
        }
        ExprKind::BinaryOp { left, right, .. } => {
            check_expr(left, table, diagnostics);
            check_expr(right, table, diagnostics);
        }
        ExprKind::UnaryOp { operand, .. } => check_expr(operand, table, diagnostics),
    }
}

fn check_identifier(
    name: Symbol,
    line: u32,
    table: &SymbolTable,
    diagnostics: &mut Vec<SemanticDiagnostic>,
) {
    if !table.contains(name) {
        diagnostics.push(SemanticDiagnostic {
            line,
            message: format!("variable '{name}' no definida"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tacc_par::Parser;

    fn analyze_src(src: &str) -> AnalysisResult {
        let program = Parser::parse_source(src).unwrap();
        analyze(&program)
    }

    #[test]
    fn undefined_variable_is_reported_with_its_line() {
        let result = analyze_src("y = undefined + 1\n");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line, 1);
        assert!(result.diagnostics[0].message.contains("undefined"));
    }

    #[test]
    fn well_formed_program_has_no_diagnostics() {
        let result = analyze_src("x = 1\nprint(x)\n");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn function_parameters_are_defined_inside_the_body() {
        let result = analyze_src("def f(n):\n    return n + 1\n");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn variable_assigned_only_in_a_not_taken_branch_is_still_defined() {
        let result = analyze_src(
            "if False:\n    x = 1\nelse:\n    print(0)\nprint(x)\n",
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn global_suppresses_use_before_def_inside_function() {
        let result = analyze_src(
            "contador = 0\ndef inc():\n    global contador\n    contador = contador + 1\n",
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn forward_reference_to_a_later_assignment_is_accepted_flow_insensitively() {
        let result = analyze_src("print(x)\nx = 1\n");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn duplicate_analysis_yields_an_equivalent_table() {
        let program = Parser::parse_source("x = 1\ny = x + 1\n").unwrap();
        let first = analyze(&program);
        let second = analyze(&program);
        assert_eq!(first.table.len(), second.table.len());
        assert!(first.diagnostics.is_empty() && second.diagnostics.is_empty());
    }

    #[test]
    fn dotted_append_call_checks_its_base_variable() {
        let result = analyze_src("lista.append(1)\n");
        assert_eq!(result.diagnostics.len(), 1);
    }
}
