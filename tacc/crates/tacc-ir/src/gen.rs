//! AST → TAC syntax-directed translation, per spec.md §4.4.
//!
//! Each `gen_expr` call is the reference design's "visit": it emits whatever
//! instructions the subexpression needs and returns the `Operand` holding its
//! value. `gen_stmt` emits and returns nothing. Grounded on the
//! visit-returns-operand shape of `faxc-mir::lower::hir_to_mir`, adapted to
//! the flat temp/label-counter model this IR actually uses (no `IndexVec`-
//! of-locals, no basic blocks — one flat `Vec<TacInstruction>`, per
//! spec.md §3).

use std::collections::HashMap;

use tacc_par::ast::{BinOp, Block, Callee, Expr, ExprKind, Program, Stmt, UnOp};
use tacc_util::Symbol;

use crate::tac::{Label, Opcode, Operand, Tac, TacInstruction};

/// The generator's output: the flat TAC vector plus, per spec.md §9's first
/// Open Question, each function's declared parameter list recorded at
/// definition time. `tacc-vm`'s `CALL` handler does not consult this table
/// (see DESIGN.md) — it is tracked here so a correcting implementation has
/// something to switch to without re-deriving it from the AST.
pub struct GeneratedProgram {
    pub tac: Tac,
    pub functions: HashMap<Symbol, Vec<Symbol>>,
}

pub struct Generator {
    tac: Tac,
    temp_counter: u32,
    label_counter: u32,
    functions: HashMap<Symbol, Vec<Symbol>>,
}

impl Generator {
    pub fn new() -> Self {
        Self {
            tac: Tac::new(),
            temp_counter: 0,
            label_counter: 0,
            functions: HashMap::new(),
        }
    }

    pub fn generate(program: &Program) -> GeneratedProgram {
        let mut gen = Generator::new();
        for stmt in &program.statements {
            gen.gen_stmt(stmt);
        }
        GeneratedProgram {
            tac: gen.tac,
            functions: gen.functions,
        }
    }

    fn new_temp(&mut self) -> Operand {
        let t = Operand::Temp(self.temp_counter);
        self.temp_counter += 1;
        t
    }

    fn new_label(&mut self) -> Label {
        let l = Label::Numbered(self.label_counter);
        self.label_counter += 1;
        l
    }

    fn emit(&mut self, op: Opcode, arg1: Option<Operand>, arg2: Option<Operand>, result: Option<Operand>) {
        self.tac.push(TacInstruction::new(op, arg1, arg2, result));
    }

    fn emit_label(&mut self, label: Label) {
        self.emit(Opcode::Label, Some(Operand::Label(label)), None, None);
    }

    fn emit_goto(&mut self, label: Label) {
        self.emit(Opcode::Goto, Some(Operand::Label(label)), None, None);
    }

    fn gen_block(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assignment { name, expr, .. } => {
                let value = self.gen_expr(expr);
                self.emit(Opcode::Assign, Some(value), None, Some(Operand::Name(*name)));
            }
            Stmt::IndexAssignment {
                target,
                index,
                value,
                ..
            } => {
                let target_op = self.gen_expr(target);
                let index_op = self.gen_expr(index);
                let value_op = self.gen_expr(value);
                self.emit(Opcode::ListSet, Some(target_op), Some(index_op), Some(value_op));
            }
            Stmt::Print { expr, .. } => {
                let value = self.gen_expr(expr);
                self.emit(Opcode::Print, Some(value), None, None);
            }
            Stmt::If {
                cond,
                then_block,
                elifs,
                else_block,
                ..
            } => self.gen_if(cond, then_block, elifs, else_block),
            Stmt::While { cond, block, .. } => self.gen_while(cond, block),
            Stmt::For {
                name,
                iterable,
                block,
                ..
            } => self.gen_for(*name, iterable, block),
            Stmt::Function {
                name, params, body, ..
            } => self.gen_function(*name, params, body),
            Stmt::Return { expr, .. } => {
                let value = expr.as_ref().map(|e| self.gen_expr(e));
                self.emit(Opcode::Return, value, None, None);
            }
            Stmt::Global { .. } => {
                // `global` only affects the semantic analyzer's use-before-def
                // check (spec.md §4.3); it lowers to nothing at the TAC level.
            }
            Stmt::Del { target, .. } => self.gen_del(target),
            Stmt::Break { .. } => self.emit(Opcode::Break, None, None, None),
            Stmt::Continue { .. } => self.emit(Opcode::Continue, None, None, None),
            Stmt::Try {
                try_block,
                excepts,
                ..
            } => self.gen_try(try_block, excepts),
            Stmt::Expr { expr, .. } => {
                self.gen_expr(expr);
            }
        }
    }

    fn gen_if(
        &mut self,
        cond: &Expr,
        then_block: &Block,
        elifs: &[(Expr, Block)],
        else_block: &Option<Block>,
    ) {
        let end_label = self.new_label();

        let cond_op = self.gen_expr(cond);
        let next_label = self.new_label();
        self.emit(Opcode::IfFalse, Some(cond_op), Some(Operand::Label(next_label)), None);
        self.gen_block(then_block);
        self.emit_goto(end_label);
        self.emit_label(next_label);

        for (elif_cond, elif_block) in elifs {
            let cond_op = self.gen_expr(elif_cond);
            let next_label = self.new_label();
            self.emit(Opcode::IfFalse, Some(cond_op), Some(Operand::Label(next_label)), None);
            self.gen_block(elif_block);
            self.emit_goto(end_label);
            self.emit_label(next_label);
        }

        if let Some(else_block) = else_block {
            self.gen_block(else_block);
        }

        self.emit_label(end_label);
    }

    fn gen_while(&mut self, cond: &Expr, block: &Block) {
        let start_label = self.new_label();
        let end_label = self.new_label();

        self.emit_label(start_label);
        let cond_op = self.gen_expr(cond);
        self.emit(Opcode::IfFalse, Some(cond_op), Some(Operand::Label(end_label)), None);
        self.gen_block(block);
        self.emit_goto(start_label);
        self.emit_label(end_label);
    }

    /// `Callee::Name("range")` with exactly one argument is the counter-loop
    /// form (spec.md §4.2/§4.4); anything else is a general iterable.
    fn range_arg<'e>(iterable: &'e Expr) -> Option<&'e Expr> {
        match &iterable.kind {
            ExprKind::Call {
                callee: Callee::Name(name),
                args,
            } if name.as_str() == "range" && args.len() == 1 => Some(&args[0]),
            _ => None,
        }
    }

    fn gen_for(&mut self, name: Symbol, iterable: &Expr, block: &Block) {
        if let Some(limit_expr) = Self::range_arg(iterable) {
            self.gen_for_range(name, limit_expr, block);
        } else {
            self.gen_for_iterable(name, iterable, block);
        }
    }

    // For (range form) → ASSIGN(0,–,counter); LABEL start; LT(counter,
    // limit, t); IF_FALSE(t,end); body; ADD(counter,1,t2); ASSIGN(t2,–,
    // counter); GOTO start; LABEL end.
    fn gen_for_range(&mut self, name: Symbol, limit_expr: &Expr, block: &Block) {
        let limit = self.gen_expr(limit_expr);
        let counter = Operand::Name(name);
        self.emit(Opcode::Assign, Some(Operand::int(0)), None, Some(counter.clone()));

        let start_label = self.new_label();
        let end_label = self.new_label();
        self.emit_label(start_label);

        let cond = self.new_temp();
        self.emit(
            Opcode::Lt,
            Some(counter.clone()),
            Some(limit),
            Some(cond.clone()),
        );
        self.emit(Opcode::IfFalse, Some(cond), Some(Operand::Label(end_label)), None);

        self.gen_block(block);

        let next = self.new_temp();
        self.emit(
            Opcode::Add,
            Some(counter.clone()),
            Some(Operand::int(1)),
            Some(next.clone()),
        );
        self.emit(Opcode::Assign, Some(next), None, Some(counter));

        self.emit_goto(start_label);
        self.emit_label(end_label);
    }

    // For (general iterable) → call `len` into a temp; same loop shape, with
    // LIST_GET(iterable, counter, name) at body entry.
    fn gen_for_iterable(&mut self, name: Symbol, iterable: &Expr, block: &Block) {
        let iterable_op = self.gen_expr(iterable);
        let limit = self.new_temp();
        self.emit(
            Opcode::Call,
            Some(Operand::Name(Symbol::intern("len"))),
            Some(Operand::ArgList(vec![iterable_op.clone()])),
            Some(limit.clone()),
        );

        let counter = self.new_temp();
        self.emit(Opcode::Assign, Some(Operand::int(0)), None, Some(counter.clone()));

        let start_label = self.new_label();
        let end_label = self.new_label();
        self.emit_label(start_label);

        let cond = self.new_temp();
        self.emit(
            Opcode::Lt,
            Some(counter.clone()),
            Some(limit),
            Some(cond.clone()),
        );
        self.emit(Opcode::IfFalse, Some(cond), Some(Operand::Label(end_label)), None);

        self.emit(
            Opcode::ListGet,
            Some(iterable_op),
            Some(counter.clone()),
            Some(Operand::Name(name)),
        );

        self.gen_block(block);

        let next = self.new_temp();
        self.emit(
            Opcode::Add,
            Some(counter.clone()),
            Some(Operand::int(1)),
            Some(next.clone()),
        );
        self.emit(Opcode::Assign, Some(next), None, Some(counter));

        self.emit_goto(start_label);
        self.emit_label(end_label);
    }

    fn gen_function(&mut self, name: Symbol, params: &[Symbol], body: &Block) {
        self.functions.insert(name, params.to_vec());
        self.emit_label(Label::Function(name));
        self.gen_block(body);
        self.emit(Opcode::Return, None, None, None);
    }

    fn gen_del(&mut self, target: &Expr) {
        match &target.kind {
            ExprKind::Index { target, index } => {
                let base = self.gen_expr(target);
                let idx = self.gen_expr(index);
                self.emit(Opcode::Del, Some(base), Some(idx), None);
            }
            ExprKind::Identifier(name) => {
                self.emit(Opcode::Del, Some(Operand::Name(*name)), None, None);
            }
            _ => unreachable!("parser only accepts identifiers or index targets for `del`"),
        }
    }

    // Try → LABEL try; try_block; GOTO end; LABEL except; except_blocks in
    // order; LABEL end.
    fn gen_try(&mut self, try_block: &Block, excepts: &[(Option<Symbol>, Block)]) {
        let try_label = self.new_label();
        let except_label = self.new_label();
        let end_label = self.new_label();

        self.emit_label(try_label);
        self.gen_block(try_block);
        self.emit_goto(end_label);

        self.emit_label(except_label);
        for (_name, except_block) in excepts {
            self.gen_block(except_block);
        }

        self.emit_label(end_label);
    }

    fn gen_expr(&mut self, expr: &Expr) -> Operand {
        match &expr.kind {
            ExprKind::Int(v) => Operand::int(*v),
            ExprKind::Float(v) => Operand::float(*v),
            ExprKind::Str(s) => Operand::string(s.clone()),
            ExprKind::Bool(b) => Operand::boolean(*b),
            ExprKind::Identifier(name) => Operand::Name(*name),
            ExprKind::List(elements) => self.gen_list(elements),
            ExprKind::Dict(items) => self.gen_dict(items),
            ExprKind::Index { target, index } => self.gen_index(target, index),
            ExprKind::Call { callee, args } => self.gen_call(callee, args),
            ExprKind::BinaryOp { op, left, right } => self.gen_binop(*op, left, right),
            ExprKind::UnaryOp { op, operand } => self.gen_unop(*op, operand),
        }
    }

    fn gen_list(&mut self, elements: &[Expr]) -> Operand {
        let temp = self.new_temp();
        self.emit(Opcode::ListCreate, None, None, Some(temp.clone()));
        for element in elements {
            let value = self.gen_expr(element);
            self.emit(Opcode::ListAppend, Some(temp.clone()), Some(value), None);
        }
        temp
    }

    fn gen_dict(&mut self, items: &[(Expr, Expr)]) -> Operand {
        let temp = self.new_temp();
        self.emit(Opcode::DictCreate, None, None, Some(temp.clone()));
        for (key, value) in items {
            let key_op = self.gen_expr(key);
            let value_op = self.gen_expr(value);
            self.emit(Opcode::DictSet, Some(temp.clone()), Some(key_op), Some(value_op));
        }
        temp
    }

    fn gen_index(&mut self, target: &Expr, index: &Expr) -> Operand {
        let target_op = self.gen_expr(target);
        let index_op = self.gen_expr(index);
        let temp = self.new_temp();
        self.emit(Opcode::ListGet, Some(target_op), Some(index_op), Some(temp.clone()));
        temp
    }

    fn gen_binop(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Operand {
        let left_op = self.gen_expr(left);
        let right_op = self.gen_expr(right);
        let temp = self.new_temp();
        let opcode = match op {
            BinOp::Add => Opcode::Add,
            BinOp::Sub => Opcode::Sub,
            BinOp::Mul => Opcode::Mul,
            BinOp::Div => Opcode::Div,
            BinOp::Mod => Opcode::Mod,
            BinOp::Eq => Opcode::Eq,
            BinOp::Ne => Opcode::Neq,
            BinOp::Lt => Opcode::Lt,
            BinOp::Gt => Opcode::Gt,
            BinOp::Le => Opcode::Lte,
            BinOp::Ge => Opcode::Gte,
        };
        self.emit(opcode, Some(left_op), Some(right_op), Some(temp.clone()));
        temp
    }

    fn gen_unop(&mut self, op: UnOp, operand: &Expr) -> Operand {
        let operand_op = self.gen_expr(operand);
        let temp = self.new_temp();
        match op {
            UnOp::Neg => self.emit(Opcode::Neg, Some(operand_op), None, Some(temp.clone())),
        }
        temp
    }

    fn gen_call(&mut self, callee: &Callee, args: &[Expr]) -> Operand {
        match callee {
            // `range` is only meaningful as a `for` iterable (spec.md
            // §4.4); elsewhere it is transparent and just returns its
            // argument's operand with no emission.
            Callee::Name(name) if name.as_str() == "range" && args.len() == 1 => {
                self.gen_expr(&args[0])
            }
            Callee::Name(name) => {
                let arg_ops: Vec<Operand> = args.iter().map(|a| self.gen_expr(a)).collect();
                let temp = self.new_temp();
                self.emit(
                    Opcode::Call,
                    Some(Operand::Name(*name)),
                    Some(Operand::ArgList(arg_ops)),
                    Some(temp.clone()),
                );
                temp
            }
            Callee::Dotted(base, method) if method.as_str() == "append" => {
                let value = self.gen_expr(&args[0]);
                self.emit(Opcode::ListAppend, Some(Operand::Name(*base)), Some(value), None);
                Operand::Name(*base)
            }
            // No other dotted method is defined by spec.md §4.2/§4.4; fall
            // back to a generic call named by the dotted form so an
            // unrecognized method surfaces as an unknown-callee runtime
            // error rather than a generator panic.
            Callee::Dotted(base, method) => {
                let callee_name = Symbol::intern(&format!("{base}.{method}"));
                let arg_ops: Vec<Operand> = args.iter().map(|a| self.gen_expr(a)).collect();
                let temp = self.new_temp();
                self.emit(
                    Opcode::Call,
                    Some(Operand::Name(callee_name)),
                    Some(Operand::ArgList(arg_ops)),
                    Some(temp.clone()),
                );
                temp
            }
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tacc_par::Parser;

    fn generate(src: &str) -> Tac {
        let program = Parser::parse_source(src).unwrap();
        Generator::generate(&program).tac
    }

    #[test]
    fn simple_addition_and_print() {
        let tac = generate("x = 1 + 2\nprint(x)\n");
        let listing = tac.listing();
        assert!(listing.contains("t0 = 1 + 2"));
        assert!(listing.contains("x = t0"));
        assert!(listing.contains("print(x)"));
    }

    #[test]
    fn list_literal_lowers_to_create_then_appends() {
        let tac = generate("lista = [5, 7]\n");
        let listing = tac.listing();
        assert!(listing.contains("= []"));
        assert!(listing.contains(".append(5)"));
        assert!(listing.contains(".append(7)"));
    }

    #[test]
    fn if_else_emits_if_false_goto_and_end_label() {
        let tac = generate("if x:\n    print(1)\nelse:\n    print(0)\n");
        let listing = tac.listing();
        assert!(listing.contains("if_false"));
        assert!(listing.contains("goto"));
    }

    #[test]
    fn every_goto_target_resolves_to_a_label() {
        let tac = generate(
            "x = 10\nif x > 5:\n    print(1)\nelse:\n    print(0)\n",
        );
        let labels = tac.label_index();
        for instr in &tac.instructions {
            if let crate::tac::Opcode::Goto = instr.op {
                if let Some(Operand::Label(target)) = &instr.arg1 {
                    assert!(labels.contains_key(target), "unresolved goto target {target}");
                }
            }
            if let crate::tac::Opcode::IfFalse = instr.op {
                if let Some(Operand::Label(target)) = &instr.arg2 {
                    assert!(labels.contains_key(target), "unresolved if_false target {target}");
                }
            }
        }
    }

    #[test]
    fn range_for_lowers_to_counter_loop_using_the_loop_variable() {
        let tac = generate("for i in range(3):\n    print(i)\n");
        let listing = tac.listing();
        assert!(listing.contains("i = 0"));
        assert!(listing.contains("i < 3") || listing.contains("i < t"));
    }

    #[test]
    fn general_iterable_for_binds_loop_var_via_list_get() {
        let tac = generate("for x in lista:\n    print(x)\n");
        let listing = tac.listing();
        assert!(listing.contains("len"));
        assert!(listing.contains("x = lista[t"));
    }

    #[test]
    fn function_definition_wraps_body_in_label_and_trailing_return() {
        let tac = generate("def factorial(n):\n    return n\n");
        assert!(matches!(tac.instructions[0].op, crate::tac::Opcode::Label));
        assert!(matches!(
            tac.instructions.last().unwrap().op,
            crate::tac::Opcode::Return
        ));
    }

    #[test]
    fn function_parameter_list_is_recorded() {
        let program = Parser::parse_source("def add(a, b):\n    return a + b\n").unwrap();
        let generated = Generator::generate(&program);
        let params = generated.functions.get(&Symbol::intern("add")).unwrap();
        assert_eq!(params, &vec![Symbol::intern("a"), Symbol::intern("b")]);
    }

    #[test]
    fn index_assignment_stores_value_in_result_field() {
        let tac = generate("lista[1] = 7\n");
        let last = tac.instructions.last().unwrap();
        assert!(matches!(last.op, crate::tac::Opcode::ListSet));
        assert_eq!(last.result, Some(Operand::int(7)));
    }

    #[test]
    fn del_with_index_carries_target_and_index() {
        let tac = generate("del lista[0]\n");
        let last = tac.instructions.last().unwrap();
        assert!(matches!(last.op, crate::tac::Opcode::Del));
        assert!(last.arg2.is_some());
    }

    #[test]
    fn del_without_index_has_no_arg2() {
        let tac = generate("del x\n");
        let last = tac.instructions.last().unwrap();
        assert!(matches!(last.op, crate::tac::Opcode::Del));
        assert!(last.arg2.is_none());
    }
}
