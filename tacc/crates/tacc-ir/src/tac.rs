//! The TAC instruction model, per spec.md §3 and the textual grammar in
//! spec.md §6.
//!
//! The reference design encodes every operand as a bare string (a literal's
//! textual form, a variable name, or a synthetic temporary, all mixed in one
//! `String` field) and reparses it at interpretation time. spec.md §9's
//! redesign hint replaces that with a proper `Operand` sum —
//! `Literal | Name | Temp | Label | ArgList` — while keeping the `Display`
//! impl byte-for-byte compatible with the textual listing format, so nothing
//! downstream of the listing (tests, the assembly emitter) needs to change.
//! Grounded on `faxc-mir::mir`'s `Operand`/`Rvalue`/`Constant` split, reduced
//! to a flat instruction vector since spec.md §3 specifies TAC as a single
//! ordered vector, not a basic-block CFG.

use std::fmt;
use tacc_util::Symbol;

/// A literal value as it appears in source or is folded by the optimizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            // Strings are the one place a TAC operand's textual form carries
            // quoting (spec.md §4.1): the decoded value is wrapped back in
            // double quotes when serialized.
            Literal::Str(s) => write!(f, "\"{s}\""),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
        }
    }
}

/// A jump target: either a generator-numbered label (`L0`, `L1`, …) or a
/// function entry label (`func_<name>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Numbered(u32),
    Function(Symbol),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Numbered(n) => write!(f, "L{n}"),
            Label::Function(name) => write!(f, "func_{name}"),
        }
    }
}

/// A TAC operand. Every slot of a `TacInstruction` (`arg1`, `arg2`, `result`)
/// holds one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Literal),
    /// A user-level variable name.
    Name(Symbol),
    /// A compiler-synthesized single-assignment temporary (`t0`, `t1`, …).
    Temp(u32),
    Label(Label),
    /// The comma-joined argument list of a user function `CALL` (spec.md
    /// §4.4); kept as a `Vec<Operand>` rather than a pre-joined string so the
    /// interpreter never has to re-split and re-resolve a flat string.
    ArgList(Vec<Operand>),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(lit) => write!(f, "{lit}"),
            Operand::Name(name) => write!(f, "{name}"),
            Operand::Temp(n) => write!(f, "t{n}"),
            Operand::Label(label) => write!(f, "{label}"),
            Operand::ArgList(args) => {
                let joined = args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{joined}")
            }
        }
    }
}

impl Operand {
    pub fn int(v: i64) -> Self {
        Operand::Literal(Literal::Int(v))
    }

    pub fn float(v: f64) -> Self {
        Operand::Literal(Literal::Float(v))
    }

    pub fn string(v: impl Into<String>) -> Self {
        Operand::Literal(Literal::Str(v.into()))
    }

    pub fn boolean(v: bool) -> Self {
        Operand::Literal(Literal::Bool(v))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Operand::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

/// Every opcode the TAC generator emits, per spec.md §4.4/§6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Print,
    Label,
    Goto,
    IfFalse,
    ListCreate,
    ListAppend,
    ListGet,
    ListSet,
    DictCreate,
    DictSet,
    Call,
    Return,
    Del,
    /// Reserved per spec.md §4.4; unused by the interpreter in this subset.
    Break,
    /// Reserved per spec.md §4.4; unused by the interpreter in this subset.
    Continue,
}

impl Opcode {
    /// The arithmetic/comparison opcodes the optimizer's constant-folding
    /// pass considers (spec.md §4.5).
    pub fn is_binary_arith_or_cmp(self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::Eq
                | Opcode::Neq
                | Opcode::Lt
                | Opcode::Gt
                | Opcode::Lte
                | Opcode::Gte
        )
    }

    /// The infix symbol used in the textual listing (spec.md §6); `None`
    /// for opcodes that don't print as an infix expression.
    fn infix_symbol(self) -> Option<&'static str> {
        Some(match self {
            Opcode::Add => "+",
            Opcode::Sub => "-",
            Opcode::Mul => "*",
            Opcode::Div => "/",
            Opcode::Mod => "%",
            Opcode::Eq => "==",
            Opcode::Neq => "!=",
            Opcode::Lt => "<",
            Opcode::Gt => ">",
            Opcode::Lte => "<=",
            Opcode::Gte => ">=",
            _ => return None,
        })
    }
}

/// One TAC instruction: a quadruple of (op, arg1, arg2, result), per
/// spec.md §3.
///
/// `LIST_SET`'s `result` field irregularly carries the *value* operand
/// rather than a destination (spec.md §4.4, §9) — this is preserved exactly
/// rather than refactored to a 3-arg form, to stay byte-for-byte compatible
/// with the textual grammar in spec.md §6.
#[derive(Debug, Clone, PartialEq)]
pub struct TacInstruction {
    pub op: Opcode,
    pub arg1: Option<Operand>,
    pub arg2: Option<Operand>,
    pub result: Option<Operand>,
}

impl TacInstruction {
    pub fn new(
        op: Opcode,
        arg1: Option<Operand>,
        arg2: Option<Operand>,
        result: Option<Operand>,
    ) -> Self {
        Self {
            op,
            arg1,
            arg2,
            result,
        }
    }

    /// Every operand name this instruction *reads* (used by dead-temporary
    /// elimination and liveness-style analyses, spec.md §4.5). `LIST_SET`'s
    /// `result` is a read here, matching its documented irregular role.
    pub fn reads(&self) -> Vec<&Operand> {
        let mut out = Vec::new();
        match self.op {
            Opcode::Assign => {
                if let Some(a1) = &self.arg1 {
                    out.push(a1);
                }
            }
            Opcode::ListSet | Opcode::DictSet => {
                out.extend(self.arg1.iter());
                out.extend(self.arg2.iter());
                out.extend(self.result.iter());
            }
            _ => {
                out.extend(self.arg1.iter());
                out.extend(self.arg2.iter());
            }
        }
        out
    }

    /// The operand this instruction writes, if any. `LIST_SET`/`DICT_SET`
    /// write into the container named by `arg1`, not into `result` — so
    /// they report no write destination here.
    pub fn writes(&self) -> Option<&Operand> {
        match self.op {
            Opcode::ListSet | Opcode::DictSet => None,
            _ => self.result.as_ref(),
        }
    }
}

impl fmt::Display for TacInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a1 = || self.arg1.as_ref().map(ToString::to_string).unwrap_or_default();
        let a2 = || self.arg2.as_ref().map(ToString::to_string).unwrap_or_default();
        let res = || self.result.as_ref().map(ToString::to_string).unwrap_or_default();

        match self.op {
            Opcode::Assign => write!(f, "{} = {}", res(), a1()),
            op if op.is_binary_arith_or_cmp() => {
                write!(f, "{} = {} {} {}", res(), a1(), op.infix_symbol().unwrap(), a2())
            }
            Opcode::Neg => write!(f, "{} = -{}", res(), a1()),
            Opcode::Print => write!(f, "print({})", a1()),
            Opcode::Label => write!(f, "{}:", a1()),
            Opcode::Goto => write!(f, "goto {}", a1()),
            Opcode::IfFalse => write!(f, "if_false {} goto {}", a1(), a2()),
            Opcode::ListCreate => write!(f, "{} = []", res()),
            Opcode::ListAppend => write!(f, "{}.append({})", a1(), a2()),
            Opcode::ListGet => write!(f, "{} = {}[{}]", res(), a1(), a2()),
            Opcode::ListSet => write!(f, "{}[{}] = {}", a1(), a2(), res()),
            Opcode::DictCreate => write!(f, "{} = {{}}", res()),
            Opcode::DictSet => write!(f, "{}[{}] = {}", a1(), a2(), res()),
            Opcode::Call => write!(f, "{} = {}({})", res(), a1(), a2()),
            Opcode::Return => match &self.arg1 {
                Some(a) => write!(f, "return {a}"),
                None => write!(f, "return"),
            },
            Opcode::Del => match &self.arg2 {
                Some(idx) => write!(f, "del {}[{}]", a1(), idx),
                None => write!(f, "del {}", a1()),
            },
            Opcode::Break => write!(f, "break"),
            Opcode::Continue => write!(f, "continue"),
        }
    }
}

/// A full TAC program: a flat instruction vector, per spec.md §3.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tac {
    pub instructions: Vec<TacInstruction>,
}

impl Tac {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instr: TacInstruction) {
        self.instructions.push(instr);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Render the textual listing described by spec.md §6, one instruction
    /// per line.
    pub fn listing(&self) -> String {
        self.instructions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build a label → instruction-index table. Used by the generator's own
    /// sanity checks and by the interpreter's prepass (spec.md §4.6).
    pub fn label_index(&self) -> std::collections::HashMap<Label, usize> {
        let mut map = std::collections::HashMap::new();
        for (idx, instr) in self.instructions.iter().enumerate() {
            if instr.op == Opcode::Label {
                if let Some(Operand::Label(label)) = &instr.arg1 {
                    map.insert(*label, idx);
                }
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_listing_matches_grammar() {
        let instr = TacInstruction::new(
            Opcode::Assign,
            Some(Operand::int(3)),
            None,
            Some(Operand::Temp(0)),
        );
        assert_eq!(instr.to_string(), "t0 = 3");
    }

    #[test]
    fn binop_listing_uses_infix_symbol() {
        let instr = TacInstruction::new(
            Opcode::Add,
            Some(Operand::Temp(0)),
            Some(Operand::Temp(1)),
            Some(Operand::Temp(2)),
        );
        assert_eq!(instr.to_string(), "t2 = t0 + t1");
    }

    #[test]
    fn list_set_prints_result_as_the_value_not_a_destination() {
        let instr = TacInstruction::new(
            Opcode::ListSet,
            Some(Operand::Name(Symbol::intern("lista"))),
            Some(Operand::int(1)),
            Some(Operand::int(7)),
        );
        assert_eq!(instr.to_string(), "lista[1] = 7");
    }

    #[test]
    fn return_with_no_argument_omits_operand() {
        let instr = TacInstruction::new(Opcode::Return, None, None, None);
        assert_eq!(instr.to_string(), "return");
    }

    #[test]
    fn string_literal_round_trips_through_quotes() {
        let op = Operand::string("hi");
        assert_eq!(op.to_string(), "\"hi\"");
    }

    #[test]
    fn function_label_uses_func_prefix() {
        let label = Label::Function(Symbol::intern("factorial"));
        assert_eq!(label.to_string(), "func_factorial");
    }

    #[test]
    fn label_index_maps_numbered_and_function_labels() {
        let mut tac = Tac::new();
        tac.push(TacInstruction::new(
            Opcode::Label,
            Some(Operand::Label(Label::Numbered(0))),
            None,
            None,
        ));
        tac.push(TacInstruction::new(Opcode::Return, None, None, None));
        let idx = tac.label_index();
        assert_eq!(idx.get(&Label::Numbered(0)), Some(&0));
    }
}
