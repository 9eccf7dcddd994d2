//! The assembly emitter, per SPEC_FULL.md §4.7.
//!
//! A thin, mechanical walk over optimized TAC that performs no optimization
//! and defines none of the language's semantics (spec.md §1) — it exists
//! only so spec.md §8's assembly-emission property is checkable. Grounded
//! directly on `faxc_gen::asm::{AsmGenerator, RegisterAllocator, Location}`,
//! whose shape is kept (a stack-relative `RegisterAllocator` plus a
//! `PhysReg`/`Stack` `Location` enum) but whose body — previously a stub
//! (`generate_function` held a bare `// Assembly generation logic` comment)
//! — is filled in here, since spec.md §8 names a concrete testable property
//! for its output. `StackFrame`'s offset/alignment shape is adapted from
//! `faxc_lir::stack_frame::StackFrame`, reduced to one flat frame per
//! function (no register spilling, so no separate spill-slot bookkeeping).

use indexmap::IndexMap;
use tacc_util::Symbol;

use tacc_ir::{Label, Opcode, Operand, Tac, TacInstruction};

/// A stack slot or scratch register an operand has been assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    PhysReg(&'static str),
    Stack(i32),
}

/// A single key whose lifetime is local to one stack frame: a variable name
/// or a compiler temporary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LocalKey {
    Name(Symbol),
    Temp(u32),
}

fn local_key(op: &Operand) -> Option<LocalKey> {
    match op {
        Operand::Name(name) => Some(LocalKey::Name(*name)),
        Operand::Temp(n) => Some(LocalKey::Temp(*n)),
        _ => None,
    }
}

/// Per-function stack layout: each local gets one 8-byte, 16-byte-aligned
/// slot below the saved frame pointer, assigned in first-use order.
pub struct RegisterAllocator {
    pub allocation: IndexMap<LocalKey, i32>,
    pub frame_size: u32,
}

impl RegisterAllocator {
    fn new() -> Self {
        Self {
            allocation: IndexMap::new(),
            frame_size: 0,
        }
    }

    fn location_for(&mut self, key: LocalKey) -> Location {
        if let Some(&offset) = self.allocation.get(&key) {
            return Location::Stack(offset);
        }
        let offset = -(8 * (self.allocation.len() as i32 + 1));
        self.allocation.insert(key, offset);
        self.frame_size = ((self.allocation.len() as u32 * 8 + 15) / 16) * 16;
        Location::Stack(offset)
    }
}

impl Default for RegisterAllocator {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AsmGenerator {
    pub output: String,
    pub indent: usize,
    pub reg_alloc: RegisterAllocator,
}

const SCRATCH_A: &str = "rax";
const SCRATCH_B: &str = "rbx";

impl AsmGenerator {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 1,
            reg_alloc: RegisterAllocator::new(),
        }
    }

    /// Emit the textual assembly listing for an entire TAC program.
    pub fn generate(tac: &Tac) -> String {
        let mut gen = AsmGenerator::new();
        for instr in &tac.instructions {
            gen.generate_instruction(instr);
        }
        gen.output
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    /// Load an operand's value into a scratch register, emitting a
    /// stack-pointer-relative load when the operand is a local.
    fn load(&mut self, op: Option<&Operand>, scratch: &'static str) {
        let Some(op) = op else { return };
        match local_key(op) {
            Some(key) => match self.reg_alloc.location_for(key) {
                Location::Stack(offset) => {
                    self.line(&format!("mov {scratch}, [rbp{offset:+}]"));
                }
                Location::PhysReg(other) => self.line(&format!("mov {scratch}, {other}")),
            },
            None => self.line(&format!("mov {scratch}, {op}")),
        }
    }

    fn store(&mut self, op: Option<&Operand>, scratch: &'static str) {
        let Some(op) = op else { return };
        if let Some(key) = local_key(op) {
            match self.reg_alloc.location_for(key) {
                Location::Stack(offset) => {
                    self.line(&format!("mov [rbp{offset:+}], {scratch}"));
                }
                Location::PhysReg(other) => self.line(&format!("mov {other}, {scratch}")),
            }
        }
    }

    fn generate_instruction(&mut self, instr: &TacInstruction) {
        match instr.op {
            Opcode::Label => {
                self.indent = 0;
                if let Some(label) = &instr.arg1 {
                    self.line(&format!("{label}:"));
                }
                self.indent = 1;
                if let Some(Operand::Label(Label::Function(_))) = &instr.arg1 {
                    self.reg_alloc = RegisterAllocator::new();
                    self.line("push rbp");
                    self.line("mov rbp, rsp");
                }
            }
            op if op.is_binary_arith_or_cmp() => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.load(instr.arg2.as_ref(), SCRATCH_B);
                self.line(&format!("{} {SCRATCH_A}, {SCRATCH_B}", arith_mnemonic(op)));
                self.store(instr.result.as_ref(), SCRATCH_A);
            }
            Opcode::Assign => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.store(instr.result.as_ref(), SCRATCH_A);
            }
            Opcode::Neg => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.line(&format!("neg {SCRATCH_A}"));
                self.store(instr.result.as_ref(), SCRATCH_A);
            }
            Opcode::Print => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.line("call print_value");
            }
            Opcode::Goto => {
                if let Some(Operand::Label(target)) = &instr.arg1 {
                    self.line(&format!("jmp {target}"));
                }
            }
            Opcode::IfFalse => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.line(&format!("cmp {SCRATCH_A}, 0"));
                if let Some(Operand::Label(target)) = &instr.arg2 {
                    self.line(&format!("je {target}"));
                }
            }
            Opcode::ListCreate | Opcode::DictCreate => {
                self.line("call container_new");
                self.store(instr.result.as_ref(), SCRATCH_A);
            }
            Opcode::ListAppend => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.load(instr.arg2.as_ref(), SCRATCH_B);
                self.line("call list_append");
            }
            Opcode::ListGet => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.load(instr.arg2.as_ref(), SCRATCH_B);
                self.line("call container_get");
                self.store(instr.result.as_ref(), SCRATCH_A);
            }
            Opcode::ListSet | Opcode::DictSet => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.load(instr.arg2.as_ref(), SCRATCH_B);
                self.load(instr.result.as_ref(), SCRATCH_A);
                self.line("call container_set");
            }
            Opcode::Call => {
                if let Some(Operand::Name(callee)) = &instr.arg1 {
                    self.line(&format!("call func_{callee}"));
                }
                self.store(instr.result.as_ref(), SCRATCH_A);
            }
            Opcode::Return => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.line("mov rsp, rbp");
                self.line("pop rbp");
                self.line("ret");
            }
            Opcode::Del => {
                self.load(instr.arg1.as_ref(), SCRATCH_A);
                self.line("call container_del");
            }
            Opcode::Break | Opcode::Continue => {}
        }
    }
}

impl Default for AsmGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn arith_mnemonic(op: Opcode) -> &'static str {
    match op {
        Opcode::Add => "add",
        Opcode::Sub => "sub",
        Opcode::Mul => "imul",
        Opcode::Div => "idiv",
        Opcode::Mod => "idiv",
        Opcode::Eq | Opcode::Neq | Opcode::Lt | Opcode::Gt | Opcode::Lte | Opcode::Gte => "cmp",
        _ => unreachable!("arith_mnemonic only called for arithmetic/comparison opcodes"),
    }
}
