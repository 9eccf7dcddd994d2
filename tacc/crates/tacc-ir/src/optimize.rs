//! Constant folding, copy propagation, and dead-temporary elimination, per
//! spec.md §4.5.
//!
//! Grounded on `faxc-mir::optimize`'s free-function-over-a-mutable-IR shape
//! (`constant_folding`/`copy_propagation`/`dead_code_elimination` run in
//! sequence); this crate's IR is a flat instruction vector rather than a
//! basic-block CFG, so each pass is a linear scan instead of a per-block
//! walk. The div/mod-by-zero "leave the instruction unchanged" rule carries
//! over unchanged, since it matches spec.md exactly.

use crate::tac::{Label, Literal, Opcode, Operand, Tac, TacInstruction};

/// Numeric value used while folding; keeps int/float distinct so
/// `int op int` stays an int literal instead of drifting to float.
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(v) => v as f64,
            Num::Float(v) => v,
        }
    }
}

fn to_num(lit: &Literal) -> Option<Num> {
    match lit {
        Literal::Int(v) => Some(Num::Int(*v)),
        Literal::Float(v) => Some(Num::Float(*v)),
        Literal::Bool(b) => Some(Num::Int(if *b { 1 } else { 0 })),
        Literal::Str(_) => None,
    }
}

/// Run every pass to a fixed point, bounded so a pathological program
/// can't loop forever (spec.md §4.5: "run until fixed point or a fixed
/// bound").
const MAX_ITERATIONS: usize = 32;

pub fn optimize(tac: &Tac) -> Tac {
    let mut instructions = tac.instructions.clone();
    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        changed |= constant_fold(&mut instructions);
        changed |= copy_propagate(&mut instructions);
        changed |= dead_temp_eliminate(&mut instructions);
        if !changed {
            break;
        }
    }
    Tac { instructions }
}

/// For any arithmetic or comparison instruction whose two operands are
/// numeric or boolean literals, replace it with `ASSIGN(literal_result,–,
/// result)`. Division/modulo by a literal zero is left unchanged — the
/// runtime surfaces that error (spec.md §4.5).
fn constant_fold(instructions: &mut [TacInstruction]) -> bool {
    let mut changed = false;
    for instr in instructions.iter_mut() {
        if !instr.op.is_binary_arith_or_cmp() {
            continue;
        }
        let (Some(Operand::Literal(l1)), Some(Operand::Literal(l2))) = (&instr.arg1, &instr.arg2)
        else {
            continue;
        };
        let (Some(n1), Some(n2)) = (to_num(l1), to_num(l2)) else {
            continue;
        };

        let folded = match instr.op {
            Opcode::Add => Some(fold_arith(n1, n2, |a, b| a.wrapping_add(b), |a, b| a + b)),
            Opcode::Sub => Some(fold_arith(n1, n2, |a, b| a.wrapping_sub(b), |a, b| a - b)),
            Opcode::Mul => Some(fold_arith(n1, n2, |a, b| a.wrapping_mul(b), |a, b| a * b)),
            Opcode::Div => {
                if is_zero(n2) {
                    None
                } else {
                    Some(fold_arith(n1, n2, |a, b| a.wrapping_div(b), |a, b| a / b))
                }
            }
            Opcode::Mod => {
                if is_zero(n2) {
                    None
                } else {
                    Some(fold_arith(n1, n2, |a, b| a.wrapping_rem(b), |a, b| a % b))
                }
            }
            Opcode::Eq => Some(Literal::Bool(n1.as_f64() == n2.as_f64())),
            Opcode::Neq => Some(Literal::Bool(n1.as_f64() != n2.as_f64())),
            Opcode::Lt => Some(Literal::Bool(n1.as_f64() < n2.as_f64())),
            Opcode::Gt => Some(Literal::Bool(n1.as_f64() > n2.as_f64())),
            Opcode::Lte => Some(Literal::Bool(n1.as_f64() <= n2.as_f64())),
            Opcode::Gte => Some(Literal::Bool(n1.as_f64() >= n2.as_f64())),
            _ => None,
        };

        if let Some(literal) = folded {
            let result = instr.result.take();
            *instr = TacInstruction::new(Opcode::Assign, Some(Operand::Literal(literal)), None, result);
            changed = true;
        }
    }
    changed
}

fn is_zero(n: Num) -> bool {
    match n {
        Num::Int(v) => v == 0,
        Num::Float(v) => v == 0.0,
    }
}

fn fold_arith(a: Num, b: Num, int_op: impl Fn(i64, i64) -> i64, float_op: impl Fn(f64, f64) -> f64) -> Literal {
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => Literal::Int(int_op(a, b)),
        _ => Literal::Float(float_op(a.as_f64(), b.as_f64())),
    }
}

/// An `ASSIGN(a,–,t)` where `t` is a temporary and `a` is a literal may be
/// inlined into every later read of `t` (spec.md §4.5: conservative, literal
/// sources only).
fn copy_propagate(instructions: &mut [TacInstruction]) -> bool {
    let mut changed = false;
    let mut i = 0;
    while i < instructions.len() {
        let Some((temp, literal)) = literal_assign_target(&instructions[i]) else {
            i += 1;
            continue;
        };
        for later in instructions[i + 1..].iter_mut() {
            if substitute_reads(later, temp, &literal) {
                changed = true;
            }
        }
        i += 1;
    }
    changed
}

fn literal_assign_target(instr: &TacInstruction) -> Option<(u32, Literal)> {
    if instr.op != Opcode::Assign {
        return None;
    }
    let Some(Operand::Temp(temp)) = instr.result else {
        return None;
    };
    let Some(Operand::Literal(literal)) = &instr.arg1 else {
        return None;
    };
    Some((temp, literal.clone()))
}

fn substitute_reads(instr: &mut TacInstruction, temp: u32, literal: &Literal) -> bool {
    let mut changed = false;
    match instr.op {
        Opcode::ListSet | Opcode::DictSet => {
            for slot in [&mut instr.arg1, &mut instr.arg2, &mut instr.result] {
                if let Some(op) = slot {
                    changed |= substitute_operand(op, temp, literal);
                }
            }
        }
        _ => {
            for slot in [&mut instr.arg1, &mut instr.arg2] {
                if let Some(op) = slot {
                    changed |= substitute_operand(op, temp, literal);
                }
            }
        }
    }
    changed
}

fn substitute_operand(op: &mut Operand, temp: u32, literal: &Literal) -> bool {
    match op {
        Operand::Temp(n) if *n == temp => {
            *op = Operand::Literal(literal.clone());
            true
        }
        Operand::ArgList(args) => {
            let mut changed = false;
            for arg in args.iter_mut() {
                changed |= substitute_operand(arg, temp, literal);
            }
            changed
        }
        _ => false,
    }
}

/// An instruction whose `result` is a temporary read by nothing else may be
/// dropped, *except* `CALL` — a call to a user function may have
/// observable side effects (nested `PRINT`, mutation of a shared list/dict)
/// even when its return value goes unused, so it is never eliminated
/// (spec.md §4.5's side-effect-order guarantee).
fn dead_temp_eliminate(instructions: &mut Vec<TacInstruction>) -> bool {
    let before = instructions.len();
    let mut keep = vec![true; instructions.len()];

    for i in 0..instructions.len() {
        if instructions[i].op == Opcode::Call {
            continue;
        }
        let Some(Operand::Temp(temp)) = instructions[i].writes() else {
            continue;
        };
        let used_elsewhere = instructions
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && reads_temp(other, *temp));
        if !used_elsewhere {
            keep[i] = false;
        }
    }

    let mut idx = 0;
    instructions.retain(|_| {
        let k = keep[idx];
        idx += 1;
        k
    });

    instructions.len() != before
}

fn reads_temp(instr: &TacInstruction, temp: u32) -> bool {
    instr.reads().iter().any(|op| operand_reads_temp(op, temp))
}

fn operand_reads_temp(op: &Operand, temp: u32) -> bool {
    match op {
        Operand::Temp(n) => *n == temp,
        Operand::ArgList(args) => args.iter().any(|a| operand_reads_temp(a, temp)),
        _ => false,
    }
}

/// Every `GOTO`/`IF_FALSE` target must still name a `LABEL` present in the
/// vector (spec.md §8). Exposed for tests and for the interpreter's own
/// sanity checks.
pub fn all_jump_targets_resolve(tac: &Tac) -> bool {
    let labels: std::collections::HashSet<Label> = tac
        .instructions
        .iter()
        .filter(|i| i.op == Opcode::Label)
        .filter_map(|i| match &i.arg1 {
            Some(Operand::Label(l)) => Some(*l),
            _ => None,
        })
        .collect();

    tac.instructions.iter().all(|instr| match instr.op {
        Opcode::Goto => matches!(&instr.arg1, Some(Operand::Label(l)) if labels.contains(l)),
        Opcode::IfFalse => matches!(&instr.arg2, Some(Operand::Label(l)) if labels.contains(l)),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::Generator;
    use tacc_par::Parser;

    fn tac_for(src: &str) -> Tac {
        let program = Parser::parse_source(src).unwrap();
        Generator::generate(&program).tac
    }

    #[test]
    fn constant_arithmetic_folds_to_assign() {
        let tac = tac_for("x = 1 + 2\n");
        let opt = optimize(&tac);
        assert!(opt.listing().contains("= 3"));
    }

    #[test]
    fn division_by_zero_literal_is_left_unchanged() {
        let tac = tac_for("x = 1 / 0\n");
        let opt = optimize(&tac);
        assert!(opt.listing().contains("1 / 0"));
    }

    #[test]
    fn optimizer_never_increases_instruction_count() {
        let tac = tac_for("x = 1 + 2 * 3\nprint(x)\n");
        let opt = optimize(&tac);
        assert!(opt.len() <= tac.len());
    }

    #[test]
    fn optimizer_is_idempotent() {
        let tac = tac_for("def f(n):\n    return n + 1\nprint(f(4))\n");
        let once = optimize(&tac);
        let twice = optimize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn dead_unused_temp_is_removed() {
        let tac = tac_for("x = 1\ny = 2 + 3\nprint(x)\n");
        let opt = optimize(&tac);
        assert!(opt.len() < tac.len());
    }

    #[test]
    fn call_result_is_never_eliminated_even_if_unused() {
        let tac = tac_for("def noisy():\n    print(1)\n    return 0\nnoisy()\n");
        let opt = optimize(&tac);
        assert!(opt.listing().contains("noisy"));
    }

    #[test]
    fn jump_targets_still_resolve_after_optimization() {
        let tac = tac_for("if 1 == 1:\n    print(1)\nelse:\n    print(0)\n");
        let opt = optimize(&tac);
        assert!(all_jump_targets_resolve(&opt));
    }

    #[test]
    fn copy_propagation_inlines_literal_into_later_use() {
        let tac = tac_for("x = 2\ny = x + 3\n");
        let opt = optimize(&tac);
        assert!(opt.listing().contains("+ 3"));
    }
}
