//! The TAC instruction model, the AST→TAC generator, and the optimizer —
//! kept in one crate, mirroring the teacher's `faxc-mir` (which keeps IR
//! definition, lowering, and optimization together rather than splitting
//! them across crates).

pub mod gen;
pub mod optimize;
pub mod tac;

pub use gen::{GeneratedProgram, Generator};
pub use optimize::{all_jump_targets_resolve, optimize};
pub use tac::{Label, Literal, Opcode, Operand, Tac, TacInstruction};
