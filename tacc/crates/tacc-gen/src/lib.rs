//! Mechanical assembly emission over optimized TAC, per SPEC_FULL.md §4.7.
//! Out of scope for language semantics (spec.md §1); exists only to satisfy
//! spec.md §8's assembly-emission testable property.

pub mod asm;

pub use asm::{AsmGenerator, Location, RegisterAllocator};
