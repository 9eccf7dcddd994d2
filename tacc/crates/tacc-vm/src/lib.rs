//! The TAC interpreter: reference execution semantics for the pipeline, per
//! spec.md §4.6.

pub mod interp;

pub use interp::{interpret, DictKey, Interpreter, Value};
