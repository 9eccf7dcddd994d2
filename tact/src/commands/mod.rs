//! Command modules for the tact CLI.
//!
//! This module contains implementations for all available subcommands.
//! Each subcommand is implemented in its own file following a standardized pattern.

pub mod emit;
pub mod run;

pub use emit::{run_emit, EmitArgs, EmitKindArg};
pub use run::{run_run, RunArgs};
