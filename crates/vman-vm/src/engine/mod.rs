//! Execution engine.
//!
//! The VM fetches one instruction at a time from the program image, decodes
//! it into a typed record and applies it to the register file. Native calls
//! are delegated to [`crate::native`].

mod config;
mod error;
mod registers;
mod trace;
mod vm;

#[cfg(test)]
mod engine_tests;

pub use config::{BranchOperand, Compat, Limits, UnknownOpcodePolicy};
pub use error::RuntimeError;
pub use registers::{
    FIRST_PARAM_REGISTER, FUNCTION_REGISTER, LIBRARY_REGISTER, REGISTER_COUNT, RESULT_REGISTER,
    Registers,
};
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
pub use vm::{RunReport, State, VM, VMBuilder};
