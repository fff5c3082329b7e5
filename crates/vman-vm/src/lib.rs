//! Register VM for vman program images.
//!
//! This crate provides the virtual machine that executes a validated
//! [`Program`](vman_bytecode::Program) over a twelve-register file, and the
//! bridge that lets bytecode call functions in native libraries.

pub mod engine;
pub mod native;

// Re-export commonly used items at crate root
pub use engine::{
    BranchOperand, Compat, Limits, NoopTracer, PrintTracer, REGISTER_COUNT, Registers, RunReport,
    RuntimeError, State, Tracer, UnknownOpcodePolicy, VM, VMBuilder, Verbosity,
};
pub use native::{CallOutcome, HostResolver, NativeCallReport, NativeFn, SymbolResolver};
