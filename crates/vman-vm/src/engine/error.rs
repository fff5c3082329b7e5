//! Errors that stop execution.

use vman_bytecode::{DecodeError, OutOfBounds};

use super::registers::REGISTER_COUNT;

/// Fault that moves the VM into its terminal `Faulted` state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// DIV or MOD with a zero divisor. `register` is the divisor register,
    /// `value` the dividend.
    #[error("division by zero at {pc:#x}: divisor r{register} is 0 (dividend {value})")]
    DivisionByZero { register: u8, value: i32, pc: u64 },

    #[error("register index {index} out of range at {pc:#x} (valid: 0..{REGISTER_COUNT})")]
    RegisterOutOfRange { index: u64, pc: u64 },

    #[error("unknown opcode {opcode:#04x} at {pc:#x}")]
    UnknownOpcode { opcode: u8, pc: u64 },

    #[error("invalid jump target {target} at {pc:#x}")]
    InvalidJumpTarget { target: i32, pc: u64 },

    /// A register used as an image offset holds a negative value.
    #[error("r{register} holds negative image offset {value} at {pc:#x}")]
    NegativeOffset { register: u8, value: i32, pc: u64 },

    #[error("{access} (at {pc:#x})")]
    OutOfBounds { access: OutOfBounds, pc: u64 },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("execution fuel exhausted ({0} instructions)")]
    FuelExhausted(u64),
}

impl RuntimeError {
    /// Arithmetic faults get a separate exit status from the host.
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, RuntimeError::DivisionByZero { .. })
    }

    /// Program counter of the faulting instruction, where known.
    pub fn pc(&self) -> Option<u64> {
        match self {
            RuntimeError::DivisionByZero { pc, .. }
            | RuntimeError::RegisterOutOfRange { pc, .. }
            | RuntimeError::UnknownOpcode { pc, .. }
            | RuntimeError::InvalidJumpTarget { pc, .. }
            | RuntimeError::NegativeOffset { pc, .. }
            | RuntimeError::OutOfBounds { pc, .. } => Some(*pc),
            RuntimeError::Decode(
                DecodeError::PastEnd { pc, .. }
                | DecodeError::Truncated { pc, .. }
                | DecodeError::InvalidParameterTag { pc, .. },
            ) => Some(*pc),
            RuntimeError::FuelExhausted(_) => None,
        }
    }
}
