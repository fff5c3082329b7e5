//! Runtime configuration: compatibility switches and execution limits.

/// What the VM does with a byte that is not in the opcode table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// Skip the byte as a one-byte no-op.
    #[default]
    Nop,
    /// Stop with [`RuntimeError::UnknownOpcode`](super::RuntimeError::UnknownOpcode).
    Fault,
}

/// Second comparand of JIE/JNE.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BranchOperand {
    /// Compare `r[a]` with `r[b]`.
    #[default]
    Register,
    /// Compare `r[a]` with the register whose index is `pc + 2`.
    ///
    /// Older binaries were produced against this behavior. The index is
    /// checked like any other register access, so in practice this faults
    /// unless the branch sits in the first few bytes of the image.
    ProgramCounter,
}

/// Behavior switches for binaries built against older interpreters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Compat {
    pub branch_operand: BranchOperand,
    /// Skip one padding byte after the NFC terminator.
    pub nfc_pad_byte: bool,
    pub unknown_opcode: UnknownOpcodePolicy,
}

impl Compat {
    /// Current semantics.
    pub fn fixed() -> Self {
        Self::default()
    }

    /// Semantics older binaries were built against.
    pub fn legacy() -> Self {
        Self {
            branch_operand: BranchOperand::ProgramCounter,
            nfc_pad_byte: true,
            unknown_opcode: UnknownOpcodePolicy::Nop,
        }
    }

    pub fn branch_operand(mut self, operand: BranchOperand) -> Self {
        self.branch_operand = operand;
        self
    }

    pub fn nfc_pad_byte(mut self, enabled: bool) -> Self {
        self.nfc_pad_byte = enabled;
        self
    }

    pub fn unknown_opcode(mut self, policy: UnknownOpcodePolicy) -> Self {
        self.unknown_opcode = policy;
        self
    }
}

/// Runtime limits for execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of executed instructions (default: unlimited).
    pub(crate) fuel: Option<u64>,
}

impl Limits {
    /// Create limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the instruction budget.
    pub fn fuel(mut self, fuel: u64) -> Self {
        self.fuel = Some(fuel);
        self
    }

    pub fn get_fuel(&self) -> Option<u64> {
        self.fuel
    }
}
