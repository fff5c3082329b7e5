//! Virtual machine for executing vman program images.

use vman_bytecode::{BinaryOp, Instruction, Program, mov_value};

use crate::native::{self, HostResolver, SymbolResolver};

use super::config::{BranchOperand, Compat, Limits, UnknownOpcodePolicy};
use super::error::RuntimeError;
use super::registers::{RESULT_REGISTER, Registers};
use super::trace::{NoopTracer, Tracer};

/// Execution state.
#[derive(Clone, Debug, PartialEq)]
pub enum State {
    Running,
    /// The program counter ran off the end of the image.
    Halted(u32),
    /// Execution stopped on a fault and cannot be resumed.
    Faulted(RuntimeError),
}

impl State {
    pub fn is_running(&self) -> bool {
        matches!(self, State::Running)
    }
}

/// Outcome of driving a VM to a terminal state.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub state: State,
    pub registers: Registers,
    pub pc: u64,
    pub steps: u64,
}

/// Virtual machine state for one program.
pub struct VM<'p, R = HostResolver> {
    program: &'p Program,
    registers: Registers,
    pc: u64,
    state: State,
    steps: u64,
    /// Remaining fuel, if limited.
    fuel: Option<u64>,
    limits: Limits,
    compat: Compat,
    resolver: R,
}

/// Builder for VM instances.
pub struct VMBuilder<'p, R = HostResolver> {
    program: &'p Program,
    compat: Compat,
    limits: Limits,
    resolver: R,
}

impl<'p> VMBuilder<'p> {
    /// Create a new VM builder.
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            compat: Compat::default(),
            limits: Limits::default(),
            resolver: HostResolver,
        }
    }
}

impl<'p, R: SymbolResolver> VMBuilder<'p, R> {
    /// Set the compatibility switches.
    pub fn compat(mut self, compat: Compat) -> Self {
        self.compat = compat;
        self
    }

    /// Set the runtime limits.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the instruction budget.
    pub fn fuel(mut self, fuel: u64) -> Self {
        self.limits = self.limits.fuel(fuel);
        self
    }

    /// Set the unknown opcode policy.
    pub fn unknown_opcode(mut self, policy: UnknownOpcodePolicy) -> Self {
        self.compat = self.compat.unknown_opcode(policy);
        self
    }

    /// Use a different symbol resolver for native calls.
    pub fn resolver<S: SymbolResolver>(self, resolver: S) -> VMBuilder<'p, S> {
        VMBuilder {
            program: self.program,
            compat: self.compat,
            limits: self.limits,
            resolver,
        }
    }

    /// Build the VM.
    pub fn build(self) -> VM<'p, R> {
        VM {
            program: self.program,
            registers: Registers::new(),
            pc: self.program.entry_point(),
            state: State::Running,
            steps: 0,
            fuel: self.limits.get_fuel(),
            limits: self.limits,
            compat: self.compat,
            resolver: self.resolver,
        }
    }
}

impl<'p> VM<'p> {
    /// Create a VM builder.
    pub fn builder(program: &'p Program) -> VMBuilder<'p> {
        VMBuilder::new(program)
    }
}

impl<'p, R: SymbolResolver> VM<'p, R> {
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn pc(&self) -> u64 {
        self.pc
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> &State {
        self.step_with(&mut NoopTracer)
    }

    /// Execute one instruction with a tracer.
    ///
    /// Does nothing once the VM has halted or faulted.
    pub fn step_with<T: Tracer>(&mut self, tracer: &mut T) -> &State {
        if !self.state.is_running() {
            return &self.state;
        }
        if self.at_end() {
            return self.finish(State::Halted(0), tracer);
        }

        if let Some(fuel) = &mut self.fuel {
            if *fuel == 0 {
                let limit = self.limits.get_fuel().unwrap_or(0);
                return self.finish(State::Faulted(RuntimeError::FuelExhausted(limit)), tracer);
            }
            *fuel -= 1;
        }

        let result = self.execute(tracer);
        self.steps += 1;
        match result {
            Err(e) => self.finish(State::Faulted(e), tracer),
            Ok(()) if self.at_end() => self.finish(State::Halted(0), tracer),
            Ok(()) => &self.state,
        }
    }

    /// Run to a terminal state.
    ///
    /// Uses `NoopTracer`, which gets optimized away at compile time.
    pub fn run(self) -> RunReport {
        self.run_with(&mut NoopTracer)
    }

    /// Run to a terminal state with a tracer.
    pub fn run_with<T: Tracer>(mut self, tracer: &mut T) -> RunReport {
        tracing::debug!(
            entry = self.pc,
            size = self.program.len(),
            fuel = ?self.limits.get_fuel(),
            "starting execution"
        );
        while self.state.is_running() {
            self.step_with(tracer);
        }
        tracing::debug!(pc = self.pc, steps = self.steps, state = ?self.state, "execution finished");

        RunReport {
            state: self.state,
            registers: self.registers,
            pc: self.pc,
            steps: self.steps,
        }
    }

    fn at_end(&self) -> bool {
        self.pc >= self.program.len() as u64
    }

    fn finish<T: Tracer>(&mut self, state: State, tracer: &mut T) -> &State {
        tracer.trace_halt(&state, self.steps);
        self.state = state;
        &self.state
    }

    fn execute<T: Tracer>(&mut self, tracer: &mut T) -> Result<(), RuntimeError> {
        let pc = self.pc;
        let program = self.program;
        let instr = program.decode_at(pc)?;
        tracer.trace_instruction(pc, &instr);

        let mut next = pc + instr.width() as u64;
        match instr {
            Instruction::Nop => {}
            Instruction::Binary { op, dst, lhs, rhs } => {
                let a = self.read(lhs, pc)?;
                let b = self.read(rhs, pc)?;
                let value = alu(op, a, b).ok_or(RuntimeError::DivisionByZero {
                    register: rhs,
                    value: a,
                    pc,
                })?;
                self.write(dst, value, pc, tracer)?;
            }
            Instruction::Not { dst, src } => {
                let value = !self.read(src, pc)?;
                self.write(dst, value, pc, tracer)?;
            }
            Instruction::Mov { dst, imm } => {
                self.write(dst, mov_value(imm), pc, tracer)?;
            }
            Instruction::Jmp { target } => {
                next = self.jump_target(target, pc)?;
                tracer.trace_jump(next);
            }
            Instruction::Branch {
                cond,
                lhs,
                rhs,
                target,
            } => {
                let a = self.read(lhs, pc)?;
                let b = match self.compat.branch_operand {
                    BranchOperand::Register => self.read(rhs, pc)?,
                    BranchOperand::ProgramCounter => self.read_wide(pc + 2, pc)?,
                };
                let taken = cond.holds(a, b);
                // The opcode byte is consumed by the fetch; three more bytes
                // are skipped from wherever the branch leaves the counter.
                let base = if taken {
                    self.jump_target(target, pc)?
                } else {
                    pc + 1
                };
                next = base + 3;
                tracer.trace_branch(taken, next);
            }
            Instruction::NativeCall(call) => {
                let report =
                    native::invoke(&mut self.resolver, program, &self.registers, call, pc)?;
                tracer.trace_native_call(&report);
                if let Some(value) = report.outcome.register_value() {
                    self.write(RESULT_REGISTER, value, pc, tracer)?;
                }
                if self.compat.nfc_pad_byte {
                    next += 1;
                }
            }
            Instruction::Unknown(opcode) => match self.compat.unknown_opcode {
                UnknownOpcodePolicy::Nop => {
                    tracing::trace!(opcode, pc, "skipping unknown opcode");
                }
                UnknownOpcodePolicy::Fault => {
                    return Err(RuntimeError::UnknownOpcode { opcode, pc });
                }
            },
        }

        self.pc = next;
        Ok(())
    }

    #[inline]
    fn read(&self, index: u8, pc: u64) -> Result<i32, RuntimeError> {
        self.registers
            .get(index)
            .ok_or(RuntimeError::RegisterOutOfRange {
                index: u64::from(index),
                pc,
            })
    }

    /// Read a register addressed by something wider than an operand byte.
    fn read_wide(&self, index: u64, pc: u64) -> Result<i32, RuntimeError> {
        let err = RuntimeError::RegisterOutOfRange { index, pc };
        let index = u8::try_from(index).map_err(|_| err.clone())?;
        self.registers.get(index).ok_or(err)
    }

    #[inline]
    fn write<T: Tracer>(
        &mut self,
        index: u8,
        value: i32,
        pc: u64,
        tracer: &mut T,
    ) -> Result<(), RuntimeError> {
        let slot = self
            .registers
            .get_mut(index)
            .ok_or(RuntimeError::RegisterOutOfRange {
                index: u64::from(index),
                pc,
            })?;
        *slot = value;
        tracer.trace_register_write(index, value);
        Ok(())
    }

    fn jump_target(&self, register: u8, pc: u64) -> Result<u64, RuntimeError> {
        let target = self.read(register, pc)?;
        u64::try_from(target).map_err(|_| RuntimeError::InvalidJumpTarget { target, pc })
    }
}

/// Apply a binary operation; `None` on a zero divisor.
fn alu(op: BinaryOp, a: i32, b: i32) -> Option<i32> {
    if op.divides() && b == 0 {
        return None;
    }
    Some(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => a.wrapping_div(b),
        BinaryOp::Mod => a.wrapping_rem(b),
        BinaryOp::Lsh => a.wrapping_shl(b as u32),
        BinaryOp::Rsh => a.wrapping_shr(b as u32),
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
    })
}
