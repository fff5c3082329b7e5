//! Tracing infrastructure for stepping through VM execution.
//!
//! The VM is generic over [`Tracer`]. With [`NoopTracer`] every hook is an
//! empty `#[inline(always)]` function and the calls disappear from the
//! execution loop. [`PrintTracer`] collects one line per instruction plus
//! indented sub-lines for what the instruction did.

use vman_bytecode::{Colors, Instruction};

use crate::native::{CallOutcome, NativeCallReport};

use super::vm::State;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Instructions, register writes and the final state.
    #[default]
    Default,
    /// Also control flow decisions and native call details.
    Verbose,
}

/// Tracer trait for VM execution instrumentation.
///
/// Each method is called at a specific point during execution:
/// - `trace_instruction` - after decoding, before applying an instruction
/// - `trace_register_write` - after a register is written
/// - `trace_jump` - after JMP sets the program counter
/// - `trace_branch` - after JIE/JNE evaluate their condition
/// - `trace_native_call` - after an NFC returns (or fails to resolve)
/// - `trace_halt` - once, when the VM reaches a terminal state
pub trait Tracer {
    fn trace_instruction(&mut self, pc: u64, instr: &Instruction<'_>);

    fn trace_register_write(&mut self, index: u8, value: i32);

    fn trace_jump(&mut self, target: u64);

    /// `next` is the program counter after the branch, taken or not.
    fn trace_branch(&mut self, taken: bool, next: u64);

    fn trace_native_call(&mut self, report: &NativeCallReport);

    fn trace_halt(&mut self, state: &State, steps: u64);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_instruction(&mut self, _pc: u64, _instr: &Instruction<'_>) {}

    #[inline(always)]
    fn trace_register_write(&mut self, _index: u8, _value: i32) {}

    #[inline(always)]
    fn trace_jump(&mut self, _target: u64) {}

    #[inline(always)]
    fn trace_branch(&mut self, _taken: bool, _next: u64) {}

    #[inline(always)]
    fn trace_native_call(&mut self, _report: &NativeCallReport) {}

    #[inline(always)]
    fn trace_halt(&mut self, _state: &State, _steps: u64) {}
}

const SUBLINE_INDENT: &str = "        ";

/// Tracer that collects execution trace lines.
pub struct PrintTracer {
    verbosity: Verbosity,
    lines: Vec<String>,
    colors: Colors,
}

impl PrintTracer {
    pub fn new(verbosity: Verbosity, colors: Colors) -> Self {
        Self {
            verbosity,
            lines: Vec::new(),
            colors,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined, each terminated by a newline.
    pub fn output(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Print all trace lines.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    fn add_subline(&mut self, content: String) {
        self.lines.push(format!("{SUBLINE_INDENT}{content}"));
    }
}

impl Tracer for PrintTracer {
    fn trace_instruction(&mut self, pc: u64, instr: &Instruction<'_>) {
        let c = self.colors;
        self.lines
            .push(format!("{}{pc:#06x}{}  {instr}", c.red, c.reset));
    }

    fn trace_register_write(&mut self, index: u8, value: i32) {
        let c = self.colors;
        self.add_subline(format!("{}r{index}{} = {value}", c.yellow, c.reset));
    }

    fn trace_jump(&mut self, target: u64) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let c = self.colors;
        self.add_subline(format!("-> {}{target:#06x}{}", c.red, c.reset));
    }

    fn trace_branch(&mut self, taken: bool, next: u64) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let c = self.colors;
        let label = if taken { "taken" } else { "not taken" };
        self.add_subline(format!("{label} -> {}{next:#06x}{}", c.red, c.reset));
    }

    fn trace_native_call(&mut self, report: &NativeCallReport) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let c = self.colors;
        let target = format!(
            "{}{}!{}{}",
            c.yellow, report.library, report.function, c.reset
        );
        let line = match report.outcome {
            CallOutcome::Returned(value) => format!("{target} returned {value}"),
            CallOutcome::Unresolved => format!("{target} not resolved"),
            CallOutcome::UnsupportedReturn(tag) => {
                format!("{target} not called: unsupported return tag {tag:#04x}")
            }
        };
        self.add_subline(line);
    }

    fn trace_halt(&mut self, state: &State, steps: u64) {
        let c = self.colors;
        let line = match state {
            State::Running => return,
            State::Halted(code) => {
                format!("{}halted{} ({code}) after {steps} steps", c.bold, c.reset)
            }
            State::Faulted(err) => format!("{}faulted{}: {err}", c.bold, c.reset),
        };
        self.lines.push(line);
    }
}
