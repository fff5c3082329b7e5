//! Common logic for exec and trace commands.

use std::io::{self, BufRead};

use vman_bytecode::Program;
use vman_vm::{Compat, Limits, RuntimeError, State, VM};

/// Process exit status for a terminal VM state.
///
/// Arithmetic faults keep the 255 status older hosts produced; every other
/// fault is a plain failure.
pub fn exit_code(state: &State) -> i32 {
    match state {
        State::Halted(_) => 0,
        State::Faulted(e) if e.is_arithmetic() => 255,
        State::Faulted(_) | State::Running => 1,
    }
}

/// Build a VM against the host's symbol resolver.
pub fn build_vm(program: &Program, compat: Compat, fuel: Option<u64>) -> VM<'_> {
    let mut limits = Limits::new();
    if let Some(fuel) = fuel {
        limits = limits.fuel(fuel);
    }
    VM::builder(program).compat(compat).limits(limits).build()
}

/// Print a fault to stderr and, when it needs one, wait for acknowledgment.
pub fn report_fault(state: &State, wait_on_fault: bool) {
    let State::Faulted(err) = state else {
        return;
    };
    eprintln!("error: {}", err);
    if needs_acknowledgment(err, wait_on_fault) {
        eprintln!("press Enter to exit");
        wait_for_acknowledgment(&mut io::stdin().lock());
    }
}

/// Arithmetic faults hold the process until the user confirms, unless
/// `--no-wait` was given.
pub fn needs_acknowledgment(err: &RuntimeError, wait_on_fault: bool) -> bool {
    wait_on_fault && err.is_arithmetic()
}

/// Block until a line (or end of input) arrives.
pub fn wait_for_acknowledgment(input: &mut impl BufRead) {
    let mut line = String::new();
    if let Err(e) = input.read_line(&mut line) {
        tracing::debug!(error = %e, "acknowledgment read failed");
    }
}
