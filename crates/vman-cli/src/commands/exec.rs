//! Run a program image and report the final machine state.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;
use vman_bytecode::Colors;
use vman_vm::{Compat, RunReport, RuntimeError, State};

use super::loader::load_or_exit;
use super::run_common::{build_vm, exit_code, report_fault};

pub struct ExecArgs {
    pub image_path: PathBuf,
    pub fuel: Option<u64>,
    pub compat: Compat,
    pub wait_on_fault: bool,
    pub json: bool,
    pub pretty: bool,
    pub color: bool,
}

pub fn run(args: ExecArgs) {
    let program = load_or_exit(&args.image_path);
    let report = build_vm(&program, args.compat, args.fuel).run();

    if args.json {
        match render_json(&report, args.pretty) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: cannot serialize result: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", render_text(&report, Colors::new(args.color)));
    }

    report_fault(&report.state, args.wait_on_fault);
    std::process::exit(exit_code(&report.state));
}

/// Final state and register file as text.
pub fn render_text(report: &RunReport, c: Colors) -> String {
    let status = match &report.state {
        State::Halted(code) => format!("halted ({code})"),
        State::Faulted(_) => "faulted".to_string(),
        State::Running => "running".to_string(),
    };

    let mut out = String::new();
    writeln!(
        out,
        "{status} after {} steps at {}{:#06x}{}",
        report.steps, c.red, report.pc, c.reset
    )
    .unwrap();

    for (index, value) in report.registers.iter() {
        let name = format!("r{index}");
        writeln!(
            out,
            "{}{name:<3}{} = {value} ({:#010x})",
            c.yellow, c.reset, value as u32
        )
        .unwrap();
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    state: &'static str,
    halt_code: Option<u32>,
    error: Option<String>,
    arithmetic: bool,
    pc: u64,
    steps: u64,
    registers: &'a vman_vm::Registers,
}

/// Final state and register file as JSON.
pub fn render_json(report: &RunReport, pretty: bool) -> serde_json::Result<String> {
    let (state, halt_code, error) = match &report.state {
        State::Running => ("running", None, None),
        State::Halted(code) => ("halted", Some(*code), None),
        State::Faulted(e) => ("faulted", None, Some(e)),
    };
    let json = JsonReport {
        state,
        halt_code,
        error: error.map(RuntimeError::to_string),
        arithmetic: error.is_some_and(RuntimeError::is_arithmetic),
        pc: report.pc,
        steps: report.steps,
        registers: &report.registers,
    };
    if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
}
