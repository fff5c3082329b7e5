//! Trace program execution for debugging.

use std::path::PathBuf;

use vman_bytecode::Colors;
use vman_vm::{Compat, PrintTracer, Verbosity};

use super::loader::load_or_exit;
use super::run_common::{build_vm, exit_code, report_fault};

pub struct TraceArgs {
    pub image_path: PathBuf,
    pub fuel: Option<u64>,
    pub compat: Compat,
    pub verbosity: Verbosity,
    pub wait_on_fault: bool,
    pub color: bool,
}

pub fn run(args: TraceArgs) {
    let program = load_or_exit(&args.image_path);
    let mut tracer = PrintTracer::new(args.verbosity, Colors::new(args.color));

    let report = build_vm(&program, args.compat, args.fuel).run_with(&mut tracer);
    tracer.print();

    report_fault(&report.state, args.wait_on_fault);
    std::process::exit(exit_code(&report.state));
}
