//! Tests for CLI dispatch logic.
//!
//! These tests verify:
//! 1. Unified flags: dump/exec/trace accept each other's flags without error
//! 2. Help visibility: hidden flags don't appear in --help
//! 3. Params extraction: correct fields are extracted from ArgMatches

use std::path::PathBuf;

use vman_vm::{BranchOperand, Compat, UnknownOpcodePolicy};

use super::*;
use crate::cli::commands::{dump_command, exec_command, trace_command};
use crate::commands::trace::TraceArgs;
use crate::logging::{LogFormat, LogLevel};

#[test]
fn exec_extracts_run_flags() {
    let m = exec_command()
        .try_get_matches_from([
            "exec",
            "program.bin",
            "--fuel",
            "500",
            "--no-wait",
            "--json",
            "--compact",
        ])
        .unwrap();
    let params = ExecParams::from_matches(&m);

    assert_eq!(params.image_path, PathBuf::from("program.bin"));
    assert_eq!(params.fuel, Some(500));
    assert_eq!(params.compat, Compat::fixed());
    assert!(params.no_wait);
    assert!(params.json);
    assert!(params.compact);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn exec_defaults() {
    let m = exec_command()
        .try_get_matches_from(["exec", "program.bin"])
        .unwrap();
    let params = ExecParams::from_matches(&m);

    assert_eq!(params.fuel, None);
    assert!(!params.no_wait);
    assert!(!params.json);
    assert_eq!(params.compat.unknown_opcode, UnknownOpcodePolicy::Nop);
    assert_eq!(params.compat.branch_operand, BranchOperand::Register);
}

#[test]
fn exec_requires_image_path() {
    let result = exec_command().try_get_matches_from(["exec"]);
    assert!(result.is_err());
}

#[test]
fn legacy_profile_with_unknown_opcode_override() {
    let m = exec_command()
        .try_get_matches_from([
            "exec",
            "old.bin",
            "--compat",
            "legacy",
            "--unknown-opcode",
            "fault",
        ])
        .unwrap();
    let params = ExecParams::from_matches(&m);

    assert_eq!(
        params.compat,
        Compat::legacy().unknown_opcode(UnknownOpcodePolicy::Fault)
    );
    assert!(params.compat.nfc_pad_byte);
}

#[test]
fn rejects_unknown_compat_profile() {
    let result =
        exec_command().try_get_matches_from(["exec", "program.bin", "--compat", "newest"]);
    assert!(result.is_err());
}

#[test]
fn dump_accepts_run_flags() {
    let result = dump_command().try_get_matches_from([
        "dump",
        "program.bin",
        "--fuel",
        "10",
        "--compat",
        "legacy",
        "--json",
        "-vv",
    ]);
    assert!(
        result.is_ok(),
        "dump should accept run flags: {:?}",
        result.err()
    );

    let params = DumpParams::from_matches(&result.unwrap());
    assert_eq!(params.image_path, PathBuf::from("program.bin"));
}

#[test]
fn dump_color_choice() {
    let m = dump_command()
        .try_get_matches_from(["dump", "program.bin", "--color", "never"])
        .unwrap();
    assert_eq!(DumpParams::from_matches(&m).color, ColorChoice::Never);

    let m = dump_command()
        .try_get_matches_from(["dump", "program.bin", "--color", "always"])
        .unwrap();
    assert_eq!(DumpParams::from_matches(&m).color, ColorChoice::Always);
}

#[test]
fn trace_accepts_exec_flags() {
    let result = trace_command().try_get_matches_from([
        "trace",
        "program.bin",
        "--json",
        "--compact",
        "--no-wait",
    ]);
    assert!(
        result.is_ok(),
        "trace should accept exec flags: {:?}",
        result.err()
    );
}

#[test]
fn trace_waits_on_fault_unless_no_wait() {
    let m = trace_command()
        .try_get_matches_from(["trace", "program.bin"])
        .unwrap();
    let args: TraceArgs = TraceParams::from_matches(&m).into();
    assert!(args.wait_on_fault);

    let m = trace_command()
        .try_get_matches_from(["trace", "program.bin", "--no-wait"])
        .unwrap();
    let params = TraceParams::from_matches(&m);
    assert!(params.no_wait);
    let args: TraceArgs = params.into();
    assert!(!args.wait_on_fault);
}

#[test]
fn trace_counts_verbosity() {
    let m = trace_command()
        .try_get_matches_from(["trace", "program.bin", "-vv", "--fuel", "100"])
        .unwrap();
    let params = TraceParams::from_matches(&m);

    assert_eq!(params.verbose, 2);
    assert_eq!(params.fuel, Some(100));
}

#[test]
fn exec_accepts_trace_flags() {
    let result = exec_command().try_get_matches_from(["exec", "program.bin", "-v"]);
    assert!(result.is_ok());
}

#[test]
fn dump_help_hides_run_flags() {
    let help = dump_command().render_help().to_string();

    assert!(help.contains("--color"));
    assert!(!help.contains("--fuel"));
    assert!(!help.contains("--compat"));
    assert!(!help.contains("--json"));
    assert!(!help.contains("Verbosity level"));
}

#[test]
fn exec_help_hides_verbose() {
    let help = exec_command().render_help().to_string();

    assert!(help.contains("--fuel"));
    assert!(help.contains("--no-wait"));
    assert!(!help.contains("Verbosity level"));
}

#[test]
fn trace_help_hides_output_flags() {
    let help = trace_command().render_help().to_string();

    assert!(help.contains("--fuel"));
    assert!(help.contains("Verbosity level"));
    assert!(!help.contains("--json"));
    assert!(!help.contains("--compact"));
    assert!(help.contains("--no-wait"));
}

#[test]
fn global_log_flags_after_subcommand() {
    let m = build_cli()
        .try_get_matches_from([
            "vman",
            "exec",
            "program.bin",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])
        .unwrap();
    let settings = log_settings(&m);

    assert_eq!(settings.level, Some(LogLevel::Debug));
    assert_eq!(settings.format, Some(LogFormat::Json));
}

#[test]
fn log_flags_default_to_none() {
    let m = build_cli()
        .try_get_matches_from(["vman", "dump", "program.bin"])
        .unwrap();
    let settings = log_settings(&m);

    assert_eq!(settings.level, None);
    assert_eq!(settings.format, None);
}

#[test]
fn cli_requires_subcommand() {
    let result = build_cli().try_get_matches_from(["vman"]);
    assert!(result.is_err());
}

#[test]
fn color_flag_values() {
    assert_eq!(ColorChoice::from_flag(Some("always")), ColorChoice::Always);
    assert_eq!(ColorChoice::from_flag(Some("never")), ColorChoice::Never);
    assert_eq!(ColorChoice::from_flag(Some("auto")), ColorChoice::Auto);
    assert_eq!(ColorChoice::from_flag(None), ColorChoice::Auto);
    assert!(ColorChoice::Always.should_colorize());
    assert!(!ColorChoice::Never.should_colorize());
}
