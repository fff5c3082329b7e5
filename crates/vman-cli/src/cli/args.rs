//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.
//! The same definition is reused across commands with different visibility
//! (via `.hide(true)`).

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Program image to load (positional).
pub fn image_path_arg() -> Arg {
    Arg::new("image_path")
        .value_name("IMAGE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Program image to load")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Execution fuel limit (--fuel).
pub fn fuel_arg() -> Arg {
    Arg::new("fuel")
        .long("fuel")
        .value_name("N")
        .value_parser(value_parser!(u64))
        .help("Stop after N instructions (default: unlimited)")
}

/// Behavior profile (--compat).
pub fn compat_arg() -> Arg {
    Arg::new("compat")
        .long("compat")
        .value_name("PROFILE")
        .default_value("fixed")
        .value_parser(["fixed", "legacy"])
        .help("Branch operand, NFC padding and unknown-opcode behavior")
}

/// Unknown opcode handling (--unknown-opcode).
pub fn unknown_opcode_arg() -> Arg {
    Arg::new("unknown_opcode")
        .long("unknown-opcode")
        .value_name("POLICY")
        .value_parser(["nop", "fault"])
        .help("Treat unknown opcodes as one-byte no-ops or as faults (overrides --compat)")
}

/// Skip the acknowledgment pause after a fault (--no-wait).
pub fn no_wait_arg() -> Arg {
    Arg::new("no_wait")
        .long("no-wait")
        .action(ArgAction::SetTrue)
        .help("Exit immediately after a fault instead of waiting for Enter")
}

/// Print the final state as JSON (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the final machine state as JSON")
}

/// Output compact JSON (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Output compact JSON (default: pretty when stdout is a TTY)")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Verbosity level (-v for jumps and native call results)")
}

/// Log level (--log-level). Global.
pub fn log_level_arg() -> Arg {
    Arg::new("log_level")
        .long("log-level")
        .value_name("LEVEL")
        .global(true)
        .value_parser(["error", "warn", "info", "debug", "trace"])
        .help("Diagnostic log level on stderr (env: VMAN_LOG_LEVEL)")
}

/// Log format (--log-format). Global.
pub fn log_format_arg() -> Arg {
    Arg::new("log_format")
        .long("log-format")
        .value_name("FORMAT")
        .global(true)
        .value_parser(["auto", "text", "json"])
        .help("Diagnostic log format; auto is json when stderr is redirected (env: VMAN_LOG_FORMAT)")
}
