//! Command builders for the CLI.
//!
//! Each command is built using the shared arg builders from `args.rs`.
//! exec/trace/dump accept all runtime flags, with irrelevant ones hidden
//! from `--help`, so switching subcommands never breaks a command line.

use clap::Command;

use super::args::*;

/// Add hidden execution args (for commands that don't execute).
fn with_hidden_run_args(cmd: Command) -> Command {
    cmd.arg(fuel_arg().hide(true))
        .arg(compat_arg().hide(true))
        .arg(unknown_opcode_arg().hide(true))
        .arg(no_wait_arg().hide(true))
}

/// Add hidden exec output args (for commands that don't produce JSON).
fn with_hidden_exec_args(cmd: Command) -> Command {
    cmd.arg(json_arg().hide(true))
        .arg(compact_arg().hide(true))
}

/// Add hidden trace args (for commands that don't trace).
fn with_hidden_trace_args(cmd: Command) -> Command {
    cmd.arg(verbose_arg().hide(true))
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("vman")
        .about("Register-based bytecode VM with native function calls")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(log_level_arg())
        .arg(log_format_arg())
        .subcommand(exec_command())
        .subcommand(dump_command())
        .subcommand(trace_command())
}

/// Run a program image.
///
/// Accepts trace flags for unified CLI experience, but ignores them.
pub fn exec_command() -> Command {
    let cmd = Command::new("exec")
        .about("Run a program image")
        .after_help(
            r#"EXAMPLES:
  vman exec program.bin                  # run to completion
  vman exec program.bin --fuel 10000     # bound the instruction count
  vman exec program.bin --json           # print final state as JSON
  vman exec old.bin --compat legacy      # older branch/NFC encoding

EXIT STATUS:
  0 when the program runs off the end of its image, 255 after an arithmetic
  fault, 1 after any other fault or a load error."#,
        )
        .arg(image_path_arg())
        .arg(fuel_arg())
        .arg(compat_arg())
        .arg(unknown_opcode_arg())
        .arg(no_wait_arg())
        .arg(json_arg())
        .arg(compact_arg())
        .arg(color_arg());

    // Hidden unified flags
    with_hidden_trace_args(cmd)
}

/// Show a program image.
///
/// Accepts all runtime flags for unified CLI experience, but only uses
/// the image path and color.
pub fn dump_command() -> Command {
    let cmd = Command::new("dump")
        .about("Disassemble a program image")
        .after_help(
            r#"EXAMPLES:
  vman dump program.bin                  # header, libraries, data, code
  vman dump program.bin --color never    # plain text"#,
        )
        .arg(image_path_arg())
        .arg(color_arg());

    // Hidden unified flags
    with_hidden_trace_args(with_hidden_exec_args(with_hidden_run_args(cmd)))
}

/// Trace program execution for debugging.
///
/// Accepts exec output flags for unified CLI experience, but ignores them.
pub fn trace_command() -> Command {
    let cmd = Command::new("trace")
        .about("Trace program execution for debugging")
        .after_help(
            r#"EXAMPLES:
  vman trace program.bin                 # instructions and register writes
  vman trace program.bin -v              # also jumps and native call results
  vman trace program.bin --fuel 100      # stop runaway loops"#,
        )
        .arg(image_path_arg())
        .arg(fuel_arg())
        .arg(compat_arg())
        .arg(unknown_opcode_arg())
        .arg(verbose_arg())
        .arg(no_wait_arg())
        .arg(color_arg());

    // Hidden unified flags
    with_hidden_exec_args(cmd)
}
