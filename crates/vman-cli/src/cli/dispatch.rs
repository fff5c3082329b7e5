//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs that mirror command `*Args` but are populated from clap
//! - `from_matches()` extractors that pull relevant fields (ignoring hidden ones)
//! - `Into<*Args>` impls to bridge dispatch → command handlers

use std::path::PathBuf;

use clap::ArgMatches;
use vman_vm::{Compat, UnknownOpcodePolicy, Verbosity};

use super::ColorChoice;
use crate::commands::dump::DumpArgs;
use crate::commands::exec::ExecArgs;
use crate::commands::trace::TraceArgs;
use crate::logging::{LogFormat, LogLevel, LogSettings};

pub struct ExecParams {
    pub image_path: PathBuf,
    pub fuel: Option<u64>,
    pub compat: Compat,
    pub no_wait: bool,
    pub json: bool,
    pub compact: bool,
    pub color: ColorChoice,
    // Note: verbose is parsed but not extracted (unified flag from trace)
}

impl ExecParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image_path: image_path(m),
            fuel: m.get_one::<u64>("fuel").copied(),
            compat: parse_compat(m),
            no_wait: m.get_flag("no_wait"),
            json: m.get_flag("json"),
            compact: m.get_flag("compact"),
            color: parse_color(m),
        }
    }
}

impl From<ExecParams> for ExecArgs {
    fn from(p: ExecParams) -> Self {
        let pretty = !p.compact && std::io::IsTerminal::is_terminal(&std::io::stdout());
        Self {
            image_path: p.image_path,
            fuel: p.fuel,
            compat: p.compat,
            wait_on_fault: !p.no_wait,
            json: p.json,
            pretty,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub image_path: PathBuf,
    pub color: ColorChoice,
    // Note: fuel, compat, unknown_opcode, no_wait, json, compact, verbose are
    // parsed but not extracted (unified flags)
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image_path: image_path(m),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            image_path: p.image_path,
            color: p.color.should_colorize(),
        }
    }
}

pub struct TraceParams {
    pub image_path: PathBuf,
    pub fuel: Option<u64>,
    pub compat: Compat,
    pub verbose: u8,
    pub no_wait: bool,
    pub color: ColorChoice,
    // Note: json, compact are parsed but not extracted
}

impl TraceParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image_path: image_path(m),
            fuel: m.get_one::<u64>("fuel").copied(),
            compat: parse_compat(m),
            verbose: m.get_count("verbose"),
            no_wait: m.get_flag("no_wait"),
            color: parse_color(m),
        }
    }
}

impl From<TraceParams> for TraceArgs {
    fn from(p: TraceParams) -> Self {
        let verbosity = match p.verbose {
            0 => Verbosity::Default,
            _ => Verbosity::Verbose,
        };
        Self {
            image_path: p.image_path,
            fuel: p.fuel,
            compat: p.compat,
            verbosity,
            wait_on_fault: !p.no_wait,
            color: p.color.should_colorize(),
        }
    }
}

/// Logging overrides from the global `--log-level` / `--log-format` flags.
pub fn log_settings(m: &ArgMatches) -> LogSettings {
    LogSettings {
        format: m
            .get_one::<String>("log_format")
            .and_then(|s| s.parse::<LogFormat>().ok()),
        level: m
            .get_one::<String>("log_level")
            .and_then(|s| s.parse::<LogLevel>().ok()),
    }
}

fn image_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("image_path")
        .cloned()
        .unwrap_or_default()
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    ColorChoice::from_flag(m.get_one::<String>("color").map(String::as_str))
}

/// `--compat` selects the profile; `--unknown-opcode` overrides one switch of it.
fn parse_compat(m: &ArgMatches) -> Compat {
    let compat = match m.get_one::<String>("compat").map(|s| s.as_str()) {
        Some("legacy") => Compat::legacy(),
        _ => Compat::fixed(),
    };
    match m.get_one::<String>("unknown_opcode").map(|s| s.as_str()) {
        Some("fault") => compat.unknown_opcode(UnknownOpcodePolicy::Fault),
        Some("nop") => compat.unknown_opcode(UnknownOpcodePolicy::Nop),
        _ => compat,
    }
}
