//! Human-readable disassembly of a program image.
//!
//! Read-only: the dump shares the opcode table with the VM but never executes
//! anything. Process information (resident libraries) is supplied by an
//! injected [`EnvironmentInspector`].

use std::fmt::Write as _;

use crate::colors::Colors;

use super::DATA_START;
use super::image::Program;

/// A library mapped into the current process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResidentLibrary {
    pub name: String,
    pub base: u64,
}

/// Source of process details shown alongside the disassembly.
pub trait EnvironmentInspector {
    fn process_id(&self) -> Option<u32>;

    fn resident_libraries(&self) -> Vec<ResidentLibrary>;
}

/// Inspector that reports nothing.
pub struct NoEnvironment;

impl EnvironmentInspector for NoEnvironment {
    fn process_id(&self) -> Option<u32> {
        None
    }

    fn resident_libraries(&self) -> Vec<ResidentLibrary> {
        Vec::new()
    }
}

/// Generate a human-readable dump of the program.
pub fn dump(program: &Program, colors: Colors) -> String {
    dump_with(program, colors, &NoEnvironment)
}

/// Generate a dump including the process environment.
pub fn dump_with(program: &Program, colors: Colors, env: &dyn EnvironmentInspector) -> String {
    let mut out = String::new();

    dump_header(&mut out, program, colors);
    dump_environment(&mut out, env, colors);
    dump_data(&mut out, program, colors);
    dump_code(&mut out, program, colors);

    out
}

fn dump_header(out: &mut String, program: &Program, c: Colors) {
    let header = program.header();
    writeln!(out, "{}[header]{}", c.bold, c.reset).unwrap();
    writeln!(out, "entry    = {}{:#06x}{}", c.red, header.entry_point, c.reset).unwrap();
    writeln!(out, "magic    = {:#018x}", header.magic).unwrap();
    writeln!(out, "data_end = {}{:#06x}{}", c.red, header.data_end(), c.reset).unwrap();
}

fn dump_environment(out: &mut String, env: &dyn EnvironmentInspector, c: Colors) {
    let pid = env.process_id();
    let libraries = env.resident_libraries();
    if pid.is_none() && libraries.is_empty() {
        return;
    }

    writeln!(out).unwrap();
    writeln!(out, "{}[libraries]{}", c.bold, c.reset).unwrap();
    if let Some(pid) = pid {
        writeln!(out, "pid = {}{pid}{}", c.red, c.reset).unwrap();
    }
    for lib in libraries {
        writeln!(
            out,
            "{}{}{} @ {}{:#x}{}",
            c.yellow, lib.name, c.reset, c.red, lib.base, c.reset
        )
        .unwrap();
    }
}

fn dump_data(out: &mut String, program: &Program, c: Colors) {
    let strings = data_strings(program);
    if strings.is_empty() {
        return;
    }

    writeln!(out).unwrap();
    writeln!(out, "{}[data]{}", c.bold, c.reset).unwrap();
    for (offset, text) in strings {
        let text = String::from_utf8_lossy(text);
        writeln!(
            out,
            "{}{offset:#06x}{}  {}\"{}\"{}",
            c.red,
            c.reset,
            c.yellow,
            text.escape_debug(),
            c.reset
        )
        .unwrap();
    }
}

/// Printable strings in the data segment.
///
/// A string starts at any byte in `0x21..=0x7E` and runs to the next NUL.
fn data_strings(program: &Program) -> Vec<(usize, &[u8])> {
    let bytes = program.bytes();
    let end = usize::try_from(program.entry_point())
        .unwrap_or(usize::MAX)
        .min(bytes.len());

    let mut strings = Vec::new();
    let mut i = DATA_START;
    while i < end {
        if (0x21..=0x7E).contains(&bytes[i]) {
            let start = i;
            while i < end && bytes[i] != 0 {
                i += 1;
            }
            strings.push((start, &bytes[start..i]));
        }
        i += 1;
    }
    strings
}

fn dump_code(out: &mut String, program: &Program, c: Colors) {
    writeln!(out).unwrap();
    writeln!(out, "{}[code]{}", c.bold, c.reset).unwrap();

    let mut pc = program.entry_point();
    while pc < program.len() as u64 {
        match program.decode_at(pc) {
            Ok(instr) => {
                writeln!(out, "{}{pc:#06x}{}  {instr}", c.red, c.reset).unwrap();
                pc += instr.width() as u64;
            }
            Err(e) => {
                writeln!(out, "{}{pc:#06x}{}  ; {e}", c.red, c.reset).unwrap();
                break;
            }
        }
    }
}
