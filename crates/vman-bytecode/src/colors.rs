//! ANSI color codes for terminal output.
//!
//! - Red: offsets and addresses
//! - Yellow: operands, string contents, library names
//! - Bold: section headers and mnemonics of control flow
//! - Reset: Return to default

/// ANSI color palette for disassembly and trace output.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub red: &'static str,
    pub yellow: &'static str,
    pub bold: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        red: "\x1b[1;31m",
        yellow: "\x1b[1;33m",
        bold: "\x1b[1m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        red: "",
        yellow: "",
        bold: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.reset.is_empty()
    }
}
