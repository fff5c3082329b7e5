//! The register file.

use serde::Serialize;

pub const REGISTER_COUNT: usize = 12;

/// Holds the library name offset for NFC.
pub const LIBRARY_REGISTER: u8 = 0;
/// Holds the function name offset for NFC.
pub const FUNCTION_REGISTER: u8 = 1;
/// Parameter `i` of an NFC reads its offset from `r[FIRST_PARAM_REGISTER + i]`.
pub const FIRST_PARAM_REGISTER: u8 = 2;
/// Receives the narrowed NFC return value.
pub const RESULT_REGISTER: u8 = 2;

/// Twelve signed 32-bit registers, zero-initialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Registers([i32; REGISTER_COUNT]);

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_array(values: [i32; REGISTER_COUNT]) -> Self {
        Self(values)
    }

    /// Read a register; `None` if the index is past the file.
    #[inline]
    pub fn get(&self, index: u8) -> Option<i32> {
        self.0.get(usize::from(index)).copied()
    }

    #[inline]
    pub fn get_mut(&mut self, index: u8) -> Option<&mut i32> {
        self.0.get_mut(usize::from(index))
    }

    pub fn as_array(&self) -> &[i32; REGISTER_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, i32)> + '_ {
        self.0.iter().enumerate().map(|(i, &v)| (i as u8, v))
    }
}
