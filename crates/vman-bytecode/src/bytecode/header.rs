//! Program image header (16 bytes).
//!
//! - 0-7: entry point, the initial program counter
//! - 8-15: magic signature
//!
//! Both words are little-endian, the byte pattern a direct memory copy of the
//! machine word produces on every supported host.

use super::{HEADER_SIZE, MAGIC};

/// File header - first 16 bytes of a program image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Offset of the first instruction. Everything between the header and
    /// this offset is the data segment.
    pub entry_point: u64,
    /// Must equal [`MAGIC`].
    pub magic: u64,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            entry_point: HEADER_SIZE as u64,
            magic: MAGIC,
        }
    }
}

impl Header {
    pub fn new(entry_point: u64) -> Self {
        Self {
            entry_point,
            magic: MAGIC,
        }
    }

    /// Decode header from the first 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        let mut entry = [0u8; 8];
        let mut magic = [0u8; 8];
        entry.copy_from_slice(&bytes[0..8]);
        magic.copy_from_slice(&bytes[8..16]);

        Self {
            entry_point: u64::from_le_bytes(entry),
            magic: u64::from_le_bytes(magic),
        }
    }

    /// Encode header to 16 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..8].copy_from_slice(&self.entry_point.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.magic.to_le_bytes());
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    /// Last offset of the data segment, as reported by the disassembly view.
    pub fn data_end(&self) -> u64 {
        self.entry_point.saturating_sub(1)
    }
}
