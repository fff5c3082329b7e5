//! Bytecode format constants.

/// Magic signature stored at bytes 8..16 of every program image.
///
/// On disk it reads `19 11 4B 55 51 45 5A 49`: the `0x1119` marker followed
/// by the ASCII text `KUQEZI`.
pub const MAGIC: u64 = 0x495A_4551_554B_1119;

/// Size of the fixed header: entry point followed by the magic.
pub const HEADER_SIZE: usize = 16;

/// First byte of the data segment.
pub const DATA_START: usize = HEADER_SIZE;

/// Longest library name read for a native call, excluding the terminator.
pub const MAX_LIBRARY_NAME: usize = 127;

/// Longest function name read for a native call, excluding the terminator.
pub const MAX_FUNCTION_NAME: usize = 63;
