//! Program image format for vman.
//!
//! This crate contains:
//! - Program image loading and bounds-checked access (Program, Header)
//! - The opcode table and typed instruction decoding/encoding
//! - Native call type tags
//! - An image builder and a read-only disassembly view

pub mod bytecode;
pub mod colors;
pub mod type_tag;

// Re-export commonly used items at crate root
pub use bytecode::{
    BinaryOp, ByteStorage, Condition, DATA_START, DecodeError, EnvironmentInspector, HEADER_SIZE,
    Header, ImageBuilder, ImageError, Instruction, MAGIC, MAX_FUNCTION_NAME, MAX_LIBRARY_NAME,
    MOV_MAX, MOV_MIN, NativeCall, NoEnvironment, Opcode, OutOfBounds, Program, ResidentLibrary,
    dump, dump_with, mov_imm, mov_value,
};
pub use colors::Colors;
pub use type_tag::TypeTag;
