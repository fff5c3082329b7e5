//! Bytecode format for vman program images.
//!
//! Layout: `[entry point: u64][magic: u64][data segment][instruction stream]`.

mod builder;
mod constants;
mod dump;
mod header;
mod image;
mod instructions;


pub use builder::ImageBuilder;
pub use constants::{DATA_START, HEADER_SIZE, MAGIC, MAX_FUNCTION_NAME, MAX_LIBRARY_NAME};
pub use dump::{EnvironmentInspector, NoEnvironment, ResidentLibrary, dump, dump_with};
pub use header::Header;
pub use image::{ByteStorage, ImageError, OutOfBounds, Program};
pub use instructions::{
    BinaryOp, Condition, DecodeError, Instruction, MOV_MAX, MOV_MIN, NativeCall, Opcode, mov_imm,
    mov_value,
};
