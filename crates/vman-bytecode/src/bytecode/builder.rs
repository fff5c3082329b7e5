//! Program image builder.
//!
//! Lays out `[header][data][code]`. Data must be emitted before code so that
//! the offsets handed out for strings and instructions stay absolute.

use crate::type_tag::TypeTag;

use super::header::Header;
use super::image::{ImageError, Program};
use super::instructions::{BinaryOp, Condition, Instruction, MOV_MAX, MOV_MIN, mov_imm};
use super::{HEADER_SIZE, MAGIC, Opcode};

#[derive(Clone, Debug)]
pub struct ImageBuilder {
    magic: u64,
    entry_override: Option<u64>,
    data: Vec<u8>,
    code: Vec<u8>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            entry_override: None,
            data: Vec::new(),
            code: Vec::new(),
        }
    }

    /// Write a different magic into the header.
    pub fn magic(mut self, magic: u64) -> Self {
        self.magic = magic;
        self
    }

    /// Write a specific entry point instead of the start of the code.
    pub fn entry_point(mut self, entry: u64) -> Self {
        self.entry_override = Some(entry);
        self
    }

    /// Append raw bytes to the data segment, returning their absolute offset.
    pub fn data(&mut self, bytes: &[u8]) -> u64 {
        assert!(self.code.is_empty(), "data must be emitted before code");
        let offset = (HEADER_SIZE + self.data.len()) as u64;
        self.data.extend_from_slice(bytes);
        offset
    }

    /// Append a null-terminated string to the data segment.
    pub fn string(&mut self, s: &str) -> u64 {
        let offset = self.data(s.as_bytes());
        self.data.push(0);
        offset
    }

    /// Offset of the first instruction.
    pub fn code_start(&self) -> u64 {
        (HEADER_SIZE + self.data.len()) as u64
    }

    /// Absolute offset of the next instruction.
    pub fn here(&self) -> u64 {
        self.code_start() + self.code.len() as u64
    }

    pub fn instruction(&mut self, instr: &Instruction<'_>) -> &mut Self {
        instr.encode(&mut self.code);
        self
    }

    /// Append raw bytes to the instruction stream.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    pub fn nop(&mut self) -> &mut Self {
        self.instruction(&Instruction::Nop)
    }

    pub fn binary(&mut self, op: BinaryOp, dst: u8, lhs: u8, rhs: u8) -> &mut Self {
        self.instruction(&Instruction::Binary { op, dst, lhs, rhs })
    }

    pub fn not(&mut self, dst: u8, src: u8) -> &mut Self {
        self.instruction(&Instruction::Not { dst, src })
    }

    /// `MOV dst, value`; `value` must fit in 24 signed bits.
    pub fn mov(&mut self, dst: u8, value: i32) -> &mut Self {
        debug_assert!(
            (MOV_MIN..=MOV_MAX).contains(&value),
            "MOV immediate {value} does not fit in 24 bits"
        );
        self.instruction(&Instruction::Mov {
            dst,
            imm: mov_imm(value),
        })
    }

    pub fn jmp(&mut self, target: u8) -> &mut Self {
        self.instruction(&Instruction::Jmp { target })
    }

    pub fn jie(&mut self, lhs: u8, rhs: u8, target: u8) -> &mut Self {
        self.branch(Condition::Equal, lhs, rhs, target)
    }

    pub fn jne(&mut self, lhs: u8, rhs: u8, target: u8) -> &mut Self {
        self.branch(Condition::NotEqual, lhs, rhs, target)
    }

    fn branch(&mut self, cond: Condition, lhs: u8, rhs: u8, target: u8) -> &mut Self {
        self.instruction(&Instruction::Branch {
            cond,
            lhs,
            rhs,
            target,
        })
    }

    /// `NFC ret(params...)`. Names and parameter offsets come from registers.
    pub fn nfc(&mut self, ret: TypeTag, params: &[TypeTag]) -> &mut Self {
        self.code.push(Opcode::Nfc as u8);
        self.code.push(ret as u8);
        self.code.extend(params.iter().map(|&t| t as u8));
        self.code.push(0);
        self
    }

    pub fn header(&self) -> Header {
        Header {
            entry_point: self.entry_override.unwrap_or_else(|| self.code_start()),
            magic: self.magic,
        }
    }

    /// Produce the image bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.data.len() + self.code.len());
        out.extend_from_slice(&self.header().to_bytes());
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.code);
        out
    }

    /// Produce and validate the image.
    pub fn build_program(&self) -> Result<Program, ImageError> {
        Program::from_bytes(self.build())
    }
}
