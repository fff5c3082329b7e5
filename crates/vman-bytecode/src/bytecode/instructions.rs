//! Opcode table and typed instruction records.
//!
//! Operands are decoded once at fetch time into an [`Instruction`]; handlers
//! never re-read the image. Register operands are raw bytes and are not range
//! checked here.

use std::fmt;

use crate::type_tag::TypeTag;

/// Instruction opcodes with their on-disk byte values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0xF0,
    Add = 0x10,
    Sub = 0x11,
    Div = 0x12,
    Mul = 0x13,
    Mod = 0x14,
    Lsh = 0x15,
    Rsh = 0x16,
    Not = 0x17,
    And = 0x18,
    Or = 0x19,
    Xor = 0x1A,
    Jmp = 0x20,
    Jie = 0x21,
    Jne = 0x22,
    Mov = 0x25,
    Nfc = 0x27,
}

impl Opcode {
    pub const ALL: [Opcode; 17] = [
        Opcode::Nop,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Div,
        Opcode::Mul,
        Opcode::Mod,
        Opcode::Lsh,
        Opcode::Rsh,
        Opcode::Not,
        Opcode::And,
        Opcode::Or,
        Opcode::Xor,
        Opcode::Jmp,
        Opcode::Jie,
        Opcode::Jne,
        Opcode::Mov,
        Opcode::Nfc,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| *op as u8 == v)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Div => "div",
            Opcode::Mul => "mul",
            Opcode::Mod => "mod",
            Opcode::Lsh => "lsh",
            Opcode::Rsh => "rsh",
            Opcode::Not => "not",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Jmp => "jmp",
            Opcode::Jie => "jie",
            Opcode::Jne => "jne",
            Opcode::Mov => "mov",
            Opcode::Nfc => "nfc",
        }
    }

    /// Number of operand bytes following the opcode byte.
    ///
    /// `None` for NFC, whose operand stream is null-terminated.
    pub fn operand_width(self) -> Option<usize> {
        match self {
            Opcode::Nop => Some(0),
            Opcode::Jmp => Some(1),
            Opcode::Not => Some(2),
            Opcode::Mov => Some(5),
            Opcode::Nfc => None,
            _ => Some(3),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Three-register arithmetic and bitwise operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Div,
    Mul,
    Mod,
    Lsh,
    Rsh,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 10] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Div,
        BinaryOp::Mul,
        BinaryOp::Mod,
        BinaryOp::Lsh,
        BinaryOp::Rsh,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
    ];

    pub fn opcode(self) -> Opcode {
        match self {
            BinaryOp::Add => Opcode::Add,
            BinaryOp::Sub => Opcode::Sub,
            BinaryOp::Div => Opcode::Div,
            BinaryOp::Mul => Opcode::Mul,
            BinaryOp::Mod => Opcode::Mod,
            BinaryOp::Lsh => Opcode::Lsh,
            BinaryOp::Rsh => Opcode::Rsh,
            BinaryOp::And => Opcode::And,
            BinaryOp::Or => Opcode::Or,
            BinaryOp::Xor => Opcode::Xor,
        }
    }

    fn from_opcode(op: Opcode) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.opcode() == op)
    }

    /// Whether a zero right-hand operand is an arithmetic fault.
    pub fn divides(self) -> bool {
        matches!(self, BinaryOp::Div | BinaryOp::Mod)
    }
}

/// Branch condition of JIE/JNE.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Equal,
    NotEqual,
}

impl Condition {
    pub const ALL: [Condition; 2] = [Condition::Equal, Condition::NotEqual];

    pub fn opcode(self) -> Opcode {
        match self {
            Condition::Equal => Opcode::Jie,
            Condition::NotEqual => Opcode::Jne,
        }
    }

    pub fn holds(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Condition::Equal => lhs == rhs,
            Condition::NotEqual => lhs != rhs,
        }
    }
}

/// NFC operand stream: `[return tag][param tag]* 0x00`.
///
/// Parameter tags are validated at decode time; the return tag is kept raw
/// because an unsupported return type is reported at call time, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeCall<'a> {
    ret_tag: u8,
    param_tags: &'a [u8],
}

impl<'a> NativeCall<'a> {
    /// Build a call record; `None` if any parameter tag is not a [`TypeTag`].
    pub fn new(ret_tag: u8, param_tags: &'a [u8]) -> Option<Self> {
        param_tags
            .iter()
            .all(|&t| TypeTag::from_u8(t).is_some())
            .then_some(Self {
                ret_tag,
                param_tags,
            })
    }

    pub fn ret_tag(&self) -> u8 {
        self.ret_tag
    }

    /// Declared return type, if the tag is known.
    pub fn return_type(&self) -> Option<TypeTag> {
        TypeTag::from_u8(self.ret_tag)
    }

    pub fn param_count(&self) -> usize {
        self.param_tags.len()
    }

    /// Parameter types in declaration order.
    pub fn params(&self) -> impl Iterator<Item = TypeTag> + 'a {
        self.param_tags.iter().filter_map(|&t| TypeTag::from_u8(t))
    }
}

/// Smallest value a MOV immediate can carry.
pub const MOV_MIN: i32 = -(1 << 23);
/// Largest value a MOV immediate can carry.
pub const MOV_MAX: i32 = (1 << 23) - 1;

/// Value loaded by `MOV` for its 4 immediate bytes.
///
/// The format reads the big-endian word starting one byte into the immediate
/// (so the last byte comes from whatever follows the instruction) and divides
/// it by 0x100 with floor semantics. The trailing byte never survives the
/// division, which leaves the sign-extended 24-bit value of `imm[1..4]`.
/// `imm[0]` is ignored.
pub fn mov_value(imm: [u8; 4]) -> i32 {
    i32::from_be_bytes([imm[1], imm[2], imm[3], 0]) >> 8
}

/// Immediate bytes that make `MOV` load `value`.
///
/// Only the low 24 bits are representable; see [`MOV_MIN`] and [`MOV_MAX`].
pub fn mov_imm(value: i32) -> [u8; 4] {
    let [_, b1, b2, b3] = value.to_be_bytes();
    [0, b1, b2, b3]
}

/// Decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction<'a> {
    Nop,
    Binary {
        op: BinaryOp,
        dst: u8,
        lhs: u8,
        rhs: u8,
    },
    Not {
        dst: u8,
        src: u8,
    },
    Mov {
        dst: u8,
        imm: [u8; 4],
    },
    Jmp {
        target: u8,
    },
    Branch {
        cond: Condition,
        lhs: u8,
        rhs: u8,
        target: u8,
    },
    NativeCall(NativeCall<'a>),
    /// A byte outside the opcode table. Occupies one byte.
    Unknown(u8),
}

/// Instruction decode error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("program counter {pc:#x} is past the end of the image ({size} bytes)")]
    PastEnd { pc: u64, size: usize },
    #[error("truncated {opcode} at {pc:#x}: needs {needed} bytes, {available} available")]
    Truncated {
        pc: u64,
        opcode: Opcode,
        needed: usize,
        available: usize,
    },
    #[error("invalid parameter type tag {tag:#04x} for parameter {index} of nfc at {pc:#x}")]
    InvalidParameterTag { pc: u64, index: usize, tag: u8 },
}

impl<'a> Instruction<'a> {
    /// Decode the instruction at the start of `bytes`.
    ///
    /// `bytes` runs from the program counter to the end of the image; `pc` is
    /// only used for error reporting.
    pub fn decode(bytes: &'a [u8], pc: u64) -> Result<Self, DecodeError> {
        let Some(&first) = bytes.first() else {
            return Err(DecodeError::PastEnd { pc, size: 0 });
        };
        let Some(opcode) = Opcode::from_u8(first) else {
            return Ok(Self::Unknown(first));
        };

        if opcode == Opcode::Nfc {
            return Self::decode_native_call(bytes, pc);
        }

        let width = opcode.operand_width().unwrap_or(0);
        let Some(ops) = bytes.get(1..1 + width) else {
            return Err(DecodeError::Truncated {
                pc,
                opcode,
                needed: 1 + width,
                available: bytes.len(),
            });
        };

        let instr = match opcode {
            Opcode::Nop => Self::Nop,
            Opcode::Not => Self::Not {
                dst: ops[0],
                src: ops[1],
            },
            Opcode::Mov => Self::Mov {
                dst: ops[0],
                imm: [ops[1], ops[2], ops[3], ops[4]],
            },
            Opcode::Jmp => Self::Jmp { target: ops[0] },
            Opcode::Jie | Opcode::Jne => Self::Branch {
                cond: if opcode == Opcode::Jie {
                    Condition::Equal
                } else {
                    Condition::NotEqual
                },
                lhs: ops[0],
                rhs: ops[1],
                target: ops[2],
            },
            _ => match BinaryOp::from_opcode(opcode) {
                Some(op) => Self::Binary {
                    op,
                    dst: ops[0],
                    lhs: ops[1],
                    rhs: ops[2],
                },
                None => unreachable!("{opcode} has a dedicated decoder"),
            },
        };
        Ok(instr)
    }

    fn decode_native_call(bytes: &'a [u8], pc: u64) -> Result<Self, DecodeError> {
        let truncated = DecodeError::Truncated {
            pc,
            opcode: Opcode::Nfc,
            needed: bytes.len() + 1,
            available: bytes.len(),
        };
        let Some(&ret_tag) = bytes.get(1) else {
            return Err(truncated);
        };
        let stream = &bytes[2..];
        let Some(end) = stream.iter().position(|&b| b == 0) else {
            return Err(truncated);
        };
        let param_tags = &stream[..end];

        if let Some((index, &tag)) = param_tags
            .iter()
            .enumerate()
            .find(|(_, t)| TypeTag::from_u8(**t).is_none())
        {
            return Err(DecodeError::InvalidParameterTag { pc, index, tag });
        }

        Ok(Self::NativeCall(NativeCall {
            ret_tag,
            param_tags,
        }))
    }

    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Self::Nop => Some(Opcode::Nop),
            Self::Binary { op, .. } => Some(op.opcode()),
            Self::Not { .. } => Some(Opcode::Not),
            Self::Mov { .. } => Some(Opcode::Mov),
            Self::Jmp { .. } => Some(Opcode::Jmp),
            Self::Branch { cond, .. } => Some(cond.opcode()),
            Self::NativeCall(_) => Some(Opcode::Nfc),
            Self::Unknown(_) => None,
        }
    }

    /// Encoded size in bytes, opcode included.
    pub fn width(&self) -> usize {
        match self {
            // opcode, return tag, params, terminator
            Self::NativeCall(call) => 3 + call.param_count(),
            Self::Unknown(_) => 1,
            other => other
                .opcode()
                .and_then(Opcode::operand_width)
                .map_or(1, |w| 1 + w),
        }
    }

    /// Append the encoded instruction to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match *self {
            Self::Nop => out.push(Opcode::Nop as u8),
            Self::Binary { op, dst, lhs, rhs } => {
                out.extend_from_slice(&[op.opcode() as u8, dst, lhs, rhs])
            }
            Self::Not { dst, src } => out.extend_from_slice(&[Opcode::Not as u8, dst, src]),
            Self::Mov { dst, imm } => {
                out.extend_from_slice(&[Opcode::Mov as u8, dst]);
                out.extend_from_slice(&imm);
            }
            Self::Jmp { target } => out.extend_from_slice(&[Opcode::Jmp as u8, target]),
            Self::Branch {
                cond,
                lhs,
                rhs,
                target,
            } => out.extend_from_slice(&[cond.opcode() as u8, lhs, rhs, target]),
            Self::NativeCall(call) => {
                out.extend_from_slice(&[Opcode::Nfc as u8, call.ret_tag]);
                out.extend_from_slice(call.param_tags);
                out.push(0);
            }
            Self::Unknown(byte) => out.push(byte),
        }
    }
}

impl fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Nop => f.write_str("nop"),
            Self::Binary { op, dst, lhs, rhs } => {
                write!(f, "{} r{dst}, r{lhs}, r{rhs}", op.opcode())
            }
            Self::Not { dst, src } => write!(f, "not r{dst}, r{src}"),
            Self::Mov { dst, imm } => {
                let value = mov_value(imm);
                if value < 0 {
                    write!(f, "mov r{dst}, -{:#x}", value.unsigned_abs())
                } else {
                    write!(f, "mov r{dst}, {value:#x}")
                }
            }
            Self::Jmp { target } => write!(f, "jmp r{target}"),
            Self::Branch {
                cond,
                lhs,
                rhs,
                target,
            } => write!(f, "{} r{lhs}, r{rhs}, r{target}", cond.opcode()),
            Self::NativeCall(call) => {
                f.write_str("nfc ")?;
                match call.return_type() {
                    Some(tag) => f.write_str(tag.name())?,
                    None => write!(f, "{:#04x}", call.ret_tag)?,
                }
                for tag in call.params() {
                    write!(f, ", {}", tag.name())?;
                }
                Ok(())
            }
            Self::Unknown(byte) => write!(f, ".byte {byte:#04x}"),
        }
    }
}
