//! Parameter tokens and C type mapping.

use std::ffi::{c_char, c_long};

use libffi::middle::{Arg, Type, arg};
use vman_bytecode::{OutOfBounds, Program, TypeTag};

/// A parameter as declared by NFC: its type tag and the image bytes holding
/// its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamToken<'p> {
    pub tag: TypeTag,
    pub bytes: &'p [u8],
}

impl<'p> ParamToken<'p> {
    /// Borrow the value bytes for `tag` at `offset`.
    ///
    /// Pointer parameters borrow everything from `offset` to the end of the
    /// image; the callee sees the address of the first byte.
    pub fn read(program: &'p Program, tag: TypeTag, offset: u64) -> Result<Self, OutOfBounds> {
        let bytes = match tag {
            TypeTag::Pointer => program.tail(offset)?,
            _ => program.slice(offset, tag.value_size())?,
        };
        Ok(Self { tag, bytes })
    }

    /// Decode the value, native-endian.
    pub fn value(&self) -> NativeValue {
        let b = self.bytes;
        match self.tag {
            TypeTag::Bool => NativeValue::Bool(u8::from(b[0] != 0)),
            TypeTag::Char => NativeValue::Char(b[0] as i8),
            TypeTag::Short => NativeValue::Short(i16::from_ne_bytes(array(b))),
            TypeTag::Int => NativeValue::Int(i32::from_ne_bytes(array(b))),
            TypeTag::Long => NativeValue::Long(c_long::from_ne_bytes(array(b))),
            TypeTag::LongLong => NativeValue::LongLong(i64::from_ne_bytes(array(b))),
            TypeTag::Float => NativeValue::Float(f32::from_ne_bytes(array(b))),
            TypeTag::Double => NativeValue::Double(f64::from_ne_bytes(array(b))),
            TypeTag::Pointer => NativeValue::Pointer(b.as_ptr().cast::<c_char>()),
        }
    }
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// A marshalled argument, typed as the callee expects it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NativeValue {
    Bool(u8),
    Char(i8),
    Short(i16),
    Int(i32),
    Long(c_long),
    LongLong(i64),
    Float(f32),
    Double(f64),
    Pointer(*const c_char),
}

impl NativeValue {
    pub fn tag(&self) -> TypeTag {
        match self {
            NativeValue::Bool(_) => TypeTag::Bool,
            NativeValue::Char(_) => TypeTag::Char,
            NativeValue::Short(_) => TypeTag::Short,
            NativeValue::Int(_) => TypeTag::Int,
            NativeValue::Long(_) => TypeTag::Long,
            NativeValue::LongLong(_) => TypeTag::LongLong,
            NativeValue::Float(_) => TypeTag::Float,
            NativeValue::Double(_) => TypeTag::Double,
            NativeValue::Pointer(_) => TypeTag::Pointer,
        }
    }

    /// Argument referencing this value; valid while `self` is alive.
    pub(crate) fn as_arg(&self) -> Arg {
        match self {
            NativeValue::Bool(v) => arg(v),
            NativeValue::Char(v) => arg(v),
            NativeValue::Short(v) => arg(v),
            NativeValue::Int(v) => arg(v),
            NativeValue::Long(v) => arg(v),
            NativeValue::LongLong(v) => arg(v),
            NativeValue::Float(v) => arg(v),
            NativeValue::Double(v) => arg(v),
            NativeValue::Pointer(v) => arg(v),
        }
    }
}

/// libffi type for a tag.
pub(crate) fn ffi_type(tag: TypeTag) -> Type {
    match tag {
        TypeTag::Bool => Type::u8(),
        TypeTag::Char => Type::i8(),
        TypeTag::Short => Type::i16(),
        TypeTag::Int => Type::i32(),
        TypeTag::Long if size_of::<c_long>() == 8 => Type::i64(),
        TypeTag::Long => Type::i32(),
        TypeTag::LongLong => Type::i64(),
        TypeTag::Float => Type::f32(),
        TypeTag::Double => Type::f64(),
        TypeTag::Pointer => Type::pointer(),
    }
}

/// Register value for an integer return read back through a full-width slot.
///
/// Follows C conversion to `int`: `bool` becomes 0 or 1, `char` and `short`
/// sign-extend from their own width, wider types keep their low 32 bits.
pub fn narrow_integer(tag: TypeTag, slot: u64) -> i32 {
    match tag {
        TypeTag::Bool => i32::from(slot as u8 != 0),
        TypeTag::Char => i32::from(slot as i8),
        TypeTag::Short => i32::from(slot as i16),
        _ => slot as i32,
    }
}
