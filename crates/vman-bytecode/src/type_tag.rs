//! Type tags for native call marshalling.
//!
//! A tag names the C type a value is pushed as (parameters) or read back as
//! (return values). Tag 0 is reserved as the parameter list terminator.

use std::ffi::c_long;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Bool = 0x01,
    Short = 0x02,
    Int = 0x03,
    Long = 0x04,
    LongLong = 0x05,
    Float = 0x06,
    Double = 0x07,
    /// `const char*` into the program image.
    Pointer = 0x08,
    Char = 0x09,
}

impl TypeTag {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0x01 => TypeTag::Bool,
            0x02 => TypeTag::Short,
            0x03 => TypeTag::Int,
            0x04 => TypeTag::Long,
            0x05 => TypeTag::LongLong,
            0x06 => TypeTag::Float,
            0x07 => TypeTag::Double,
            0x08 => TypeTag::Pointer,
            0x09 => TypeTag::Char,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Short => "short",
            TypeTag::Int => "int",
            TypeTag::Long => "long",
            TypeTag::LongLong => "long long",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::Pointer => "ptr",
            TypeTag::Char => "char",
        }
    }

    /// Bytes read from the image for a parameter of this type.
    ///
    /// Pointers read nothing; the parameter is the address itself.
    pub fn value_size(self) -> usize {
        match self {
            TypeTag::Bool | TypeTag::Char => 1,
            TypeTag::Short => 2,
            TypeTag::Int | TypeTag::Float => 4,
            TypeTag::Long => size_of::<c_long>(),
            TypeTag::LongLong | TypeTag::Double => 8,
            TypeTag::Pointer => 0,
        }
    }

    /// Return values of this type can be narrowed into a register.
    pub fn is_return_supported(self) -> bool {
        self != TypeTag::Pointer
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
