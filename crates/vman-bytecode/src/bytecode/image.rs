//! Program image with unified code/data storage.
//!
//! The [`Program`] struct owns the loaded bytes. Code and data share one
//! address space: whether an offset holds instructions or string bytes depends
//! only on which instruction dereferences it. Every read goes through a
//! bounds-checked accessor.

use std::io;
use std::ops::Deref;
use std::path::Path;

use super::header::Header;
use super::instructions::{DecodeError, Instruction};
use super::{HEADER_SIZE, MAGIC};

/// Storage for program bytes.
#[derive(Debug)]
pub struct ByteStorage(Vec<u8>);

impl Deref for ByteStorage {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ByteStorage {
    /// Create from owned bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Read a file into memory.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self(bytes))
    }
}

/// A read that would leave the program image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("out of bounds: {len} byte(s) at {offset:#x} in an image of {size} bytes")]
pub struct OutOfBounds {
    pub offset: u64,
    pub len: usize,
    pub size: usize,
}

/// Program load error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("file too small: {0} bytes (minimum {HEADER_SIZE})")]
    FileTooSmall(usize),
    #[error("not a compatible vman binary: magic {found:#018x} (expected {MAGIC:#018x})")]
    InvalidMagic { found: u64 },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A validated program image.
///
/// The only way to obtain a `Program` is through header validation, so an
/// image with a wrong magic never reaches the VM.
#[derive(Debug)]
pub struct Program {
    storage: ByteStorage,
    header: Header,
}

impl Program {
    /// Load a program from owned bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ImageError> {
        Self::from_storage(ByteStorage::from_vec(bytes))
    }

    /// Load a program from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let storage = ByteStorage::from_file(&path)?;
        Self::from_storage(storage)
    }

    fn from_storage(storage: ByteStorage) -> Result<Self, ImageError> {
        if storage.len() < HEADER_SIZE {
            return Err(ImageError::FileTooSmall(storage.len()));
        }

        let header = Header::from_bytes(&storage[..HEADER_SIZE]);
        if !header.validate_magic() {
            return Err(ImageError::InvalidMagic {
                found: header.magic,
            });
        }

        Ok(Self { storage, header })
    }

    /// Get the parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Initial program counter.
    pub fn entry_point(&self) -> u64 {
        self.header.entry_point
    }

    /// Get the raw bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.storage
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Read a single byte.
    pub fn byte(&self, offset: u64) -> Result<u8, OutOfBounds> {
        self.slice(offset, 1).map(|b| b[0])
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn slice(&self, offset: u64, len: usize) -> Result<&[u8], OutOfBounds> {
        let err = OutOfBounds {
            offset,
            len,
            size: self.storage.len(),
        };
        let start = usize::try_from(offset).map_err(|_| err)?;
        let end = start.checked_add(len).ok_or(err)?;
        self.storage.get(start..end).ok_or(err)
    }

    /// Borrow everything from `offset` to the end of the image.
    ///
    /// The offset itself must lie inside the image.
    pub fn tail(&self, offset: u64) -> Result<&[u8], OutOfBounds> {
        let err = OutOfBounds {
            offset,
            len: 1,
            size: self.storage.len(),
        };
        let start = usize::try_from(offset).map_err(|_| err)?;
        if start >= self.storage.len() {
            return Err(err);
        }
        Ok(&self.storage[start..])
    }

    /// Read a null-terminated string, without its terminator.
    ///
    /// At most `max_len` bytes are taken; longer strings are truncated. A
    /// string that runs into the end of the image before its terminator (and
    /// before `max_len`) is out of bounds.
    pub fn c_str(&self, offset: u64, max_len: usize) -> Result<&[u8], OutOfBounds> {
        let rest = self.tail(offset)?;
        let window = &rest[..rest.len().min(max_len)];
        if let Some(nul) = window.iter().position(|&b| b == 0) {
            return Ok(&window[..nul]);
        }
        if window.len() == max_len {
            return Ok(window);
        }
        Err(OutOfBounds {
            offset,
            len: window.len() + 1,
            size: self.storage.len(),
        })
    }

    /// Decode the instruction at `pc`.
    #[inline]
    pub fn decode_at(&self, pc: u64) -> Result<Instruction<'_>, DecodeError> {
        let bytes = self.tail(pc).map_err(|_| DecodeError::PastEnd {
            pc,
            size: self.storage.len(),
        })?;
        Instruction::decode(bytes, pc)
    }
}
