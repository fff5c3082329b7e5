//! NFC execution: names, parameters, resolution and the call itself.

use std::ffi::CString;

use libffi::middle::{Arg, Cif, CodePtr};
use vman_bytecode::{MAX_FUNCTION_NAME, MAX_LIBRARY_NAME, NativeCall, Program, TypeTag};

use crate::engine::{
    FIRST_PARAM_REGISTER, FUNCTION_REGISTER, LIBRARY_REGISTER, Registers, RuntimeError,
};

use super::marshal::{NativeValue, ParamToken, ffi_type, narrow_integer};
use super::resolver::{NativeFn, SymbolResolver};

/// How an NFC ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    /// The function ran and returned this narrowed value.
    Returned(i32),
    /// The library is not resident or does not export the function.
    Unresolved,
    /// The return tag cannot be narrowed into a register; nothing was called.
    UnsupportedReturn(u8),
}

impl CallOutcome {
    /// Value the result register receives, if any.
    pub fn register_value(&self) -> Option<i32> {
        match *self {
            CallOutcome::Returned(value) => Some(value),
            CallOutcome::Unresolved => Some(0),
            CallOutcome::UnsupportedReturn(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeCallReport {
    pub library: String,
    pub function: String,
    pub outcome: CallOutcome,
}

/// Perform one native call.
///
/// Reads the library and function names through `r0` and `r1`, checks the
/// return tag and resolves the function. Only a resolved call reads its
/// parameters, one per declared tag through `r2..`. The register file is not
/// modified; the caller stores
/// [`CallOutcome::register_value`] into the result register.
pub fn invoke<R: SymbolResolver>(
    resolver: &mut R,
    program: &Program,
    registers: &Registers,
    call: NativeCall<'_>,
    pc: u64,
) -> Result<NativeCallReport, RuntimeError> {
    let library = read_name(program, registers, LIBRARY_REGISTER, MAX_LIBRARY_NAME, pc)?;
    let function = read_name(program, registers, FUNCTION_REGISTER, MAX_FUNCTION_NAME, pc)?;

    let report = |outcome| NativeCallReport {
        library: library.to_string_lossy().into_owned(),
        function: function.to_string_lossy().into_owned(),
        outcome,
    };

    let Some(ret) = call.return_type().filter(|t| t.is_return_supported()) else {
        tracing::error!(
            library = %library.to_string_lossy(),
            function = %function.to_string_lossy(),
            ret_tag = call.ret_tag(),
            pc,
            "failed to perform native call: unsupported return type"
        );
        return Ok(report(CallOutcome::UnsupportedReturn(call.ret_tag())));
    };

    let Some(target) = resolver.resolve(&library, &function) else {
        tracing::debug!(
            library = %library.to_string_lossy(),
            function = %function.to_string_lossy(),
            pc,
            "native function not resolved"
        );
        return Ok(report(CallOutcome::Unresolved));
    };

    // Parameters are only dereferenced once there is a function to pass them to.
    let tokens = call
        .params()
        .enumerate()
        .map(|(index, tag)| {
            let register = param_register(index, pc)?;
            let offset = image_offset(registers, register, pc)?;
            ParamToken::read(program, tag, offset)
                .map_err(|access| RuntimeError::OutOfBounds { access, pc })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let values: Vec<NativeValue> = tokens.iter().map(ParamToken::value).collect();
    // SAFETY: the resolver vouches that `target` is a function with the C
    // signature described by the NFC tags. Pointer arguments point into
    // `program`, which outlives the call.
    let value = unsafe { call_native(target, ret, &values) };
    tracing::debug!(
        library = %library.to_string_lossy(),
        function = %function.to_string_lossy(),
        result = value,
        "native call returned"
    );
    Ok(report(CallOutcome::Returned(value)))
}

unsafe fn call_native(target: NativeFn, ret: TypeTag, values: &[NativeValue]) -> i32 {
    let cif = Cif::new(values.iter().map(|v| ffi_type(v.tag())), ffi_type(ret));
    let args: Vec<Arg> = values.iter().map(NativeValue::as_arg).collect();
    let code = CodePtr::from_ptr(target.as_ptr());

    // Integer returns come back widened to a full `ffi_arg` slot.
    unsafe {
        match ret {
            TypeTag::LongLong => narrow_integer(ret, cif.call::<i64>(code, &args) as u64),
            TypeTag::Float => cif.call::<f32>(code, &args) as i32,
            TypeTag::Double => cif.call::<f64>(code, &args) as i32,
            _ => narrow_integer(ret, cif.call::<usize>(code, &args) as u64),
        }
    }
}

fn read_name(
    program: &Program,
    registers: &Registers,
    register: u8,
    max_len: usize,
    pc: u64,
) -> Result<CString, RuntimeError> {
    let offset = image_offset(registers, register, pc)?;
    let bytes = program
        .c_str(offset, max_len)
        .map_err(|access| RuntimeError::OutOfBounds { access, pc })?;
    // `c_str` stops at the first NUL, so this cannot fail.
    Ok(CString::new(bytes).unwrap_or_default())
}

fn param_register(index: usize, pc: u64) -> Result<u8, RuntimeError> {
    let register = usize::from(FIRST_PARAM_REGISTER) + index;
    u8::try_from(register)
        .ok()
        .filter(|r| usize::from(*r) < crate::engine::REGISTER_COUNT)
        .ok_or(RuntimeError::RegisterOutOfRange {
            index: register as u64,
            pc,
        })
}

fn image_offset(registers: &Registers, register: u8, pc: u64) -> Result<u64, RuntimeError> {
    let value = registers
        .get(register)
        .ok_or(RuntimeError::RegisterOutOfRange {
            index: u64::from(register),
            pc,
        })?;
    u64::try_from(value).map_err(|_| RuntimeError::NegativeOffset {
        register,
        value,
        pc,
    })
}
