//! Native call bridge.
//!
//! NFC names a library and a function through C strings in the program image,
//! declares the C types of its parameters and return value with type tags, and
//! reads each parameter value from the image. The bridge marshals those values,
//! resolves the function among the libraries already loaded in the process and
//! invokes it with the host's C calling convention.

mod bridge;
mod marshal;
mod resolver;


pub use bridge::{CallOutcome, NativeCallReport, invoke};
pub use marshal::{NativeValue, ParamToken, narrow_integer};
pub use resolver::{HostResolver, NativeFn, SymbolResolver};
