//! Symbol resolution among libraries resident in the process.

use std::ffi::{CStr, c_void};
use std::ptr::NonNull;

/// Address of a resolved native function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeFn(NonNull<c_void>);

impl NativeFn {
    /// `None` for a null pointer.
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Looks up a function by library and symbol name.
///
/// Called on every NFC; implementations must not assume results are cached by
/// the caller.
pub trait SymbolResolver {
    fn resolve(&mut self, library: &CStr, function: &CStr) -> Option<NativeFn>;
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for &mut R {
    fn resolve(&mut self, library: &CStr, function: &CStr) -> Option<NativeFn> {
        (**self).resolve(library, function)
    }
}

/// Resolves symbols in libraries the process has already loaded.
///
/// Never loads a library: a name that is not resident resolves to nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostResolver;

impl SymbolResolver for HostResolver {
    fn resolve(&mut self, library: &CStr, function: &CStr) -> Option<NativeFn> {
        let ptr = unsafe { platform::resident_symbol(library, function) };
        NativeFn::from_ptr(ptr)
    }
}

#[cfg(target_family = "unix")]
mod platform {
    use std::ffi::CStr;
    use std::os::raw::{c_char, c_int, c_void};
    use std::ptr;

    #[cfg_attr(target_os = "linux", link(name = "dl"))]
    unsafe extern "C" {
        fn dlopen(filename: *const c_char, flag: c_int) -> *mut c_void;
        fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
        fn dlclose(handle: *mut c_void) -> c_int;
    }

    const RTLD_LAZY: c_int = 1;

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    const RTLD_NOLOAD: c_int = 0x10;
    #[cfg(target_os = "freebsd")]
    const RTLD_NOLOAD: c_int = 0x2000;
    #[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "freebsd")))]
    const RTLD_NOLOAD: c_int = 4;

    pub(super) unsafe fn resident_symbol(library: &CStr, function: &CStr) -> *mut c_void {
        let handle = unsafe { dlopen(library.as_ptr(), RTLD_LAZY | RTLD_NOLOAD) };
        if handle.is_null() {
            return ptr::null_mut();
        }
        let symbol = unsafe { dlsym(handle, function.as_ptr()) };
        // The library was resident before the dlopen, so dropping this
        // reference keeps the symbol mapped.
        unsafe { dlclose(handle) };
        symbol
    }
}

#[cfg(target_family = "windows")]
mod platform {
    use std::ffi::CStr;
    use std::os::raw::{c_char, c_void};
    use std::ptr;

    type HMODULE = *mut c_void;

    #[link(name = "kernel32")]
    unsafe extern "system" {
        fn GetModuleHandleA(lpModuleName: *const c_char) -> HMODULE;
        fn GetProcAddress(hModule: HMODULE, lpProcName: *const c_char) -> *mut c_void;
    }

    pub(super) unsafe fn resident_symbol(library: &CStr, function: &CStr) -> *mut c_void {
        let module = unsafe { GetModuleHandleA(library.as_ptr()) };
        if module.is_null() {
            return ptr::null_mut();
        }
        unsafe { GetProcAddress(module, function.as_ptr()) }
    }
}

#[cfg(not(any(target_family = "unix", target_family = "windows")))]
mod platform {
    use std::ffi::{CStr, c_void};

    pub(super) unsafe fn resident_symbol(_library: &CStr, _function: &CStr) -> *mut c_void {
        std::ptr::null_mut()
    }
}
