//! Raw FMI scalar typedefs, shared by the FMI 1.0 and 2.0 C ABI bindings.
//!
//! These mirror `fmiModelTypes.h` / `fmi2TypesPlatform.h` from the standard
//! rather than anything Rust-idiomatic, because they cross the FFI boundary
//! verbatim.

use std::os::raw::{c_char, c_int, c_void};

/// `fmiReal` / `fmi2Real`
pub type FmiReal = f64;
/// `fmiInteger` / `fmi2Integer`
pub type FmiInteger = i32;
/// `fmiValueReference` / `fmi2ValueReference`
pub type FmiValueReference = u32;
/// `fmiString` / `fmi2String`: a NUL-terminated C string, owned by the callee.
pub type FmiString = *const c_char;
/// `fmiComponent` / `fmi2Component`: opaque per-instance handle.
pub type FmiComponent = *mut c_void;
/// `fmi2ComponentEnvironment`: opaque per-instantiation host handle.
pub type Fmi2ComponentEnvironment = *mut c_void;
/// `fmi2FMUstate`: opaque serializable snapshot handle (v2 only).
pub type Fmi2FmuState = *mut c_void;

/// FMI 1.0 represents booleans as `char`; FMI 2.0 widens this to `int`.
pub type Fmi1Boolean = c_char;
pub type Fmi2Boolean = c_int;

/// Value used by the Model Description for any default-experiment field
/// that was not present in the XML, so callers can detect absence the same
/// way they would check `isnan()` in the original C++.
pub const NOT_A_NUMBER: FmiReal = FmiReal::NAN;

/// True iff `x` is the crate's "value absent" sentinel.
pub fn is_not_a_number(x: FmiReal) -> bool {
    x.is_nan()
}
