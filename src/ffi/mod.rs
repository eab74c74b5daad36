//! Raw FMI C ABI bindings, one module per standard version.
//!
//! Hand-written typed [`libloading`] lookups rather than `bindgen` output —
//! this crate carries no vendored FMI C headers for `bindgen` to parse.

#[cfg(feature = "fmi1")]
pub mod fmi1;
#[cfg(feature = "fmi2")]
pub mod fmi2;

/// Resolves one named C symbol from `lib`, logging a warning before the
/// error propagates. A missing required symbol is what the Model Manager
/// reports as `LoadFmuStatus::SharedLibLoadFailed` — this is the one place
/// that turns the miss into a diagnosable event instead of a silent `?`.
pub(crate) fn resolve_symbol<T: Copy>(lib: &libloading::Library, name: &[u8]) -> Result<T, libloading::Error> {
    unsafe { lib.get::<T>(name) }.map(|sym| *sym).map_err(|e| {
        log::warn!(target: "fmi", "missing required symbol {}: {e}", String::from_utf8_lossy(name));
        e
    })
}
