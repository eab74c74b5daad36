//! The logger/allocator/deallocator indirection the FMI standard requires
//! the host to supply to every FMU instance.
//!
//! Converts the FMU's C strings defensively (never panics on a malformed
//! pointer), maps status to a `log::Level`, and forwards through
//! `log::Record::builder()` rather than `println!`.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::{Mutex, OnceLock};

/// Process-wide optional sink capturing every logger invocation, off by
/// default.
pub struct LogBuffer {
    enabled: std::sync::atomic::AtomicBool,
    lines: Mutex<Vec<String>>,
}

impl LogBuffer {
    const fn new() -> Self {
        Self {
            enabled: std::sync::atomic::AtomicBool::new(false),
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(std::sync::atomic::Ordering::Relaxed)
    }

    fn record(&self, instance_name: &str, category: &str, message: &str) {
        if !self.is_enabled() {
            return;
        }
        let line = format!("[{instance_name}] ({category}) {message}");
        self.lines.lock().unwrap().push(line);
    }

    /// Snapshot of every captured line since the buffer was last cleared.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

/// The single process-wide debug log buffer.
pub fn log_buffer() -> &'static LogBuffer {
    static BUFFER: OnceLock<LogBuffer> = OnceLock::new();
    BUFFER.get_or_init(LogBuffer::new)
}

/// Maps an FMI status ordinal (shared encoding across v1/v2 for the
/// statuses they hold in common: OK=0, Warning=1, Discard=2, Error=3,
/// Fatal=4) to a `log::Level`. The succinct logger additionally uses this
/// to decide whether to format the message at all.
pub fn status_ordinal_to_level(status: i32) -> log::Level {
    match status {
        0 => log::Level::Info,
        1 => log::Level::Warn,
        2 => log::Level::Debug,
        _ => log::Level::Error,
    }
}

/// Converts a possibly-null, possibly-invalid C string into a `&str`,
/// never panicking — the FMU is untrusted code and the logger must survive
/// being called with garbage.
///
/// # Safety
/// `ptr` must either be null or point to a NUL-terminated string valid for
/// the duration of this call, per the FMI callback contract.
pub unsafe fn c_str_or(ptr: *const c_char, fallback: &'static str) -> String {
    if ptr.is_null() {
        return fallback.to_owned();
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .unwrap_or(fallback)
        .to_owned()
}

/// Forwards one already-decoded log line through the `log` facade and, if
/// enabled, the process-wide [`LogBuffer`].
pub fn emit(instance_name: &str, category: &str, message: &str, level: log::Level) {
    log::logger().log(
        &log::Record::builder()
            .args(format_args!("{message}"))
            .level(level)
            .module_path(Some("fmi"))
            .target(category)
            .build(),
    );
    log_buffer().record(instance_name, category, message);
}

/// Verbose default logger: emits every message regardless of status.
pub fn verbose_log(instance_name: &str, status_ordinal: i32, category: &str, message: &str) {
    emit(instance_name, category, message, status_ordinal_to_level(status_ordinal));
}

/// Succinct default logger: only emits non-OK-status messages.
pub fn succinct_log(instance_name: &str, status_ordinal: i32, category: &str, message: &str) {
    if status_ordinal == 0 {
        return;
    }
    emit(instance_name, category, message, status_ordinal_to_level(status_ordinal));
}

/// Default verbose `extern "C"` logger, callable as either FMI version's
/// `CallbackLogger` — v1's `FmiComponent` and v2's `Fmi2ComponentEnvironment`
/// are both `*mut c_void`, so one function satisfies both type aliases.
///
/// # Safety
/// Called by the FMU with C strings that may be null or non-UTF8; see
/// [`c_str_or`].
pub unsafe extern "C" fn default_verbose_logger(
    _component: *mut std::ffi::c_void,
    instance_name: *const c_char,
    status: i32,
    category: *const c_char,
    message: *const c_char,
) {
    let instance_name = unsafe { c_str_or(instance_name, "?") };
    let category = unsafe { c_str_or(category, "?") };
    let message = unsafe { c_str_or(message, "") };
    verbose_log(&instance_name, status, &category, &message);
}

/// Default succinct `extern "C"` logger — only non-OK statuses reach `log`.
///
/// # Safety
/// Same contract as [`default_verbose_logger`].
pub unsafe extern "C" fn default_succinct_logger(
    _component: *mut std::ffi::c_void,
    instance_name: *const c_char,
    status: i32,
    category: *const c_char,
    message: *const c_char,
) {
    let instance_name = unsafe { c_str_or(instance_name, "?") };
    let category = unsafe { c_str_or(category, "?") };
    let message = unsafe { c_str_or(message, "") };
    succinct_log(&instance_name, status, &category, &message);
}

/// Default allocator, mapped to the host's general-purpose allocator via
/// `calloc` rather than Rust's `alloc` API — `free_memory` receives only the
/// pointer back, with no size/layout, which rules out `std::alloc::dealloc`.
///
/// # Safety
/// Only ever called by an FMU through the `CallbackFunctions` table.
#[cfg(any(feature = "fmi1", feature = "fmi2"))]
pub unsafe extern "C" fn default_allocate_memory(n_obj: usize, size: usize) -> *mut std::ffi::c_void {
    unsafe { libc::calloc(n_obj, size) }
}

/// Default deallocator paired with [`default_allocate_memory`].
///
/// # Safety
/// `obj` must be null or a pointer previously returned by
/// [`default_allocate_memory`] and not yet freed.
#[cfg(any(feature = "fmi1", feature = "fmi2"))]
pub unsafe extern "C" fn default_free_memory(obj: *mut std::ffi::c_void) {
    if !obj.is_null() {
        unsafe { libc::free(obj) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succinct_skips_ok() {
        log_buffer().set_enabled(true);
        log_buffer().clear();
        succinct_log("inst", 0, "cat", "should not appear");
        assert!(log_buffer().lines().is_empty());
        succinct_log("inst", 1, "cat", "should appear");
        assert_eq!(log_buffer().lines().len(), 1);
        log_buffer().set_enabled(false);
    }

    #[test]
    fn c_str_or_handles_null() {
        let s = unsafe { c_str_or(std::ptr::null(), "NULL") };
        assert_eq!(s, "NULL");
    }
}
