//! FFI bindings for client-signals
//!
//! This module provides C-compatible functions for native embedders (for
//! example a webview host) that forward page events and window geometry and
//! read back the behavior record. All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `cs_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::behavior::{BehaviorMonitor, DevToolsHeuristic, PageEvent};
use crate::config::DevToolsConfig;
use crate::error::SignalError;
use crate::host::WindowGeometry;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Behavior Monitor API
// ============================================================================

/// Opaque handle to a behavior monitor and its devtools heuristic
pub struct MonitorHandle {
    monitor: BehaviorMonitor,
    devtools: DevToolsHeuristic,
}

impl MonitorHandle {
    fn new(start_time_ms: i64) -> Self {
        Self {
            monitor: BehaviorMonitor::new(start_time_ms),
            devtools: DevToolsHeuristic::new(DevToolsConfig::default()),
        }
    }

    fn dispatch_json(&self, json: &str) -> Result<(), SignalError> {
        if json.trim().is_empty() {
            return Err(SignalError::InvalidEvent("empty event payload".to_string()));
        }
        let event = PageEvent::from_json(json)?;
        self.monitor.dispatch(&event);
        Ok(())
    }

    fn behavior_json(&self) -> Result<String, SignalError> {
        Ok(serde_json::to_string(&self.monitor.snapshot())?)
    }
}

/// Create a new behavior monitor.
///
/// `start_time_ms` is the page start in Unix milliseconds; pass a negative
/// value to use the current time.
///
/// # Safety
/// - Returns a pointer to a newly allocated monitor.
/// - Must be freed with `cs_monitor_free`.
#[no_mangle]
pub unsafe extern "C" fn cs_monitor_new(start_time_ms: i64) -> *mut MonitorHandle {
    clear_last_error();

    let start = if start_time_ms < 0 {
        chrono::Utc::now().timestamp_millis()
    } else {
        start_time_ms
    };

    Box::into_raw(Box::new(MonitorHandle::new(start)))
}

/// Free a behavior monitor.
///
/// # Safety
/// - `monitor` must be a valid pointer returned by `cs_monitor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn cs_monitor_free(monitor: *mut MonitorHandle) {
    if !monitor.is_null() {
        drop(Box::from_raw(monitor));
    }
}

/// Feed one page event, encoded as JSON (e.g. `{"type":"copy"}`).
///
/// # Safety
/// - `monitor` must be a valid pointer returned by `cs_monitor_new`.
/// - `event_json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error; call `cs_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn cs_monitor_dispatch(
    monitor: *mut MonitorHandle,
    event_json: *const c_char,
) -> i32 {
    clear_last_error();

    if monitor.is_null() {
        set_last_error("Null monitor pointer");
        return -1;
    }

    let handle = &*monitor;

    let json_str = match cstr_to_string(event_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid event string pointer");
            return -1;
        }
    };

    match handle.dispatch_json(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Run one devtools sample against the given window geometry.
///
/// # Safety
/// - `monitor` must be a valid pointer returned by `cs_monitor_new`.
/// - Returns the new score (0-5), or -1 when the sample was skipped because
///   a dimension is zero. Returns -2 on a null monitor.
#[no_mangle]
pub unsafe extern "C" fn cs_monitor_sample_geometry(
    monitor: *mut MonitorHandle,
    outer_width: u32,
    outer_height: u32,
    inner_width: u32,
    inner_height: u32,
) -> i32 {
    clear_last_error();

    if monitor.is_null() {
        set_last_error("Null monitor pointer");
        return -2;
    }

    let handle = &mut *monitor;
    let geometry = WindowGeometry::new(outer_width, outer_height, inner_width, inner_height);

    match handle.devtools.sample(Some(geometry), &handle.monitor) {
        Some(reading) => i32::from(reading.score),
        None => -1,
    }
}

/// Read the current behavior record as JSON.
///
/// # Safety
/// - `monitor` must be a valid pointer returned by `cs_monitor_new`.
/// - Returns a newly allocated string that must be freed with `cs_free_string`.
/// - Returns NULL on error; call `cs_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cs_monitor_behavior_json(monitor: *const MonitorHandle) -> *mut c_char {
    clear_last_error();

    if monitor.is_null() {
        set_last_error("Null monitor pointer");
        return ptr::null_mut();
    }

    match (*monitor).behavior_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by client-signals functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a client-signals function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn cs_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next client-signals call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn cs_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string.
/// - Do NOT free the returned pointer.
#[no_mangle]
pub unsafe extern "C" fn cs_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
