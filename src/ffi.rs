//! FFI bindings for NailGuard
//!
//! This module provides C-compatible functions for calling NailGuard from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `nailguard_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{frame_to_report, MonitorProcessor};

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
// Stateless API
// ============================================================================

/// Process a single frame JSON and return the report JSON (fresh session).
///
/// # Safety
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `nailguard_free_string`.
/// - Returns NULL on error; call `nailguard_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn nailguard_frame_to_report(
    frame_json: *const c_char,
    sensitivity: u32,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(frame_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frame JSON string pointer");
            return ptr::null_mut();
        }
    };

    match frame_to_report(json_str, sensitivity) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful processor API
// ============================================================================

/// Create a processor handle with the given sensitivity (30-80 px).
///
/// # Safety
/// - Returns NULL on error; call `nailguard_last_error` for the message.
/// - The handle must be freed with `nailguard_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn nailguard_processor_new(sensitivity: u32) -> *mut MonitorProcessor {
    clear_last_error();

    match MonitorProcessor::new(sensitivity) {
        Ok(processor) => Box::into_raw(Box::new(processor)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Process one frame through a processor handle, returning the report JSON.
///
/// # Safety
/// - `processor` must be a handle returned by `nailguard_processor_new` that
///   has not been freed.
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `nailguard_free_string`; NULL on error.
#[no_mangle]
pub unsafe extern "C" fn nailguard_processor_process(
    processor: *mut MonitorProcessor,
    frame_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(processor) = processor.as_mut() else {
        set_last_error("Invalid processor handle");
        return ptr::null_mut();
    };

    let json_str = match cstr_to_string(frame_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frame JSON string pointer");
            return ptr::null_mut();
        }
    };

    match processor.process(&json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Reset the session timer on a processor handle.
///
/// # Safety
/// - `processor` must be a live handle from `nailguard_processor_new`.
#[no_mangle]
pub unsafe extern "C" fn nailguard_processor_reset(processor: *mut MonitorProcessor) {
    if let Some(processor) = processor.as_mut() {
        processor.reset_session();
    }
}

/// Free a processor handle.
///
/// # Safety
/// - `processor` must be a handle returned by `nailguard_processor_new`, or
///   NULL (no-op).
#[no_mangle]
pub unsafe extern "C" fn nailguard_processor_free(processor: *mut MonitorProcessor) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Free a string returned by this library.
///
/// # Safety
/// - `s` must be a string returned by a `nailguard_*` function, or NULL
///   (no-op).
#[no_mangle]
pub unsafe extern "C" fn nailguard_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the last error message, or NULL if there is none.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with
///   `nailguard_free_string`.
#[no_mangle]
pub unsafe extern "C" fn nailguard_last_error() -> *mut c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(msg) => string_to_cstr(msg.to_str().unwrap_or("Unknown error")),
        None => ptr::null_mut(),
    })
}
