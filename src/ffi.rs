//! FFI bindings for Synheart Streak
//!
//! This module provides C-compatible functions for calling Streak from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `streak_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{streak_report_json, StreakProcessor};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

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

/// Analyze an observation array against a goal and return the report JSON.
///
/// # Safety
/// - `observations_json` and `goal_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `streak_free_string`.
/// - Returns NULL on error; call `streak_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn streak_analyze(
    observations_json: *const c_char,
    goal_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(observations) = cstr_to_string(observations_json) else {
        set_last_error("Invalid observations string pointer");
        return ptr::null_mut();
    };
    let Some(goal) = cstr_to_string(goal_json) else {
        set_last_error("Invalid goal string pointer");
        return ptr::null_mut();
    };

    match streak_report_json(observations, goal) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Configured Processor API
// ============================================================================

/// Opaque handle to a StreakProcessor
pub struct StreakProcessorHandle {
    processor: StreakProcessor,
}

/// Create a new StreakProcessor.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration, otherwise it must be
///   a valid null-terminated C string holding an engine configuration.
/// - Returns a pointer that must be freed with `streak_processor_free`.
/// - Returns NULL on error; call `streak_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn streak_processor_new(
    config_json: *const c_char,
) -> *mut StreakProcessorHandle {
    clear_last_error();

    let processor = if config_json.is_null() {
        StreakProcessor::new()
    } else {
        let Some(json) = cstr_to_string(config_json) else {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        };
        match StreakProcessor::from_config_json(&json) {
            Ok(processor) => processor,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    Box::into_raw(Box::new(StreakProcessorHandle { processor }))
}

/// Free a StreakProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `streak_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn streak_processor_free(processor: *mut StreakProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Analyze with a configured processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `streak_processor_new`.
/// - `observations_json` and `goal_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `streak_free_string`.
/// - Returns NULL on error; call `streak_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn streak_processor_analyze(
    processor: *const StreakProcessorHandle,
    observations_json: *const c_char,
    goal_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }
    let handle = &*processor;

    let Some(observations) = cstr_to_string(observations_json) else {
        set_last_error("Invalid observations string pointer");
        return ptr::null_mut();
    };
    let Some(goal) = cstr_to_string(goal_json) else {
        set_last_error("Invalid goal string pointer");
        return ptr::null_mut();
    };

    match handle.processor.analyze_json(&observations, &goal) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Streak functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Streak function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn streak_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Streak function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn streak_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Streak library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn streak_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
