//! FFI bindings for Synheart Gesture
//!
//! This module provides C-compatible functions for driving the gesture engine
//! from a host application that owns the camera, the landmark tracker and the
//! classification model. All functions take and return JSON as C strings
//! (null-terminated); returned strings must be freed with `gesture_free_string`.
//!
//! Typical host loop:
//! 1. `gesture_engine_on_frame` for every tracker frame
//! 2. when the outcome carries a `classify` request, run the model
//!    asynchronously and call `gesture_engine_complete_classification`
//! 3. execute every `action_dispatched` event and report back with
//!    `gesture_engine_report_action`

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::classifier::ClassificationResult;
use crate::config::GestureConfig;
use crate::engine::GestureEngine;
use crate::error::GestureError;
use crate::frame::FrameRecord;
use crate::types::{ActionReport, EngineEvent};

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

/// Serialize a value and hand it to the caller, recording failures
fn json_to_cstr<T: serde::Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Classification result delivered by the host
#[derive(Deserialize)]
struct ClassificationCompletion {
    ticket: u64,
    timestamp: DateTime<Utc>,
    /// Model output in configured label order
    #[serde(default)]
    probabilities: Option<Vec<f32>>,
    /// Set instead of `probabilities` when the model failed
    #[serde(default)]
    error: Option<String>,
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to a GestureEngine
pub struct GestureEngineHandle {
    engine: GestureEngine,
}

impl GestureEngineHandle {
    fn complete(&mut self, completion: ClassificationCompletion) -> Vec<EngineEvent> {
        let result = match (completion.probabilities, completion.error) {
            (_, Some(message)) => Err(GestureError::ClassificationFailed(message)),
            (Some(probabilities), None) => ClassificationResult::from_probabilities(
                &self.engine.config().labels,
                &probabilities,
            ),
            (None, None) => Err(GestureError::ClassificationFailed(
                "completion carried neither probabilities nor error".to_string(),
            )),
        };
        self.engine
            .complete_classification(completion.ticket, result, completion.timestamp)
    }
}

/// Create a new engine from a JSON configuration (NULL for defaults).
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Returns a pointer that must be freed with `gesture_engine_free`.
/// - Returns NULL on error; call `gesture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gesture_engine_new(
    config_json: *const c_char,
) -> *mut GestureEngineHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        GestureConfig::default()
    } else {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match GestureConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match GestureEngine::new(config) {
        Ok(engine) => Box::into_raw(Box::new(GestureEngineHandle { engine })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `gesture_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gesture_engine_free(engine: *mut GestureEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Feed one `hand.frame.v1` record and return the frame outcome as JSON.
///
/// Malformed landmarks do not fail the call; the outcome is marked `dropped`.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `gesture_engine_new`.
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `gesture_free_string`.
/// - Returns NULL on error; call `gesture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gesture_engine_on_frame(
    engine: *mut GestureEngineHandle,
    frame_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &mut *engine;

    let json = match cstr_to_string(frame_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frame string pointer");
            return ptr::null_mut();
        }
    };

    let frame: FrameRecord = match serde_json::from_str(&json) {
        Ok(frame) => frame,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let outcome = match frame.to_vector(handle.engine.config().landmark_count) {
        Ok(vector) => handle.engine.on_frame(vector, frame.timestamp),
        Err(e) => {
            tracing::warn!(error = %e, "dropping malformed frame");
            crate::engine::FrameOutcome {
                dropped: true,
                ..Default::default()
            }
        }
    };

    json_to_cstr(&outcome)
}

/// Complete a classification request and return the resulting events as JSON.
///
/// `completion_json` is `{"ticket": n, "timestamp": "...", "probabilities": [...]}`
/// or `{"ticket": n, "timestamp": "...", "error": "..."}`.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `gesture_engine_new`.
/// - `completion_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `gesture_free_string`.
/// - Returns NULL on error; call `gesture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gesture_engine_complete_classification(
    engine: *mut GestureEngineHandle,
    completion_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &mut *engine;

    let json = match cstr_to_string(completion_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid completion string pointer");
            return ptr::null_mut();
        }
    };

    match serde_json::from_str::<ClassificationCompletion>(&json) {
        Ok(completion) => json_to_cstr(&handle.complete(completion)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Report an action outcome and return the resulting events as JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `gesture_engine_new`.
/// - `report_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `gesture_free_string`.
/// - Returns NULL on error; call `gesture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gesture_engine_report_action(
    engine: *mut GestureEngineHandle,
    report_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &mut *engine;

    let json = match cstr_to_string(report_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid report string pointer");
            return ptr::null_mut();
        }
    };

    match serde_json::from_str::<ActionReport>(&json) {
        Ok(report) => json_to_cstr(&handle.engine.report_action(report)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Restart detection (full state reset, action cooldowns kept).
///
/// # Safety
/// - `engine` must be a valid pointer returned by `gesture_engine_new`.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn gesture_engine_restart(engine: *mut GestureEngineHandle) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }
    (&mut *engine).engine.restart();
    0
}

/// Current engine state as JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `gesture_engine_new`.
/// - Returns a newly allocated string that must be freed with `gesture_free_string`.
/// - Returns NULL on error; call `gesture_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gesture_engine_state(engine: *const GestureEngineHandle) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    json_to_cstr(&(&*engine).engine.state())
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Gesture functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Gesture function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gesture_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Gesture function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn gesture_last_error() -> *const c_char {
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
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn gesture_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
