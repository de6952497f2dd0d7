//! FFI bindings for Healthlog Insights
//!
//! This module provides C-compatible functions for calling the engine from the
//! host application. Input bundles and reports cross the boundary as JSON in
//! null-terminated C strings. Returned strings are allocated here and must be
//! freed by the caller using `healthlog_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{DateTime, Utc};

use crate::config::InsightConfig;
use crate::engine::InsightsEngine;
use crate::error::InsightError;
use crate::types::{parse_flexible_datetime, InsightInput};

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

/// Resolve the reference instant: explicit argument, then the bundle's
/// `as_of`, then the current time.
unsafe fn resolve_as_of(
    as_of: *const c_char,
    input: &InsightInput,
) -> Result<DateTime<Utc>, InsightError> {
    if as_of.is_null() {
        return Ok(input.as_of.unwrap_or_else(Utc::now));
    }
    let s = cstr_to_string(as_of)
        .ok_or_else(|| InsightError::InvalidInput("as_of is not valid UTF-8".to_string()))?;
    parse_flexible_datetime(&s)
}

unsafe fn run(
    input_json: *const c_char,
    config_json: Option<*const c_char>,
    as_of: *const c_char,
) -> Result<String, InsightError> {
    let json = cstr_to_string(input_json)
        .ok_or_else(|| InsightError::InvalidInput("Invalid input string pointer".to_string()))?;
    let input = InsightInput::from_json(&json)?;

    let engine = match config_json {
        Some(ptr) => {
            let config = cstr_to_string(ptr).ok_or_else(|| {
                InsightError::InvalidInput("Invalid config string pointer".to_string())
            })?;
            InsightsEngine::with_config(InsightConfig::from_json(&config)?)?
        }
        None => InsightsEngine::new(),
    };

    let as_of = resolve_as_of(as_of, &input)?;
    engine.generate_from_input(&input, as_of).to_json()
}

fn into_cstr(result: Result<String, InsightError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Insight Generation
// ============================================================================

/// Generate an insight report from an input bundle with default settings.
///
/// # Safety
/// - `input_json` must be a valid null-terminated C string holding an input bundle.
/// - `as_of` may be NULL or a null-terminated `YYYY-MM-DD` / RFC 3339 string.
///   When NULL, the bundle's `as_of` is used, falling back to the current time.
/// - Returns a newly allocated report JSON string that must be freed with `healthlog_free_string`.
/// - Returns NULL on error; call `healthlog_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn healthlog_generate_insights(
    input_json: *const c_char,
    as_of: *const c_char,
) -> *mut c_char {
    clear_last_error();
    into_cstr(run(input_json, None, as_of))
}

/// Generate an insight report with a JSON configuration override.
///
/// # Safety
/// - `input_json` and `config_json` must be valid null-terminated C strings.
/// - `as_of` follows the same rules as in `healthlog_generate_insights`.
/// - Returns a newly allocated string that must be freed with `healthlog_free_string`.
/// - Returns NULL on error; call `healthlog_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn healthlog_generate_insights_with_config(
    input_json: *const c_char,
    config_json: *const c_char,
    as_of: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if config_json.is_null() {
        set_last_error("Invalid config string pointer");
        return ptr::null_mut();
    }

    into_cstr(run(input_json, Some(config_json), as_of))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a `healthlog_*` function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a `healthlog_*` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn healthlog_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next `healthlog_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn healthlog_last_error() -> *const c_char {
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
pub unsafe extern "C" fn healthlog_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stressed_bundle() -> CString {
        let metrics: Vec<String> = (1..=14)
            .map(|day| format!(r#"{{ "date": "2024-06-{day:02}", "stress_level": 9 }}"#))
            .collect();
        CString::new(format!(
            r#"{{ "as_of": "2024-06-15T12:00:00Z", "health_metrics": [{}] }}"#,
            metrics.join(",")
        ))
        .unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        healthlog_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_generate_insights() {
        let input = stressed_bundle();

        unsafe {
            let report = take_string(healthlog_generate_insights(input.as_ptr(), ptr::null()));
            let value: serde_json::Value = serde_json::from_str(&report).unwrap();

            assert_eq!(value["insights"][0]["id"], "chronic_stress");
            assert_eq!(value["insights"][0]["severity"], "critical");
            assert_eq!(value["generated_at"], "2024-06-15T12:00:00Z");
            assert!(healthlog_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_explicit_as_of_overrides_bundle() {
        let input = stressed_bundle();
        let as_of = CString::new("2024-06-02").unwrap();

        unsafe {
            let report = take_string(healthlog_generate_insights(input.as_ptr(), as_of.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&report).unwrap();

            assert_eq!(value["insights"][0]["id"], "insufficient_data");
        }
    }

    #[test]
    fn test_ffi_with_config() {
        let input = stressed_bundle();
        let config = CString::new(r#"{ "thresholds": { "chronic_stress_days": 30 } }"#).unwrap();

        unsafe {
            let report = take_string(healthlog_generate_insights_with_config(
                input.as_ptr(),
                config.as_ptr(),
                ptr::null(),
            ));
            let value: serde_json::Value = serde_json::from_str(&report).unwrap();

            assert_eq!(value["insights"][0]["id"], "elevated_stress");
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid = CString::new("not json").unwrap();

        unsafe {
            let result = healthlog_generate_insights(invalid.as_ptr(), ptr::null());
            assert!(result.is_null());

            let error = healthlog_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.starts_with("Invalid JSON"));

            let result = healthlog_generate_insights(ptr::null(), ptr::null());
            assert!(result.is_null());

            let input = stressed_bundle();
            let bad_date = CString::new("next tuesday").unwrap();
            let result = healthlog_generate_insights(input.as_ptr(), bad_date.as_ptr());
            assert!(result.is_null());
            let error_str = CStr::from_ptr(healthlog_last_error()).to_str().unwrap();
            assert!(error_str.starts_with("Date parse error"));
        }
    }

    #[test]
    fn test_ffi_invalid_config() {
        let input = stressed_bundle();
        let config = CString::new(r#"{ "windows": { "recent_days": 0 } }"#).unwrap();

        unsafe {
            let result =
                healthlog_generate_insights_with_config(input.as_ptr(), config.as_ptr(), ptr::null());
            assert!(result.is_null());
            let error_str = CStr::from_ptr(healthlog_last_error()).to_str().unwrap();
            assert!(error_str.starts_with("Invalid configuration"));

            let result =
                healthlog_generate_insights_with_config(input.as_ptr(), ptr::null(), ptr::null());
            assert!(result.is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = healthlog_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
