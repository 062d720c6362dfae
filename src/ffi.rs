//! FFI bindings for Synheart Trend
//!
//! This module provides C-compatible functions for calling Trend from a
//! mobile host. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `trend_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{DateTime, Utc};

use crate::axis::canonical_axis;
use crate::labels::{last_updated_label, weekly_date_range_label};
use crate::pipeline::ChartProcessor;
use crate::types::{ChartTimezone, Granularity};

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

/// Parse an optional RFC 3339 reference; NULL means "now"
unsafe fn reference_from_ptr(ptr: *const c_char) -> Result<DateTime<Utc>, String> {
    match cstr_to_string(ptr) {
        None if ptr.is_null() => Ok(Utc::now()),
        None => Err("Invalid reference string pointer".to_string()),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("Invalid reference instant '{s}': {e}")),
    }
}

/// Parse an optional timezone; NULL means the host's local timezone
unsafe fn timezone_from_ptr(ptr: *const c_char) -> Result<ChartTimezone, String> {
    match cstr_to_string(ptr) {
        None if ptr.is_null() => Ok(ChartTimezone::Local),
        None => Err("Invalid timezone string pointer".to_string()),
        Some(s) => s.parse().map_err(|e: crate::ComputeError| e.to_string()),
    }
}

unsafe fn granularity_from_ptr(ptr: *const c_char) -> Result<Granularity, String> {
    let s = cstr_to_string(ptr).ok_or_else(|| "Invalid granularity string pointer".to_string())?;
    s.parse().map_err(|e: crate::ComputeError| e.to_string())
}

// ============================================================================
// Chart API
// ============================================================================

/// Aggregate a sample batch and return chart payload JSON.
///
/// # Safety
/// - `json` and `granularity` must be valid null-terminated C strings.
/// - `reference` (RFC 3339) and `timezone` may be NULL for "now" and the local timezone.
/// - Returns a newly allocated string that must be freed with `trend_free_string`.
/// - Returns NULL on error; call `trend_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn trend_align_json(
    json: *const c_char,
    granularity: *const c_char,
    reference: *const c_char,
    timezone: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let (granularity, reference, timezone) = match (
        granularity_from_ptr(granularity),
        reference_from_ptr(reference),
        timezone_from_ptr(timezone),
    ) {
        (Ok(g), Ok(r), Ok(tz)) => (g, r, tz),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    let config = crate::ChartConfig::default().with_timezone(timezone);
    match ChartProcessor::with_config(config).process(&json_str, granularity, reference) {
        Ok(payload) => string_to_cstr(&payload),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Return the canonical axis labels as a JSON array.
///
/// # Safety
/// - `granularity` must be a valid null-terminated C string.
/// - `reference` and `timezone` may be NULL for "now" and the local timezone.
/// - Returns a newly allocated string that must be freed with `trend_free_string`.
#[no_mangle]
pub unsafe extern "C" fn trend_axis_labels(
    granularity: *const c_char,
    reference: *const c_char,
    timezone: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let (granularity, reference, timezone) = match (
        granularity_from_ptr(granularity),
        reference_from_ptr(reference),
        timezone_from_ptr(timezone),
    ) {
        (Ok(g), Ok(r), Ok(tz)) => (g, r, tz),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    let labels = canonical_axis(granularity, &reference, timezone);
    match serde_json::to_string(&labels) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Return the weekly date range label for the week ending at `end`.
///
/// # Safety
/// - `end` (RFC 3339) and `timezone` may be NULL for "now" and the local timezone.
/// - Returns a newly allocated string that must be freed with `trend_free_string`.
#[no_mangle]
pub unsafe extern "C" fn trend_weekly_range_label(
    end: *const c_char,
    timezone: *const c_char,
) -> *mut c_char {
    clear_last_error();

    match (reference_from_ptr(end), timezone_from_ptr(timezone)) {
        (Ok(end), Ok(tz)) => string_to_cstr(&weekly_date_range_label(&end, tz)),
        (Err(e), _) | (_, Err(e)) => {
            set_last_error(&e);
            ptr::null_mut()
        }
    }
}

/// Return the "last updated on" header label for `instant`.
///
/// # Safety
/// - `instant` (RFC 3339) and `timezone` may be NULL for "now" and the local timezone.
/// - Returns a newly allocated string that must be freed with `trend_free_string`.
#[no_mangle]
pub unsafe extern "C" fn trend_last_updated_label(
    instant: *const c_char,
    timezone: *const c_char,
) -> *mut c_char {
    clear_last_error();

    match (reference_from_ptr(instant), timezone_from_ptr(timezone)) {
        (Ok(instant), Ok(tz)) => string_to_cstr(&last_updated_label(&instant, tz)),
        (Err(e), _) | (_, Err(e)) => {
            set_last_error(&e);
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Trend functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Trend function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn trend_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Trend function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn trend_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Trend library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn trend_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn utc() -> CString {
        CString::new("UTC").unwrap()
    }

    fn sample_batch_json() -> CString {
        CString::new(
            r#"{
            "schema_version": "trend.sample_batch.v1",
            "unit": "m",
            "samples": [
                {"start_time": "2020-06-08T08:00:00Z", "end_time": "2020-06-08T08:06:00Z", "value": 480.0},
                {"start_time": "2020-06-09T08:00:00Z", "end_time": "2020-06-09T08:06:00Z", "value": 500.0}
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_align_json() {
        let json = sample_batch_json();
        let granularity = CString::new("daily").unwrap();
        let reference = CString::new("2020-06-10T12:00:00Z").unwrap();
        let timezone = utc();

        unsafe {
            let result = trend_align_json(
                json.as_ptr(),
                granularity.as_ptr(),
                reference.as_ptr(),
                timezone.as_ptr(),
            );

            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("trend.chart_series.v1"));
            let payload: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(payload["timezone"], "UTC");
            assert_eq!(payload["points"][6]["label"], "Wed");

            trend_free_string(result);
        }
    }

    #[test]
    fn test_ffi_axis_labels() {
        let granularity = CString::new("quarterly").unwrap();
        let reference = CString::new("2020-06-10T12:00:00Z").unwrap();

        unsafe {
            let timezone = utc();
            let result = trend_axis_labels(granularity.as_ptr(), reference.as_ptr(), timezone.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert_eq!(result_str, r#"["Jul-Sep","Oct-Dec","Jan-Mar","Apr-Jun"]"#);

            trend_free_string(result);
        }
    }

    #[test]
    fn test_ffi_labels() {
        let end = CString::new("2021-01-02T12:00:00Z").unwrap();
        let timezone = utc();

        unsafe {
            let range = trend_weekly_range_label(end.as_ptr(), timezone.as_ptr());
            assert_eq!(
                CStr::from_ptr(range).to_str().unwrap(),
                "Dec 26, 2020–Jan 2, 2021"
            );
            trend_free_string(range);

            let updated = trend_last_updated_label(end.as_ptr(), timezone.as_ptr());
            assert_eq!(
                CStr::from_ptr(updated).to_str().unwrap(),
                "last updated on Jan 2, 2021"
            );
            trend_free_string(updated);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let granularity = CString::new("daily").unwrap();

            let result = trend_align_json(
                invalid_json.as_ptr(),
                granularity.as_ptr(),
                ptr::null(),
                ptr::null(),
            );
            assert!(result.is_null());

            let error = trend_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            let bad_granularity = CString::new("fortnightly").unwrap();
            let result = trend_axis_labels(bad_granularity.as_ptr(), ptr::null(), ptr::null());
            assert!(result.is_null());

            let error_str = CStr::from_ptr(trend_last_error()).to_str().unwrap();
            assert!(error_str.contains("fortnightly"));
        }
    }

    #[test]
    fn test_ffi_null_timezone_is_local() {
        assert_eq!(
            unsafe { timezone_from_ptr(ptr::null()) },
            Ok(ChartTimezone::Local)
        );

        let fixed = CString::new("+02:00").unwrap();
        assert_eq!(
            unsafe { timezone_from_ptr(fixed.as_ptr()) }.map(|tz| tz.to_string()),
            Ok("+02:00".to_string())
        );
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = trend_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
