//! Checked conversions from raw C arguments.

use std::ffi::{CStr, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use wayfind_core::{Costing, RoutingError};

use crate::error::{BoundaryError, FfiError, set_last_error};

/// Run `body`, turning a panic into `fallback`.
pub(crate) fn shield<T>(fallback: T, body: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        set_last_error(&BoundaryError::Panicked { message }.to_string());
        fallback
    })
}

/// Convert a caller-stated length to `usize`.
pub(crate) fn length(name: &'static str, value: i32) -> Result<usize, BoundaryError> {
    usize::try_from(value).map_err(|_| BoundaryError::NegativeLength { name, value })
}

/// Saturating conversion of a count to the boundary's integer type.
pub(crate) fn saturating_count(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Borrow a null-terminated UTF-8 string.
///
/// # Safety
///
/// A non-null `ptr` must point to a null-terminated string that outlives
/// `'a`.
pub(crate) unsafe fn c_str<'a>(
    name: &'static str,
    ptr: *const c_char,
) -> Result<&'a str, BoundaryError> {
    if ptr.is_null() {
        return Err(BoundaryError::NullPointer { name });
    }
    // SAFETY: non-null and null-terminated per the caller's contract.
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str().map_err(|_| BoundaryError::InvalidUtf8 { name })
}

/// Parse a costing name argument.
///
/// # Safety
///
/// As for [`c_str`].
pub(crate) unsafe fn costing_arg(ptr: *const c_char) -> Result<Costing, FfiError> {
    // SAFETY: forwarded caller contract.
    let name = unsafe { c_str("mode", ptr) }?;
    Costing::from_str(name).map_err(|message| RoutingError::invalid(message).into())
}

/// Borrow `len` elements starting at `ptr`.
///
/// # Safety
///
/// A non-null `ptr` must be valid for reads of `len` elements for `'a`.
pub(crate) unsafe fn slice<'a, T>(
    name: &'static str,
    ptr: *const T,
    len: usize,
) -> Result<&'a [T], BoundaryError> {
    if ptr.is_null() {
        return Err(BoundaryError::NullPointer { name });
    }
    // SAFETY: non-null and valid for `len` reads per the caller's contract.
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Mutably borrow `len` elements starting at `ptr`.
///
/// # Safety
///
/// A non-null `ptr` must be valid for writes of `len` elements for `'a` and
/// not aliased.
pub(crate) unsafe fn slice_mut<'a, T>(
    name: &'static str,
    ptr: *mut T,
    len: usize,
) -> Result<&'a mut [T], BoundaryError> {
    if ptr.is_null() {
        return Err(BoundaryError::NullPointer { name });
    }
    // SAFETY: non-null, valid for `len` writes and unaliased per the
    // caller's contract.
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}

/// Mutably borrow a single output value.
///
/// # Safety
///
/// A non-null `ptr` must be valid for writes and unaliased for `'a`.
pub(crate) unsafe fn out<'a, T>(name: &'static str, ptr: *mut T) -> Result<&'a mut T, BoundaryError> {
    // SAFETY: `as_mut` checks for null; validity is the caller's contract.
    unsafe { ptr.as_mut() }.ok_or(BoundaryError::NullPointer { name })
}
