//! Boundary failures and the per-thread last-error message.

use std::cell::RefCell;
use std::ffi::{CString, c_char};

use log::debug;
use thiserror::Error;
use wayfind_core::{RoutingError, STATUS_FAILED};
use wayfind_data::EngineLoadError;

/// Caller input rejected before any routing work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryError {
    /// A required pointer was null.
    #[error("`{name}` must not be null")]
    NullPointer {
        /// Parameter name.
        name: &'static str,
    },
    /// A capacity or count was negative.
    #[error("`{name}` must not be negative, got {value}")]
    NegativeLength {
        /// Parameter name.
        name: &'static str,
        /// Value supplied.
        value: i32,
    },
    /// A string argument was not UTF-8.
    #[error("`{name}` is not valid UTF-8")]
    InvalidUtf8 {
        /// Parameter name.
        name: &'static str,
    },
    /// An output buffer cannot hold the result.
    #[error("`{name}` holds {capacity} bytes but {needed} are required")]
    BufferTooSmall {
        /// Parameter name.
        name: &'static str,
        /// Caller-stated capacity.
        capacity: usize,
        /// Bytes required.
        needed: usize,
    },
    /// The call panicked internally.
    #[error("internal failure: {message}")]
    Panicked {
        /// Panic payload, if it was a string.
        message: String,
    },
}

/// Any failure an exported function can report.
#[derive(Debug, Error)]
pub enum FfiError {
    /// Invalid caller input.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    /// A routing operation failed.
    #[error(transparent)]
    Routing(#[from] RoutingError),
    /// The engine could not be loaded.
    #[error(transparent)]
    Load(#[from] EngineLoadError),
}

impl FfiError {
    /// Integer status for this failure: `-2` when no engine is loaded,
    /// otherwise `-1`.
    #[must_use]
    pub const fn status(&self) -> i32 {
        match self {
            Self::Routing(err) => err.status_code(),
            Self::Boundary(_) | Self::Load(_) => STATUS_FAILED,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Record `err` as this thread's last error and return its status.
pub(crate) fn record(err: &FfiError) -> i32 {
    debug!("boundary call failed: {err}");
    set_last_error(&err.to_string());
    err.status()
}

pub(crate) fn set_last_error(message: &str) {
    let text = CString::new(message.replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(text));
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Pointer to this thread's last error message, or null.
///
/// The pointer stays valid until the next failing call on this thread.
pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |text| text.as_ptr())
    })
}
