//! Per-thread last error and diagnostics entry points

use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::fmt::Display;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(err: &dyn Display) {
    let message = err.to_string().replace('\0', " ");
    let message = CString::new(message).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

/// Message of the most recent failure on this thread, or null.
///
/// The string is owned by the library and stays valid until the next
/// failing call or [`mcore_clear_error`] on the same thread.
#[no_mangle]
pub extern "C" fn mcore_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |message| message.as_ptr())
    })
}

#[no_mangle]
pub extern "C" fn mcore_clear_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Install the stderr log subscriber (`MCORE_LOG` filter, default `warn`).
///
/// Returns 1 if installed, 0 if a subscriber already existed.
#[no_mangle]
pub extern "C" fn mcore_log_init() -> i32 {
    i32::from(crate::logging::init())
}
