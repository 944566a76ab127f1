//! C ABI
//!
//! Every entry point is `extern "C"` with a `mcore_` prefix. Hard failures
//! return `MCORE_ERR` (or a sentinel) and store a message retrievable with
//! [`mcore_last_error`] on the calling thread. Soft failures are absorbed
//! with defaults. Panics never cross the boundary.
//!
//! Strings are UTF-8 byte spans with an explicit length; a null pointer with
//! length zero is the empty string.

mod a11y;
mod backend;
mod error;
mod frame;
mod input;
mod text;
mod types;

pub use a11y::*;
pub use backend::*;
pub use error::*;
pub use frame::*;
pub use input::*;
pub use text::*;
pub use types::*;

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::context::RenderContext;
use crate::error::{EngineError, Result};

/// Opaque context handle owned by the host
pub struct McoreContext {
    pub(crate) inner: RenderContext,
}

impl McoreContext {
    /// The typed context, for Rust code sharing a handle with C callers
    pub fn render_context(&self) -> &RenderContext {
        &self.inner
    }
}

/// Borrow the context behind a host pointer.
///
/// # Safety
///
/// `ctx` must be null or a pointer returned by `mcore_create*` that has not
/// been destroyed.
unsafe fn context<'a>(ctx: *const McoreContext) -> Result<&'a RenderContext> {
    ctx.as_ref()
        .map(|ctx| &ctx.inner)
        .ok_or_else(|| EngineError::InvalidArgument("null context".into()))
}

/// Borrow a UTF-8 span.
///
/// # Safety
///
/// `ptr` must be null or valid for reads of `len` bytes.
unsafe fn str_arg<'a>(ptr: *const u8, len: usize) -> Result<&'a str> {
    if ptr.is_null() {
        return if len == 0 {
            Ok("")
        } else {
            Err(EngineError::InvalidArgument("null string with non-zero length".into()))
        };
    }
    let bytes = std::slice::from_raw_parts(ptr, len);
    std::str::from_utf8(bytes)
        .map_err(|e| EngineError::InvalidArgument(format!("invalid UTF-8: {e}")))
}

/// Borrow an array argument.
///
/// # Safety
///
/// `ptr` must be null or valid for reads of `len` elements.
unsafe fn slice_arg<'a, T>(ptr: *const T, len: usize) -> Result<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(EngineError::InvalidArgument("null array with non-zero length".into()));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

/// Copy `text` into a host buffer when it fits. Returns the byte length.
///
/// # Safety
///
/// `out` must be null or valid for writes of `cap` bytes.
unsafe fn copy_out(text: &str, out: *mut u8, cap: usize) -> usize {
    if !out.is_null() && text.len() <= cap {
        std::ptr::copy_nonoverlapping(text.as_ptr(), out, text.len());
    }
    text.len()
}

/// Run an entry point body, turning errors and panics into `fallback` plus
/// a last-error message.
fn guard<T>(name: &str, fallback: T, body: impl FnOnce() -> Result<T>) -> T {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            tracing::debug!("{name}: {err}");
            set_last_error(&err);
            fallback
        }
        Err(_) => {
            tracing::error!("{name}: panicked");
            set_last_error(&format!("{name}: internal error"));
            fallback
        }
    }
}

fn status(name: &str, body: impl FnOnce() -> Result<()>) -> McoreStatus {
    guard(name, McoreStatus::Err, || body().map(|()| McoreStatus::Ok))
}
