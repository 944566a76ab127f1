//! Context lifecycle and frame entry points

use crate::backend::{RecordingBackend, RenderBackend};
use crate::config::EngineConfig;
use crate::context::RenderContext;
use crate::error::{EngineError, Result};

use super::backend::{McoreBackendVtable, VtableBackend};
use super::types::{
    McoreDrawCmd, McoreRect, McoreRgba, McoreRoundedRect, McoreStatus, McoreStyledRect,
    McoreSurfaceDesc, McoreTextDraw,
};
use super::{context, guard, slice_arg, status, str_arg, McoreContext};

unsafe fn create(
    desc: *const McoreSurfaceDesc,
    config: *const u8,
    config_len: usize,
    backend: Box<dyn RenderBackend>,
) -> Result<*mut McoreContext> {
    let desc = desc
        .as_ref()
        .ok_or_else(|| EngineError::InvalidArgument("null surface descriptor".into()))?;
    let config = match str_arg(config, config_len)? {
        "" => EngineConfig::default(),
        source => EngineConfig::from_toml_str(source)?,
    };
    let inner = RenderContext::new(desc.to_surface()?, config, backend)?;
    Ok(Box::into_raw(Box::new(McoreContext { inner })))
}

/// Create a context drawing into an in-memory recording backend.
///
/// Returns null on failure; see [`mcore_last_error`](super::mcore_last_error).
///
/// # Safety
///
/// `desc` must be null or point to a valid descriptor.
#[no_mangle]
pub unsafe extern "C" fn mcore_create(desc: *const McoreSurfaceDesc) -> *mut McoreContext {
    guard("mcore_create", std::ptr::null_mut(), || {
        create(desc, std::ptr::null(), 0, Box::new(RecordingBackend::new()))
    })
}

/// Like [`mcore_create`] with a TOML configuration document.
///
/// # Safety
///
/// `desc` as for [`mcore_create`]; `config` must be valid for `config_len`
/// bytes.
#[no_mangle]
pub unsafe extern "C" fn mcore_create_with_config(
    desc: *const McoreSurfaceDesc,
    config: *const u8,
    config_len: usize,
) -> *mut McoreContext {
    guard("mcore_create_with_config", std::ptr::null_mut(), || {
        create(desc, config, config_len, Box::new(RecordingBackend::new()))
    })
}

/// Create a context rendering through host callbacks.
///
/// On failure the vtable's `destroy` callback has already run.
///
/// # Safety
///
/// `vtable` must point to a valid table whose callbacks stay callable with
/// its `user_data` until `destroy` runs. Other pointers as for
/// [`mcore_create_with_config`].
#[no_mangle]
pub unsafe extern "C" fn mcore_create_with_backend(
    desc: *const McoreSurfaceDesc,
    vtable: *const McoreBackendVtable,
    config: *const u8,
    config_len: usize,
) -> *mut McoreContext {
    guard("mcore_create_with_backend", std::ptr::null_mut(), || {
        let vtable = vtable
            .as_ref()
            .ok_or_else(|| EngineError::InvalidArgument("null backend vtable".into()))?;
        let backend = Box::new(VtableBackend::new(*vtable));
        create(desc, config, config_len, backend)
    })
}

/// Destroy a context. Null is ignored.
///
/// # Safety
///
/// `ctx` must come from `mcore_create*` and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn mcore_destroy(ctx: *mut McoreContext) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}

/// Apply a new surface size or scale. Fails while a frame is open.
///
/// # Safety
///
/// `ctx` must be a live context; `desc` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn mcore_resize(
    ctx: *mut McoreContext,
    desc: *const McoreSurfaceDesc,
) -> McoreStatus {
    status("mcore_resize", || {
        let ctx = context(ctx)?;
        let desc = desc
            .as_ref()
            .ok_or_else(|| EngineError::InvalidArgument("null surface descriptor".into()))?;
        ctx.resize(desc.to_surface()?)
    })
}

/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_begin_frame(ctx: *mut McoreContext, time_seconds: f64) {
    guard("mcore_begin_frame", (), || context(ctx)?.begin_frame(time_seconds));
}

/// # Safety
///
/// `ctx` must be a live context; `rect` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn mcore_rect_rounded(ctx: *mut McoreContext, rect: *const McoreRoundedRect) {
    guard("mcore_rect_rounded", (), || {
        let ctx = context(ctx)?;
        if let Some(rect) = rect.as_ref() {
            ctx.record(rect.to_command());
        }
        Ok(())
    });
}

/// # Safety
///
/// `ctx` must be a live context; `rect` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn mcore_rect_styled(ctx: *mut McoreContext, rect: *const McoreStyledRect) {
    guard("mcore_rect_styled", (), || {
        let ctx = context(ctx)?;
        if let Some(rect) = rect.as_ref() {
            ctx.record(rect.to_command());
        }
        Ok(())
    });
}

/// Queue a text run; shaping happens when the frame executes.
///
/// # Safety
///
/// `ctx` must be a live context; `text` must be null or valid, with its
/// string readable for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_draw(ctx: *mut McoreContext, text: *const McoreTextDraw) {
    guard("mcore_text_draw", (), || {
        let ctx = context(ctx)?;
        if let Some(text) = text.as_ref() {
            ctx.draw_text(text.to_run(ctx.config().text.default_font_size)?);
        }
        Ok(())
    });
}

/// # Safety
///
/// `ctx` must be a live context; `rect` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn mcore_push_clip(ctx: *mut McoreContext, rect: *const McoreRect) {
    guard("mcore_push_clip", (), || {
        let ctx = context(ctx)?;
        if let Some(rect) = rect.as_ref() {
            ctx.push_clip((*rect).into());
        }
        Ok(())
    });
}

/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_pop_clip(ctx: *mut McoreContext) {
    guard("mcore_pop_clip", (), || {
        context(ctx)?.pop_clip();
        Ok(())
    });
}

/// Append `count` commands to the open frame, after any already recorded.
///
/// A malformed command rejects the whole batch.
///
/// # Safety
///
/// `ctx` must be a live context; `commands` must be valid for `count`
/// elements whose tagged members are initialized.
#[no_mangle]
pub unsafe extern "C" fn mcore_submit(
    ctx: *mut McoreContext,
    commands: *const McoreDrawCmd,
    count: usize,
) -> McoreStatus {
    status("mcore_submit", || {
        let ctx = context(ctx)?;
        let default_size = ctx.config().text.default_font_size;
        let commands = slice_arg(commands, count)?
            .iter()
            .map(|command| command.to_command(default_size))
            .collect::<Result<Vec<_>>>()?;
        ctx.submit(commands);
        Ok(())
    })
}

/// Execute and present the open frame.
///
/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_end_frame_present(
    ctx: *mut McoreContext,
    clear: McoreRgba,
) -> McoreStatus {
    status("mcore_end_frame_present", || {
        context(ctx)?.end_frame_present(clear.into()).map(|_| ())
    })
}
