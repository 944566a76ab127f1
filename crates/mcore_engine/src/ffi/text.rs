//! Fonts, text measurement and color entry points

use mcore_paint::Color;
use mcore_text::FontId;

use crate::error::EngineError;

use super::types::{McoreFontBlob, McoreRgba, McoreSize, McoreStatus, McoreTextMetrics, McoreTextReq};
use super::{context, guard, slice_arg, status, str_arg, McoreContext};

fn wrap(width: f32) -> Option<f32> {
    (width > 0.0).then_some(width)
}

/// Register font bytes. Returns the new font id, or -1 on failure.
///
/// The first registered font becomes the default for measurement.
///
/// # Safety
///
/// `ctx` must be a live context; `blob` must be null or valid with readable
/// data and name spans.
#[no_mangle]
pub unsafe extern "C" fn mcore_font_register(
    ctx: *mut McoreContext,
    blob: *const McoreFontBlob,
) -> i32 {
    guard("mcore_font_register", -1, || {
        let ctx = context(ctx)?;
        let blob = blob
            .as_ref()
            .ok_or_else(|| EngineError::InvalidArgument("null font blob".into()))?;
        let data = slice_arg(blob.data, blob.len)?;
        let name = match str_arg(blob.name, blob.name_len)? {
            "" => None,
            name => Some(name),
        };
        let id = ctx.register_font(data, name)?;
        i32::try_from(id.0).map_err(|_| EngineError::InvalidArgument("too many fonts".into()))
    })
}

/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_font_set_default(ctx: *mut McoreContext, font_id: i32) -> McoreStatus {
    status("mcore_font_set_default", || {
        let ctx = context(ctx)?;
        let known = u32::try_from(font_id)
            .map(|id| ctx.set_default_font(FontId(id)))
            .unwrap_or(Ok(false))?;
        if known {
            Ok(())
        } else {
            Err(EngineError::InvalidArgument(format!("unknown font id {font_id}")))
        }
    })
}

/// Lay out a string. Unknown fonts give zeroed metrics.
///
/// # Safety
///
/// `ctx` must be a live context; `req` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_layout(
    ctx: *mut McoreContext,
    req: *const McoreTextReq,
) -> McoreTextMetrics {
    guard("mcore_text_layout", McoreTextMetrics::default(), || {
        let ctx = context(ctx)?;
        let req = req
            .as_ref()
            .ok_or_else(|| EngineError::InvalidArgument("null text request".into()))?;
        let text = str_arg(req.utf8, req.len)?;
        let Ok(font) = u32::try_from(req.font_id) else {
            return Ok(McoreTextMetrics::default());
        };
        let metrics = ctx.text_layout(text, wrap(req.wrap_width), req.font_size_px, FontId(font))?;
        Ok(McoreTextMetrics {
            advance_w: metrics.advance_w,
            advance_h: metrics.advance_h,
            line_count: i32::try_from(metrics.line_count).unwrap_or(i32::MAX),
        })
    })
}

/// Size of a string in the default font; `max_width <= 0` disables wrapping.
///
/// # Safety
///
/// `ctx` must be a live context; `utf8` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn mcore_measure(
    ctx: *mut McoreContext,
    utf8: *const u8,
    len: usize,
    font_size_px: f32,
    max_width: f32,
) -> McoreSize {
    guard("mcore_measure", McoreSize::default(), || {
        let size = context(ctx)?.measure(str_arg(utf8, len)?, font_size_px, wrap(max_width))?;
        Ok(McoreSize {
            w: size.width,
            h: size.height,
        })
    })
}

/// Caret x for byte `offset`, snapped back to a char boundary.
///
/// # Safety
///
/// `ctx` must be a live context; `utf8` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn mcore_measure_to_byte_offset(
    ctx: *mut McoreContext,
    utf8: *const u8,
    len: usize,
    font_size_px: f32,
    offset: usize,
) -> f32 {
    guard("mcore_measure_to_byte_offset", 0.0, || {
        context(ctx)?.measure_to_byte_offset(str_arg(utf8, len)?, font_size_px, offset)
    })
}

/// Byte offset of the caret boundary nearest to `x`.
///
/// # Safety
///
/// `ctx` must be a live context; `utf8` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn mcore_hit_test(
    ctx: *mut McoreContext,
    utf8: *const u8,
    len: usize,
    font_size_px: f32,
    x: f32,
) -> usize {
    guard("mcore_hit_test", 0, || {
        context(ctx)?.hit_test(str_arg(utf8, len)?, font_size_px, x)
    })
}

/// Parse a CSS color. Returns 1 and writes `out` on success, 0 otherwise.
///
/// # Safety
///
/// `utf8` must be valid for `len` bytes; `out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn mcore_color_parse(utf8: *const u8, len: usize, out: *mut McoreRgba) -> i32 {
    guard("mcore_color_parse", 0, || {
        let Some(color) = Color::parse(str_arg(utf8, len)?) else {
            return Ok(0);
        };
        if let Some(out) = out.as_mut() {
            *out = color.into();
        }
        Ok(1)
    })
}

/// Interpolate in Oklab; alpha is mixed linearly and `t` is not clamped.
#[no_mangle]
pub extern "C" fn mcore_color_lerp(a: McoreRgba, b: McoreRgba, t: f32) -> McoreRgba {
    Color::lerp(a.into(), b.into(), t).into()
}
