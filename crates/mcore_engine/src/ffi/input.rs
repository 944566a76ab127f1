//! Text input entry points
//!
//! Every call addresses a state by the host's 64-bit widget id; unknown ids
//! get a fresh empty state. Out-of-range offsets are clamped and snapped to
//! a char boundary.

use mcore_input::{Direction, TextEvent};
use mcore_text::FontId;

use crate::error::{EngineError, Result};

use super::types::{
    McoreStatus, McoreTextEvent, MCORE_DIRECTION_END, MCORE_DIRECTION_HOME, MCORE_DIRECTION_LEFT,
    MCORE_DIRECTION_RIGHT, MCORE_EVENT_BACKSPACE, MCORE_EVENT_DELETE, MCORE_EVENT_INSERT_CHAR,
    MCORE_EVENT_INSERT_TEXT, MCORE_EVENT_MOVE_CURSOR, MCORE_EVENT_SET_CURSOR,
};
use super::{context, copy_out, guard, slice_arg, status, str_arg, McoreContext};

unsafe fn to_event(event: &McoreTextEvent) -> Result<TextEvent> {
    Ok(match event.kind {
        MCORE_EVENT_INSERT_CHAR => TextEvent::InsertChar(event.codepoint),
        MCORE_EVENT_BACKSPACE => TextEvent::Backspace,
        MCORE_EVENT_DELETE => TextEvent::Delete,
        MCORE_EVENT_MOVE_CURSOR => TextEvent::MoveCursor {
            direction: match event.direction {
                MCORE_DIRECTION_LEFT => Direction::Left,
                MCORE_DIRECTION_RIGHT => Direction::Right,
                MCORE_DIRECTION_HOME => Direction::Home,
                MCORE_DIRECTION_END => Direction::End,
                other => {
                    return Err(EngineError::InvalidArgument(format!(
                        "unknown cursor direction {other}"
                    )))
                }
            },
            extend: event.extend != 0,
        },
        MCORE_EVENT_SET_CURSOR => TextEvent::SetCursor(event.position),
        MCORE_EVENT_INSERT_TEXT => TextEvent::InsertText(str_arg(event.utf8, event.len)?.to_owned()),
        other => {
            return Err(EngineError::InvalidArgument(format!(
                "unknown text event kind {other}"
            )))
        }
    })
}

/// Apply an editing event. Returns 1 if the committed text changed, 0 if
/// not, -1 on a malformed event.
///
/// # Safety
///
/// `ctx` must be a live context; `event` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_event(
    ctx: *mut McoreContext,
    id: u64,
    event: *const McoreTextEvent,
) -> i32 {
    guard("mcore_text_input_event", -1, || {
        let ctx = context(ctx)?;
        let event = event
            .as_ref()
            .ok_or_else(|| EngineError::InvalidArgument("null text event".into()))?;
        Ok(i32::from(ctx.text_input_event(id, to_event(event)?)?))
    })
}

/// Copy the committed text into `out` if it fits in `cap` bytes. Returns the
/// text's byte length either way.
///
/// # Safety
///
/// `ctx` must be a live context; `out` must be null or writable for `cap`
/// bytes.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_get_text(
    ctx: *mut McoreContext,
    id: u64,
    out: *mut u8,
    cap: usize,
) -> usize {
    guard("mcore_text_input_get_text", 0, || {
        context(ctx)?.with_text_inputs(|inputs| copy_out(inputs.get_text(id), out, cap))
    })
}

/// Replace the committed text; the cursor moves to the end.
///
/// # Safety
///
/// `ctx` must be a live context; `utf8` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_set_text(
    ctx: *mut McoreContext,
    id: u64,
    utf8: *const u8,
    len: usize,
) -> McoreStatus {
    status("mcore_text_input_set_text", || {
        let text = str_arg(utf8, len)?;
        context(ctx)?.with_text_inputs(|inputs| inputs.set_text(id, text))
    })
}

/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_get_cursor(ctx: *mut McoreContext, id: u64) -> usize {
    guard("mcore_text_input_get_cursor", 0, || {
        context(ctx)?.with_text_inputs(|inputs| inputs.get_cursor(id))
    })
}

/// Move the cursor, extending the selection from its anchor when `extend`
/// is non-zero.
///
/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_set_cursor(
    ctx: *mut McoreContext,
    id: u64,
    offset: usize,
    extend: i32,
) {
    guard("mcore_text_input_set_cursor", (), || {
        context(ctx)?.with_text_inputs(|inputs| inputs.set_cursor_with_extend(id, offset, extend != 0))
    });
}

/// Write the selection bounds. Returns 1 if there is a non-empty
/// selection, 0 otherwise.
///
/// # Safety
///
/// `ctx` must be a live context; `start` and `end` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_get_selection(
    ctx: *mut McoreContext,
    id: u64,
    start: *mut usize,
    end: *mut usize,
) -> i32 {
    guard("mcore_text_input_get_selection", 0, || {
        let selection = context(ctx)?.with_text_inputs(|inputs| inputs.get_selection(id))?;
        let Some((from, to)) = selection else {
            return Ok(0);
        };
        if let Some(start) = start.as_mut() {
            *start = from;
        }
        if let Some(end) = end.as_mut() {
            *end = to;
        }
        Ok(1)
    })
}

/// Like [`mcore_text_input_get_text`] for the selected text.
///
/// # Safety
///
/// As for [`mcore_text_input_get_text`].
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_get_selected_text(
    ctx: *mut McoreContext,
    id: u64,
    out: *mut u8,
    cap: usize,
) -> usize {
    guard("mcore_text_input_get_selected_text", 0, || {
        context(ctx)?.with_text_inputs(|inputs| copy_out(inputs.get_selected_text(id), out, cap))
    })
}

/// Anchor a selection at `offset` without moving the cursor.
///
/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_start_selection(
    ctx: *mut McoreContext,
    id: u64,
    offset: usize,
) {
    guard("mcore_text_input_start_selection", (), || {
        context(ctx)?.with_text_inputs(|inputs| inputs.start_selection(id, offset))
    });
}

/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_select_all(ctx: *mut McoreContext, id: u64) {
    guard("mcore_text_input_select_all", (), || {
        context(ctx)?.with_text_inputs(|inputs| inputs.select_all(id))
    });
}

/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_clear_selection(ctx: *mut McoreContext, id: u64) {
    guard("mcore_text_input_clear_selection", (), || {
        context(ctx)?.with_text_inputs(|inputs| inputs.clear_selection(id))
    });
}

/// Set the IME composition string. An empty string clears it.
///
/// # Safety
///
/// `ctx` must be a live context; `utf8` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_set_preedit(
    ctx: *mut McoreContext,
    id: u64,
    utf8: *const u8,
    len: usize,
    cursor: usize,
) -> McoreStatus {
    status("mcore_text_input_set_preedit", || {
        let text = str_arg(utf8, len)?;
        context(ctx)?.with_text_inputs(|inputs| inputs.set_preedit(id, text, cursor))
    })
}

/// Insert committed IME text and drop the preedit. Returns 1 if the text
/// changed, 0 if not, -1 on failure.
///
/// # Safety
///
/// `ctx` must be a live context; `utf8` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_commit(
    ctx: *mut McoreContext,
    id: u64,
    utf8: *const u8,
    len: usize,
) -> i32 {
    guard("mcore_text_input_commit", -1, || {
        let text = str_arg(utf8, len)?;
        context(ctx)?.with_text_inputs(|inputs| i32::from(inputs.commit(id, text)))
    })
}

/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_clear_preedit(ctx: *mut McoreContext, id: u64) {
    guard("mcore_text_input_clear_preedit", (), || {
        context(ctx)?.with_text_inputs(|inputs| inputs.clear_preedit(id))
    });
}

/// Copy the preedit text into `out` if it fits and write its cursor.
/// Returns the preedit byte length, 0 when there is none.
///
/// # Safety
///
/// `ctx` must be a live context; `out` must be null or writable for `cap`
/// bytes; `cursor` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_get_preedit(
    ctx: *mut McoreContext,
    id: u64,
    out: *mut u8,
    cap: usize,
    cursor: *mut usize,
) -> usize {
    guard("mcore_text_input_get_preedit", 0, || {
        context(ctx)?.with_text_inputs(|inputs| {
            let (text, offset) = inputs.get_preedit(id).unwrap_or(("", 0));
            if let Some(cursor) = cursor.as_mut() {
                *cursor = offset;
            }
            copy_out(text, out, cap)
        })
    })
}

/// Make Home/End follow wrapped lines. A negative `font_id` restores
/// logical `\n` lines; `wrap_width <= 0` disables wrapping.
///
/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_set_layout(
    ctx: *mut McoreContext,
    id: u64,
    font_id: i32,
    font_size_px: f32,
    wrap_width: f32,
) {
    guard("mcore_text_input_set_layout", (), || {
        let font = u32::try_from(font_id).ok().map(FontId);
        let wrap = (wrap_width > 0.0).then_some(wrap_width);
        context(ctx)?.set_text_input_layout(id, font, font_size_px, wrap)
    });
}

/// Drop the state for `id`. Returns 1 if it existed.
///
/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_dispose(ctx: *mut McoreContext, id: u64) -> i32 {
    guard("mcore_text_input_dispose", 0, || {
        context(ctx)?.with_text_inputs(|inputs| i32::from(inputs.dispose(id)))
    })
}

/// Drop every state whose id is not among `live_ids`. Returns how many
/// were dropped.
///
/// # Safety
///
/// `ctx` must be a live context; `live_ids` must be valid for `count`
/// elements.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_retain(
    ctx: *mut McoreContext,
    live_ids: *const u64,
    count: usize,
) -> usize {
    guard("mcore_text_input_retain", 0, || {
        let live = slice_arg(live_ids, count)?;
        context(ctx)?.with_text_inputs(|inputs| inputs.retain(live))
    })
}

/// Number of live text input states.
///
/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_text_input_count(ctx: *mut McoreContext) -> usize {
    guard("mcore_text_input_count", 0, || {
        context(ctx)?.with_text_inputs(|inputs| inputs.len())
    })
}
