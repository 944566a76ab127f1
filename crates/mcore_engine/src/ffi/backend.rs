//! Render backend implemented by the host through a table of C callbacks

use std::ffi::c_void;

use crate::backend::{GlyphInstance, RectInstance, RenderBackend, RenderList, RenderOp, NO_CLIP};
use crate::error::BackendError;
use crate::surface::SurfaceDesc;

use super::types::McoreRgba;

/// Frame parameters passed to `begin_frame`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreFrameInfo {
    pub clear: McoreRgba,
    pub width_px: u32,
    pub height_px: u32,
    pub scale_factor: f32,
    pub time_seconds: f64,
}

/// Shared parameters of a glyph batch
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreGlyphRun {
    pub font_id: u32,
    pub font_size: f32,
    pub color: McoreRgba,
    /// x, y, width, height; `NO_CLIP` bounds when unclipped
    pub clip_bounds: [f32; 4],
}

/// Host backend callbacks. Callbacks returning `int32_t` report 0 on success.
///
/// Ops are delivered in paint order between `begin_frame` and `present`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreBackendVtable {
    pub user_data: *mut c_void,
    pub resize: Option<
        unsafe extern "C" fn(user_data: *mut c_void, width_px: u32, height_px: u32, scale: f32) -> i32,
    >,
    pub begin_frame:
        Option<unsafe extern "C" fn(user_data: *mut c_void, frame: *const McoreFrameInfo) -> i32>,
    /// Rounded and styled rects; styled rects carry border/shadow flags
    pub draw_rect: Option<unsafe extern "C" fn(user_data: *mut c_void, rect: *const RectInstance)>,
    pub draw_glyphs: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            run: *const McoreGlyphRun,
            glyphs: *const GlyphInstance,
            count: usize,
        ),
    >,
    pub present: Option<unsafe extern "C" fn(user_data: *mut c_void) -> i32>,
    /// Called once when the context is destroyed
    pub destroy: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
}

/// [`RenderBackend`] forwarding to a host vtable
pub struct VtableBackend {
    vtable: McoreBackendVtable,
}

impl VtableBackend {
    /// # Safety
    ///
    /// Every callback must be safe to call with `user_data` until `destroy`
    /// has been called.
    pub unsafe fn new(vtable: McoreBackendVtable) -> Self {
        Self { vtable }
    }
}

fn check(code: i32, what: &str) -> Result<(), BackendError> {
    if code == 0 {
        Ok(())
    } else {
        Err(BackendError::Render(format!("host {what} returned {code}")))
    }
}

impl RenderBackend for VtableBackend {
    fn resize(&mut self, surface: &SurfaceDesc) -> Result<(), BackendError> {
        let Some(resize) = self.vtable.resize else {
            return Ok(());
        };
        // SAFETY: upheld by the caller of `VtableBackend::new`
        let code = unsafe {
            resize(
                self.vtable.user_data,
                surface.width_px,
                surface.height_px,
                surface.scale_factor,
            )
        };
        if code == 0 {
            Ok(())
        } else {
            Err(BackendError::Configure(format!("host resize returned {code}")))
        }
    }

    fn render(&mut self, list: &RenderList) -> Result<(), BackendError> {
        let user_data = self.vtable.user_data;
        let info = McoreFrameInfo {
            clear: list.clear.into(),
            width_px: list.width_px,
            height_px: list.height_px,
            scale_factor: list.scale_factor,
            time_seconds: list.time,
        };
        // SAFETY: upheld by the caller of `VtableBackend::new`; pointers
        // handed out are valid for the duration of each call
        unsafe {
            if let Some(begin_frame) = self.vtable.begin_frame {
                check(begin_frame(user_data, &info), "begin_frame")?;
            }
            for op in &list.ops {
                match op {
                    RenderOp::FillRoundedRect(rect) | RenderOp::StyledRect(rect) => {
                        if let Some(draw_rect) = self.vtable.draw_rect {
                            draw_rect(user_data, rect);
                        }
                    }
                    RenderOp::Glyphs(run) => {
                        let Some(draw_glyphs) = self.vtable.draw_glyphs else {
                            continue;
                        };
                        let header = McoreGlyphRun {
                            font_id: run.font.0,
                            font_size: run.font_size,
                            color: run.color.into(),
                            clip_bounds: run
                                .clip
                                .map(|c| [c.x, c.y, c.width, c.height])
                                .unwrap_or(NO_CLIP),
                        };
                        draw_glyphs(user_data, &header, run.glyphs.as_ptr(), run.glyphs.len());
                    }
                }
            }
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), BackendError> {
        let Some(present) = self.vtable.present else {
            return Ok(());
        };
        // SAFETY: upheld by the caller of `VtableBackend::new`
        let code = unsafe { present(self.vtable.user_data) };
        match code {
            0 => Ok(()),
            code => Err(BackendError::Present(format!("host present returned {code}"))),
        }
    }

    fn name(&self) -> &str {
        "host"
    }
}

impl Drop for VtableBackend {
    fn drop(&mut self) {
        if let Some(destroy) = self.vtable.destroy {
            // SAFETY: upheld by the caller of `VtableBackend::new`
            unsafe { destroy(self.vtable.user_data) };
        }
    }
}
