//! Render backend interface
//!
//! The pipeline turns a frame's draw commands into a [`RenderList`]: ordered
//! ops with resolved clips and shaped glyphs. A backend rasterizes the list
//! and presents it. GPU backends live with the host; the crate ships the
//! headless [`RecordingBackend`].

use std::cell::RefCell;
use std::rc::Rc;

use mcore_paint::{Color, Rect, RoundedRect};
use mcore_text::FontId;

use crate::error::BackendError;
use crate::surface::SurfaceDesc;

/// Clip bounds meaning "unclipped"
pub const NO_CLIP: [f32; 4] = [-10000.0, -10000.0, 100000.0, 100000.0];

/// [`RectInstance::flags`] bit: border fields are valid
pub const RECT_HAS_BORDER: u32 = 1;
/// [`RectInstance::flags`] bit: shadow fields are valid
pub const RECT_HAS_SHADOW: u32 = 1 << 1;

/// One rectangle, laid out for direct upload to an instance buffer
///
/// Memory layout (112 bytes):
/// - bounds: x, y, width, height
/// - clip_bounds: x, y, width, height ([`NO_CLIP`] when unclipped)
/// - fill, border_color, shadow_color: RGBA
/// - shadow: offset_x, offset_y, blur_radius, 0
/// - radius, border_width, flags, padding
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RectInstance {
    pub bounds: [f32; 4],
    pub clip_bounds: [f32; 4],
    pub fill: [f32; 4],
    pub border_color: [f32; 4],
    pub shadow_color: [f32; 4],
    pub shadow: [f32; 4],
    /// Corner radius, already limited to half the shorter side
    pub radius: f32,
    pub border_width: f32,
    pub flags: u32,
    pub _pad: u32,
}

impl RectInstance {
    pub fn new(rect: &RoundedRect, fill: Color, clip: Option<Rect>) -> Self {
        Self {
            bounds: rect_array(&rect.rect),
            clip_bounds: clip.as_ref().map(rect_array).unwrap_or(NO_CLIP),
            fill: fill.to_array(),
            border_color: [0.0; 4],
            shadow_color: [0.0; 4],
            shadow: [0.0; 4],
            radius: rect.effective_radius(),
            border_width: 0.0,
            flags: 0,
            _pad: 0,
        }
    }

    pub fn has_border(&self) -> bool {
        self.flags & RECT_HAS_BORDER != 0
    }

    pub fn has_shadow(&self) -> bool {
        self.flags & RECT_HAS_SHADOW != 0
    }

    pub fn clip(&self) -> Option<Rect> {
        (self.clip_bounds != NO_CLIP).then(|| {
            let [x, y, w, h] = self.clip_bounds;
            Rect::new(x, y, w, h)
        })
    }
}

fn rect_array(rect: &Rect) -> [f32; 4] {
    [rect.x, rect.y, rect.width, rect.height]
}

/// One positioned glyph in surface coordinates
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlyphInstance {
    /// Pen position with shaper offsets applied, on the baseline
    pub x: f32,
    pub y: f32,
    pub glyph_id: u32,
    /// Byte offset of the source cluster in the run's text
    pub cluster: u32,
}

/// Glyphs of one text command sharing a font, size, color and clip
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRun {
    pub font: FontId,
    pub font_size: f32,
    pub color: Color,
    pub clip: Option<Rect>,
    /// Laid out bounds in surface coordinates
    pub bounds: Rect,
    pub glyphs: Vec<GlyphInstance>,
}

impl GlyphRun {
    /// Raw instance data, for uploading as-is
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.glyphs)
    }
}

/// An executed draw operation
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOp {
    FillRoundedRect(RectInstance),
    StyledRect(RectInstance),
    Glyphs(GlyphRun),
}

/// Everything a backend needs to draw one frame
#[derive(Clone, Debug, PartialEq)]
pub struct RenderList {
    pub ops: Vec<RenderOp>,
    pub clear: Color,
    pub width_px: u32,
    pub height_px: u32,
    pub scale_factor: f32,
    /// Host time passed to `begin_frame`, in seconds
    pub time: f64,
}

impl RenderList {
    pub fn new(surface: &SurfaceDesc, clear: Color, time: f64) -> Self {
        Self {
            ops: Vec::new(),
            clear,
            width_px: surface.width_px,
            height_px: surface.height_px,
            scale_factor: surface.scale_factor,
            time,
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn glyph_count(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                RenderOp::Glyphs(run) => run.glyphs.len(),
                _ => 0,
            })
            .sum()
    }
}

/// Rasterizes executed frames for one surface
pub trait RenderBackend {
    /// Reconfigure for a new surface size or scale.
    fn resize(&mut self, surface: &SurfaceDesc) -> Result<(), BackendError>;

    /// Draw a frame into the back buffer.
    fn render(&mut self, list: &RenderList) -> Result<(), BackendError>;

    /// Show the last rendered frame.
    fn present(&mut self) -> Result<(), BackendError>;

    fn name(&self) -> &str {
        "backend"
    }
}

#[derive(Debug, Default)]
struct Recording {
    frames: Vec<RenderList>,
    rendered: Option<RenderList>,
    presents: usize,
    resizes: Vec<(u32, u32)>,
    fail_present: Option<String>,
    history: usize,
}

/// Keeps presented frames in memory.
///
/// Clones share the same recording, so a test can keep one handle while the
/// context owns another.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingBackend {
    /// Frames kept by [`RecordingBackend::new`]
    pub const DEFAULT_HISTORY: usize = 8;

    pub fn new() -> Self {
        Self::with_history(Self::DEFAULT_HISTORY)
    }

    /// Keep the last `history` presented frames (at least one).
    pub fn with_history(history: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Recording {
                history: history.max(1),
                ..Default::default()
            })),
        }
    }

    pub fn frames(&self) -> Vec<RenderList> {
        self.inner.borrow().frames.clone()
    }

    pub fn last_frame(&self) -> Option<RenderList> {
        self.inner.borrow().frames.last().cloned()
    }

    pub fn present_count(&self) -> usize {
        self.inner.borrow().presents
    }

    pub fn resizes(&self) -> Vec<(u32, u32)> {
        self.inner.borrow().resizes.clone()
    }

    /// Make the next `present` fail with `message`.
    pub fn fail_next_present(&self, message: impl Into<String>) {
        self.inner.borrow_mut().fail_present = Some(message.into());
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for RecordingBackend {
    fn resize(&mut self, surface: &SurfaceDesc) -> Result<(), BackendError> {
        self.inner
            .borrow_mut()
            .resizes
            .push((surface.width_px, surface.height_px));
        Ok(())
    }

    fn render(&mut self, list: &RenderList) -> Result<(), BackendError> {
        self.inner.borrow_mut().rendered = Some(list.clone());
        Ok(())
    }

    fn present(&mut self) -> Result<(), BackendError> {
        let mut recording = self.inner.borrow_mut();
        if let Some(message) = recording.fail_present.take() {
            recording.rendered = None;
            return Err(BackendError::Present(message));
        }
        let Some(frame) = recording.rendered.take() else {
            return Err(BackendError::Present("nothing rendered".into()));
        };
        if recording.frames.len() == recording.history {
            recording.frames.remove(0);
        }
        recording.frames.push(frame);
        recording.presents += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
