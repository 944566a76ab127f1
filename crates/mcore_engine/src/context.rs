//! Render context: one per host surface
//!
//! Every method takes `&self`. State lives in `RefCell`s that are borrowed
//! only for the duration of a call and never while host code runs, so a host
//! callback (accessibility action, backend) may call back into the context.
//! A call that would need state already borrowed further up the stack fails
//! with [`EngineError::Busy`] instead of panicking.

use std::cell::{RefCell, RefMut};
use std::sync::Arc;

use mcore_a11y::{A11yAction, A11yNode, AccessibilitySync, ActionCallback, UpdateOutcome};
use mcore_input::{LayoutHint, TextEvent, TextInputManager};
use mcore_paint::{Border, Color, DrawCommand, Rect, RoundedRect, Shadow, TextRun};
use mcore_text::{CacheStats, FontId, ShapeFont, Size, TextMetrics, TextSystem};
use tracing::{debug, info, warn};

use crate::backend::RenderBackend;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::pipeline::{FramePipeline, FrameReport};
use crate::surface::SurfaceDesc;

pub struct RenderContext {
    config: EngineConfig,
    surface: RefCell<SurfaceDesc>,
    backend: RefCell<Box<dyn RenderBackend>>,
    text: RefCell<TextSystem>,
    pipeline: RefCell<FramePipeline>,
    inputs: RefCell<TextInputManager>,
    a11y: AccessibilitySync,
}

fn borrow<T>(cell: &RefCell<T>) -> Result<RefMut<'_, T>> {
    cell.try_borrow_mut().map_err(|_| EngineError::Busy)
}

impl RenderContext {
    /// Create a context for `surface`, configuring `backend` for it.
    pub fn new(
        surface: SurfaceDesc,
        config: EngineConfig,
        mut backend: Box<dyn RenderBackend>,
    ) -> Result<Self> {
        surface.validate()?;
        backend.resize(&surface)?;
        info!(
            "render context created: {} {}x{} @{}x, backend {}",
            surface.handle.platform_name(),
            surface.width_px,
            surface.height_px,
            surface.scale_factor,
            backend.name()
        );

        Ok(Self {
            text: RefCell::new(TextSystem::new(config.text.cache_capacity)),
            inputs: RefCell::new(TextInputManager::with_max_states(config.input.max_states)),
            a11y: AccessibilitySync::new(config.accessibility.validation.into()),
            surface: RefCell::new(surface),
            backend: RefCell::new(backend),
            pipeline: RefCell::new(FramePipeline::new()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn surface(&self) -> Result<SurfaceDesc> {
        self.surface
            .try_borrow()
            .map(|surface| *surface)
            .map_err(|_| EngineError::Busy)
    }

    // === Lifecycle ===

    /// Apply a new surface size or scale. Fails while a frame is open.
    pub fn resize(&self, surface: SurfaceDesc) -> Result<()> {
        if self.pipeline.try_borrow().map_err(|_| EngineError::Busy)?.is_open() {
            warn!("resize rejected: frame in progress");
            return Err(EngineError::FrameInProgress);
        }
        let previous = self.surface()?;
        let surface = surface.clamped(previous.scale_factor);
        borrow(&self.backend)?.resize(&surface)?;
        *borrow(&self.surface)? = surface;
        debug!(
            "resized to {}x{} @{}x",
            surface.width_px, surface.height_px, surface.scale_factor
        );
        Ok(())
    }

    pub fn begin_frame(&self, time: f64) -> Result<()> {
        borrow(&self.pipeline)?.begin(time);
        Ok(())
    }

    pub fn frame_in_progress(&self) -> bool {
        self.pipeline
            .try_borrow()
            .map(|pipeline| pipeline.is_open())
            .unwrap_or(false)
    }

    /// Execute the open frame and present it.
    ///
    /// The frame is consumed even when the backend fails.
    pub fn end_frame_present(&self, clear: Color) -> Result<FrameReport> {
        let surface = self.surface()?;
        let (list, report) = {
            let mut pipeline = borrow(&self.pipeline)?;
            let mut text = borrow(&self.text)?;
            let (commands, time) = pipeline.finish()?;
            pipeline.execute(&commands, &mut text, &surface, clear, time)
        };

        let mut backend = borrow(&self.backend)?;
        backend.render(&list)?;
        backend.present()?;
        debug!(
            "presented {} ops ({} culled, {} text skipped)",
            report.ops, report.culled, report.skipped_text
        );
        Ok(report)
    }

    // === Drawing ===

    /// Record a command in the open frame. Returns false if it was dropped.
    pub fn record(&self, command: DrawCommand) -> bool {
        match borrow(&self.pipeline) {
            Ok(mut pipeline) => pipeline.record(command),
            Err(_) => {
                warn!("draw command dropped: pipeline busy");
                false
            }
        }
    }

    pub fn submit(&self, commands: Vec<DrawCommand>) -> bool {
        match borrow(&self.pipeline) {
            Ok(mut pipeline) => pipeline.submit(commands),
            Err(_) => {
                warn!("command batch dropped: pipeline busy");
                false
            }
        }
    }

    pub fn draw_rounded_rect(&self, rect: Rect, radius: f32, fill: Color) -> bool {
        self.record(DrawCommand::RoundedRect {
            rect: RoundedRect::new(rect, radius),
            fill,
        })
    }

    pub fn draw_styled_rect(
        &self,
        rect: Rect,
        radius: f32,
        fill: Color,
        border: Option<Border>,
        shadow: Option<Shadow>,
    ) -> bool {
        self.record(DrawCommand::StyledRect {
            rect: RoundedRect::new(rect, radius),
            fill,
            border,
            shadow,
        })
    }

    pub fn draw_text(&self, run: TextRun) -> bool {
        self.record(DrawCommand::Text(run))
    }

    pub fn push_clip(&self, rect: Rect) -> bool {
        self.record(DrawCommand::PushClip { rect })
    }

    pub fn pop_clip(&self) -> bool {
        self.record(DrawCommand::PopClip)
    }

    // === Text ===

    pub fn register_font(&self, data: &[u8], name: Option<&str>) -> Result<FontId> {
        let id = borrow(&self.text)?.register(data, name)?;
        info!("registered font {} ({:?})", id.0, name);
        Ok(id)
    }

    pub fn register_font_face(&self, face: Arc<dyn ShapeFont>, name: Option<&str>) -> Result<FontId> {
        Ok(borrow(&self.text)?.register_face(face, name))
    }

    pub fn find_font(&self, name: &str) -> Option<FontId> {
        self.text.try_borrow().ok()?.registry().find(name)
    }

    pub fn set_default_font(&self, font: FontId) -> Result<bool> {
        Ok(borrow(&self.text)?.set_default_font(font))
    }

    /// Metrics for `text`, zeroed for an unknown font.
    pub fn text_layout(
        &self,
        text: &str,
        wrap_width: Option<f32>,
        font_size: f32,
        font: FontId,
    ) -> Result<TextMetrics> {
        let font_size = self.config.font_size_or_default(font_size);
        Ok(borrow(&self.text)?.layout(text, wrap_width, font_size, font))
    }

    pub fn measure(&self, text: &str, font_size: f32, max_width: Option<f32>) -> Result<Size> {
        let font_size = self.config.font_size_or_default(font_size);
        Ok(borrow(&self.text)?.measure(text, font_size, max_width))
    }

    pub fn measure_to_byte_offset(&self, text: &str, font_size: f32, offset: usize) -> Result<f32> {
        let font_size = self.config.font_size_or_default(font_size);
        Ok(borrow(&self.text)?.measure_to_byte_offset(text, font_size, offset))
    }

    pub fn hit_test(&self, text: &str, font_size: f32, x: f32) -> Result<usize> {
        let font_size = self.config.font_size_or_default(font_size);
        Ok(borrow(&self.text)?.hit_test(text, font_size, x))
    }

    pub fn text_cache_stats(&self) -> Result<CacheStats> {
        Ok(self.text.try_borrow().map_err(|_| EngineError::Busy)?.cache_stats())
    }

    // === Text input ===

    /// Apply an editing event. Home/End use the state's layout hint, if set.
    pub fn text_input_event(&self, id: u64, event: TextEvent) -> Result<bool> {
        let mut inputs = borrow(&self.inputs)?;
        let mut text = borrow(&self.text)?;
        Ok(inputs.apply_event_with(id, event, &mut *text))
    }

    /// Run `f` against the text input states.
    pub fn with_text_inputs<R>(&self, f: impl FnOnce(&mut TextInputManager) -> R) -> Result<R> {
        let mut inputs = borrow(&self.inputs)?;
        Ok(f(&mut *inputs))
    }

    /// Make Home/End follow the wrapped lines of `font` at `font_size`.
    pub fn set_text_input_layout(
        &self,
        id: u64,
        font: Option<FontId>,
        font_size: f32,
        wrap_width: Option<f32>,
    ) -> Result<()> {
        let font_size = self.config.font_size_or_default(font_size);
        let hint = font.map(|font| LayoutHint {
            font,
            font_size,
            wrap_width,
        });
        borrow(&self.inputs)?.set_layout(id, hint);
        Ok(())
    }

    // === Accessibility ===

    pub fn accessibility(&self) -> &AccessibilitySync {
        &self.a11y
    }

    pub fn a11y_update(&self, nodes: Vec<A11yNode>, root: u64, focus: u64) -> Result<UpdateOutcome> {
        Ok(self.a11y.update(nodes, root, focus)?)
    }

    pub fn set_a11y_action_callback(&self, callback: Option<ActionCallback>) {
        self.a11y.set_action_callback(callback);
    }

    pub fn a11y_perform_action(&self, node: u64, action: A11yAction) -> bool {
        self.a11y.perform_action(node, action)
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        info!("render context destroyed");
    }
}
