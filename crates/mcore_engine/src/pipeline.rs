//! Per-frame command recording and execution

use mcore_paint::{ClipStack, Color, DrawCommand, DrawList, Rect, RoundedRect, TextRun};
use mcore_text::{FontId, TextSystem};
use tracing::{debug, warn};

use crate::backend::{GlyphInstance, GlyphRun, RectInstance, RenderList, RenderOp};
use crate::error::{EngineError, Result};
use crate::surface::SurfaceDesc;

/// Counters for one executed frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Ops handed to the backend
    pub ops: usize,
    /// Draws dropped because they fall outside the clip
    pub culled: usize,
    /// Text commands with an unknown font
    pub skipped_text: usize,
    /// Clips still pushed when the list ended
    pub unbalanced_clips: usize,
}

/// Records commands between `begin_frame` and `end_frame_present`
#[derive(Debug, Default)]
pub struct FramePipeline {
    list: DrawList,
    open: Option<f64>,
    clip: ClipStack,
    frames: u64,
}

impl FramePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Frames finished so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Commands recorded in the open frame
    pub fn commands(&self) -> &[DrawCommand] {
        self.list.commands()
    }

    /// Open a frame. An unfinished frame is discarded.
    pub fn begin(&mut self, time: f64) {
        if self.open.is_some() {
            warn!(
                "begin_frame without end_frame_present, discarding {} commands",
                self.list.len()
            );
        }
        self.list.clear();
        self.open = Some(time);
    }

    /// Append a command. Outside a frame the command is dropped.
    pub fn record(&mut self, command: DrawCommand) -> bool {
        if self.open.is_none() {
            warn!("draw command outside a frame dropped");
            return false;
        }
        self.list.push(command);
        true
    }

    /// Append a batch in order.
    pub fn submit(&mut self, commands: impl IntoIterator<Item = DrawCommand>) -> bool {
        if self.open.is_none() {
            warn!("command batch outside a frame dropped");
            return false;
        }
        self.list.extend(commands);
        true
    }

    /// Close the frame and hand back its commands and time.
    pub fn finish(&mut self) -> Result<(Vec<DrawCommand>, f64)> {
        let time = self.open.take().ok_or(EngineError::NoFrame)?;
        self.frames += 1;
        Ok((self.list.take_commands(), time))
    }

    /// Resolve clips and shape text, producing what the backend draws.
    pub fn execute(
        &mut self,
        commands: &[DrawCommand],
        text: &mut TextSystem,
        surface: &SurfaceDesc,
        clear: Color,
        time: f64,
    ) -> (RenderList, FrameReport) {
        let mut list = RenderList::new(surface, clear, time);
        let mut report = FrameReport::default();
        self.clip.clear();

        for command in commands {
            match command {
                DrawCommand::PushClip { rect } => self.clip.push(*rect),
                DrawCommand::PopClip => {
                    self.clip.pop();
                }
                DrawCommand::RoundedRect { rect, fill } => {
                    if !self.clip.admits(&rect.rect) {
                        report.culled += 1;
                        continue;
                    }
                    list.ops.push(RenderOp::FillRoundedRect(RectInstance::new(
                        rect,
                        *fill,
                        self.clip.current(),
                    )));
                }
                DrawCommand::StyledRect {
                    rect,
                    fill,
                    border,
                    shadow,
                } => {
                    let bounds = match shadow {
                        Some(shadow) => union(&rect.rect, &shadow.bounds(&rect.rect)),
                        None => rect.rect,
                    };
                    if !self.clip.admits(&bounds) {
                        report.culled += 1;
                        continue;
                    }
                    let instance = styled_instance(rect, *fill, *border, *shadow, self.clip.current());
                    list.ops.push(RenderOp::StyledRect(instance));
                }
                DrawCommand::Text(run) => match self.shape_run(run, text) {
                    None => report.skipped_text += 1,
                    Some(glyphs) if !self.clip.admits(&glyphs.bounds) => report.culled += 1,
                    Some(glyphs) => list.ops.push(RenderOp::Glyphs(glyphs)),
                },
            }
        }

        report.unbalanced_clips = self.clip.depth();
        if report.unbalanced_clips > 0 {
            debug!("{} clips left open at end of frame", report.unbalanced_clips);
            self.clip.clear();
        }
        report.ops = list.len();
        (list, report)
    }

    fn shape_run(&self, run: &TextRun, text: &mut TextSystem) -> Option<GlyphRun> {
        let font = FontId(run.font_id);
        let Some(layout) = text.layout_full(&run.text, run.wrap_width, run.font_size, font) else {
            debug!("text command skipped: unknown font id {}", run.font_id);
            return None;
        };
        let origin = run.origin;
        let glyphs = layout
            .glyphs()
            .map(|glyph| GlyphInstance {
                x: origin.x + glyph.x + glyph.x_offset,
                y: origin.y + glyph.y - glyph.y_offset,
                glyph_id: u32::from(glyph.glyph_id),
                cluster: glyph.cluster,
            })
            .collect();
        Some(GlyphRun {
            font,
            font_size: run.font_size,
            color: run.color,
            clip: self.clip.current(),
            bounds: Rect::new(origin.x, origin.y, layout.width, layout.height),
            glyphs,
        })
    }
}

fn styled_instance(
    rect: &RoundedRect,
    fill: Color,
    border: Option<mcore_paint::Border>,
    shadow: Option<mcore_paint::Shadow>,
    clip: Option<Rect>,
) -> RectInstance {
    let mut instance = RectInstance::new(rect, fill, clip);
    if let Some(border) = border {
        instance.flags |= crate::backend::RECT_HAS_BORDER;
        instance.border_width = border.width.max(0.0);
        instance.border_color = border.color.to_array();
    }
    if let Some(shadow) = shadow {
        instance.flags |= crate::backend::RECT_HAS_SHADOW;
        instance.shadow = [shadow.offset_x, shadow.offset_y, shadow.blur_radius.max(0.0), 0.0];
        instance.shadow_color = shadow.color.to_array();
    }
    instance
}

fn union(a: &Rect, b: &Rect) -> Rect {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    Rect::new(x, y, a.right().max(b.right()) - x, a.bottom().max(b.bottom()) - y)
}
