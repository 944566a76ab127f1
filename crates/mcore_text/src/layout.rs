//! Text layout engine
//!
//! Splits text into paragraphs at `\n`, shapes each paragraph once and breaks
//! it into lines greedily at UAX #14 opportunities. Rendering, measurement and
//! caret queries all read the same [`TextLayout`], so a caret drawn at an
//! offset lines up with the glyphs drawn for it.

use std::ops::Range;

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::{ShapeFont, ShapedGlyph, ShapedText};

/// A positioned glyph ready for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    /// Glyph ID in the font
    pub glyph_id: u16,
    /// Byte index into the laid out string
    pub cluster: u32,
    /// Pen position in pixels, relative to the layout origin
    pub x: f32,
    /// Baseline Y in pixels
    pub y: f32,
    /// Shaper offsets, added to the pen position when drawing
    pub x_offset: f32,
    pub y_offset: f32,
    pub advance: f32,
    pub codepoint: char,
}

/// A visual line
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    pub glyphs: Vec<PositionedGlyph>,
    /// Byte range of the line's content, excluding a terminating `\n`
    pub range: Range<usize>,
    /// Visible width; whitespace hanging at a soft wrap is not counted
    pub width: f32,
    /// Pen position after the last glyph
    pub advance: f32,
    pub top: f32,
    pub baseline_y: f32,
    /// Line ended because the next word did not fit
    pub soft_wrapped: bool,
}

/// Aggregate layout bounds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub advance_w: f32,
    pub advance_h: f32,
    pub line_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Geometric caret location for a byte offset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Caret {
    pub x: f32,
    /// Top of the caret's line
    pub y: f32,
    pub height: f32,
    pub line: usize,
}

/// Result of laying out text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    /// The laid out string; line ranges and glyph clusters index into it
    pub text: String,
    pub lines: Vec<LayoutLine>,
    /// Widest line
    pub width: f32,
    pub height: f32,
    pub line_height: f32,
}

impl TextLayout {
    pub fn metrics(&self) -> TextMetrics {
        TextMetrics {
            advance_w: self.width,
            advance_h: self.height,
            line_count: self.lines.len() as u32,
        }
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Get all glyphs as a flat iterator
    pub fn glyphs(&self) -> impl Iterator<Item = &PositionedGlyph> {
        self.lines.iter().flat_map(|line| line.glyphs.iter())
    }

    /// Index of the line that displays the caret for `offset`.
    ///
    /// At a soft wrap the offset belongs to the start of the following line.
    pub fn line_for_offset(&self, offset: usize) -> Option<usize> {
        if self.lines.is_empty() {
            return None;
        }
        Some(
            self.lines
                .iter()
                .rposition(|line| line.range.start <= offset)
                .unwrap_or(0),
        )
    }

    /// Caret geometry for byte `offset`, snapped back to a char boundary.
    ///
    /// Inside a multi-character cluster (a ligature, or a base with marks)
    /// the cluster's advance is split evenly between its characters.
    pub fn caret(&self, offset: usize) -> Caret {
        let offset = snap_to_boundary(&self.text, offset);
        let Some(index) = self.line_for_offset(offset) else {
            return Caret::default();
        };
        let line = &self.lines[index];
        let x = self
            .cluster_spans(line)
            .into_iter()
            .find(|span| offset < span.end)
            .map(|span| {
                let k = self.char_count(span.start..offset.max(span.start));
                span.stop_x(k, self.char_count(span.start..span.end))
            })
            .unwrap_or(line.advance);
        Caret {
            x,
            y: line.top,
            height: self.line_height,
            line: index,
        }
    }

    /// Byte offset of the caret boundary nearest to a point.
    pub fn hit_test(&self, x: f32, y: f32) -> usize {
        if self.lines.is_empty() {
            return 0;
        }
        let row = if self.line_height > 0.0 {
            (y / self.line_height).floor().max(0.0) as usize
        } else {
            0
        };
        let line = &self.lines[row.min(self.lines.len() - 1)];

        let mut last_stop = None;
        for span in self.cluster_spans(line) {
            let chars = self.char_count(span.start..span.end);
            let offsets = self
                .text
                .get(span.start..span.end)
                .map(|cluster| cluster.char_indices().map(|(i, _)| span.start + i).collect())
                .unwrap_or_else(|| vec![span.start]);
            for (k, offset) in offsets.into_iter().enumerate() {
                let left = span.stop_x(k, chars);
                let right = span.stop_x(k + 1, chars);
                if x < left + (right - left) * 0.5 {
                    return offset.max(line.range.start);
                }
                last_stop = Some(offset);
            }
        }
        // Past the end of a wrapped line: stay before the hanging whitespace
        // so the caret does not jump to the next line
        if line.soft_wrapped {
            if let Some(offset) = last_stop {
                return offset;
            }
        }
        line.range.end
    }

    /// Glyphs of `line` grouped by source cluster, in visual order.
    fn cluster_spans(&self, line: &LayoutLine) -> Vec<ClusterSpan> {
        let mut spans: Vec<ClusterSpan> = Vec::new();
        for glyph in &line.glyphs {
            let start = glyph.cluster as usize;
            match spans.last_mut() {
                Some(span) if span.start == start => span.advance += glyph.advance,
                _ => spans.push(ClusterSpan {
                    start,
                    end: start,
                    x: glyph.x,
                    advance: glyph.advance,
                }),
            }
        }
        let mut next = line.range.end;
        for span in spans.iter_mut().rev() {
            span.end = next.max(span.start);
            next = span.start;
        }
        spans
    }

    fn char_count(&self, range: Range<usize>) -> usize {
        self.text
            .get(range)
            .map(|slice| slice.chars().count())
            .unwrap_or(0)
    }
}

/// One source cluster on a line and the pen span its glyphs cover
struct ClusterSpan {
    start: usize,
    end: usize,
    x: f32,
    advance: f32,
}

impl ClusterSpan {
    /// X of the `k`th of `chars` caret stops in the cluster.
    fn stop_x(&self, k: usize, chars: usize) -> f32 {
        if chars == 0 {
            return self.x;
        }
        self.x + self.advance * k as f32 / chars as f32
    }
}

/// Clamp `offset` to `text` and move it back onto a char boundary.
pub fn snap_to_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Treat `None`, zero, negative and non-finite widths as "no wrap".
pub fn normalize_wrap(wrap_width: Option<f32>) -> Option<f32> {
    wrap_width.filter(|w| w.is_finite() && *w > 0.0)
}

/// Lay out `text` with `face`.
pub fn layout_text(
    face: &dyn ShapeFont,
    text: &str,
    font_size: f32,
    wrap_width: Option<f32>,
) -> TextLayout {
    let metrics = face.metrics();
    let line_height = metrics.line_height_px(font_size);
    let ascender = metrics.ascender_px(font_size);
    let wrap = normalize_wrap(wrap_width);

    let mut lines = Vec::new();
    let mut base = 0usize;
    for paragraph in text.split('\n') {
        let shaped = face.shape(paragraph, font_size);
        for slice in break_paragraph(paragraph, &shaped, wrap) {
            let top = lines.len() as f32 * line_height;
            lines.push(position_line(&shaped, slice, base, top, top + ascender));
        }
        base += paragraph.len() + 1;
    }

    let width = lines.iter().map(|l| l.width).fold(0.0f32, f32::max);
    TextLayout {
        text: text.to_owned(),
        height: lines.len() as f32 * line_height,
        width,
        line_height,
        lines,
    }
}

struct Segment {
    glyphs: Range<usize>,
    forced: bool,
}

struct LineSlice {
    glyphs: Range<usize>,
    bytes: Range<usize>,
    soft_wrapped: bool,
}

/// Group glyphs into unbreakable runs ending at each break opportunity.
fn segments(paragraph: &str, glyphs: &[ShapedGlyph]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (pos, opportunity) in linebreaks(paragraph) {
        if pos >= paragraph.len() {
            break;
        }
        let end = start
            + glyphs[start..]
                .iter()
                .take_while(|g| (g.cluster as usize) < pos)
                .count();
        segments.push(Segment {
            glyphs: start..end,
            forced: opportunity == BreakOpportunity::Mandatory,
        });
        start = end;
    }
    segments.push(Segment {
        glyphs: start..glyphs.len(),
        forced: false,
    });
    segments
}

fn break_paragraph(paragraph: &str, shaped: &ShapedText, wrap: Option<f32>) -> Vec<LineSlice> {
    let glyphs = &shaped.glyphs;
    let advance = |g: &ShapedGlyph| shaped.scale(g.x_advance);

    // (first glyph of the next line, soft wrap)
    let mut breaks: Vec<(usize, bool)> = Vec::new();
    let mut line_start = 0usize;
    let mut line_width = 0.0f32;

    for seg in segments(paragraph, glyphs) {
        let run = &glyphs[seg.glyphs.clone()];
        let run_width: f32 = run.iter().map(advance).sum();

        match wrap {
            Some(max) => {
                let trailing: f32 = run
                    .iter()
                    .rev()
                    .take_while(|g| g.codepoint.is_whitespace())
                    .map(advance)
                    .sum();
                let visible = run_width - trailing;

                if line_start < seg.glyphs.start && line_width + visible > max {
                    breaks.push((seg.glyphs.start, true));
                    line_start = seg.glyphs.start;
                    line_width = 0.0;
                }

                if line_start == seg.glyphs.start && visible > max {
                    // Word wider than the line: fall back to character breaks
                    for i in seg.glyphs.clone() {
                        let g = &glyphs[i];
                        let w = advance(g);
                        if i > line_start && !g.codepoint.is_whitespace() && line_width + w > max {
                            breaks.push((i, true));
                            line_start = i;
                            line_width = 0.0;
                        }
                        line_width += w;
                    }
                } else {
                    line_width += run_width;
                }
            }
            None => line_width += run_width,
        }

        if seg.forced {
            breaks.push((seg.glyphs.end, false));
            line_start = seg.glyphs.end;
            line_width = 0.0;
        }
    }

    let byte_at = |glyph_index: usize| {
        glyphs
            .get(glyph_index)
            .map(|g| g.cluster as usize)
            .unwrap_or(paragraph.len())
    };

    let mut slices = Vec::with_capacity(breaks.len() + 1);
    let mut glyph_start = 0;
    let mut byte_start = 0;
    for &(next, soft_wrapped) in &breaks {
        let byte_end = byte_at(next);
        slices.push(LineSlice {
            glyphs: glyph_start..next,
            bytes: byte_start..byte_end,
            soft_wrapped,
        });
        glyph_start = next;
        byte_start = byte_end;
    }
    slices.push(LineSlice {
        glyphs: glyph_start..glyphs.len(),
        bytes: byte_start..paragraph.len(),
        soft_wrapped: false,
    });
    slices
}

fn position_line(
    shaped: &ShapedText,
    slice: LineSlice,
    base: usize,
    top: f32,
    baseline_y: f32,
) -> LayoutLine {
    let mut pen = 0.0f32;
    let mut glyphs = Vec::with_capacity(slice.glyphs.len());

    for g in &shaped.glyphs[slice.glyphs] {
        let advance = shaped.scale(g.x_advance);
        glyphs.push(PositionedGlyph {
            glyph_id: g.glyph_id,
            cluster: (base + g.cluster as usize) as u32,
            x: pen,
            y: baseline_y,
            x_offset: shaped.scale(g.x_offset),
            y_offset: shaped.scale(g.y_offset),
            advance,
            codepoint: g.codepoint,
        });
        pen += advance;
    }

    let hanging: f32 = if slice.soft_wrapped {
        glyphs
            .iter()
            .rev()
            .take_while(|g| g.codepoint.is_whitespace())
            .map(|g| g.advance)
            .sum()
    } else {
        0.0
    };

    LayoutLine {
        glyphs,
        range: base + slice.bytes.start..base + slice.bytes.end,
        width: pen - hanging,
        advance: pen,
        top,
        baseline_y,
        soft_wrapped: slice.soft_wrapped,
    }
}
