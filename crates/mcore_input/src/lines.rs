//! Line boundaries for Home/End
//!
//! Without a layout hint a line is a logical `\n`-separated line. With a
//! hint, the text system supplies the wrapped visual line that displays the
//! cursor, the same lines the renderer draws.

use std::ops::Range;

use mcore_text::TextSystem;

use crate::LayoutHint;

pub trait LineBoundaries {
    /// Byte range of the line containing `offset`, excluding its newline.
    fn line_range(&mut self, text: &str, hint: Option<&LayoutHint>, offset: usize) -> Range<usize>;
}

/// Lines separated by `\n` only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogicalLines;

impl LineBoundaries for LogicalLines {
    fn line_range(&mut self, text: &str, _hint: Option<&LayoutHint>, offset: usize) -> Range<usize> {
        logical_line(text, offset)
    }
}

impl LineBoundaries for TextSystem {
    fn line_range(&mut self, text: &str, hint: Option<&LayoutHint>, offset: usize) -> Range<usize> {
        let Some(hint) = hint else {
            return logical_line(text, offset);
        };
        let Some(layout) = self.layout_full(text, hint.wrap_width, hint.font_size, hint.font)
        else {
            return logical_line(text, offset);
        };
        let Some(index) = layout.line_for_offset(offset) else {
            return logical_line(text, offset);
        };

        let line = &layout.lines[index];
        // On a wrapped line, End stops before the hanging whitespace so the
        // caret stays on this line
        let end = match line.glyphs.last() {
            Some(last) if line.soft_wrapped && last.codepoint.is_whitespace() => {
                last.cluster as usize
            }
            _ => line.range.end,
        };
        line.range.start..end
    }
}

fn logical_line(text: &str, offset: usize) -> Range<usize> {
    let offset = offset.min(text.len());
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len());
    start..end
}
