//! Draw commands and the per-frame recording list

use crate::color::Color;
use crate::primitives::{Border, Point, Rect, RoundedRect, Shadow};

/// A text run to be shaped when the frame executes
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Top-left of the first line box
    pub origin: Point,
    pub font_id: u32,
    pub font_size: f32,
    /// `None` disables wrapping
    pub wrap_width: Option<f32>,
    pub color: Color,
}

/// A draw command recorded during a frame
///
/// List order is paint order: later commands draw on top.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    RoundedRect {
        rect: RoundedRect,
        fill: Color,
    },
    StyledRect {
        rect: RoundedRect,
        fill: Color,
        border: Option<Border>,
        shadow: Option<Shadow>,
    },
    Text(TextRun),
    PushClip {
        rect: Rect,
    },
    PopClip,
}

impl DrawCommand {
    pub fn is_clip(&self) -> bool {
        matches!(self, DrawCommand::PushClip { .. } | DrawCommand::PopClip)
    }
}

/// Ordered command list for one frame
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take ownership of recorded commands, leaving the list empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Append a batch, preserving its order after anything already recorded.
    pub fn extend(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        self.commands.extend(commands);
    }

    // === Shapes ===

    pub fn rounded_rect(&mut self, rect: Rect, radius: f32, fill: Color) {
        self.commands.push(DrawCommand::RoundedRect {
            rect: RoundedRect::new(rect, radius),
            fill,
        });
    }

    pub fn styled_rect(
        &mut self,
        rect: Rect,
        radius: f32,
        fill: Color,
        border: Option<Border>,
        shadow: Option<Shadow>,
    ) {
        self.commands.push(DrawCommand::StyledRect {
            rect: RoundedRect::new(rect, radius),
            fill,
            border,
            shadow,
        });
    }

    // === Text ===

    pub fn text(&mut self, run: TextRun) {
        self.commands.push(DrawCommand::Text(run));
    }

    // === Clipping ===

    pub fn push_clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::PushClip { rect });
    }

    pub fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_and_bulk_share_order() {
        let mut list = DrawList::new();
        list.rounded_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 2.0, Color::RED);
        list.extend([
            DrawCommand::PushClip {
                rect: Rect::new(0.0, 0.0, 5.0, 5.0),
            },
            DrawCommand::PopClip,
        ]);
        list.pop_clip();

        let kinds: Vec<bool> = list.commands().iter().map(DrawCommand::is_clip).collect();
        assert_eq!(kinds, vec![false, true, true, true]);
        assert!(matches!(list.commands()[0], DrawCommand::RoundedRect { .. }));
    }

    #[test]
    fn test_take_commands_empties_list() {
        let mut list = DrawList::new();
        list.styled_rect(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            0.0,
            Color::WHITE,
            Some(Border::new(0.0, Color::BLACK)),
            None,
        );
        let taken = list.take_commands();
        assert_eq!(taken.len(), 1);
        assert!(list.is_empty());
        // A zero-width border is still a border
        match &taken[0] {
            DrawCommand::StyledRect { border, shadow, .. } => {
                assert_eq!(border.map(|b| b.width), Some(0.0));
                assert!(shadow.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
