//! Text input editing for mcore
//!
//! One [`TextInputState`] per host widget id: a UTF-8 buffer, a byte cursor,
//! an optional selection anchor and an optional IME preedit. Events come from
//! the host already translated from key codes.

pub mod lines;
pub mod manager;
pub mod state;

pub use lines::{LineBoundaries, LogicalLines};
pub use manager::TextInputManager;
pub use state::{Preedit, TextInputState};

use mcore_text::FontId;

/// Cursor movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    /// Start of the line containing the cursor
    Home,
    /// End of the line containing the cursor
    End,
}

/// A text editing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEvent {
    /// Unicode scalar value; invalid values are ignored
    InsertChar(u32),
    Backspace,
    Delete,
    MoveCursor { direction: Direction, extend: bool },
    /// Byte offset, snapped to a char boundary at or before it
    SetCursor(usize),
    InsertText(String),
}

/// How a state's text is laid out on screen, for visual Home/End
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutHint {
    pub font: FontId,
    pub font_size: f32,
    pub wrap_width: Option<f32>,
}
