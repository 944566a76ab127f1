//! Editing state for a single text input
//!
//! All positions are byte offsets into the committed UTF-8 buffer and always
//! sit on char boundaries. The selection is derived from the anchor and the
//! cursor; it is never stored separately.

use std::ops::Range;

use mcore_text::snap_to_boundary;
use tracing::debug;

use crate::lines::{LineBoundaries, LogicalLines};
use crate::{Direction, LayoutHint, TextEvent};

/// IME composition overlay, never part of the committed buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preedit {
    pub text: String,
    /// Byte offset within `text`
    pub cursor: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    text: String,
    cursor: usize,
    anchor: Option<usize>,
    preedit: Option<Preedit>,
    layout: Option<LayoutHint>,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.set_text(text);
        state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// `[min(anchor, cursor), max(anchor, cursor))`, `None` when empty.
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        let range = anchor.min(self.cursor)..anchor.max(self.cursor);
        (!range.is_empty()).then_some(range)
    }

    pub fn selected_text(&self) -> &str {
        self.selection()
            .map(|range| &self.text[range])
            .unwrap_or_default()
    }

    pub fn preedit(&self) -> Option<&Preedit> {
        self.preedit.as_ref()
    }

    pub fn layout_hint(&self) -> Option<&LayoutHint> {
        self.layout.as_ref()
    }

    pub fn set_layout_hint(&mut self, hint: Option<LayoutHint>) {
        self.layout = hint;
    }

    /// Apply one editing event with logical (`\n`) lines for Home/End.
    pub fn apply(&mut self, event: TextEvent) -> bool {
        self.apply_with(event, &mut LogicalLines)
    }

    /// Apply one editing event. Returns whether the committed buffer changed.
    pub fn apply_with(&mut self, event: TextEvent, lines: &mut dyn LineBoundaries) -> bool {
        match event {
            TextEvent::InsertChar(code) => match char::from_u32(code) {
                Some(ch) => {
                    let mut buf = [0u8; 4];
                    self.insert_text(ch.encode_utf8(&mut buf))
                }
                None => {
                    debug!("ignoring InsertChar with invalid scalar {code:#x}");
                    false
                }
            },
            TextEvent::InsertText(text) => self.insert_text(&text),
            TextEvent::Backspace => self.backspace(),
            TextEvent::Delete => self.delete(),
            TextEvent::MoveCursor { direction, extend } => {
                self.move_cursor(direction, extend, lines);
                false
            }
            TextEvent::SetCursor(position) => {
                self.set_cursor(position);
                false
            }
        }
    }

    /// Replace the selection (or insert at the cursor) with `text`.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let removed = self.delete_selection();
        self.text.insert_str(self.cursor, text);
        self.cursor += text.len();
        self.anchor = None;
        removed || !text.is_empty()
    }

    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        self.anchor = None;
        if self.cursor == 0 {
            return false;
        }
        let prev = prev_boundary(&self.text, self.cursor);
        self.text.drain(prev..self.cursor);
        self.cursor = prev;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        self.anchor = None;
        if self.cursor >= self.text.len() {
            return false;
        }
        let next = next_boundary(&self.text, self.cursor);
        self.text.drain(self.cursor..next);
        true
    }

    pub fn move_cursor(
        &mut self,
        direction: Direction,
        extend: bool,
        lines: &mut dyn LineBoundaries,
    ) {
        let target = match direction {
            Direction::Left => prev_boundary(&self.text, self.cursor),
            Direction::Right => next_boundary(&self.text, self.cursor),
            Direction::Home => {
                lines
                    .line_range(&self.text, self.layout.as_ref(), self.cursor)
                    .start
            }
            Direction::End => {
                lines
                    .line_range(&self.text, self.layout.as_ref(), self.cursor)
                    .end
            }
        };
        self.move_to(target, extend);
    }

    /// Snap to the boundary at or before `position`; clears the selection.
    pub fn set_cursor(&mut self, position: usize) {
        self.cursor = snap_to_boundary(&self.text, position);
        self.anchor = None;
    }

    /// Move to `offset`, extending from the existing anchor (or the current
    /// cursor) when `extend` is set.
    pub fn move_to(&mut self, offset: usize, extend: bool) {
        let target = snap_to_boundary(&self.text, offset);
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = target;
    }

    /// Anchor a selection at `offset` without moving the cursor.
    pub fn start_selection(&mut self, offset: usize) {
        self.anchor = Some(snap_to_boundary(&self.text, offset));
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.text.len();
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Replace the whole buffer. The cursor moves to the end; any preedit is
    /// kept since the IME owns it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
        self.anchor = None;
    }

    /// Show `text` as composition at the cursor. Empty text clears it.
    pub fn set_preedit(&mut self, text: &str, cursor: usize) {
        if text.is_empty() {
            self.preedit = None;
            return;
        }
        self.preedit = Some(Preedit {
            text: text.to_owned(),
            cursor: snap_to_boundary(text, cursor),
        });
    }

    /// Commit composed text as a real insertion and drop the preedit.
    pub fn commit(&mut self, text: &str) -> bool {
        self.preedit = None;
        self.insert_text(text)
    }

    pub fn clear_preedit(&mut self) {
        self.preedit = None;
    }

    /// Committed text with the preedit spliced in at the cursor, and the
    /// caret offset within that string.
    pub fn display_text(&self) -> (String, usize) {
        match &self.preedit {
            Some(preedit) => {
                let mut shown = String::with_capacity(self.text.len() + preedit.text.len());
                shown.push_str(&self.text[..self.cursor]);
                shown.push_str(&preedit.text);
                shown.push_str(&self.text[self.cursor..]);
                (shown, self.cursor + preedit.cursor)
            }
            None => (self.text.clone(), self.cursor),
        }
    }

    fn delete_selection(&mut self) -> bool {
        match self.selection() {
            Some(range) => {
                self.cursor = range.start;
                self.text.drain(range);
                self.anchor = None;
                true
            }
            None => false,
        }
    }
}

fn prev_boundary(text: &str, offset: usize) -> usize {
    text[..offset]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .chars()
        .next()
        .map(|c| offset + c.len_utf8())
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right(extend: bool) -> TextEvent {
        TextEvent::MoveCursor {
            direction: Direction::Right,
            extend,
        }
    }

    fn left(extend: bool) -> TextEvent {
        TextEvent::MoveCursor {
            direction: Direction::Left,
            extend,
        }
    }

    #[test]
    fn test_insert_char() {
        let mut state = TextInputState::new();
        assert!(state.apply(TextEvent::InsertChar('H' as u32)));
        assert!(state.apply(TextEvent::InsertChar('i' as u32)));
        assert_eq!(state.text(), "Hi");
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn test_invalid_scalar_is_ignored() {
        let mut state = TextInputState::with_text("a");
        assert!(!state.apply(TextEvent::InsertChar(0xD800)));
        assert!(!state.apply(TextEvent::InsertChar(0x110000)));
        assert_eq!(state.text(), "a");
    }

    #[test]
    fn test_utf8_handling() {
        let mut state = TextInputState::new();
        state.apply(TextEvent::InsertChar('日' as u32));
        assert_eq!(state.cursor(), 3);
        state.apply(TextEvent::InsertChar('本' as u32));
        assert_eq!(state.cursor(), 6);
        assert!(state.apply(TextEvent::Backspace));
        assert_eq!(state.text(), "日");
        assert_eq!(state.cursor(), 3);
    }

    #[test]
    fn test_delete_keeps_cursor() {
        let mut state = TextInputState::with_text("aé😀b");
        state.set_cursor(1);
        assert!(state.apply(TextEvent::Delete));
        assert_eq!(state.text(), "a😀b");
        assert_eq!(state.cursor(), 1);
        assert!(state.apply(TextEvent::Delete));
        assert_eq!(state.text(), "ab");
        state.set_cursor(2);
        assert!(!state.apply(TextEvent::Delete));
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut state = TextInputState::with_text("abc");
        state.set_cursor(0);
        assert!(!state.apply(TextEvent::Backspace));
        assert_eq!(state.text(), "abc");
    }

    #[test]
    fn test_set_cursor_snaps_back_mid_scalar() {
        let mut state = TextInputState::with_text("a日b");
        state.apply(TextEvent::SetCursor(2));
        assert_eq!(state.cursor(), 1);
        state.apply(TextEvent::SetCursor(400));
        assert_eq!(state.cursor(), 5);
    }

    #[test]
    fn test_extend_selection_from_started_anchor() {
        let mut state = TextInputState::with_text("hello world");
        state.set_cursor(5);
        state.start_selection(5);
        for _ in 0..3 {
            state.apply(right(true));
        }
        assert_eq!(state.selection(), Some(5..8));
        assert_eq!(state.selected_text(), " wo");
    }

    #[test]
    fn test_extend_backwards_then_forwards_past_anchor() {
        let mut state = TextInputState::with_text("abcdef");
        state.set_cursor(3);
        state.apply(left(true));
        state.apply(left(true));
        assert_eq!(state.selection(), Some(1..3));
        for _ in 0..4 {
            state.apply(right(true));
        }
        assert_eq!(state.selection(), Some(3..5));
    }

    #[test]
    fn test_move_without_extend_steps_and_clears_selection() {
        let mut state = TextInputState::with_text("abcdef");
        state.select_all();
        state.apply(left(false));
        assert_eq!(state.cursor(), 5);
        assert_eq!(state.selection(), None);

        state.start_selection(1);
        state.apply(right(false));
        assert_eq!(state.cursor(), 6);
        assert_eq!(state.anchor(), None);

        let mut state = TextInputState::with_text("a日b");
        state.select_all();
        state.apply(left(false));
        assert_eq!(state.cursor(), 4);
        state.apply(left(false));
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut state = TextInputState::with_text("hello world");
        state.start_selection(0);
        state.move_to(5, true);
        assert!(state.apply(TextEvent::InsertText("bye".into())));
        assert_eq!(state.text(), "bye world");
        assert_eq!(state.cursor(), 3);
        assert_eq!(state.selection(), None);
    }

    #[test]
    fn test_backspace_deletes_selection() {
        let mut state = TextInputState::with_text("hello world");
        state.set_cursor(11);
        state.move_to(6, true);
        assert!(state.apply(TextEvent::Backspace));
        assert_eq!(state.text(), "hello ");
        assert_eq!(state.cursor(), 6);
    }

    #[test]
    fn test_home_end_use_logical_lines() {
        let mut state = TextInputState::with_text("one\ntwo\nthree");
        state.set_cursor(5);
        state.apply(TextEvent::MoveCursor {
            direction: Direction::Home,
            extend: false,
        });
        assert_eq!(state.cursor(), 4);
        state.apply(TextEvent::MoveCursor {
            direction: Direction::End,
            extend: true,
        });
        assert_eq!(state.cursor(), 7);
        assert_eq!(state.selected_text(), "two");
    }

    #[test]
    fn test_preedit_is_not_committed() {
        let mut state = TextInputState::with_text("ab");
        state.set_cursor(1);
        state.set_preedit("にほ", 4);
        assert_eq!(state.text(), "ab");
        assert_eq!(state.preedit().map(|p| p.cursor), Some(3));
        assert_eq!(state.display_text(), ("aにほb".to_string(), 4));

        assert!(state.commit("日本"));
        assert_eq!(state.text(), "a日本b");
        assert_eq!(state.cursor(), 7);
        assert!(state.preedit().is_none());
    }

    #[test]
    fn test_empty_preedit_clears() {
        let mut state = TextInputState::new();
        state.set_preedit("x", 1);
        state.set_preedit("", 0);
        assert!(state.preedit().is_none());
    }

    #[test]
    fn test_set_text_keeps_preedit() {
        let mut state = TextInputState::with_text("old");
        state.select_all();
        state.set_preedit("k", 1);
        state.set_text("new text");
        assert_eq!(state.cursor(), 8);
        assert_eq!(state.selection(), None);
        assert!(state.preedit().is_some());
    }
}
