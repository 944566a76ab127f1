//! Per-widget text input states keyed by host ids

use lru::LruCache;
use rustc_hash::{FxBuildHasher, FxHashSet};
use tracing::debug;

use crate::lines::{LineBoundaries, LogicalLines};
use crate::state::TextInputState;
use crate::{LayoutHint, TextEvent};

/// Text input states addressed by opaque `u64` ids.
///
/// Any access creates the state for an unseen id. With a non-zero
/// `max_states`, the least recently touched state is evicted to make room.
pub struct TextInputManager {
    states: LruCache<u64, TextInputState, FxBuildHasher>,
    max_states: usize,
}

impl TextInputManager {
    pub fn new() -> Self {
        Self::with_max_states(0)
    }

    /// `0` means unbounded.
    pub fn with_max_states(max_states: usize) -> Self {
        Self {
            states: LruCache::unbounded_with_hasher(FxBuildHasher),
            max_states,
        }
    }

    /// Get the state for `id`, creating it on first touch.
    pub fn state(&mut self, id: u64) -> &mut TextInputState {
        if self.max_states > 0 && !self.states.contains(&id) {
            while self.states.len() >= self.max_states {
                match self.states.pop_lru() {
                    Some((evicted, _)) => debug!("evicted text input state {evicted}"),
                    None => break,
                }
            }
        }
        self.states.get_or_insert_mut(id, TextInputState::new)
    }

    /// Look up without creating or touching.
    pub fn peek(&self, id: u64) -> Option<&TextInputState> {
        self.states.peek(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.states.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drop the state for `id`. Unknown ids are a no-op.
    pub fn dispose(&mut self, id: u64) -> bool {
        self.states.pop(&id).is_some()
    }

    /// Drop every state whose id is not in `live`. Returns how many were dropped.
    pub fn retain(&mut self, live: &[u64]) -> usize {
        let live: FxHashSet<u64> = live.iter().copied().collect();
        let dead: Vec<u64> = self
            .states
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !live.contains(id))
            .collect();
        for id in &dead {
            self.states.pop(id);
        }
        if !dead.is_empty() {
            debug!("disposed {} text input states", dead.len());
        }
        dead.len()
    }

    pub fn apply_event(&mut self, id: u64, event: TextEvent) -> bool {
        self.apply_event_with(id, event, &mut LogicalLines)
    }

    /// Apply with a line source for Home/End, usually the text system.
    pub fn apply_event_with(
        &mut self,
        id: u64,
        event: TextEvent,
        lines: &mut dyn LineBoundaries,
    ) -> bool {
        self.state(id).apply_with(event, lines)
    }

    pub fn get_text(&mut self, id: u64) -> &str {
        self.state(id).text()
    }

    pub fn get_cursor(&mut self, id: u64) -> usize {
        self.state(id).cursor()
    }

    pub fn set_text(&mut self, id: u64, text: impl Into<String>) {
        self.state(id).set_text(text);
    }

    pub fn get_selection(&mut self, id: u64) -> Option<(usize, usize)> {
        self.state(id).selection().map(|r| (r.start, r.end))
    }

    pub fn get_selected_text(&mut self, id: u64) -> &str {
        self.state(id).selected_text()
    }

    pub fn set_cursor_with_extend(&mut self, id: u64, offset: usize, extend: bool) {
        self.state(id).move_to(offset, extend);
    }

    pub fn start_selection(&mut self, id: u64, offset: usize) {
        self.state(id).start_selection(offset);
    }

    pub fn select_all(&mut self, id: u64) {
        self.state(id).select_all();
    }

    pub fn clear_selection(&mut self, id: u64) {
        self.state(id).clear_selection();
    }

    pub fn set_preedit(&mut self, id: u64, text: &str, cursor: usize) {
        self.state(id).set_preedit(text, cursor);
    }

    pub fn commit(&mut self, id: u64, text: &str) -> bool {
        self.state(id).commit(text)
    }

    pub fn clear_preedit(&mut self, id: u64) {
        self.state(id).clear_preedit();
    }

    pub fn get_preedit(&mut self, id: u64) -> Option<(&str, usize)> {
        self.state(id)
            .preedit()
            .map(|preedit| (preedit.text.as_str(), preedit.cursor))
    }

    pub fn display_text(&mut self, id: u64) -> (String, usize) {
        self.state(id).display_text()
    }

    /// Make Home/End follow wrapped lines laid out with `hint`.
    pub fn set_layout(&mut self, id: u64, hint: Option<LayoutHint>) {
        self.state(id).set_layout_hint(hint);
    }
}

impl Default for TextInputManager {
    fn default() -> Self {
        Self::new()
    }
}
