//! Clip rectangle stack

use smallvec::SmallVec;
use tracing::debug;

use crate::primitives::Rect;

/// Nested clip regions. Each entry is already intersected with its parent,
/// so the top is the effective clip.
#[derive(Clone, Debug, Default)]
pub struct ClipStack {
    stack: SmallVec<[Rect; 8]>,
}

impl ClipStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intersect `rect` with the current clip and push the result.
    ///
    /// An empty stack is unconstrained, so the first push stores `rect` as is.
    pub fn push(&mut self, rect: Rect) {
        let clipped = match self.stack.last() {
            Some(top) => top.intersect(&rect),
            None => rect,
        };
        self.stack.push(clipped);
    }

    /// Remove the top entry. Popping an empty stack is ignored.
    pub fn pop(&mut self) -> Option<Rect> {
        let popped = self.stack.pop();
        if popped.is_none() {
            debug!("clip stack underflow ignored");
        }
        popped
    }

    /// Effective clip, `None` when unconstrained.
    pub fn current(&self) -> Option<Rect> {
        self.stack.last().copied()
    }

    /// Whether `bounds` can produce visible output under the current clip.
    pub fn admits(&self, bounds: &Rect) -> bool {
        match self.stack.last() {
            Some(clip) => clip.intersects(bounds),
            None => true,
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_intersects_with_top() {
        let mut clips = ClipStack::new();
        clips.push(Rect::new(0.0, 0.0, 100.0, 100.0));
        clips.push(Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(clips.current(), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));
    }

    #[test]
    fn test_balanced_pops_return_to_empty_and_underflow_is_ignored() {
        let mut clips = ClipStack::new();
        clips.push(Rect::new(0.0, 0.0, 10.0, 10.0));
        clips.push(Rect::new(5.0, 5.0, 10.0, 10.0));
        assert!(clips.pop().is_some());
        assert!(clips.pop().is_some());
        assert!(clips.is_empty());
        assert_eq!(clips.pop(), None);
        assert_eq!(clips.depth(), 0);
        assert_eq!(clips.current(), None);
    }

    #[test]
    fn test_disjoint_clip_admits_nothing() {
        let mut clips = ClipStack::new();
        assert!(clips.admits(&Rect::new(-1e6, -1e6, 1.0, 1.0)));
        clips.push(Rect::new(0.0, 0.0, 10.0, 10.0));
        clips.push(Rect::new(20.0, 20.0, 10.0, 10.0));
        assert!(!clips.admits(&Rect::new(0.0, 0.0, 100.0, 100.0)));
        clips.pop();
        assert!(clips.admits(&Rect::new(5.0, 5.0, 1.0, 1.0)));
    }
}
