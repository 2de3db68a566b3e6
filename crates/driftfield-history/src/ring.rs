//! Fixed-capacity ring buffer of [`FrameSnapshot`]s with a playback cursor.

use std::collections::VecDeque;

use crate::snapshot::FrameSnapshot;

/// Ring buffer capacity in frames.
pub const HISTORY_CAPACITY: usize = 100;

/// Ring buffer of recorded frames plus a cursor for read-only playback.
///
/// The cursor is either "live" (always tracking the most recently pushed
/// frame) or pinned to a specific recorded step ("playback"). Pushing new
/// frames never clears history or disturbs a pinned cursor; only
/// [`History::reset`] does.
#[derive(Clone, Debug)]
pub struct History {
    capacity: usize,
    buffer: VecDeque<FrameSnapshot>,
    /// `None` means "live head"; `Some(step)` pins playback to that step.
    cursor_step: Option<u64>,
}

impl Default for History {
    fn default() -> Self {
        History::new()
    }
}

impl History {
    /// An empty history with the default 100-frame capacity.
    pub fn new() -> Self {
        History::with_capacity(HISTORY_CAPACITY)
    }

    /// An empty history with a custom capacity (must be `>= 1`).
    pub fn with_capacity(capacity: usize) -> Self {
        History {
            capacity: capacity.max(1),
            buffer: VecDeque::new(),
            cursor_step: None,
        }
    }

    /// Append a newly computed snapshot, evicting the oldest frame if the
    /// buffer is at capacity. Does not disturb a pinned playback cursor.
    ///
    /// # Panics
    /// Panics if `snapshot.step` does not strictly exceed the previously
    /// pushed step, preserving the ascending-step invariant.
    pub fn push(&mut self, snapshot: FrameSnapshot) {
        if let Some(last) = self.buffer.back() {
            assert!(
                snapshot.step > last.step,
                "history steps must be strictly ascending"
            );
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(snapshot);
    }

    /// Discard all recorded frames and return the cursor to the live head.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor_step = None;
    }

    /// Number of frames currently retained.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether no frames have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether the cursor is pinned to a recorded frame rather than the
    /// live head.
    pub fn is_in_playback(&self) -> bool {
        self.cursor_step.is_some()
    }

    fn index_of(&self, step: u64) -> Option<usize> {
        self.buffer.iter().position(|f| f.step == step)
    }

    fn clamp_to_nearest(&self, step: u64) -> Option<usize> {
        if self.buffer.is_empty() {
            return None;
        }
        if let Some(idx) = self.index_of(step) {
            return Some(idx);
        }
        // History underflow/overflow on seek: clamp to the nearest valid
        // snapshot rather than erroring.
        let (mut best_idx, mut best_dist) = (0usize, u64::MAX);
        for (idx, frame) in self.buffer.iter().enumerate() {
            let dist = frame.step.abs_diff(step);
            if dist < best_dist {
                best_dist = dist;
                best_idx = idx;
            }
        }
        Some(best_idx)
    }

    /// The currently viewed frame: the pinned playback frame if in
    /// playback, otherwise the live head (most recently pushed frame).
    pub fn current(&self) -> Option<&FrameSnapshot> {
        match self.cursor_step {
            None => self.buffer.back(),
            Some(step) => self
                .clamp_to_nearest(step)
                .and_then(|idx| self.buffer.get(idx)),
        }
    }

    /// Move the cursor one frame toward the start of history, entering
    /// playback. A no-op at the oldest retained frame.
    pub fn step_backward(&mut self) {
        let Some(current_idx) = self.current_index() else {
            return;
        };
        let target = current_idx.saturating_sub(1);
        self.cursor_step = self.buffer.get(target).map(|f| f.step);
    }

    /// Move the cursor one frame toward the live head. Exits playback if
    /// this reaches the most recent frame.
    pub fn step_forward(&mut self) {
        let Some(current_idx) = self.current_index() else {
            return;
        };
        let last_idx = self.buffer.len().saturating_sub(1);
        if current_idx >= last_idx {
            self.cursor_step = None;
            return;
        }
        let target = current_idx + 1;
        if target == last_idx {
            self.cursor_step = None;
        } else {
            self.cursor_step = self.buffer.get(target).map(|f| f.step);
        }
    }

    /// Pin the cursor to the frame at buffer index `i` (`0` is the oldest
    /// retained frame), clamped into range, entering playback.
    pub fn seek_to_frame(&mut self, i: usize) {
        if self.buffer.is_empty() {
            return;
        }
        let clamped = i.min(self.buffer.len() - 1);
        self.cursor_step = self.buffer.get(clamped).map(|f| f.step);
    }

    /// Return the cursor to the live head.
    pub fn exit_playback(&mut self) {
        self.cursor_step = None;
    }

    fn current_index(&self) -> Option<usize> {
        match self.cursor_step {
            None => {
                if self.buffer.is_empty() {
                    None
                } else {
                    Some(self.buffer.len() - 1)
                }
            }
            Some(step) => self.clamp_to_nearest(step),
        }
    }

    /// Iterate all retained frames, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &FrameSnapshot> {
        self.buffer.iter()
    }
}
