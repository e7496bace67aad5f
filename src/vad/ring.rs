//! Fixed-capacity ring of recently classified frames.
//!
//! The segmenter keeps the last N (frame, decision) pairs here: in the
//! unvoiced state the ring is the lead-in that seeds an utterance, in the
//! voiced state it is the offset-confirmation window. Voiced counts are
//! maintained incrementally so threshold checks are O(1).

use crate::audio::frame::Frame;

/// A circular buffer of `(Frame, is_speech)` pairs with fixed capacity.
///
/// Pushing onto a full ring evicts the oldest entry. `drain` yields the
/// stored frames oldest-first.
pub struct FrameRing {
    slots: Vec<Option<(Frame, bool)>>,
    head: usize,
    len: usize,
    voiced: usize,
}

impl FrameRing {
    /// Creates an empty ring holding at most `capacity` frames.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be nonzero");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            len: 0,
            voiced: 0,
        }
    }

    /// Appends a classified frame, evicting the oldest when full.
    pub fn push(&mut self, frame: Frame, is_speech: bool) {
        let capacity = self.slots.len();
        let tail = (self.head + self.len) % capacity;

        if self.len == capacity {
            // Overwrite the oldest slot at head.
            if let Some((_, was_speech)) = self.slots[self.head].take() {
                if was_speech {
                    self.voiced -= 1;
                }
            }
            self.head = (self.head + 1) % capacity;
            self.len -= 1;
        }

        self.slots[tail] = Some((frame, is_speech));
        self.len += 1;
        if is_speech {
            self.voiced += 1;
        }
    }

    /// Number of voiced frames currently stored.
    pub fn voiced(&self) -> usize {
        self.voiced
    }

    /// Number of unvoiced frames currently stored.
    pub fn unvoiced(&self) -> usize {
        self.len - self.voiced
    }

    /// Number of frames currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of frames the ring holds.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Removes and returns all stored frames, oldest first.
    pub fn drain(&mut self) -> Vec<Frame> {
        let capacity = self.slots.len();
        let mut frames = Vec::with_capacity(self.len);
        for offset in 0..self.len {
            let index = (self.head + offset) % capacity;
            if let Some((frame, _)) = self.slots[index].take() {
                frames.push(frame);
            }
        }
        self.head = 0;
        self.len = 0;
        self.voiced = 0;
        frames
    }

    /// Discards all stored frames.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
        self.voiced = 0;
    }
}
