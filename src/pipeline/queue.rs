//! Unbounded handoff of finished segments from capture to transcription.
//!
//! Capture must never wait on the transcriber, so the queue is unbounded
//! and pushes are non-blocking. The worker pops with a bounded timeout so
//! it can poll its shutdown condition.

use crate::pipeline::types::Segment;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use std::time::Duration;

/// FIFO queue of speech segments awaiting transcription.
#[derive(Clone)]
pub struct SegmentQueue {
    tx: Sender<Segment>,
    rx: Receiver<Segment>,
}

impl SegmentQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Enqueue a segment. Never blocks.
    pub fn push(&self, segment: Segment) {
        // Both ends live in this struct, so the channel cannot disconnect
        // while a queue handle exists.
        let _ = self.tx.send(segment);
    }

    /// Dequeue the oldest segment, waiting at most `timeout`.
    ///
    /// Returns `None` when the wait elapses without a segment arriving.
    pub fn pop(&self, timeout: Duration) -> Option<Segment> {
        match self.rx.recv_timeout(timeout) {
            Ok(segment) => Some(segment),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Number of segments currently waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for SegmentQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Instant, SystemTime};

    fn segment(tag: i16) -> Segment {
        Segment {
            samples: vec![tag; 480],
            frame_count: 1,
            captured_at: SystemTime::now(),
        }
    }

    #[test]
    fn pop_returns_pushed_segments_in_order() {
        let queue = SegmentQueue::new();
        queue.push(segment(1));
        queue.push(segment(2));
        queue.push(segment(3));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(Duration::from_millis(10)).unwrap().samples[0], 1);
        assert_eq!(queue.pop(Duration::from_millis(10)).unwrap().samples[0], 2);
        assert_eq!(queue.pop(Duration::from_millis(10)).unwrap().samples[0], 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_times_out_on_empty_queue() {
        let queue = SegmentQueue::new();

        let start = Instant::now();
        assert!(queue.pop(Duration::from_millis(30)).is_none());
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(30));
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn push_from_another_thread_wakes_pop() {
        let queue = SegmentQueue::new();
        let producer = queue.clone();

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            producer.push(segment(9));
        });

        let popped = queue.pop(Duration::from_secs(2));
        handle.join().unwrap();

        assert_eq!(popped.unwrap().samples[0], 9);
    }

    #[test]
    fn push_never_blocks() {
        let queue = SegmentQueue::new();
        // Far beyond any bounded buffer; completes immediately.
        for i in 0..10_000 {
            queue.push(segment((i % 100) as i16));
        }
        assert_eq!(queue.len(), 10_000);
    }
}
