//! Fixed-capacity trace ring.
//!
//! When the sink cannot keep up, newer records overwrite older ones. Every
//! stored record carries a wrapping sequence number so the consumer can spot
//! gaps.

use heapless::Deque;

use super::{TraceRecord, Tracer};

/// A record plus the sequence number it was stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Stamped {
    pub seq: u8,
    pub record: TraceRecord,
}

/// Ring of the last `N` records.
#[derive(Debug)]
pub struct TraceBuffer<const N: usize> {
    ring: Deque<Stamped, N>,
    seq: u8,
    dropped: usize,
}

impl<const N: usize> Default for TraceBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TraceBuffer<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: Deque::new(),
            seq: 0,
            dropped: 0,
        }
    }

    /// Oldest record still held.
    pub fn pop(&mut self) -> Option<Stamped> {
        self.ring.pop_front()
    }

    /// Hand every held record to `sink`, oldest first.
    pub fn drain(&mut self, mut sink: impl FnMut(Stamped)) -> usize {
        let mut n = 0;
        while let Some(stamped) = self.ring.pop_front() {
            sink(stamped);
            n += 1;
        }
        n
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stamped> {
        self.ring.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Records overwritten before anyone read them.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Forget every held record and restart the sequence.
    pub fn clear(&mut self) {
        self.ring.clear();
        self.seq = 0;
        self.dropped = 0;
    }
}

impl<const N: usize> Tracer for TraceBuffer<N> {
    fn record(&mut self, record: &TraceRecord) {
        if N == 0 {
            self.dropped += 1;
            return;
        }
        self.seq = self.seq.wrapping_add(1);
        if self.ring.is_full() {
            let _ = self.ring.pop_front();
            self.dropped += 1;
        }
        let stamped = Stamped {
            seq: self.seq,
            record: *record,
        };
        // cannot fail, a slot was freed above
        let _ = self.ring.push_back(stamped);
    }
}
