// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-capacity FIFO ring with oldest-evicted-on-overflow semantics.
//!
//! Storage is allocated once at construction; `head` indexes the oldest
//! element and wraps modulo capacity. Not synchronized: the owning
//! [`Collector`](super::Collector) guards it with its mutex.

/// Bounded ring buffer that overwrites its oldest entry when full.
#[derive(Debug)]
pub(crate) struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty ring holding at most `capacity` entries.
    ///
    /// Callers validate `capacity >= 1`.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring capacity must be > 0");
        let slots = std::iter::repeat_with(|| None).take(capacity).collect();
        Self {
            slots,
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Append `item`, evicting and returning the oldest entry if full.
    pub(crate) fn push_overwrite(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() { self.pop() } else { None };
        let tail = (self.head + self.len) % self.slots.len();
        self.slots[tail] = Some(item);
        self.len += 1;
        evicted
    }

    /// Remove and return the oldest entry.
    pub(crate) fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        item
    }

    /// Drop every entry and rewind.
    pub(crate) fn clear(&mut self) {
        while self.pop().is_some() {}
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut ring = RingBuffer::with_capacity(3);
        assert!(ring.push_overwrite(1).is_none());
        assert!(ring.push_overwrite(2).is_none());
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), None);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_overwrite_evicts_oldest() {
        let mut ring = RingBuffer::with_capacity(3);
        for i in 0..3 {
            ring.push_overwrite(i);
        }
        assert!(ring.is_full());
        assert_eq!(ring.push_overwrite(3), Some(0));
        assert_eq!(ring.push_overwrite(4), Some(1));
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
        assert_eq!(ring.pop(), Some(4));
    }

    #[test]
    fn test_wraps_across_many_cycles() {
        let mut ring = RingBuffer::with_capacity(4);
        for round in 0..10 {
            for i in 0..6 {
                ring.push_overwrite(round * 10 + i);
            }
            let drained: Vec<_> = std::iter::from_fn(|| ring.pop()).collect();
            assert_eq!(drained, (2..6).map(|i| round * 10 + i).collect::<Vec<_>>());
        }
        assert_eq!(ring.capacity(), 4);
    }

    #[test]
    fn test_capacity_one() {
        let mut ring = RingBuffer::with_capacity(1);
        ring.push_overwrite('a');
        assert_eq!(ring.push_overwrite('b'), Some('a'));
        assert_eq!(ring.pop(), Some('b'));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_clear() {
        let mut ring = RingBuffer::with_capacity(2);
        ring.push_overwrite(1);
        ring.push_overwrite(2);
        ring.clear();
        assert!(ring.is_empty());
        ring.push_overwrite(3);
        assert_eq!(ring.pop(), Some(3));
    }
}
