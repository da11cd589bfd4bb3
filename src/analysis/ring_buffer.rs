// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/imucal

//! Fixed-capacity ring buffer over a flat array

/// Ring buffer keeping the last `capacity` values pushed into it.
///
/// Storage is allocated once; pushing into a full buffer overwrites the oldest
/// entry.
#[derive(Debug, Clone)]
pub struct RingBuffer<T: Copy + Default> {
    data: Vec<T>,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// `capacity` must be non-zero; callers validate it.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![T::default(); capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// Push a value, returning the evicted one when the buffer was full
    pub fn push(&mut self, value: T) -> Option<T> {
        let capacity = self.data.len();
        if self.len < capacity {
            let index = (self.head + self.len) % capacity;
            self.data[index] = value;
            self.len += 1;
            None
        } else {
            let evicted = self.data[self.head];
            self.data[self.head] = value;
            self.head = (self.head + 1) % capacity;
            Some(evicted)
        }
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let capacity = self.data.len();
        (0..self.len).map(move |i| self.data[(self.head + i) % capacity])
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_and_evict() {
        let mut ring = RingBuffer::<i32>::new(3);
        assert!(ring.is_empty());
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.push(3), None);
        assert!(ring.is_full());

        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut ring = RingBuffer::<f64>::new(4);
        for i in 0..10 {
            ring.push(i as f64);
        }
        ring.clear();
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.iter().next(), None);
        ring.push(7.0);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![7.0]);
    }
}
