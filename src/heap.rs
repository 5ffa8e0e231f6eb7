// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! A hand-rolled binary min-heap of `(f32, value)` pairs.
//!
//! Unlike `std::collections::BinaryHeap` or an off-the-shelf priority queue
//! crate, this heap is content to hold several entries for the same logical
//! key at once. Both the A* engine and the navigation mesh builder re-push a
//! node whenever they find a cheaper way to reach it, and let a stale pop
//! (one whose key no longer matches the caller's own bookkeeping) simply be
//! discarded rather than trying to decrease-key in place.

use crate::error::FloodError;

struct Entry<V> {
    key: f32,
    value: V,
}

/// A binary min-heap over `(f32, V)` pairs. Duplicate keys are allowed;
/// ties are broken arbitrarily (by heap shape), which is fine for every
/// consumer in this crate.
pub struct MinHeap<V> {
    entries: Vec<Entry<V>>,
}

impl<V> Default for MinHeap<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> MinHeap<V> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently in the heap.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the heap holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `value` keyed by `key`, maintaining the heap property.
    pub fn put(&mut self, key: f32, value: V) {
        self.entries.push(Entry { key, value });
        self.sift_up(self.entries.len() - 1);
    }

    /// Removes and returns the pair with the smallest key.
    ///
    /// # Errors
    /// Returns [`FloodError::EmptyHeap`] when the heap holds no entries.
    pub fn pop_pair(&mut self) -> Result<(f32, V), FloodError> {
        if self.entries.is_empty() {
            return Err(FloodError::EmptyHeap);
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let popped = self.entries.pop().unwrap();
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Ok((popped.key, popped.value))
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.entries[i].key < self.entries[parent].key {
                self.entries.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;
            if left < len && self.entries[left].key < self.entries[smallest].key {
                smallest = left;
            }
            if right < len && self.entries[right].key < self.entries[smallest].key {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.entries.swap(i, smallest);
            i = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // by default, it is empty
    #[test]
    fn by_default_it_is_empty() {
        let heap: MinHeap<char> = MinHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);
    }

    // when i push an entry, the length increases
    #[test]
    fn when_i_push_an_entry_the_length_increases() {
        let mut heap = MinHeap::new();
        heap.put(1.0, 'a');
        assert_eq!(heap.len(), 1);
        assert!(!heap.is_empty());
    }

    // when i pop from an empty heap, i get the empty heap error
    #[test]
    fn when_i_pop_from_an_empty_heap_i_get_the_empty_heap_error() {
        let mut heap: MinHeap<char> = MinHeap::new();
        assert_eq!(heap.pop_pair(), Err(FloodError::EmptyHeap));
    }

    // when i pop, i always get the smallest key first
    #[test]
    fn when_i_pop_i_always_get_the_smallest_key_first() {
        let mut heap = MinHeap::new();
        heap.put(5.0, 'e');
        heap.put(1.0, 'a');
        heap.put(4.0, 'd');
        heap.put(2.0, 'b');
        heap.put(3.0, 'c');

        assert_eq!(heap.pop_pair().unwrap(), (1.0, 'a'));
        assert_eq!(heap.pop_pair().unwrap(), (2.0, 'b'));
        assert_eq!(heap.pop_pair().unwrap(), (3.0, 'c'));
        assert_eq!(heap.pop_pair().unwrap(), (4.0, 'd'));
        assert_eq!(heap.pop_pair().unwrap(), (5.0, 'e'));
        assert!(heap.is_empty());
    }

    // duplicate keys are tolerated and both survive a pop
    #[test]
    fn duplicate_keys_are_tolerated() {
        let mut heap = MinHeap::new();
        heap.put(1.0, "first");
        heap.put(1.0, "second");
        assert_eq!(heap.len(), 2);
        let (k1, _) = heap.pop_pair().unwrap();
        let (k2, _) = heap.pop_pair().unwrap();
        assert_eq!(k1, 1.0);
        assert_eq!(k2, 1.0);
    }

    // popping every entry drains the heap
    #[test]
    fn popping_every_entry_drains_the_heap() {
        let mut heap = MinHeap::new();
        for i in 0..50 {
            heap.put(i as f32, i);
        }
        let mut last = -1.0;
        while let Ok((k, _)) = heap.pop_pair() {
            assert!(k >= last);
            last = k;
        }
        assert!(heap.is_empty());
    }
}
