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

//! Small memoization primitives used to avoid recomputing expensive board
//! queries and sub-walks.

use fxhash::FxHashMap;
use std::collections::VecDeque;
use std::hash::Hash;

/// A bounded least-recently-used cache.
///
/// Recency is updated only when a new key is *inserted*, not when an
/// existing key is looked up again on a cache hit. This is a deliberate,
/// preserved quirk (see `SPEC_FULL.md` Open Questions): a key that is read
/// often but never recomputed still ages out in insertion order.
pub struct LruMemo<K, V> {
    capacity: usize,
    order: VecDeque<K>,
    values: FxHashMap<K, V>,
}

impl<K: Eq + Hash + Clone, V: Clone> LruMemo<K, V> {
    /// Creates an empty memo holding at most `capacity` distinct keys.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LruMemo capacity must be at least 1");
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            values: FxHashMap::default(),
        }
    }

    /// Returns the cached value for `key`, computing and storing it via
    /// `compute` on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(v) = self.values.get(&key) {
            return v.clone();
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Looks up `key` without computing anything on a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        self.values.get(key).cloned()
    }

    /// Stores `value` under `key`, evicting the oldest inserted key if the
    /// memo is already at capacity.
    pub fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn insert(&mut self, key: K, value: V) {
        if self.values.len() >= self.capacity && !self.values.contains_key(&key) {
            if let Some(oldest) = self.order.pop_front() {
                self.values.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.values.insert(key, value);
    }

    /// Number of distinct keys currently held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A single-slot memo: remembers only the most recent `(key, value)` pair.
///
/// Useful for eliding repeated identical calls within one evaluation (e.g.
/// successive `hash(board)` calls against the same board).
pub struct LastMemo<K, V> {
    slot: Option<(K, V)>,
}

impl<K, V> Default for LastMemo<K, V> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<K: PartialEq + Clone, V: Clone> LastMemo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value if `key` matches the last stored key,
    /// otherwise recomputes, stores, and returns the new value.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some((k, v)) = &self.slot {
            if *k == key {
                return v.clone();
            }
        }
        let value = compute();
        self.slot = Some((key, value.clone()));
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    // by default, it is empty
    #[test]
    fn by_default_it_is_empty() {
        let memo: LruMemo<i32, i32> = LruMemo::new(3);
        assert!(memo.is_empty());
    }

    // when the same key is requested twice, the compute closure runs once
    #[test]
    fn when_the_same_key_is_requested_twice_compute_runs_once() {
        let mut memo = LruMemo::new(3);
        let calls = Cell::new(0);
        let v1 = memo.get_or_insert_with(1, || {
            calls.set(calls.get() + 1);
            "one"
        });
        let v2 = memo.get_or_insert_with(1, || {
            calls.set(calls.get() + 1);
            "one"
        });
        assert_eq!(v1, "one");
        assert_eq!(v2, "one");
        assert_eq!(calls.get(), 1);
    }

    // when capacity is exceeded, the oldest inserted key is evicted
    #[test]
    fn when_capacity_is_exceeded_the_oldest_inserted_key_is_evicted() {
        let mut memo = LruMemo::new(2);
        memo.get_or_insert_with(1, || "a");
        memo.get_or_insert_with(2, || "b");
        memo.get_or_insert_with(3, || "c");
        assert_eq!(memo.len(), 2);

        let calls = Cell::new(0);
        memo.get_or_insert_with(1, || {
            calls.set(calls.get() + 1);
            "a-again"
        });
        assert_eq!(calls.get(), 1, "key 1 should have been evicted and recomputed");
    }

    // reading a key does not refresh its recency, only insertion does
    #[test]
    fn reading_a_key_does_not_refresh_its_recency() {
        let mut memo = LruMemo::new(2);
        memo.get_or_insert_with(1, || "a");
        memo.get_or_insert_with(2, || "b");
        // re-read key 1 repeatedly; this must not protect it from eviction
        for _ in 0..5 {
            memo.get_or_insert_with(1, || "a");
        }
        memo.get_or_insert_with(3, || "c");

        let calls = Cell::new(0);
        memo.get_or_insert_with(1, || {
            calls.set(calls.get() + 1);
            "a-again"
        });
        assert_eq!(calls.get(), 1, "insertion order, not read order, drives eviction");
    }

    // last memo returns the cached value only for the exact same key
    #[test]
    fn last_memo_returns_the_cached_value_only_for_the_exact_same_key() {
        let mut memo = LastMemo::new();
        let calls = Cell::new(0);
        let a = memo.get_or_insert_with("x".to_string(), || {
            calls.set(calls.get() + 1);
            1
        });
        let b = memo.get_or_insert_with("x".to_string(), || {
            calls.set(calls.get() + 1);
            1
        });
        let c = memo.get_or_insert_with("y".to_string(), || {
            calls.set(calls.get() + 1);
            2
        });
        assert_eq!((a, b, c), (1, 1, 2));
        assert_eq!(calls.get(), 2);
    }
}
