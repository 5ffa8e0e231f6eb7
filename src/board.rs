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

//! The Flood-It board model: a packed square grid of color bytes and every
//! pure query used by the solver (flood fill, perimeter analysis,
//! blobification, distances).
//!
//! A [`Board`] is a value type. Every transformation returns a new `Board`;
//! nothing here mutates its receiver. A handful of read-only per-instance
//! caches (hash, color set, perimeter at a given position) are kept behind
//! a `RefCell` purely as an implementation detail — callers never observe
//! mutation.

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use fxhash::{FxHashMap, FxHashSet};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::FloodError;
use crate::memo::LruMemo;

/// Capacity of [`Board::blob_size`]'s per-instance LRU memo.
const BLOB_SIZE_CACHE_CAPACITY: usize = 100;

struct BoardCache {
    hash: Option<String>,
    colors: Option<Vec<u8>>,
    perimeter_blocks: Option<(usize, Vec<usize>)>,
    blob_size: LruMemo<(String, usize), usize>,
}

impl Default for BoardCache {
    fn default() -> Self {
        BoardCache {
            hash: None,
            colors: None,
            perimeter_blocks: None,
            blob_size: LruMemo::new(BLOB_SIZE_CACHE_CAPACITY),
        }
    }
}

/// A square grid of color labels, stored as one byte per cell in row-major
/// order (`position = x + y * size`).
pub struct Board {
    cells: Vec<u8>,
    cache: RefCell<BoardCache>,
}

impl Board {
    /// Wraps a raw byte buffer as a board.
    ///
    /// # Errors
    /// Fails with [`FloodError::InvalidBoardString`] if `cells.len()` is not
    /// a positive perfect square.
    pub fn from_bytes(cells: Vec<u8>) -> Result<Board, FloodError> {
        let len = cells.len();
        let size = (len as f64).sqrt().round() as usize;
        if size == 0 || size * size != len {
            return Err(FloodError::InvalidBoardString { digit_count: len });
        }
        Ok(Board { cells, cache: RefCell::new(BoardCache::default()) })
    }

    /// The raw backing buffer, one byte per cell, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Side length of the square grid.
    pub fn size(&self) -> usize {
        (self.cells.len() as f64).sqrt().round() as usize
    }

    /// Row-major index of `(x, y)`.
    pub fn position(&self, x: usize, y: usize) -> usize {
        x + y * self.size()
    }

    /// A collision-free string fingerprint of this board's byte sequence:
    /// character `i` carries the Unicode scalar value `cells[i] as u32`
    /// (every byte is a valid Latin-1 code point), so two boards of equal
    /// length hash equal iff their bytes are equal.
    pub fn hash(&self) -> String {
        {
            let cache = self.cache.borrow();
            if let Some(h) = &cache.hash {
                return h.clone();
            }
        }
        let h: String = self.cells.iter().map(|&b| char::from(b)).collect();
        self.cache.borrow_mut().hash = Some(h.clone());
        h
    }

    /// Deduplicated colors present on the board, in first-seen order.
    pub fn get_colors(&self) -> Vec<u8> {
        {
            let cache = self.cache.borrow();
            if let Some(c) = &cache.colors {
                return c.clone();
            }
        }
        let mut seen = FxHashSet::default();
        let mut colors = Vec::new();
        for &b in &self.cells {
            if seen.insert(b) {
                colors.push(b);
            }
        }
        self.cache.borrow_mut().colors = Some(colors.clone());
        colors
    }

    /// Up to four 4-connected neighbors of `p` (fewer on an edge or corner).
    pub fn adjacent_positions(&self, p: usize) -> Vec<usize> {
        let n = self.size();
        let x = p % n;
        let y = p / n;
        let mut result = Vec::with_capacity(4);
        if x > 0 {
            result.push(p - 1);
        }
        if x + 1 < n {
            result.push(p + 1);
        }
        if y > 0 {
            result.push(p - n);
        }
        if y + 1 < n {
            result.push(p + n);
        }
        result
    }

    /// Every position 4-connected to `p` that shares `p`'s color, found by
    /// an iterative flood fill (explicit stack, no recursion).
    pub fn blob_positions(&self, p: usize) -> Vec<usize> {
        let color = self.cells[p];
        let mut visited = FxHashSet::default();
        let mut stack = vec![p];
        visited.insert(p);
        let mut result = Vec::new();
        while let Some(cur) = stack.pop() {
            result.push(cur);
            for n in self.adjacent_positions(cur) {
                if self.cells[n] == color && visited.insert(n) {
                    stack.push(n);
                }
            }
        }
        result
    }

    /// Size of the blob anchored at `p`, memoized by `(hash(self), p)` in a
    /// 100-entry LRU (see `SPEC_FULL.md` §4.3/§9): keying on the board's own
    /// hash rather than just `p` keeps the cache correct if this `Board`
    /// value is ever compared against stale entries carried over from
    /// another instance sharing the same cache.
    pub fn blob_size(&self, p: usize) -> usize {
        let key = (self.hash(), p);
        if let Some(cached) = self.cache.borrow().blob_size.get(&key) {
            return cached;
        }
        let size = self.blob_positions(p).len();
        self.cache.borrow_mut().blob_size.put(key, size);
        size
    }

    /// True iff no cell outside the blob at `p` carries `p`'s color.
    pub fn blob_is_whole(&self, p: usize) -> bool {
        let color = self.cells[p];
        let blob: FxHashSet<usize> = self.blob_positions(p).into_iter().collect();
        self.cells.iter().enumerate().all(|(i, &c)| c != color || blob.contains(&i))
    }

    /// Returns a new board identical to this one except that the blob
    /// anchored at position 0 has been recolored to `c`. Does not mutate
    /// `self`.
    ///
    /// ```
    /// use flood_it_solver::board::Board;
    /// let b = Board::from_bytes(vec![0, 0, 1, 0, 2, 0, 3, 3, 3]).unwrap();
    /// let played = b.play_color(2);
    /// assert_eq!(played.as_bytes()[0], 2);
    /// ```
    pub fn play_color(&self, c: u8) -> Board {
        if self.cells[0] == c {
            return self.clone();
        }
        let blob = self.blob_positions(0);
        let mut cells = self.cells.clone();
        for p in blob {
            cells[p] = c;
        }
        Board { cells, cache: RefCell::new(BoardCache::default()) }
    }

    /// One successor board per distinct color on the top-left blob's
    /// perimeter. If any successor makes the top-left blob whole (fully
    /// absorbs a color), that single board is returned on its own — once a
    /// color is gone there is never a reason to consider the others.
    pub fn neighbor_boards(&self) -> Vec<Board> {
        let colors = self.perimeter_colors(0);
        let boards: Vec<Board> = colors.into_iter().map(|c| self.play_color(c)).collect();
        if let Some(whole) = boards.iter().find(|b| b.blob_is_whole(0)) {
            return vec![whole.clone()];
        }
        boards
    }

    /// Manhattan distance between two positions.
    pub fn distance(&self, a: usize, b: usize) -> usize {
        let n = self.size();
        let (ax, ay) = (a % n, a / n);
        let (bx, by) = (b % n, b / n);
        ax.abs_diff(bx) + ay.abs_diff(by)
    }

    /// Minimum Manhattan distance between any cell of the blob at `a` and
    /// any cell of the blob at `q`; zero when `a` and `q` share a blob.
    pub fn blob_distance(&self, a: usize, q: usize) -> usize {
        let blob_a = self.blob_positions(a);
        let blob_q = self.blob_positions(q);
        blob_a
            .iter()
            .flat_map(|&x| blob_q.iter().map(move |&y| self.distance(x, y)))
            .min()
            .unwrap_or(0)
    }

    /// Deduplicated positions adjacent to the blob at `p` but outside it.
    pub fn perimeter_blocks(&self, p: usize) -> Vec<usize> {
        {
            let cache = self.cache.borrow();
            if let Some((cached_p, blocks)) = &cache.perimeter_blocks {
                if *cached_p == p {
                    return blocks.clone();
                }
            }
        }
        let color = self.cells[p];
        let blob = self.blob_positions(p);
        let mut seen = FxHashSet::default();
        let mut result = Vec::new();
        for &b in &blob {
            for adj in self.adjacent_positions(b) {
                if self.cells[adj] != color && seen.insert(adj) {
                    result.push(adj);
                }
            }
        }
        self.cache.borrow_mut().perimeter_blocks = Some((p, result.clone()));
        result
    }

    /// Number of perimeter blocks around the blob at `p`.
    pub fn perimeter(&self, p: usize) -> usize {
        self.perimeter_blocks(p).len()
    }

    /// Distinct colors found among the perimeter blocks of the blob at `p`.
    pub fn perimeter_colors(&self, p: usize) -> Vec<u8> {
        let mut seen = FxHashSet::default();
        let mut colors = Vec::new();
        for block in self.perimeter_blocks(p) {
            let c = self.cells[block];
            if seen.insert(c) {
                colors.push(c);
            }
        }
        colors
    }

    /// Distinct blob identifiers found among the perimeter blocks of the
    /// blob at `p`.
    pub fn perimeter_blobs(&self, p: usize) -> Vec<u16> {
        let blobified = self.blobified_board();
        let mut seen = FxHashSet::default();
        let mut ids = Vec::new();
        for block in self.perimeter_blocks(p) {
            let id = blobified[block];
            if seen.insert(id) {
                ids.push(id);
            }
        }
        ids
    }

    /// A same-shaped buffer of 1-based blob identifiers: every cell in a
    /// maximal connected region shares one identifier.
    pub fn blobified_board(&self) -> Vec<u16> {
        let len = self.cells.len();
        let mut labels = vec![0u16; len];
        let mut next_id: u16 = 1;
        for start in 0..len {
            if labels[start] != 0 {
                continue;
            }
            let color = self.cells[start];
            let mut stack = vec![start];
            labels[start] = next_id;
            while let Some(cur) = stack.pop() {
                for n in self.adjacent_positions(cur) {
                    if labels[n] == 0 && self.cells[n] == color {
                        labels[n] = next_id;
                        stack.push(n);
                    }
                }
            }
            next_id += 1;
        }
        labels
    }

    /// For each color present, how many distinct blobs carry it.
    pub fn blob_counts(&self) -> FxHashMap<u8, usize> {
        let blobified = self.blobified_board();
        let mut seen_blobs: FxHashSet<u16> = FxHashSet::default();
        let mut counts: FxHashMap<u8, usize> = FxHashMap::default();
        for (i, &id) in blobified.iter().enumerate() {
            if seen_blobs.insert(id) {
                *counts.entry(self.cells[i]).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Total number of distinct blobs on the board.
    pub fn net_blob_count(&self) -> usize {
        self.blob_counts().values().sum()
    }

    /// True iff every color in `colors` is split across at least two
    /// blobs.
    pub fn colors_segmented(&self, colors: &[u8]) -> bool {
        let counts = self.blob_counts();
        colors.iter().all(|c| counts.get(c).copied().unwrap_or(0) >= 2)
    }

    /// [`colors_segmented`](Self::colors_segmented) over every color
    /// currently on the board.
    pub fn all_blobs_segmented(&self) -> bool {
        let colors = self.get_colors();
        self.colors_segmented(&colors)
    }
}

impl Clone for Board {
    fn clone(&self) -> Self {
        Board { cells: self.cells.clone(), cache: RefCell::new(BoardCache::default()) }
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}
impl Eq for Board {}

impl std::hash::Hash for Board {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.cells.hash(state);
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board").field("size", &self.size()).field("cells", &self.cells).finish()
    }
}

impl fmt::Display for Board {
    /// Renders the board as `size` lines of `size` decimal digits each,
    /// separated by `\n`, with no trailing newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size();
        for y in 0..n {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..n {
                write!(f, "{}", self.cells[self.position(x, y)])?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = FloodError;

    /// Strips every non-digit character from `s` and interprets each
    /// remaining digit as a single-digit color.
    ///
    /// ```
    /// use flood_it_solver::board::Board;
    /// use std::str::FromStr;
    /// let b = Board::from_str("01\n23").unwrap();
    /// assert_eq!(b.as_bytes(), &[0, 1, 2, 3]);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cells: Vec<u8> = s.chars().filter_map(|c| c.to_digit(10)).map(|d| d as u8).collect();
        Board::from_bytes(cells)
    }
}

/// Parameters for [`random_board`].
#[derive(Debug, Clone, Copy)]
pub struct RandomBoardOptions {
    pub size: usize,
    pub color_count: usize,
}

/// Builds a random `size x size` board using `color_count` colors.
///
/// Every color `0..color_count` is guaranteed to appear at least once (the
/// first `color_count` cells are seeded one-per-color before shuffling).
/// The remaining cells are filled uniformly from `0..=color_count`
/// inclusive — note the inclusive upper bound, which can occasionally
/// place one color more than `color_count` on the board. This is a
/// preserved quirk, not a bug; see `SPEC_FULL.md`.
///
/// # Errors
/// Fails with [`FloodError::BoardTooSmall`] when `size * size < color_count`.
pub fn random_board(opts: RandomBoardOptions) -> Result<Board, FloodError> {
    let RandomBoardOptions { size, color_count } = opts;
    let length = size * size;
    if length < color_count {
        return Err(FloodError::BoardTooSmall { size, color_count });
    }
    let mut rng = rand::thread_rng();
    let mut cells = vec![0u8; length];
    for (i, cell) in cells.iter_mut().enumerate().take(color_count) {
        *cell = i as u8;
    }
    for cell in cells.iter_mut().skip(color_count) {
        *cell = rng.gen_range(0..=color_count) as u8;
    }
    cells.shuffle(&mut rng);
    Board::from_bytes(cells)
}
