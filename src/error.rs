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

//! Error types surfaced by every fallible entry point of this crate.

use thiserror::Error;

/// Everything that can go wrong while building a board, searching a graph,
/// or popping from an empty heap.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FloodError {
    /// Requested a random board whose grid has fewer cells than colors, so
    /// not every color could be seeded at least once.
    #[error("board of size {size}x{size} is too small to hold {color_count} colors")]
    BoardTooSmall { size: usize, color_count: usize },

    /// A\* (or the greedy walker) exhausted its open set without reaching a
    /// terminal node.
    #[error("no path found")]
    NoPathFound,

    /// Popped from a min-heap that held no entries. Indicates a caller bug:
    /// every legitimate search path checks `is_empty` or matches on the
    /// open set before popping again.
    #[error("pop from an empty heap")]
    EmptyHeap,

    /// `Board::from_str` received a digit count that is not a perfect square.
    #[error("board string has {digit_count} digits, which is not a perfect square")]
    InvalidBoardString { digit_count: usize },
}
