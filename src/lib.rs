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

//! # flood-it-solver
//!
//! A generic A* search engine and a composed heuristic for solving the
//! Flood-It puzzle: on each turn the player recolors the region connected
//! to the top-left cell, absorbing adjacent cells of the new color, until
//! the whole board shares one color. The goal is to find a short — ideally
//! minimal — sequence of moves.
//!
//! ## Layout
//!
//! - [`heap`] — a hand-rolled binary min-heap tolerant of stale/duplicate
//!   keys, backing both of the below.
//! - [`memo`] — a bounded LRU memo and a single-slot memo, used to avoid
//!   recomputing expensive, immutable board queries.
//! - [`board`] — the packed-byte [`board::Board`] and every pure query over
//!   it: flood fill, perimeter analysis, blobification, distances.
//! - [`greedy`] — a generic best-neighbor walker with an optional
//!   memoized sub-walk cache and one-ply lookahead.
//! - [`navmesh`] — a single-source shortest-path mesh (Dijkstra) over an
//!   arbitrary graph, queried repeatedly after a single precomputation.
//! - [`astar`] — the generic A* engine itself, blocking or cooperative.
//! - [`solver`] — the Flood-It-specific heuristics (admissible and
//!   weighted) and the [`solver::solve_board`] entry point that ties
//!   everything above together.
//! - [`error`] — [`error::FloodError`], the one error enum every fallible
//!   operation in this crate returns.
//!
//! ## Quick example
//!
//! ```
//! use flood_it_solver::board::Board;
//! use flood_it_solver::solver::{solve_board, SolveOptions};
//! use std::str::FromStr;
//!
//! let board = Board::from_str("0012\n0223\n1332\n1144").unwrap();
//! let path = solve_board(board, SolveOptions::default()).unwrap();
//! assert_eq!(path.last().unwrap().get_colors().len(), 1);
//! ```

pub mod astar;
pub mod board;
pub mod error;
pub mod greedy;
pub mod heap;
pub mod memo;
pub mod navmesh;
pub mod solver;

pub use board::Board;
pub use error::FloodError;
