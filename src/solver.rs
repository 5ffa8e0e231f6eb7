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

//! Ties the navigation mesh ([`crate::navmesh`]), the board model
//! ([`crate::board`]) and the A* engine ([`crate::astar`]) together into the
//! Flood-It heuristics and the top-level [`solve_board`] entry point.
//!
//! The admissible heuristic precomputes, once per `start` board, three
//! navigation meshes over the *blob graph* (nodes are blob identifiers from
//! [`Board::blobified_board`], edges connect blobs that touch) rooted at
//! each of the three "hard" corners. Because only the blob anchored at
//! position 0 ever changes shape as the game is played, every blob id and
//! edge away from it stays valid for the whole search: querying the
//! heuristic on a later board reuses the *start* board's blob labelling for
//! any position the growing blob at 0 has not yet swallowed.

use std::rc::Rc;

use fxhash::{FxHashMap, FxHashSet};

use crate::astar::{a_star, AStarOptions, CooperativeSearch, Driver};
use crate::board::Board;
use crate::error::FloodError;
use crate::greedy::{greedy, greedy_memoized, GreedyOptions};
use crate::memo::LruMemo;
use crate::navmesh::NavMesh;

/// Precomputed lower-bound machinery for one `start` board: one navigation
/// mesh per hard corner, all built over the blob graph implied by `start`.
pub struct AdmissibleHeuristic {
    targets: [usize; 3],
    meshes: [NavMesh<u16>; 3],
    start_blobified: Vec<u16>,
    blob_color: FxHashMap<u16, u8>,
}

impl AdmissibleHeuristic {
    /// Builds the three corner meshes from `start`'s blob structure.
    pub fn build(start: &Board) -> Self {
        let size = start.size();
        let targets = [size - 1, size * (size - 1), size * size - 1];

        let start_blobified = start.blobified_board();
        let mut adjacency: FxHashMap<u16, FxHashSet<u16>> = FxHashMap::default();
        let mut blob_color: FxHashMap<u16, u8> = FxHashMap::default();
        for p in 0..start_blobified.len() {
            let id = start_blobified[p];
            blob_color.entry(id).or_insert_with(|| start.as_bytes()[p]);
            for n in start.adjacent_positions(p) {
                let other = start_blobified[n];
                if other != id {
                    adjacency.entry(id).or_default().insert(other);
                }
            }
        }

        let target_blobs = [
            start_blobified[targets[0]],
            start_blobified[targets[1]],
            start_blobified[targets[2]],
        ];

        let neighbors_of = |adjacency: &FxHashMap<u16, FxHashSet<u16>>, id: &u16| -> Vec<u16> {
            adjacency.get(id).map(|set| set.iter().copied().collect()).unwrap_or_default()
        };

        let meshes = [
            NavMesh::build(target_blobs[0], |id: &u16| neighbors_of(&adjacency, id), |_, _| 1.0),
            NavMesh::build(target_blobs[1], |id: &u16| neighbors_of(&adjacency, id), |_, _| 1.0),
            NavMesh::build(target_blobs[2], |id: &u16| neighbors_of(&adjacency, id), |_, _| 1.0),
        ];

        AdmissibleHeuristic { targets, meshes, start_blobified, blob_color }
    }

    /// Colors reachable from `path` (a sequence of blob ids) or, when the
    /// top-left blob is whole, already settled as `board`'s current color.
    fn unhandled_colors(&self, path: &[u16], colors: &[u8], settled_color: Option<u8>) -> usize {
        let path_colors: FxHashSet<u8> = path.iter().filter_map(|id| self.blob_color.get(id).copied()).collect();
        colors
            .iter()
            .filter(|&&c| !path_colors.contains(&c) && settled_color != Some(c))
            .count()
    }

    /// The admissible lower bound on the number of moves remaining to
    /// uniform `board`, never exceeding the true remaining cost.
    ///
    /// `baseline` charges one move per remaining color, minus one if the
    /// top-left blob is already whole: each move can eliminate at most one
    /// color globally, so this is a true lower bound on its own. A color
    /// split across several disjoint blobs can still be cleared in a single
    /// move once its blobs become mutually adjacent through an unrelated
    /// flood, so no extra per-segmented-color charge is added here — doing
    /// so would overestimate the true remaining cost on boards where a
    /// single flood merges more than one blob of that color at once.
    pub fn evaluate(&self, board: &Board) -> f32 {
        let colors = board.get_colors();
        let whole = board.blob_is_whole(0);
        let settled_color = whole.then(|| board.as_bytes()[0]);

        let perimeter = board.perimeter_blocks(0);
        if perimeter.is_empty() {
            return 0.0;
        }

        let baseline = colors.len() as f32 - if whole { 1.0 } else { 0.0 };

        let test_from: FxHashSet<u16> = perimeter.iter().map(|&p| self.start_blobified[p]).collect();
        let top_left: FxHashSet<usize> = board.blob_positions(0).into_iter().collect();

        let mut longest = 0.0f32;
        for i in 0..3 {
            if top_left.contains(&self.targets[i]) {
                continue;
            }
            let mut best: Option<f32> = None;
            for &f in &test_from {
                if let Some(path) = self.meshes[i].path_to(&f) {
                    let unhandled = self.unhandled_colors(&path, &colors, settled_color);
                    let value = path.len() as f32 + 1.0 + unhandled as f32;
                    if best.map(|b| value < b).unwrap_or(true) {
                        best = Some(value);
                    }
                }
            }
            if let Some(v) = best {
                longest = longest.max(v);
            }
        }

        baseline.max(longest)
    }

    /// Shortest blob-graph distance from `target`'s hard corner down to
    /// `position`'s blob, using `start`'s (fixed) blob labelling.
    fn corner_distance(&self, target_index: usize, position: usize) -> Option<f32> {
        let blob = self.start_blobified[position];
        self.meshes[target_index].distance_to(&blob)
    }

    /// Minimum distance from the `target_index`-th hard corner to any blob
    /// currently on `board`'s top-left perimeter, or `0.0` once that corner
    /// is already inside the top-left blob.
    fn corner_distance_from_board(&self, target_index: usize, board: &Board) -> f32 {
        if board.blob_positions(0).contains(&self.targets[target_index]) {
            return 0.0;
        }
        board
            .perimeter_blocks(0)
            .iter()
            .filter_map(|&p| self.corner_distance(target_index, p))
            .fold(f32::INFINITY, f32::min)
    }
}

/// A raw distance oracle over the blob graph rooted at `target`, exposed
/// for callers (e.g. a move-hint overlay) that want a position-to-position
/// lower bound without paying for a full solve.
pub fn position_mesh(start: &Board, target: usize) -> NavMesh<u16> {
    let blobified = start.blobified_board();
    let mut adjacency: FxHashMap<u16, FxHashSet<u16>> = FxHashMap::default();
    for p in 0..blobified.len() {
        for n in start.adjacent_positions(p) {
            if blobified[p] != blobified[n] {
                adjacency.entry(blobified[p]).or_default().insert(blobified[n]);
            }
        }
    }
    let source = blobified[target];
    NavMesh::build(
        source,
        move |id: &u16| adjacency.get(id).map(|set| set.iter().copied().collect()).unwrap_or_default(),
        |_, _| 1.0,
    )
}

fn weighted_heuristic(admissible: &AdmissibleHeuristic, board: &Board) -> f32 {
    let length = board.as_bytes().len();
    10.0 * admissible.evaluate(board) + 0.01 * (length as f32 - board.blob_size(0) as f32)
}

fn is_solved(board: &Board) -> bool {
    board.get_colors().len() == 1
}

fn unit_distance(_: &Board, _: &Board) -> f32 {
    1.0
}

/// Tuning knobs for [`solve_board`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveOptions {
    /// When true, use the admissible heuristic (optimal, slower). When
    /// false (the default), use the weighted heuristic: fast and
    /// near-optimal, but not guaranteed minimal.
    pub admissible: bool,
    /// Forwarded to [`AStarOptions::driver`]: `Blocking` (the default) runs
    /// [`solve_board`] to completion; `Cooperative` only matters through
    /// [`solve_board_cooperative`], which hands back a steppable search.
    pub driver: Driver,
}

/// Shares one [`AdmissibleHeuristic`] between the main heuristic and a
/// greedy-walk fast solver, so both `solve_board` and
/// `solve_board_cooperative` build identical A* options from `opts`.
fn build_astar_options(start: &Board, opts: SolveOptions) -> AStarOptions<Board, String> {
    let admissible = Rc::new(AdmissibleHeuristic::build(start));

    let heuristic: Box<dyn FnMut(&Board) -> f32> = {
        let admissible = Rc::clone(&admissible);
        if opts.admissible {
            Box::new(move |b: &Board| admissible.evaluate(b))
        } else {
            Box::new(move |b: &Board| weighted_heuristic(&admissible, b))
        }
    };

    let mut memo: LruMemo<String, Vec<Board>> = LruMemo::new(1000);
    let fast_solver: Box<dyn FnMut(&Board) -> Option<(f32, Vec<Board>)>> = Box::new(move |b: &Board| {
        let path = greedy_memoized(
            b.clone(),
            is_solved,
            |b: &Board| b.neighbor_boards(),
            |b: &Board| admissible.evaluate(b),
            |b: &Board| b.hash(),
            &mut memo,
            GreedyOptions { prefer_lower: true, look_ahead: 0 },
        )
        .ok()?;
        let cost = path.len() as f32 - 1.0;
        Some((cost, path))
    });

    AStarOptions {
        heuristic,
        get_key: Box::new(|b: &Board| b.hash()),
        max_f_cost: None,
        driver: opts.driver,
        fast_solver: Some(fast_solver),
    }
}

/// Solves `start` by running A* over `Board::neighbor_boards` with a unit
/// step cost, using either the admissible or the weighted heuristic per
/// `opts.admissible`, with a greedy-walk fast solver spliced in on every
/// expansion. Returns the sequence of boards from `start` to a uniform
/// terminal, inclusive; the move played at each step is the new top-left
/// color, `board.as_bytes()[0]`, of the following board.
///
/// # Errors
/// [`FloodError::NoPathFound`] if no sequence of moves reaches a uniform
/// board (never happens for well-formed Flood-It boards, since every
/// non-uniform board has at least one legal move and the game is finite).
pub fn solve_board(start: Board, opts: SolveOptions) -> Result<Vec<Board>, FloodError> {
    let astar_opts = build_astar_options(&start, opts);
    a_star(start, is_solved, |b: &Board| b.neighbor_boards(), |_, _| 1.0, astar_opts)
}

/// A [`CooperativeSearch`] specialized to [`Board`], for callers (e.g. a UI
/// frame callback) that want to drive `solve_board`'s search in bursts
/// instead of blocking until it completes; see [`Driver::Cooperative`].
pub type BoardCooperativeSearch =
    CooperativeSearch<Board, String, fn(&Board) -> bool, fn(&Board) -> Vec<Board>, fn(&Board, &Board) -> f32>;

/// Builds a [`BoardCooperativeSearch`] over `start`, using the same
/// heuristic and fast-solver wiring as [`solve_board`]. No search work
/// happens until the caller starts calling `step`.
pub fn solve_board_cooperative(start: Board, opts: SolveOptions) -> BoardCooperativeSearch {
    let astar_opts = build_astar_options(&start, opts);
    CooperativeSearch::new(start, is_solved, Board::neighbor_boards, unit_distance, astar_opts)
}

/// Solves `start` with the greedy best-neighbor walker instead of A*,
/// scoring each candidate by the admissible heuristic (lower is better)
/// and optionally looking one ply further ahead before committing.
///
/// # Errors
/// [`FloodError::NoPathFound`] if a non-terminal board has no legal moves,
/// which cannot happen for a well-formed Flood-It board.
pub fn solve_board_greedy(start: Board, look_ahead: usize) -> Result<Vec<Board>, FloodError> {
    let admissible = AdmissibleHeuristic::build(&start);
    greedy(
        start,
        is_solved,
        |b: &Board| b.neighbor_boards(),
        |b: &Board| admissible.evaluate(b),
        GreedyOptions { prefer_lower: true, look_ahead },
    )
}

/// Tuning knobs for [`solve_bottom_right`].
#[derive(Debug, Clone, Copy)]
pub struct BottomRightOptions {
    /// Scales the bottom-right corner-mesh distance the way the weighted
    /// heuristic scales the full admissible heuristic; see the corner-mesh
    /// alternate heuristic documented in `DESIGN.md`.
    pub multiplier: f32,
}

impl Default for BottomRightOptions {
    fn default() -> Self {
        Self { multiplier: 0.5 }
    }
}

/// Solves only far enough to fold the bottom-right corner into the
/// top-left blob, used to bound the full solve by a cheaper partial one.
///
/// # Errors
/// [`FloodError::NoPathFound`] if the bottom-right corner is unreachable,
/// which cannot happen on a connected Flood-It board.
pub fn solve_bottom_right(start: Board, opts: BottomRightOptions) -> Result<Vec<Board>, FloodError> {
    let admissible = AdmissibleHeuristic::build(&start);
    let size = start.size();
    let bottom_right = size * size - 1;

    let heuristic = move |b: &Board| -> f32 { admissible.corner_distance_from_board(2, b) * opts.multiplier };

    let is_folded_in = move |b: &Board| b.blob_positions(0).contains(&bottom_right);

    let astar_opts = AStarOptions {
        heuristic: Box::new(heuristic),
        get_key: Box::new(|b: &Board| b.hash()),
        max_f_cost: None,
        driver: Driver::Blocking,
        fast_solver: None,
    };

    a_star(start, is_folded_in, |b: &Board| b.neighbor_boards(), |_, _| 1.0, astar_opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use crate::board::{random_board, RandomBoardOptions};

    fn board(s: &str) -> Board {
        Board::from_str(s).unwrap()
    }

    // the admissible heuristic is zero on an already-uniform board
    #[test]
    fn the_admissible_heuristic_is_zero_on_an_already_uniform_board() {
        let b = Board::from_bytes(vec![4; 25]).unwrap();
        let h = AdmissibleHeuristic::build(&b);
        assert_eq!(h.evaluate(&b), 0.0);
    }

    // a color split across blobs that all border the growing top-left blob
    // at once can be cleared in a single move, so the admissible heuristic
    // must not charge an extra move for it: doing so overestimates the true
    // remaining cost and breaks admissibility.
    #[test]
    fn evaluate_does_not_overcharge_a_color_whose_split_blobs_merge_in_one_move() {
        let b = board("00000\n00000\n11111\n99299\n99299");
        let h = AdmissibleHeuristic::build(&b);
        // optimal solve is 1, 9, 2: move 2 absorbs both disjoint 9-groups at
        // once because they each border the newly-recolored blob.
        let optimal = solve_board(b.clone(), SolveOptions { admissible: true }).unwrap();
        assert_eq!(optimal.len() - 1, 3);
        assert!(h.evaluate(&b) <= 3.0, "admissible heuristic must not exceed the true optimal cost of 3");
    }

    // solve_board on an already uniform board returns a single-board path
    #[test]
    fn solve_board_on_an_already_uniform_board_returns_a_single_board_path() {
        let b = Board::from_bytes(vec![2; 9]).unwrap();
        let path = solve_board(b, SolveOptions::default()).unwrap();
        assert_eq!(path.len(), 1);
    }

    // solve_board reaches a uniform terminal and every step is a legal move
    #[test]
    fn solve_board_reaches_a_uniform_terminal_and_every_step_is_legal() {
        let b = board("0012\n0223\n1332\n1144");
        let path = solve_board(b, SolveOptions::default()).unwrap();
        assert_eq!(path.last().unwrap().get_colors().len(), 1);
        for window in path.windows(2) {
            let neighbors = window[0].neighbor_boards();
            assert!(neighbors.iter().any(|n| n == &window[1]));
        }
    }

    // solve_board in admissible mode never returns a longer path than the greedy walker
    #[test]
    fn admissible_solve_is_never_longer_than_the_greedy_walk() {
        let b = board("0012\n0223\n1332\n1144");
        let optimal = solve_board(b.clone(), SolveOptions { admissible: true }).unwrap();
        let greedy_path = solve_board_greedy(b, 0).unwrap();
        assert!(optimal.len() <= greedy_path.len());
    }

    // the default weighted solve stays close to the greedy walk on a larger random board
    #[test]
    fn weighted_solve_stays_close_to_the_greedy_walk_on_a_larger_random_board() {
        let b = random_board(RandomBoardOptions { size: 10, color_count: 6 }).unwrap();
        let weighted = solve_board(b.clone(), SolveOptions::default()).unwrap();
        let greedy_path = solve_board_greedy(b, 0).unwrap();
        assert!(weighted.len() <= greedy_path.len() + 5);
    }

    // solve_bottom_right stops as soon as the bottom-right corner joins the top-left blob
    #[test]
    fn solve_bottom_right_stops_once_the_corner_joins_the_top_left_blob() {
        let b = board("0012\n0223\n1332\n1144");
        let path = solve_bottom_right(b, BottomRightOptions::default()).unwrap();
        let last = path.last().unwrap();
        assert!(last.blob_positions(0).contains(&(last.as_bytes().len() - 1)));
    }

    // position_mesh reports zero distance from a corner to itself
    #[test]
    fn position_mesh_reports_zero_distance_from_a_corner_to_itself() {
        let b = board("0012\n0223\n1332\n1144");
        let mesh = position_mesh(&b, 15);
        assert_eq!(mesh.distance_to(&b.blobified_board()[15]), Some(0.0));
    }
}
