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

//! A generic A* search over arbitrary graphs, with a stale-entry open heap,
//! an optional fast-solver shortcut, an f-cost ceiling, and a cooperative
//! driver for callers that want to interleave search with their own loop.

use std::hash::Hash;

use fxhash::{FxHashMap, FxHashSet};

use crate::error::FloodError;
use crate::heap::MinHeap;

/// Threshold below which a fast-solver's proposed cost is considered "cheap
/// enough" to short-circuit the remainder of the search.
const FAST_SOLVER_EPSILON: f32 = 1e-5;

/// Selects how an A* search is driven to its result.
#[derive(Debug, Clone, Copy)]
pub enum Driver {
    /// Run every iteration inside a single call; `a_star` blocks until a
    /// goal is reached or the open set is exhausted.
    Blocking,
    /// Run `async_block_size` inner-loop iterations per burst, handing
    /// control back to the caller in between. Only meaningful when driving
    /// the search through [`CooperativeSearch`] directly.
    Cooperative { async_block_size: usize },
}

impl Default for Driver {
    fn default() -> Self {
        Driver::Blocking
    }
}

impl Driver {
    /// Iterations per burst: unbounded for [`Driver::Blocking`] (the loop
    /// still returns as soon as a goal, a fast-solver hit, or an exhausted
    /// open set is reached — this never actually spins `usize::MAX` times),
    /// the configured block size for [`Driver::Cooperative`].
    fn block_size(self) -> usize {
        match self {
            Driver::Blocking => usize::MAX,
            Driver::Cooperative { async_block_size } => async_block_size,
        }
    }
}

/// Tuning knobs for [`a_star`]. `N` is the node type; `K` is the key used to
/// identify a node in the open/closed sets, projected out of `N` by the
/// caller-supplied `get_key`.
pub struct AStarOptions<N, K> {
    /// Lower-bound estimate of the remaining cost from a node to a goal.
    /// Must return a non-negative value; admissibility of the overall
    /// search depends on the caller supplying an admissible heuristic here.
    pub heuristic: Box<dyn FnMut(&N) -> f32>,
    /// Projects a node onto the key used for open/closed-set membership and
    /// for `came_from`/`g_cost` bookkeeping.
    pub get_key: Box<dyn FnMut(&N) -> K>,
    /// Prunes any node whose tentative f-cost would exceed this ceiling.
    pub max_f_cost: Option<f32>,
    /// `Blocking` (the default) or `Cooperative { async_block_size }`; see
    /// [`Driver`] and [`CooperativeSearch`].
    pub driver: Driver,
    /// On each expansion, if this returns `Some((cost, path))` with
    /// `cost <= current_f_cost - g_cost[node] + epsilon`, the search
    /// splices `path` onto the reconstructed path-so-far and returns
    /// immediately instead of continuing to expand.
    pub fast_solver: Option<Box<dyn FnMut(&N) -> Option<(f32, Vec<N>)>>>,
}

/// Runs a blocking A* search from `start` to any node satisfying `is_end`.
///
/// Built directly on [`CooperativeSearch`]: driving it with
/// [`Driver::Blocking`] (an unbounded burst) steps it to completion in one
/// call, which is exactly blocking A*. Pass [`Driver::Cooperative`] and
/// construct a [`CooperativeSearch`] directly instead of calling this
/// function if the caller wants to interleave search bursts with its own
/// loop.
///
/// # Errors
/// - [`FloodError::NoPathFound`] when the open set is exhausted before a
///   goal is reached.
/// - [`FloodError::EmptyHeap`] only if the heap's own invariants are
///   violated; not expected in normal operation.
pub fn a_star<N, K, IsEnd, Neighbors, Distance>(
    start: N,
    is_end: IsEnd,
    neighbors: Neighbors,
    distance: Distance,
    opts: AStarOptions<N, K>,
) -> Result<Vec<N>, FloodError>
where
    N: Clone,
    K: Eq + Hash + Clone,
    IsEnd: FnMut(&N) -> bool,
    Neighbors: FnMut(&N) -> Vec<N>,
    Distance: FnMut(&N, &N) -> f32,
{
    let mut search = CooperativeSearch::new(start, is_end, neighbors, distance, opts);
    loop {
        if let AStarStep::Done(path) = search.step()? {
            return Ok(path);
        }
    }
}

fn reconstruct_path<N: Clone, K: Eq + Hash + Clone>(
    came_from: &FxHashMap<K, K>,
    nodes: &FxHashMap<K, N>,
    end_key: &K,
) -> Vec<N> {
    let mut keys = vec![end_key.clone()];
    let mut current = end_key.clone();
    while let Some(prev) = came_from.get(&current) {
        keys.push(prev.clone());
        current = prev.clone();
    }
    keys.reverse();
    keys.iter().map(|k| nodes.get(k).expect("every key on the path was visited").clone()).collect()
}

/// One step of a [cooperative](CooperativeSearch) burst.
pub enum AStarStep<N> {
    /// The search is still open; call `resume`/step again to continue.
    InProgress,
    /// A goal node was reached; here is the reconstructed path.
    Done(Vec<N>),
}

/// A resumable A* search driven in bursts of `async_block_size` inner-loop
/// iterations, for callers (e.g. a UI frame callback or a game loop) that
/// cannot afford to block until the whole search completes.
///
/// There is no async runtime backing this: each burst runs synchronously
/// inside [`step`](Self::step) and control returns to the caller between
/// bursts. `pause`/`resume` toggle a flag consulted at the top of the next
/// burst; dropping the handle reclaims all search state immediately.
pub struct CooperativeSearch<N, K, IsEnd, Neighbors, Distance> {
    is_end: IsEnd,
    neighbors: Neighbors,
    distance: Distance,
    opts: AStarOptions<N, K>,
    open_set: FxHashMap<K, N>,
    closed_set: FxHashSet<K>,
    came_from: FxHashMap<K, K>,
    nodes: FxHashMap<K, N>,
    g_cost: FxHashMap<K, f32>,
    heap: MinHeap<K>,
    paused: bool,
}

impl<N, K, IsEnd, Neighbors, Distance> CooperativeSearch<N, K, IsEnd, Neighbors, Distance>
where
    N: Clone,
    K: Eq + Hash + Clone,
    IsEnd: FnMut(&N) -> bool,
    Neighbors: FnMut(&N) -> Vec<N>,
    Distance: FnMut(&N, &N) -> f32,
{
    /// Starts a new cooperative search. No work happens until the first
    /// call to [`step`](Self::step).
    pub fn new(start: N, is_end: IsEnd, neighbors: Neighbors, distance: Distance, mut opts: AStarOptions<N, K>) -> Self {
        let start_key = (opts.get_key)(&start);
        let mut open_set = FxHashMap::default();
        let mut nodes = FxHashMap::default();
        let mut g_cost = FxHashMap::default();
        let mut heap = MinHeap::new();

        g_cost.insert(start_key.clone(), 0.0);
        nodes.insert(start_key.clone(), start.clone());
        open_set.insert(start_key.clone(), start.clone());
        heap.put((opts.heuristic)(&start), start_key);

        Self {
            is_end,
            neighbors,
            distance,
            opts,
            open_set,
            closed_set: FxHashSet::default(),
            came_from: FxHashMap::default(),
            nodes,
            g_cost,
            heap,
            paused: false,
        }
    }

    /// Marks the search paused: the next call to [`step`](Self::step)
    /// returns immediately without running a burst.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Clears the paused flag. Idempotent when the search is not paused.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Runs up to one burst's worth of inner-loop iterations — per
    /// `self.opts.driver`, either unbounded (`Driver::Blocking`, so this
    /// runs to completion) or `async_block_size` (`Driver::Cooperative`) —
    /// and returns either [`AStarStep::InProgress`] or the completed path.
    ///
    /// # Errors
    /// [`FloodError::NoPathFound`] once the open set is exhausted.
    pub fn step(&mut self) -> Result<AStarStep<N>, FloodError> {
        if self.paused {
            return Ok(AStarStep::InProgress);
        }

        for _ in 0..self.opts.driver.block_size() {
            let Ok((f, key)) = self.heap.pop_pair() else {
                return Err(FloodError::NoPathFound);
            };
            let Some(current) = self.open_set.get(&key).cloned() else {
                continue;
            };

            if (self.is_end)(&current) {
                return Ok(AStarStep::Done(reconstruct_path(&self.came_from, &self.nodes, &key)));
            }

            let current_g = *self.g_cost.get(&key).unwrap_or(&0.0);
            if let Some(fast_solver) = self.opts.fast_solver.as_mut() {
                if let Some((cost, path)) = fast_solver(&current) {
                    if cost <= f - current_g + FAST_SOLVER_EPSILON {
                        let mut prefix = reconstruct_path(&self.came_from, &self.nodes, &key);
                        prefix.extend(path.into_iter().skip(1));
                        return Ok(AStarStep::Done(prefix));
                    }
                }
            }

            self.open_set.remove(&key);
            self.closed_set.insert(key.clone());

            for neighbor in (self.neighbors)(&current) {
                let neighbor_key = (self.opts.get_key)(&neighbor);
                if self.closed_set.contains(&neighbor_key) {
                    continue;
                }

                let tentative_g = current_g + (self.distance)(&current, &neighbor);
                let known_g = self.g_cost.get(&neighbor_key).copied();
                let is_open = self.open_set.contains_key(&neighbor_key);

                if !is_open || known_g.map(|g| tentative_g <= g).unwrap_or(true) {
                    let tentative_f = tentative_g + (self.opts.heuristic)(&neighbor);
                    if let Some(ceiling) = self.opts.max_f_cost {
                        if tentative_f > ceiling {
                            continue;
                        }
                    }
                    self.came_from.insert(neighbor_key.clone(), key.clone());
                    self.g_cost.insert(neighbor_key.clone(), tentative_g);
                    self.nodes.insert(neighbor_key.clone(), neighbor.clone());
                    self.open_set.insert(neighbor_key.clone(), neighbor);
                    self.heap.put(tentative_f, neighbor_key);
                }
            }
        }

        Ok(AStarStep::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_opts(goal: i32) -> AStarOptions<i32, i32> {
        AStarOptions {
            heuristic: Box::new(move |&n: &i32| (goal - n).unsigned_abs() as f32),
            get_key: Box::new(|&n: &i32| n),
            max_f_cost: None,
            driver: Driver::Blocking,
            fast_solver: None,
        }
    }

    // a_star finds the shortest path on a simple integer line graph
    #[test]
    fn a_star_finds_the_shortest_path_on_a_line_graph() {
        let path = a_star(
            0,
            |&n: &i32| n == 10,
            |&n: &i32| vec![n - 1, n + 1].into_iter().filter(|&m| (0..=20).contains(&m)).collect(),
            |_, _| 1.0,
            line_opts(10),
        )
        .unwrap();
        assert_eq!(path, (0..=10).collect::<Vec<_>>());
    }

    // a_star fails with NoPathFound when the goal is unreachable
    #[test]
    fn a_star_fails_with_no_path_found_when_the_goal_is_unreachable() {
        let result = a_star(0, |&n: &i32| n == 999, |&n: &i32| vec![n + 1].into_iter().filter(|&m| m < 5).collect(), |_, _| 1.0, line_opts(999));
        assert_eq!(result, Err(FloodError::NoPathFound));
    }

    // max_f_cost prunes nodes whose tentative f exceeds the ceiling
    #[test]
    fn max_f_cost_prunes_nodes_whose_tentative_f_exceeds_the_ceiling() {
        let mut opts = line_opts(10);
        opts.max_f_cost = Some(3.0);
        let result = a_star(0, |&n: &i32| n == 10, |&n: &i32| vec![n + 1], |_, _| 1.0, opts);
        assert_eq!(result, Err(FloodError::NoPathFound));
    }

    // a fast solver firing with a cheap enough cost short-circuits the search
    #[test]
    fn a_fast_solver_firing_with_a_cheap_cost_short_circuits_the_search() {
        let mut opts = line_opts(1000);
        opts.fast_solver = Some(Box::new(|&n: &i32| Some((0.0, vec![n, n + 1, n + 2]))));
        let path = a_star(0, |&n: &i32| n == 1000, |&n: &i32| vec![n + 1], |_, _| 1.0, opts).unwrap();
        assert_eq!(path, vec![0, 1, 2]);
    }

    // a cooperative search reaches the same result as the blocking search
    #[test]
    fn a_cooperative_search_reaches_the_same_result_as_the_blocking_search() {
        let mut opts = line_opts(10);
        opts.driver = Driver::Cooperative { async_block_size: 2 };
        let mut search = CooperativeSearch::new(
            0,
            |&n: &i32| n == 10,
            |&n: &i32| vec![n - 1, n + 1].into_iter().filter(|&m| (0..=20).contains(&m)).collect(),
            |_, _| 1.0,
            opts,
        );
        let mut result = None;
        for _ in 0..50 {
            match search.step().unwrap() {
                AStarStep::Done(path) => {
                    result = Some(path);
                    break;
                }
                AStarStep::InProgress => continue,
            }
        }
        assert_eq!(result, Some((0..=10).collect::<Vec<_>>()));
    }

    // pausing a cooperative search prevents further progress until resumed
    #[test]
    fn pausing_a_cooperative_search_prevents_further_progress_until_resumed() {
        let mut opts = line_opts(10);
        opts.driver = Driver::Cooperative { async_block_size: 1 };
        let mut search = CooperativeSearch::new(
            0,
            |&n: &i32| n == 10,
            |&n: &i32| vec![n - 1, n + 1].into_iter().filter(|&m| (0..=20).contains(&m)).collect(),
            |_, _| 1.0,
            opts,
        );
        search.step().unwrap();
        search.pause();
        assert!(matches!(search.step().unwrap(), AStarStep::InProgress));
        search.resume();
        let mut done = false;
        for _ in 0..50 {
            if matches!(search.step().unwrap(), AStarStep::Done(_)) {
                done = true;
                break;
            }
        }
        assert!(done);
    }
}
