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

//! A generic greedy best-neighbor walker, with an optional LRU memo over
//! whole sub-walks and an optional one-ply lookahead.

use std::hash::Hash;

use crate::error::FloodError;
use crate::memo::LruMemo;

/// Tuning knobs for [`greedy`] and [`greedy_memoized`].
#[derive(Debug, Clone, Copy)]
pub struct GreedyOptions {
    /// When true, the walker moves to the neighbor with the *lowest* score
    /// instead of the highest.
    pub prefer_lower: bool,
    /// When greater than zero, each candidate neighbor is scored by the
    /// best score among *its* neighbors (one-ply lookahead) rather than its
    /// own score.
    pub look_ahead: usize,
}

impl Default for GreedyOptions {
    fn default() -> Self {
        Self { prefer_lower: false, look_ahead: 0 }
    }
}

/// Walks from `start` to a node satisfying `is_end` by repeatedly stepping
/// to whichever neighbor scores best, per `opts`.
///
/// # Errors
/// Returns [`FloodError::NoPathFound`] if a non-terminal node has no
/// neighbors to step to.
pub fn greedy<N, IsEnd, Neighbors, Score>(
    start: N,
    mut is_end: IsEnd,
    mut neighbors: Neighbors,
    mut score: Score,
    opts: GreedyOptions,
) -> Result<Vec<N>, FloodError>
where
    N: Clone,
    IsEnd: FnMut(&N) -> bool,
    Neighbors: FnMut(&N) -> Vec<N>,
    Score: FnMut(&N) -> f32,
{
    let mut path = vec![start.clone()];
    let mut current = start;

    while !is_end(&current) {
        let candidates = neighbors(&current);
        if candidates.is_empty() {
            return Err(FloodError::NoPathFound);
        }

        let mut best: Option<(f32, N)> = None;
        for candidate in candidates {
            let candidate_score = if opts.look_ahead > 0 {
                lookahead_score(&candidate, &mut neighbors, &mut score, opts.prefer_lower)
            } else {
                score(&candidate)
            };
            let is_better = match &best {
                None => true,
                Some((best_score, _)) => {
                    if opts.prefer_lower {
                        candidate_score < *best_score
                    } else {
                        candidate_score > *best_score
                    }
                }
            };
            if is_better {
                best = Some((candidate_score, candidate));
            }
        }

        let (_, next) = best.expect("candidates was non-empty");
        path.push(next.clone());
        current = next;
    }

    Ok(path)
}

fn lookahead_score<N, Neighbors, Score>(
    node: &N,
    neighbors: &mut Neighbors,
    score: &mut Score,
    prefer_lower: bool,
) -> f32
where
    Neighbors: FnMut(&N) -> Vec<N>,
    Score: FnMut(&N) -> f32,
{
    let further = neighbors(node);
    if further.is_empty() {
        return score(node);
    }
    let scores = further.iter().map(|n| score(n));
    if prefer_lower {
        scores.fold(f32::INFINITY, f32::min)
    } else {
        scores.fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Runs [`greedy`], but first checks (and afterwards populates) a caller-
/// owned LRU memo keyed by `get_key(start)`, so repeated sub-walks from the
/// same start node are not recomputed. The memo is deliberately owned by
/// the caller, not by this function, matching the rest of this crate's
/// no-hidden-global-cache policy.
pub fn greedy_memoized<N, K, IsEnd, Neighbors, Score, GetKey>(
    start: N,
    is_end: IsEnd,
    neighbors: Neighbors,
    score: Score,
    get_key: GetKey,
    memo: &mut LruMemo<K, Vec<N>>,
    opts: GreedyOptions,
) -> Result<Vec<N>, FloodError>
where
    N: Clone,
    K: Eq + Hash + Clone,
    IsEnd: FnMut(&N) -> bool,
    Neighbors: FnMut(&N) -> Vec<N>,
    Score: FnMut(&N) -> f32,
    GetKey: Fn(&N) -> K,
{
    let key = get_key(&start);
    if let Some(cached) = memo.get(&key) {
        return Ok(cached);
    }
    let path = greedy(start, is_end, neighbors, score, opts)?;
    memo.put(key, path.clone());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    // on a line of integers, the walker with prefer_lower climbs down to zero
    #[test]
    fn on_a_line_of_integers_prefer_lower_walks_down_to_zero() {
        let path = greedy(
            10,
            |&n: &i32| n == 0,
            |&n: &i32| vec![n - 1, n + 1],
            |&n: &i32| n as f32,
            GreedyOptions { prefer_lower: true, look_ahead: 0 },
        )
        .unwrap();
        assert_eq!(*path.last().unwrap(), 0);
        assert_eq!(path.first().unwrap(), &10);
    }

    // the walker without prefer_lower climbs toward higher scores
    #[test]
    fn without_prefer_lower_the_walker_climbs_toward_higher_scores() {
        let path = greedy(
            0,
            |&n: &i32| n >= 5,
            |&n: &i32| vec![n + 1],
            |&n: &i32| n as f32,
            GreedyOptions::default(),
        )
        .unwrap();
        assert_eq!(*path.last().unwrap(), 5);
    }

    // a dead end with no neighbors fails with no path found
    #[test]
    fn a_dead_end_with_no_neighbors_fails_with_no_path_found() {
        let result = greedy(
            0,
            |&n: &i32| n == 99,
            |_: &i32| Vec::<i32>::new(),
            |&n: &i32| n as f32,
            GreedyOptions::default(),
        );
        assert_eq!(result, Err(FloodError::NoPathFound));
    }

    // a memoized walk is only computed once for the same key
    #[test]
    fn a_memoized_walk_is_only_computed_once_for_the_same_key() {
        let mut memo = LruMemo::new(10);
        let path1 = greedy_memoized(
            0,
            |&n: &i32| n >= 3,
            |&n: &i32| vec![n + 1],
            |&n: &i32| n as f32,
            |&n: &i32| n,
            &mut memo,
            GreedyOptions::default(),
        )
        .unwrap();
        assert_eq!(path1, vec![0, 1, 2, 3]);
        assert_eq!(memo.len(), 1);

        // same start key again: served from the memo, not recomputed
        let path2 = greedy_memoized(
            0,
            |&n: &i32| n >= 3,
            |_: &i32| panic!("should not be called on a memo hit"),
            |&n: &i32| n as f32,
            |&n: &i32| n,
            &mut memo,
            GreedyOptions::default(),
        )
        .unwrap();
        assert_eq!(path2, path1);
    }
}
