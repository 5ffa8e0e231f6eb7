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

//! A single-source shortest-path mesh (a Dijkstra variant) over an
//! arbitrary graph, built once from a source node and then queried
//! repeatedly for the shortest path to any reachable target.

use std::hash::Hash;

use fxhash::FxHashMap;

use crate::heap::MinHeap;

/// The result of [`NavMesh::build`]: a `came_from` predecessor map and a
/// `min_dist` table covering every node reachable from the source. Queries
/// against it (`path_to`, `distance_to`) never touch the graph again.
pub struct NavMesh<N> {
    source: N,
    came_from: FxHashMap<N, N>,
    min_dist: FxHashMap<N, f32>,
}

impl<N: Eq + Hash + Clone> NavMesh<N> {
    /// Runs Dijkstra from `source` using `neighbors` and `distance`,
    /// covering the whole reachable component.
    ///
    /// The internal heap is allowed to hold more than one entry for the
    /// same node (pushed again after a cheaper path to it is found); stale
    /// entries are filtered on pop by comparing the popped distance against
    /// the best known `min_dist` for that node.
    pub fn build<Neighbors, Distance>(source: N, mut neighbors: Neighbors, mut distance: Distance) -> NavMesh<N>
    where
        Neighbors: FnMut(&N) -> Vec<N>,
        Distance: FnMut(&N, &N) -> f32,
    {
        let mut min_dist: FxHashMap<N, f32> = FxHashMap::default();
        let mut came_from: FxHashMap<N, N> = FxHashMap::default();

        min_dist.insert(source.clone(), 0.0);
        let mut heap = MinHeap::new();
        heap.put(0.0, source.clone());

        while let Ok((d, node)) = heap.pop_pair() {
            let best_known = *min_dist.get(&node).unwrap_or(&f32::INFINITY);
            if d > best_known {
                continue; // stale entry, a cheaper path already won
            }
            for neighbor in neighbors(&node) {
                let candidate = d + distance(&node, &neighbor);
                let known = *min_dist.get(&neighbor).unwrap_or(&f32::INFINITY);
                if candidate < known {
                    min_dist.insert(neighbor.clone(), candidate);
                    came_from.insert(neighbor.clone(), node.clone());
                    heap.put(candidate, neighbor);
                }
            }
        }

        NavMesh { source, came_from, min_dist }
    }

    /// Reconstructs the shortest path from the source to `target`, source
    /// first. Returns `None` when `target` is unreachable.
    pub fn path_to(&self, target: &N) -> Option<Vec<N>> {
        if *target == self.source {
            return Some(vec![self.source.clone()]);
        }
        if !self.min_dist.contains_key(target) {
            return None;
        }
        let mut path = vec![target.clone()];
        let mut current = target.clone();
        while current != self.source {
            let prev = self.came_from.get(&current)?;
            path.push(prev.clone());
            current = prev.clone();
        }
        path.reverse();
        Some(path)
    }

    /// Shortest distance from the source to `target`, or `None` if
    /// unreachable.
    pub fn distance_to(&self, target: &N) -> Option<f32> {
        self.min_dist.get(target).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_neighbors(n: &i32) -> Vec<i32> {
        vec![n - 1, n + 1].into_iter().filter(|&m| (0..10).contains(&m)).collect()
    }

    // path to the source itself is a single-element path
    #[test]
    fn path_to_the_source_itself_is_a_single_element_path() {
        let mesh = NavMesh::build(3, line_neighbors, |_, _| 1.0);
        assert_eq!(mesh.path_to(&3), Some(vec![3]));
    }

    // distance over a line graph matches the number of hops
    #[test]
    fn distance_over_a_line_graph_matches_the_number_of_hops() {
        let mesh = NavMesh::build(0, line_neighbors, |_, _| 1.0);
        assert_eq!(mesh.distance_to(&5), Some(5.0));
        assert_eq!(mesh.distance_to(&9), Some(9.0));
    }

    // reconstructed path starts at the source and ends at the target
    #[test]
    fn reconstructed_path_starts_at_the_source_and_ends_at_the_target() {
        let mesh = NavMesh::build(0, line_neighbors, |_, _| 1.0);
        let path = mesh.path_to(&4).unwrap();
        assert_eq!(path.first(), Some(&0));
        assert_eq!(path.last(), Some(&4));
        assert_eq!(path.len(), 5);
    }

    // unreachable nodes outside the graph's domain have no path
    #[test]
    fn unreachable_nodes_outside_the_graphs_domain_have_no_path() {
        let mesh = NavMesh::build(0, line_neighbors, |_, _| 1.0);
        assert_eq!(mesh.path_to(&100), None);
    }

    // a cheaper edge weight is preferred over a shorter hop count
    #[test]
    fn a_cheaper_edge_weight_is_preferred_over_a_shorter_hop_count() {
        // 0 -> 1 -> 2 costs 2 via unit edges, but a direct 0 -> 2 edge
        // costing 10 should lose to the two-hop route.
        let neighbors = |n: &i32| match n {
            0 => vec![1, 2],
            1 => vec![2],
            _ => vec![],
        };
        let distance = |a: &i32, b: &i32| if *a == 0 && *b == 2 { 10.0 } else { 1.0 };
        let mesh = NavMesh::build(0, neighbors, distance);
        assert_eq!(mesh.distance_to(&2), Some(2.0));
        assert_eq!(mesh.path_to(&2), Some(vec![0, 1, 2]));
    }
}
