//! Time-expanded shortest-path search
//!
//! Dijkstra over the implicit `(vertex, phase)` state space. Traversing an
//! edge from a state at phase `p` costs `weights[p]` and lands at phase
//! `(p + 1) % period`, so the k-th edge of a walk pays its weight for phase
//! `(k - 1) % period`.
//!
//! Every state is bulk-loaded into an [`IndexedMinHeap`] up front (infinite
//! except the source at phase 0) and lowered with decrease-key, so each state
//! is extracted exactly once.
//!
//! The destination may be reached at several phases with different costs.
//! The answer is the cheapest phase once all of them are final, not the
//! first destination state seen.

use log::debug;
use serde::Serialize;

use crate::core::error::Result;
use crate::core::graph::{PeriodicGraph, Phase, StateId, VertexId};
use crate::core::heap::{Distance, HeapEntry, IndexedMinHeap, INFINITY};

const NO_PREDECESSOR: StateId = StateId::MAX;

/// When a point-to-point search may stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Termination {
    /// Stop once the heap minimum exceeds the best destination distance.
    /// Gives the same result as `Drain`.
    #[default]
    Bounded,
    /// Finalize every reachable state before answering
    Drain,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SolverConfig {
    pub termination: Termination,
}

/// Minimum-cost walk between two vertices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub source: VertexId,
    pub destination: VertexId,
    pub weight: Distance,
    /// Phase the walk ends at: `hops() % period`
    pub arrival_phase: Phase,
    /// Visited vertices, source first
    pub path: Vec<VertexId>,
}

impl Route {
    /// Number of edges traversed
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Counters for one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub pops: usize,
    /// Pops whose heap distance disagreed with the distance table.
    /// Always 0 with decrease-key.
    pub stale_pops: usize,
    pub settled: usize,
    pub relaxed: usize,
    pub improved: usize,
}

/// Distance and predecessor tables of one search
#[derive(Debug)]
pub struct SearchSpace<'g> {
    graph: &'g PeriodicGraph,
    source: VertexId,
    distances: Vec<Distance>,
    predecessors: Vec<StateId>,
    finalized: Vec<bool>,
    stats: SearchStats,
}

impl<'g> SearchSpace<'g> {
    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Best known distance to `(vertex, phase)`, `None` if unreached.
    ///
    /// Fails with `InvalidVertex` or `InvalidPhase` outside the state space.
    pub fn distance(&self, vertex: i64, phase: Phase) -> Result<Option<Distance>> {
        let state = self.graph.checked_state(vertex, phase)?;
        Ok(self.reached(state))
    }

    pub fn is_finalized(&self, vertex: i64, phase: Phase) -> Result<bool> {
        let state = self.graph.checked_state(vertex, phase)?;
        Ok(self.finalized[state as usize])
    }

    /// Cheapest phase at which `vertex` is reached; lowest phase wins ties
    pub fn best_arrival(&self, vertex: i64) -> Result<Option<(Phase, Distance)>> {
        let vertex = self.graph.vertex(vertex)?;
        Ok(self.arrival(vertex))
    }

    fn reached(&self, state: StateId) -> Option<Distance> {
        let d = self.distances[state as usize];
        (d != INFINITY).then_some(d)
    }

    fn arrival(&self, vertex: VertexId) -> Option<(Phase, Distance)> {
        let mut best: Option<(Phase, Distance)> = None;
        for phase in 0..self.graph.period() {
            if let Some(d) = self.reached(self.graph.state_id(vertex, phase)) {
                if best.map_or(true, |(_, b)| d < b) {
                    best = Some((phase, d));
                }
            }
        }
        best
    }

    /// Reconstruct the cheapest walk to `destination`.
    ///
    /// `Ok(None)` when no phase of `destination` was reached.
    pub fn route_to(&self, destination: i64) -> Result<Option<Route>> {
        let destination = self.graph.vertex(destination)?;
        let Some((arrival_phase, weight)) = self.arrival(destination) else {
            return Ok(None);
        };

        let mut path = Vec::new();
        let mut state = self.graph.state_id(destination, arrival_phase);
        loop {
            let (vertex, _) = self.graph.split_state(state);
            path.push(vertex);
            let prev = self.predecessors[state as usize];
            if prev == NO_PREDECESSOR {
                break;
            }
            state = prev;
        }
        path.reverse();
        debug_assert_eq!(path.first(), Some(&self.source));

        Ok(Some(Route {
            source: self.source,
            destination,
            weight,
            arrival_phase,
            path,
        }))
    }
}

/// Shortest-path solver over a borrowed graph
#[derive(Debug, Clone, Copy)]
pub struct Solver<'g> {
    graph: &'g PeriodicGraph,
    config: SolverConfig,
}

impl<'g> Solver<'g> {
    pub fn new(graph: &'g PeriodicGraph) -> Self {
        Self::with_config(graph, SolverConfig::default())
    }

    pub fn with_config(graph: &'g PeriodicGraph, config: SolverConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &'g PeriodicGraph {
        self.graph
    }

    /// Cheapest walk from `source` (at phase 0) to `destination` at any phase.
    ///
    /// `Ok(None)` means the destination is unreachable. Ids outside the
    /// graph fail with [`Error::InvalidVertex`](crate::Error::InvalidVertex).
    pub fn shortest_path(&self, source: i64, destination: i64) -> Result<Option<Route>> {
        let source = self.graph.vertex(source)?;
        let target = self.graph.vertex(destination)?;

        let stop_at = match self.config.termination {
            Termination::Bounded => Some(target),
            Termination::Drain => None,
        };
        let space = self.run(source, stop_at)?;
        space.route_to(target as i64)
    }

    /// Full one-to-all search from `source` at phase 0
    pub fn search(&self, source: i64) -> Result<SearchSpace<'g>> {
        let source = self.graph.vertex(source)?;
        self.run(source, None)
    }

    fn run(&self, source: VertexId, stop_at: Option<VertexId>) -> Result<SearchSpace<'g>> {
        let graph = self.graph;
        let state_count = graph.state_count()?;
        let period = graph.period();

        let mut distances = vec![INFINITY; state_count];
        let mut predecessors = vec![NO_PREDECESSOR; state_count];
        let mut finalized = vec![false; state_count];
        let mut stats = SearchStats::default();

        distances[graph.state_id(source, 0) as usize] = 0;

        let mut heap = IndexedMinHeap::build(state_count)?;
        heap.insert_all((0..state_count as StateId).map(|state| HeapEntry {
            state,
            distance: distances[state as usize],
            phase: state % period,
        }))?;

        let mut best_target = INFINITY;

        while !heap.is_empty() {
            let current = heap.extract_min()?;
            stats.pops += 1;

            let state = current.state as usize;
            if current.distance != distances[state] {
                stats.stale_pops += 1;
                continue;
            }
            if current.distance == INFINITY {
                // Everything left is unreachable
                break;
            }
            if stop_at.is_some() && current.distance > best_target {
                break;
            }

            finalized[state] = true;
            stats.settled += 1;

            let (vertex, phase) = graph.split_state(current.state);
            debug_assert_eq!(phase, current.phase);
            if stop_at == Some(vertex) {
                best_target = best_target.min(current.distance);
            }

            let next_phase = graph.next_phase(phase);
            for edge in graph.edges_from(vertex) {
                stats.relaxed += 1;
                let next = graph.state_id(edge.target, next_phase);
                if finalized[next as usize] {
                    continue;
                }
                let candidate = current
                    .distance
                    .saturating_add(Distance::from(edge.weight_at(phase)));
                if candidate < distances[next as usize] {
                    distances[next as usize] = candidate;
                    predecessors[next as usize] = current.state;
                    heap.decrease_key(next, candidate, next_phase)?;
                    stats.improved += 1;
                }
            }
        }

        debug!(
            "search from {source}: {} pops, {} settled, {} relaxed, {} improved, {} stale",
            stats.pops, stats.settled, stats.relaxed, stats.improved, stats.stale_pops
        );

        Ok(SearchSpace {
            graph,
            source,
            distances,
            predecessors,
            finalized,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::core::graph::GraphBuilder;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    fn graph(vertex_count: u32, period: u32, edges: &[(u32, u32, &[u32])]) -> PeriodicGraph {
        let mut builder = GraphBuilder::new(vertex_count, period)
            .unwrap()
            .with_edge_capacity(edges.len());
        for &(s, t, w) in edges {
            builder.add_edge(s, t, w.to_vec()).unwrap();
        }
        builder.build()
    }

    fn scenario() -> PeriodicGraph {
        graph(3, 2, &[(0, 1, &[5, 1]), (1, 2, &[2, 2]), (0, 2, &[10, 10])])
    }

    fn random_graph(rng: &mut StdRng, period: u32) -> PeriodicGraph {
        let vertex_count = rng.gen_range(1..9u32);
        let edge_count = rng.gen_range(0..(vertex_count * 3) as usize);
        let mut builder = GraphBuilder::new(vertex_count, period).unwrap();
        for _ in 0..edge_count {
            let s = rng.gen_range(0..vertex_count);
            let t = rng.gen_range(0..vertex_count);
            let weights = (0..period).map(|_| rng.gen_range(0..20)).collect();
            builder.add_edge(s, t, weights).unwrap();
        }
        builder.build()
    }

    /// Bellman-Ford over the state space
    fn reference_distance(g: &PeriodicGraph, source: u32, destination: u32) -> Option<Distance> {
        let n = g.period();
        let mut dist = vec![INFINITY; g.state_count().unwrap()];
        dist[g.state_id(source, 0) as usize] = 0;
        for _ in 0..dist.len() {
            let mut changed = false;
            for edge in g.edges() {
                for phase in 0..n {
                    let from = dist[g.state_id(edge.source, phase) as usize];
                    if from == INFINITY {
                        continue;
                    }
                    let to = g.state_id(edge.target, (phase + 1) % n) as usize;
                    let candidate = from + Distance::from(edge.weight_at(phase));
                    if candidate < dist[to] {
                        dist[to] = candidate;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        (0..n)
            .map(|p| dist[g.state_id(destination, p) as usize])
            .min()
            .filter(|&d| d != INFINITY)
    }

    /// Cost of walking `path` from phase 0, taking the cheapest parallel edge
    fn walk_cost(g: &PeriodicGraph, path: &[u32]) -> Option<Distance> {
        let mut total = 0;
        for (step, pair) in path.windows(2).enumerate() {
            let phase = step as u32 % g.period();
            let w = g
                .edges_from(pair[0])
                .filter(|e| e.target == pair[1])
                .map(|e| e.weight_at(phase))
                .min()?;
            total += Distance::from(w);
        }
        Some(total)
    }

    #[test]
    fn test_phase_dependent_route() {
        let g = scenario();
        let solver = Solver::new(&g);
        assert_eq!(solver.graph().state_count().unwrap(), 6);
        let route = solver.shortest_path(0, 2).unwrap().unwrap();
        assert_eq!(route.weight, 7);
        assert_eq!(route.path, vec![0, 1, 2]);
        assert_eq!(route.arrival_phase, 0);
        assert_eq!(route.hops(), 2);
    }

    #[test]
    fn test_source_equals_destination() {
        let g = scenario();
        let route = Solver::new(&g).shortest_path(0, 0).unwrap().unwrap();
        assert_eq!(route.weight, 0);
        assert_eq!(route.path, vec![0]);
        assert_eq!(route.arrival_phase, 0);
    }

    #[test]
    fn test_source_equals_destination_with_zero_weight_cycle() {
        let g = graph(2, 2, &[(0, 1, &[0, 0]), (1, 0, &[0, 0])]);
        let route = Solver::new(&g).shortest_path(0, 0).unwrap().unwrap();
        assert_eq!(route.weight, 0);
        assert_eq!(route.path, vec![0]);
    }

    #[test]
    fn test_no_edges_means_no_path() {
        let g = graph(2, 3, &[]);
        assert_eq!(Solver::new(&g).shortest_path(0, 1).unwrap(), None);
    }

    #[test]
    fn test_unreachable_against_edge_direction() {
        let g = scenario();
        assert_eq!(Solver::new(&g).shortest_path(2, 0).unwrap(), None);
    }

    #[test]
    fn test_invalid_vertices() {
        let g = scenario();
        let solver = Solver::new(&g);
        assert!(matches!(
            solver.shortest_path(3, 0),
            Err(Error::InvalidVertex { vertex: 3, vertex_count: 3 })
        ));
        assert!(matches!(
            solver.shortest_path(0, -2),
            Err(Error::InvalidVertex { vertex: -2, .. })
        ));
        assert!(solver.search(17).is_err());
    }

    #[test]
    fn test_self_loop_shifts_phase() {
        // Waiting one step on the loop makes the cheap phase of 0->2 usable
        let g = graph(3, 2, &[(0, 2, &[10, 1]), (0, 0, &[3, 3])]);
        let route = Solver::new(&g).shortest_path(0, 2).unwrap().unwrap();
        assert_eq!(route.weight, 4);
        assert_eq!(route.path, vec![0, 0, 2]);
        assert_eq!(route.arrival_phase, 0);
    }

    #[test]
    fn test_parallel_edges_use_cheapest_for_phase() {
        let g = graph(2, 2, &[(0, 1, &[9, 1]), (0, 1, &[4, 8])]);
        let route = Solver::new(&g).shortest_path(0, 1).unwrap().unwrap();
        assert_eq!(route.weight, 4);
        assert_eq!(route.path, vec![0, 1]);
    }

    #[test]
    fn test_longer_walk_beats_fewer_hops() {
        // Direct edge is expensive at phase 0, detour lands at phase 0 again
        // after three hops and reaches 3 through the cheap phase
        let g = graph(
            4,
            3,
            &[
                (0, 3, &[50, 50, 50]),
                (0, 1, &[1, 1, 1]),
                (1, 2, &[1, 1, 1]),
                (2, 3, &[60, 60, 2]),
            ],
        );
        let route = Solver::new(&g).shortest_path(0, 3).unwrap().unwrap();
        assert_eq!(route.weight, 4);
        assert_eq!(route.path, vec![0, 1, 2, 3]);
        assert_eq!(route.arrival_phase, 0);
    }

    #[test]
    fn test_destination_reached_at_several_phases() {
        let g = scenario();
        let space = Solver::new(&g).search(0).unwrap();
        assert_eq!(space.source(), 0);
        assert_eq!(space.distance(2, 0).unwrap(), Some(7));
        assert_eq!(space.distance(2, 1).unwrap(), Some(10));
        assert_eq!(space.best_arrival(2).unwrap(), Some((0, 7)));
        assert_eq!(space.distance(0, 1).unwrap(), None);
        assert!(space.is_finalized(2, 1).unwrap());
        assert!(!space.is_finalized(0, 1).unwrap());
    }

    #[test]
    fn test_table_lookups_outside_state_space() {
        let g = scenario();
        let space = Solver::new(&g).search(0).unwrap();
        // (0, 3) would alias state (1, 1) without the phase check
        assert!(matches!(
            space.distance(0, 3),
            Err(Error::InvalidPhase { phase: 3, period: 2 })
        ));
        assert!(matches!(
            space.is_finalized(0, 3),
            Err(Error::InvalidPhase { .. })
        ));
        assert!(matches!(
            space.distance(7, 0),
            Err(Error::InvalidVertex { vertex: 7, vertex_count: 3 })
        ));
        assert!(matches!(
            space.is_finalized(-1, 0),
            Err(Error::InvalidVertex { vertex: -1, .. })
        ));
        assert!(matches!(
            space.best_arrival(3),
            Err(Error::InvalidVertex { vertex: 3, .. })
        ));
        assert!(matches!(space.route_to(3), Err(Error::InvalidVertex { .. })));
    }

    #[test]
    fn test_search_stats() {
        let g = scenario();
        let space = Solver::new(&g).search(0).unwrap();
        let stats = space.stats();
        assert_eq!(stats.stale_pops, 0);
        // (0,0), (1,1), (2,0), (2,1)
        assert_eq!(stats.settled, 4);
        assert_eq!(stats.improved, 3);
    }

    #[test]
    fn test_idempotent_queries() {
        let mut rng = StdRng::seed_from_u64(11);
        let g = random_graph(&mut rng, 3);
        let solver = Solver::new(&g);
        for s in 0..g.vertex_count() as i64 {
            for d in 0..g.vertex_count() as i64 {
                assert_eq!(
                    solver.shortest_path(s, d).unwrap(),
                    solver.shortest_path(s, d).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_bounded_matches_drain() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let period = rng.gen_range(1..5);
            let g = random_graph(&mut rng, period);
            let bounded = Solver::new(&g);
            let drain = Solver::with_config(
                &g,
                SolverConfig {
                    termination: Termination::Drain,
                },
            );
            for s in 0..g.vertex_count() as i64 {
                for d in 0..g.vertex_count() as i64 {
                    assert_eq!(
                        bounded.shortest_path(s, d).unwrap(),
                        drain.shortest_path(s, d).unwrap(),
                        "query {s}->{d}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_matches_bellman_ford_reference() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..150 {
            let period = rng.gen_range(1..5);
            let g = random_graph(&mut rng, period);
            let solver = Solver::new(&g);
            for s in 0..g.vertex_count() {
                for d in 0..g.vertex_count() {
                    let expected = reference_distance(&g, s, d);
                    let route = solver.shortest_path(s as i64, d as i64).unwrap();
                    assert_eq!(route.as_ref().map(|r| r.weight), expected, "query {s}->{d}");
                    if let Some(route) = route {
                        assert_eq!(route.path.first(), Some(&s));
                        assert_eq!(route.path.last(), Some(&d));
                        assert_eq!(route.arrival_phase as usize, route.hops() % period as usize);
                        assert_eq!(walk_cost(&g, &route.path), Some(route.weight));
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_phase_equals_static_dijkstra() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let g = random_graph(&mut rng, 1);
            let solver = Solver::new(&g);
            for s in 0..g.vertex_count() {
                // Plain lazy Dijkstra on vertices
                let mut dist = vec![INFINITY; g.vertex_count() as usize];
                let mut heap = BinaryHeap::new();
                dist[s as usize] = 0;
                heap.push(Reverse((0, s)));
                while let Some(Reverse((d, u))) = heap.pop() {
                    if d > dist[u as usize] {
                        continue;
                    }
                    for e in g.edges_from(u) {
                        let nd = d + Distance::from(e.weight_at(0));
                        if nd < dist[e.target as usize] {
                            dist[e.target as usize] = nd;
                            heap.push(Reverse((nd, e.target)));
                        }
                    }
                }

                for d in 0..g.vertex_count() {
                    let route = solver.shortest_path(s as i64, d as i64).unwrap();
                    let expected = (dist[d as usize] != INFINITY).then_some(dist[d as usize]);
                    assert_eq!(route.as_ref().map(|r| r.weight), expected);
                    if let Some(route) = route {
                        assert_eq!(walk_cost(&g, &route.path), Some(route.weight));
                    }
                }
            }
        }
    }

    #[test]
    fn test_prefixes_of_optimal_walks_are_optimal() {
        let mut rng = StdRng::seed_from_u64(31337);
        for _ in 0..100 {
            let period = rng.gen_range(1..4);
            let g = random_graph(&mut rng, period);
            let solver = Solver::new(&g);
            for s in 0..g.vertex_count() {
                let space = solver.search(s as i64).unwrap();
                for d in 0..g.vertex_count() {
                    let Some(route) = space.route_to(d as i64).unwrap() else {
                        continue;
                    };
                    for k in 0..route.path.len() {
                        let prefix = &route.path[..=k];
                        let phase = k as u32 % period;
                        assert_eq!(
                            space.distance(route.path[k] as i64, phase).unwrap(),
                            walk_cost(&g, prefix),
                            "prefix {prefix:?} of {:?}",
                            route.path
                        );
                    }
                }
            }
        }
    }
}
