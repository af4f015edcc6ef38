//! Periodic graph storage
//!
//! Directed graph where each edge carries `period` weights, one per phase.
//! Adjacency is a flat CSR layout: `offsets` is a prefix sum over out-degrees,
//! `targets` holds one entry per edge, and `weights` holds `period` entries
//! per edge, edge-major. Edges leaving the same vertex keep insertion order.

use crate::core::error::{Error, Result};

/// Vertex id in `[0, vertex_count)`
pub type VertexId = u32;

/// Phase in `[0, period)`
pub type Phase = u32;

/// Non-negative edge weight
pub type Weight = u32;

/// Dense `(vertex, phase)` id: `vertex * period + phase`
pub type StateId = u32;

/// A directed edge as handed to [`GraphBuilder::add_edge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    pub weights: Vec<Weight>,
}

/// Borrowed view of one stored edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef<'a> {
    pub source: VertexId,
    pub target: VertexId,
    pub weights: &'a [Weight],
}

impl EdgeRef<'_> {
    /// Weight applied when the edge is traversed at `phase`
    #[inline]
    pub fn weight_at(&self, phase: Phase) -> Weight {
        self.weights[phase as usize]
    }
}

/// Immutable graph with cyclic edge weights
#[derive(Debug, Clone)]
pub struct PeriodicGraph {
    vertex_count: u32,
    period: u32,
    offsets: Vec<usize>, // vertex_count + 1
    targets: Vec<VertexId>,
    weights: Vec<Weight>, // targets.len() * period
}

impl PeriodicGraph {
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// Size of the time-expanded state space (V x N)
    ///
    /// Fails if the product does not fit a [`StateId`].
    pub fn state_count(&self) -> Result<usize> {
        let count = self.vertex_count as u64 * self.period as u64;
        if count > u32::MAX as u64 {
            return Err(Error::InvalidGraph(format!(
                "{} vertices x {} phases exceeds the state id space",
                self.vertex_count, self.period
            )));
        }
        Ok(count as usize)
    }

    pub fn contains_vertex(&self, vertex: i64) -> bool {
        vertex >= 0 && vertex < self.vertex_count as i64
    }

    /// Checked conversion of an external vertex id
    pub fn vertex(&self, vertex: i64) -> Result<VertexId> {
        if !self.contains_vertex(vertex) {
            return Err(Error::InvalidVertex {
                vertex,
                vertex_count: self.vertex_count,
            });
        }
        Ok(vertex as VertexId)
    }

    /// Checked state id for an external vertex id and phase
    pub fn checked_state(&self, vertex: i64, phase: Phase) -> Result<StateId> {
        let vertex = self.vertex(vertex)?;
        if phase >= self.period {
            return Err(Error::InvalidPhase {
                phase,
                period: self.period,
            });
        }
        Ok(self.state_id(vertex, phase))
    }

    #[inline]
    pub fn state_id(&self, vertex: VertexId, phase: Phase) -> StateId {
        vertex * self.period + phase
    }

    /// Inverse of [`state_id`](Self::state_id)
    #[inline]
    pub fn split_state(&self, state: StateId) -> (VertexId, Phase) {
        (state / self.period, state % self.period)
    }

    /// Phase reached after traversing one edge at `phase`
    #[inline]
    pub fn next_phase(&self, phase: Phase) -> Phase {
        (phase + 1) % self.period
    }

    pub fn out_degree(&self, vertex: VertexId) -> usize {
        let v = vertex as usize;
        self.offsets[v + 1] - self.offsets[v]
    }

    /// Outgoing edges of `vertex`, in insertion order
    #[inline]
    pub fn edges_from(&self, vertex: VertexId) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        let start = self.offsets[vertex as usize];
        let end = self.offsets[vertex as usize + 1];
        (start..end).map(move |i| self.edge_at(vertex, i))
    }

    /// All edges, grouped by source vertex
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        (0..self.vertex_count).flat_map(move |v| self.edges_from(v))
    }

    #[inline]
    fn edge_at(&self, source: VertexId, index: usize) -> EdgeRef<'_> {
        let n = self.period as usize;
        EdgeRef {
            source,
            target: self.targets[index],
            weights: &self.weights[index * n..(index + 1) * n],
        }
    }
}

/// Validating builder for [`PeriodicGraph`]
#[derive(Debug)]
pub struct GraphBuilder {
    vertex_count: u32,
    period: u32,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new(vertex_count: u32, period: u32) -> Result<Self> {
        if period == 0 {
            return Err(Error::InvalidGraph(
                "period must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            vertex_count,
            period,
            edges: Vec::new(),
        })
    }

    pub fn with_edge_capacity(mut self, capacity: usize) -> Self {
        self.edges.reserve(capacity);
        self
    }

    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        weights: Vec<Weight>,
    ) -> Result<&mut Self> {
        for endpoint in [source, target] {
            if endpoint >= self.vertex_count {
                return Err(Error::InvalidGraph(format!(
                    "edge {source}->{target} references vertex {endpoint}, graph has {} vertices",
                    self.vertex_count
                )));
            }
        }
        if weights.len() != self.period as usize {
            return Err(Error::InvalidGraph(format!(
                "edge {source}->{target} has {} weights, period is {}",
                weights.len(),
                self.period
            )));
        }
        self.edges.push(Edge {
            source,
            target,
            weights,
        });
        Ok(self)
    }

    pub fn build(self) -> PeriodicGraph {
        let n_vertices = self.vertex_count as usize;
        let n = self.period as usize;

        // First pass: out-degree per vertex
        let mut counts = vec![0usize; n_vertices];
        for edge in &self.edges {
            counts[edge.source as usize] += 1;
        }

        // Offsets (prefix sum)
        let mut offsets = Vec::with_capacity(n_vertices + 1);
        let mut offset = 0usize;
        for &count in &counts {
            offsets.push(offset);
            offset += count;
        }
        offsets.push(offset);

        // Second pass: scatter edges, stable within each source
        let mut cursor = offsets[..n_vertices].to_vec();
        let mut targets = vec![0 as VertexId; self.edges.len()];
        let mut weights = vec![0 as Weight; self.edges.len() * n];
        for edge in &self.edges {
            let slot = cursor[edge.source as usize];
            cursor[edge.source as usize] += 1;
            targets[slot] = edge.target;
            weights[slot * n..(slot + 1) * n].copy_from_slice(&edge.weights);
        }

        PeriodicGraph {
            vertex_count: self.vertex_count,
            period: self.period,
            offsets,
            targets,
            weights,
        }
    }
}
