//! # cyclic-route
//!
//! Shortest paths in directed graphs whose edge weights repeat with a fixed
//! period. Every edge carries `N` weights; the k-th edge of a walk pays its
//! weight for phase `(k - 1) mod N`. Queries are answered by Dijkstra over the
//! time-expanded `(vertex, phase)` state space.
//!
//! ## Basic Usage
//!
//! ```rust
//! use cyclic_route::{GraphBuilder, Solver};
//!
//! # fn main() -> cyclic_route::Result<()> {
//! let mut builder = GraphBuilder::new(3, 2)?;
//! builder.add_edge(0, 1, vec![5, 1])?;
//! builder.add_edge(1, 2, vec![2, 2])?;
//! builder.add_edge(0, 2, vec![10, 10])?;
//! let graph = builder.build();
//!
//! let route = Solver::new(&graph).shortest_path(0, 2)?.expect("reachable");
//! assert_eq!(route.weight, 7);
//! assert_eq!(route.path, vec![0, 1, 2]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading Graphs
//!
//! ```rust,no_run
//! # fn main() -> cyclic_route::Result<()> {
//! let graph = cyclic_route::load_graph("graph.txt")?;
//! let solver = cyclic_route::Solver::new(&graph);
//! match solver.shortest_path(0, 4)? {
//!     Some(route) => println!("{} via {:?}", route.weight, route.path),
//!     None => println!("no path"),
//! }
//! # Ok(())
//! # }
//! ```

// Re-export core types that users might need
pub use crate::core::error::{Error, Result};
pub use crate::core::format::{load_graph, parse_graph};
pub use crate::core::graph::{Edge, EdgeRef, GraphBuilder, PeriodicGraph, Phase, StateId, VertexId, Weight};
pub use crate::core::heap::{Distance, HeapEntry, IndexedMinHeap, INFINITY};
pub use crate::core::query::{Query, QueryOutcome, QueryReader};
pub use crate::core::solver::{Route, SearchSpace, SearchStats, Solver, SolverConfig, Termination};

pub mod core;
