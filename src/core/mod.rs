//! Core library modules for cyclic-route
//!
//! Graph storage, the indexed heap, the time-expanded solver and the text
//! formats around them.

pub mod error;
pub mod format;
pub mod graph;
pub mod heap;
pub mod query;
pub mod solver;

// Re-export main types for internal use
pub use error::{Error, Result};
pub use graph::{GraphBuilder, PeriodicGraph};
pub use solver::{Route, Solver};
