//! Error types for cyclic-route
//!
//! One error enum covers the whole library: graph construction, parsing,
//! heap misuse and query validation. `NoPathFound` is deliberately absent,
//! an unreachable destination is a normal outcome (`Ok(None)` from the solver).

use thiserror::Error;

/// Main error type for cyclic-route operations
#[derive(Debug, Error)]
pub enum Error {
    /// Query endpoint outside `[0, vertex_count)`
    #[error("invalid vertex {vertex}: graph has {vertex_count} vertices")]
    InvalidVertex { vertex: i64, vertex_count: u32 },

    /// Phase outside `[0, period)`
    #[error("invalid phase {phase}: period is {period}")]
    InvalidPhase { phase: u32, period: u32 },

    /// `extract_min` called on an empty heap
    #[error("internal error: extract_min on empty heap")]
    EmptyHeap,

    /// `decrease_key` called for a state that is not in the heap
    #[error("internal error: state {0} is not queued")]
    StateNotQueued(u32),

    /// `insert_all` saw the same state twice
    #[error("internal error: state {0} inserted twice")]
    DuplicateState(u32),

    /// Heap asked to hold more entries than it was built for
    #[error("internal error: heap capacity {capacity} cannot hold state {state}")]
    HeapCapacity { capacity: usize, state: u32 },

    /// Heap built with more slots than its `u32` position index can address
    #[error("internal error: heap capacity {0} exceeds the position index range")]
    HeapTooLarge(usize),

    /// Structurally invalid graph (bad period, endpoint or weight row)
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Malformed text input
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for invariant violations that indicate a bug rather than bad input.
    ///
    /// The CLI aborts the whole query stream on these.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::EmptyHeap
                | Error::StateNotQueued(_)
                | Error::DuplicateState(_)
                | Error::HeapCapacity { .. }
                | Error::HeapTooLarge(_)
        )
    }
}

/// Convenience result type for cyclic-route operations
pub type Result<T> = std::result::Result<T, Error>;
