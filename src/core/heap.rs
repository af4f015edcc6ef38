//! Indexed binary min-heap with decrease-key
//!
//! Entries are `(state, distance, phase)`. A position index maps every queued
//! state to its current slot, so `decrease_key` finds its entry in O(1) and
//! sifts up in O(log n). The index is the single source of truth for
//! membership: `INVALID_HANDLE` means "not in the heap" (never inserted or
//! already extracted).
//!
//! Capacity is fixed at build time and bounds the state id space; the heap
//! never reallocates during a query.

use crate::core::error::{Error, Result};
use crate::core::graph::{Phase, StateId};

const INVALID_HANDLE: u32 = u32::MAX;

/// Tentative distance of a state; `INFINITY` marks "not reached"
pub type Distance = u64;

pub const INFINITY: Distance = Distance::MAX;

/// One queued state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapEntry {
    pub state: StateId,
    pub distance: Distance,
    pub phase: Phase,
}

/// Binary min-heap over [`HeapEntry`] keyed by distance
#[derive(Debug)]
pub struct IndexedMinHeap {
    entries: Vec<HeapEntry>,
    /// state -> slot in `entries`
    positions: Vec<u32>,
}

impl IndexedMinHeap {
    /// Empty heap for states `0..capacity`.
    ///
    /// Slots are stored as `u32` with `u32::MAX` reserved, so `capacity` is
    /// limited to `u32::MAX`.
    pub fn build(capacity: usize) -> Result<Self> {
        if capacity > INVALID_HANDLE as usize {
            return Err(Error::HeapTooLarge(capacity));
        }
        Ok(Self {
            entries: Vec::with_capacity(capacity),
            positions: vec![INVALID_HANDLE; capacity],
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn contains(&self, state: StateId) -> bool {
        self.positions
            .get(state as usize)
            .is_some_and(|&pos| pos != INVALID_HANDLE)
    }

    /// Minimum entry without removing it
    #[inline]
    pub fn peek(&self) -> Option<&HeapEntry> {
        self.entries.first()
    }

    /// Bulk-load entries, then restore heap order bottom-up.
    ///
    /// On error nothing from this batch stays in the heap.
    pub fn insert_all<I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = HeapEntry>,
    {
        let start = self.entries.len();
        for entry in entries {
            if let Err(err) = self.append(entry) {
                for removed in self.entries.drain(start..) {
                    self.positions[removed.state as usize] = INVALID_HANDLE;
                }
                return Err(err);
            }
        }

        for pos in (0..self.entries.len() / 2).rev() {
            self.heapify_down(pos);
        }
        Ok(())
    }

    /// Remove and return the entry with the smallest distance
    pub fn extract_min(&mut self) -> Result<HeapEntry> {
        if self.entries.is_empty() {
            return Err(Error::EmptyHeap);
        }
        let last_idx = self.entries.len() - 1;
        self.entries.swap(0, last_idx);
        let result = self.entries.pop().ok_or(Error::EmptyHeap)?;
        self.positions[result.state as usize] = INVALID_HANDLE;

        if !self.entries.is_empty() {
            // Element that moved to the root
            self.positions[self.entries[0].state as usize] = 0;
            self.heapify_down(0);
        }
        Ok(result)
    }

    /// Lower the distance of a queued state and record the phase it was
    /// reached at.
    ///
    /// Returns `Ok(false)` without touching the heap when `distance` is not
    /// smaller than the queued one.
    pub fn decrease_key(
        &mut self,
        state: StateId,
        distance: Distance,
        phase: Phase,
    ) -> Result<bool> {
        if !self.contains(state) {
            return Err(Error::StateNotQueued(state));
        }
        let pos = self.positions[state as usize] as usize;
        debug_assert_eq!(self.entries[pos].state, state);

        if distance >= self.entries[pos].distance {
            return Ok(false);
        }
        self.entries[pos].distance = distance;
        self.entries[pos].phase = phase;
        self.heapify_up(pos);
        Ok(true)
    }

    fn append(&mut self, entry: HeapEntry) -> Result<()> {
        let state = entry.state as usize;
        if state >= self.positions.len() {
            return Err(Error::HeapCapacity {
                capacity: self.positions.len(),
                state: entry.state,
            });
        }
        if self.positions[state] != INVALID_HANDLE {
            return Err(Error::DuplicateState(entry.state));
        }
        self.positions[state] = self.entries.len() as u32;
        self.entries.push(entry);
        Ok(())
    }

    #[inline]
    fn parent(index: usize) -> usize {
        (index - 1) / 2
    }

    #[inline]
    fn heapify_up(&mut self, mut pos: usize) {
        let item = self.entries[pos];
        while pos > 0 {
            let parent_pos = Self::parent(pos);
            if item.distance >= self.entries[parent_pos].distance {
                break;
            }
            // Move parent down
            let parent_item = self.entries[parent_pos];
            self.entries[pos] = parent_item;
            self.positions[parent_item.state as usize] = pos as u32;
            pos = parent_pos;
        }
        self.entries[pos] = item;
        self.positions[item.state as usize] = pos as u32;
    }

    #[inline]
    fn heapify_down(&mut self, mut pos: usize) {
        let item = self.entries[pos];
        let len = self.entries.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let min_child = if right < len
                && self.entries[right].distance < self.entries[left].distance
            {
                right
            } else {
                left
            };
            if item.distance <= self.entries[min_child].distance {
                break;
            }
            // Move min child up
            let child_item = self.entries[min_child];
            self.entries[pos] = child_item;
            self.positions[child_item.state as usize] = pos as u32;
            pos = min_child;
        }
        self.entries[pos] = item;
        self.positions[item.state as usize] = pos as u32;
    }
}
