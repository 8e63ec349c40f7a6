//! # Slot Allocation
//!
//! Generational slot arena and its snapshot format.
//!
//! ## Guarantees
//!
//! - A removed handle never resolves again until its slot's generation
//!   wraps around (`2^GENERATION_BITS - 1` reuses later)
//! - Freed slots are reused most-recent-first
//! - Growth never invalidates existing handles

mod allocator;
mod snapshot;

pub use allocator::SlotAllocator;
pub use snapshot::{SlotRecord, SlotSnapshot};
