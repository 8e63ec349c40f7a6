//! # Concurrent Access
//!
//! ```text
//! Writer thread:   add / remove / clear   ──► mutex ──► seqlock write
//! Reader threads:  get                    ──► seqlock read (retry on tear)
//! ```
//!
//! Only the fast arena of [`HybridSlotAllocator`] is readable without a
//! lock. Everything else in this crate expects the caller to serialize
//! access.

mod hybrid_slot;
mod seqlock;

pub use hybrid_slot::HybridSlotAllocator;
pub use seqlock::SeqLock;
