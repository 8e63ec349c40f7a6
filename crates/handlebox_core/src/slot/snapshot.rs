//! # Snapshot and Replay
//!
//! Captures the live `(handle, item)` pairs of a [`SlotAllocator`] so they
//! can be recreated later with identical handles. Replay goes through
//! [`SlotAllocator::try_add_at_fixed_index`], so restored handles keep both
//! their index and their generation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SlotResult;
use crate::handle::{Handle, HandleLayout};
use crate::slot::SlotAllocator;

/// One recorded live entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord<T> {
    /// The handle the entry was issued.
    pub handle: Handle,
    /// The stored item.
    pub item: T,
}

/// Live entries of an allocator, in index order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot<T> {
    /// The recorded entries.
    pub records: Vec<SlotRecord<T>>,
}

impl<T> SlotSnapshot<T> {
    /// Returns the number of recorded entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the recorded handles, stable-sorted by type tag.
    ///
    /// Replaying in this order recreates every object of one kind before
    /// any object of the next kind.
    #[must_use]
    pub fn sorted_by_type<L: HandleLayout>(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self.records.iter().map(|record| record.handle).collect();
        L::sort_by_type(&mut handles);
        handles
    }
}

impl<L: HandleLayout, T: Clone> SlotAllocator<L, T> {
    /// Records every live entry.
    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot<T> {
        SlotSnapshot {
            records: self
                .iter()
                .map(|(handle, item)| SlotRecord {
                    handle,
                    item: item.clone(),
                })
                .collect(),
        }
    }
}

impl<L: HandleLayout, T: Clone + Default> SlotAllocator<L, T> {
    /// Clears the allocator and reinserts every recorded entry under its
    /// recorded handle.
    ///
    /// Handles issued before the restore that the snapshot does not record
    /// do not resolve afterwards, even once their slots are reused.
    ///
    /// # Returns
    ///
    /// The number of entries restored.
    ///
    /// # Errors
    ///
    /// Stops at the first record that cannot be placed: a zero type tag,
    /// an index beyond the limit, or two records for the same slot
    /// ([`SlotError::Occupied`](crate::SlotError::Occupied)).
    pub fn restore(&mut self, snapshot: &SlotSnapshot<T>) -> SlotResult<usize> {
        self.clear();
        for record in &snapshot.records {
            self.try_add_at_fixed_index(record.handle, record.item.clone(), L::type_of(record.handle))?;
        }
        debug!(restored = snapshot.len(), "slot allocator restored");
        Ok(snapshot.len())
    }
}
