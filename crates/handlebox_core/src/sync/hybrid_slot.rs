//! # Hybrid Slot Allocator
//!
//! A bounded [`SlotAllocator`] behind a [`SeqLock`] for the first `ceiling`
//! indices, plus a mutex-guarded overflow map for everything above.
//!
//! This module requires unsafe code to call the sequence lock's writer
//! side. Every such call happens while holding the state mutex.

#![allow(unsafe_code)]
//!
//! ## Layout
//!
//! ```text
//!   ┌───────────────────────────────┐   ┌─────────────────────────────┐
//!   │ SeqLock<SlotAllocator>        │   │ Mutex<Overflow>             │
//!   │ indices 0..ceiling            │   │ indices ceiling.. (HashMap) │
//!   │ readers: lock-free, retrying  │   │ free: recycled indices      │
//!   └───────────────────────────────┘   └─────────────────────────────┘
//!                  ▲ writes happen only while the mutex is held ┘
//! ```
//!
//! ## Memory
//!
//! The fast arena reserves `ceiling` slots when created so that a reader
//! racing a writer never follows a reallocated buffer. Ceilings are capped
//! at [`HybridConfig::MAX_CEILING`] to keep that reservation bounded.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::HybridConfig;
use crate::error::ConfigResult;
use crate::handle::{Handle, HandleLayout};
use crate::slot::SlotAllocator;
use crate::sync::SeqLock;

/// Entries at or above the ceiling.
#[derive(Debug)]
struct Overflow<T> {
    /// Index to `(issued handle, item)`.
    entries: HashMap<usize, (Handle, T)>,
    /// Removed indices with the generation their next occupant receives.
    free: Vec<(usize, u64)>,
    /// Lowest overflow index never issued.
    next_index: usize,
}

impl<T> Overflow<T> {
    fn new(ceiling: usize) -> Self {
        Self {
            entries: HashMap::new(),
            free: Vec::new(),
            next_index: ceiling,
        }
    }

    /// Picks the next overflow index and its generation, reusing removed
    /// indices first.
    fn claim<L: HandleLayout>(&mut self) -> Option<(usize, u64)> {
        if let Some(reused) = self.free.pop() {
            return Some(reused);
        }
        let index = self.next_index;
        if index >= L::max_entries() {
            return None;
        }
        self.next_index = index + 1;
        Some((index, 1))
    }

    /// Frees `index`, advancing past the generation of `handle`.
    fn release<L: HandleLayout>(&mut self, index: usize, handle: Handle) {
        let generation = L::next_generation(L::generation_of(handle));
        self.free.push((index, generation));
    }
}

/// Slot allocator with lock-free reads for low indices.
///
/// All methods take `&self`. Mutations serialize on an internal mutex;
/// [`get`](Self::get) on a fast-path handle never blocks.
///
/// Overflow handles start at the ceiling with generation 1. A removed
/// overflow index is reused by a later `add` with the next generation, so
/// the removed handle stays dead.
///
/// # Example
///
/// ```rust
/// use handlebox_core::{HandleLayout, HybridSlotAllocator, StandardLayout};
///
/// let slots: HybridSlotAllocator<StandardLayout, u64> = HybridSlotAllocator::new(2);
///
/// let a = slots.add(10, 1);
/// let b = slots.add(20, 1);
/// let c = slots.add(30, 1);
///
/// assert_eq!(StandardLayout::index_of(c), 2);
/// assert_eq!(slots.get(a), Some(10));
/// assert_eq!(slots.get(c), Some(30));
/// assert!(slots.remove(b));
/// assert_eq!(slots.get(b), None);
/// ```
#[derive(Debug)]
pub struct HybridSlotAllocator<L: HandleLayout, T> {
    ceiling: usize,
    fast: SeqLock<SlotAllocator<L, T>>,
    state: Mutex<Overflow<T>>,
}

impl<L: HandleLayout, T: Copy + Default> HybridSlotAllocator<L, T> {
    /// Creates an allocator whose fast arena covers indices `0..ceiling`.
    ///
    /// The ceiling is clamped to the index space of `L` and to
    /// [`HybridConfig::MAX_CEILING`].
    #[must_use]
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.min(L::max_entries()).min(HybridConfig::MAX_CEILING);
        Self {
            ceiling,
            fast: SeqLock::new(SlotAllocator::bounded(ceiling)),
            state: Mutex::new(Overflow::new(ceiling)),
        }
    }

    /// Creates an allocator from a validated configuration, chaining
    /// `initial_capacity` fast slots up front.
    ///
    /// # Errors
    ///
    /// Returns the [`HybridConfig::validate`] failure for `L`.
    pub fn from_config(config: &HybridConfig) -> ConfigResult<Self> {
        config.validate::<L>()?;
        let mut allocator = Self::new(config.ceiling);
        allocator.fast.get_mut().reserve(config.initial_capacity);
        Ok(allocator)
    }

    /// Returns the first index served by the overflow map.
    #[inline]
    #[must_use]
    pub const fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Returns the number of live entries across both halves.
    #[must_use]
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        self.peek_fast(&state).len() + state.entries.len()
    }

    /// Returns true if neither half holds a live entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds an item, preferring the fast arena while it has free slots.
    ///
    /// # Returns
    ///
    /// The new handle, or [`Handle::INVALID`] if `ty` is 0 or the whole
    /// index space is used up.
    pub fn add(&self, item: T, ty: u64) -> Handle {
        if ty == 0 {
            return Handle::INVALID;
        }

        let mut state = self.state.lock();
        if self.peek_fast(&state).next_free_index() < self.ceiling {
            return self.write_fast(&state, |fast| fast.add(item, ty));
        }

        let Some((index, generation)) = state.claim::<L>() else {
            warn!(live = state.entries.len(), "hybrid slot allocator exhausted");
            return Handle::INVALID;
        };
        let handle = L::make(index, generation, ty);
        state.entries.insert(index, (handle, item));

        debug!(%handle, index, "slot routed to overflow map");
        handle
    }

    /// Inserts an item under a previously issued handle.
    ///
    /// Low indices go through [`SlotAllocator::add_at_fixed_index`] and share
    /// its overwrite precondition. High indices replace any overflow entry at
    /// that index, leave the recycle list, and push the issuing cursor past
    /// them. Indices the cursor skips this way are not issued by `add`.
    pub fn add_at_fixed_index(&self, handle: Handle, item: T, ty: u64) -> Handle {
        if ty == 0 {
            return Handle::INVALID;
        }

        let index = L::index_of(handle);
        let mut state = self.state.lock();
        if index < self.ceiling {
            return self.write_fast(&state, |fast| fast.add_at_fixed_index(handle, item, ty));
        }

        state.free.retain(|(free, _)| *free != index);
        state.entries.insert(index, (handle, item));
        if index >= state.next_index {
            state.next_index = index + 1;
        }
        trace!(%handle, index, next_index = state.next_index, "fixed overflow slot added");
        handle
    }

    /// Removes a live entry. Stale handles are ignored.
    pub fn remove(&self, handle: Handle) -> bool {
        let index = L::index_of(handle);
        let mut state = self.state.lock();
        if index < self.ceiling {
            return self.write_fast(&state, |fast| fast.remove(handle));
        }

        let live = state
            .entries
            .get(&index)
            .is_some_and(|(stored, _)| *stored == handle);
        if live {
            state.entries.remove(&index);
            state.release::<L>(index, handle);
            trace!(%handle, index, "overflow slot removed");
        }
        live
    }

    /// Copies out the item for a live handle.
    ///
    /// Fast-path handles are read without locking; a read that overlaps a
    /// write is retried.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<T> {
        let index = L::index_of(handle);
        if index < self.ceiling {
            return self.fast.read(|fast| fast.get(handle).copied());
        }

        let state = self.state.lock();
        state
            .entries
            .get(&index)
            .filter(|(stored, _)| *stored == handle)
            .map(|(_, item)| *item)
    }

    /// Checks if `handle` refers to a live entry.
    #[must_use]
    pub fn is_live(&self, handle: Handle) -> bool {
        let index = L::index_of(handle);
        if index < self.ceiling {
            return self.fast.read(|fast| fast.is_live(handle));
        }

        let state = self.state.lock();
        state
            .entries
            .get(&index)
            .is_some_and(|(stored, _)| *stored == handle)
    }

    /// Runs `f` on the item for a live handle under the writer lock.
    ///
    /// # Returns
    ///
    /// `f`'s result, or `None` if the handle is not live.
    pub fn update<R, F>(&self, handle: Handle, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let index = L::index_of(handle);
        let mut state = self.state.lock();
        if index < self.ceiling {
            return self.write_fast(&state, |fast| fast.get_mut(handle).map(f));
        }

        state
            .entries
            .get_mut(&index)
            .filter(|(stored, _)| *stored == handle)
            .map(|(_, item)| f(item))
    }

    /// Drops every entry. Handles issued before the clear stay dead on both
    /// sides of the ceiling.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        self.write_fast(&state, SlotAllocator::clear);
        let Overflow { entries, free, .. } = &mut *state;
        for (index, (handle, _)) in entries.drain() {
            free.push((index, L::next_generation(L::generation_of(handle))));
        }
    }

    /// Visits live entries as `(true, handle, item)`: the fast arena in
    /// index order, then the overflow map in arbitrary order.
    ///
    /// The writer lock is held for the whole walk, so `f` must not call
    /// back into this allocator.
    pub fn for_each_live_entry<F>(&self, mut f: F)
    where
        F: FnMut(bool, Handle, &T),
    {
        let state = self.state.lock();
        self.peek_fast(&state).for_each_live_entry_const(&mut f);
        for (handle, item) in state.entries.values() {
            f(true, *handle, item);
        }
    }

    /// Like [`for_each_live_entry`](Self::for_each_live_entry), with mutable
    /// access to each item.
    pub fn for_each_live_entry_mut<F>(&self, mut f: F)
    where
        F: FnMut(bool, Handle, &mut T),
    {
        let mut state = self.state.lock();
        self.write_fast(&state, |fast| fast.for_each_live_entry(&mut f));
        for (handle, item) in state.entries.values_mut() {
            f(true, *handle, item);
        }
    }

    /// Fast arena view for a caller holding the state lock.
    fn peek_fast<'a>(&'a self, _held: &'a Overflow<T>) -> &'a SlotAllocator<L, T> {
        // SAFETY: `Overflow` is only reachable through `self.state`, so the
        // caller holds the mutex that every fast-arena writer takes.
        unsafe { self.fast.peek() }
    }

    /// Mutates the fast arena for a caller holding the state lock.
    fn write_fast<R>(&self, _held: &Overflow<T>, f: impl FnOnce(&mut SlotAllocator<L, T>) -> R) -> R {
        // SAFETY: as in `peek_fast`; holding the mutex makes this the only
        // writer, and no `peek_fast` reference outlives its guard borrow.
        unsafe { self.fast.write(f) }
    }
}

impl<L: HandleLayout, T: Copy + Default + PartialEq> HybridSlotAllocator<L, T> {
    /// Like [`get`](Self::get), but treats a default-valued item as absent.
    #[must_use]
    pub fn get_except_zero(&self, handle: Handle) -> Option<T> {
        self.get(handle).filter(|item| *item != T::default())
    }
}

impl<L: HandleLayout, T: Copy + Default> Default for HybridSlotAllocator<L, T> {
    fn default() -> Self {
        Self::new(HybridConfig::DEFAULT_CEILING)
    }
}
