//! # Slot Allocator
//!
//! A growable arena of generational slots threaded by an intrusive free list.
//!
//! ```text
//!   first_free ──┐
//!                ▼
//!   index:   0        1        2        3        4
//!          ┌──────┐ ┌──────┐ ┌──────┐ ┌──────┐ ┌──────┐
//!          │ live │ │ free │ │ live │ │ free │ │ free │──► 5 (one past the end)
//!          │ g=3  │ │ g=2  │ │ g=1  │ │ g=1  │ │ g=1  │
//!          └──────┘ └──┬───┘ └──────┘ └──▲─┬─┘ └──▲───┘
//!                      └─────────────────┘ └──────┘
//! ```
//!
//! A free slot's `live_generation` already holds the generation its next
//! occupant will receive. The last link of the free list points one past the
//! initialized slots and is resolved when the arena grows.

use std::marker::PhantomData;

use tracing::{debug, error, trace, warn};

use crate::error::{SlotError, SlotResult};
use crate::handle::{Handle, HandleLayout};

/// One array position of a [`SlotAllocator`].
#[derive(Clone, Debug)]
struct Slot<T> {
    /// Last handle stamped into this slot.
    handle: Handle,
    /// Next free index; meaningful only while the slot is free.
    next_free: usize,
    /// Generation of the current occupant, or of the next one if free.
    live_generation: u64,
    item: T,
}

impl<T: Default> Slot<T> {
    /// A never-used slot chained to its right neighbour.
    fn vacant<L: HandleLayout>(index: usize, ty: u64) -> Self {
        Self {
            handle: L::make(index, 0, ty),
            next_free: index + 1,
            live_generation: 1,
            item: T::default(),
        }
    }
}

impl<T> Slot<T> {
    /// A slot is occupied when its stored handle carries the live generation.
    #[inline]
    fn is_occupied<L: HandleLayout>(&self) -> bool {
        L::generation_of(self.handle) == self.live_generation
    }
}

/// Where a fixed insertion lands relative to the free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FixedTarget {
    /// The target is the head of the free list.
    Head,
    /// The target is live already.
    Occupied,
    /// The target is free but somewhere behind the head.
    Interior,
}

/// Generational arena mapping [`Handle`]s to items.
///
/// Handles combine the slot index, the slot's generation and a caller type
/// tag. Removing an entry advances the slot's generation, so every handle
/// issued for the previous occupant stops resolving.
///
/// # Thread Safety
///
/// Not internally synchronized. Wrap it in a lock, or use
/// [`HybridSlotAllocator`](crate::HybridSlotAllocator) for lock-free reads.
///
/// # Example
///
/// ```rust
/// use handlebox_core::{HandleLayout, SlotAllocator, StandardLayout};
///
/// let mut slots: SlotAllocator<StandardLayout, u32> = SlotAllocator::new();
///
/// let h1 = slots.add(1, 5);
/// assert_eq!(slots.get(h1), Some(&1));
///
/// slots.remove(h1);
/// assert_eq!(slots.get(h1), None);
///
/// let h2 = slots.add(2, 5);
/// assert_eq!(StandardLayout::index_of(h2), StandardLayout::index_of(h1));
/// assert_ne!(StandardLayout::generation_of(h2), StandardLayout::generation_of(h1));
/// ```
#[derive(Clone, Debug)]
pub struct SlotAllocator<L: HandleLayout, T> {
    /// The slot array.
    slots: Vec<Slot<T>>,
    /// Head of the free list.
    first_free: usize,
    /// Number of live slots.
    live_count: usize,
    /// Maximum number of slots, at most `2^INDEX_BITS`.
    limit: usize,
    _layout: PhantomData<L>,
}

impl<L: HandleLayout, T> SlotAllocator<L, T> {
    /// Creates an empty allocator addressing the full index space.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            first_free: 0,
            live_count: 0,
            limit: L::max_entries(),
            _layout: PhantomData,
        }
    }

    /// Returns the number of live entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if no entry is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Returns the number of initialized slots, live or free.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the maximum number of live entries.
    #[inline]
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.limit
    }

    /// Returns the index the next [`add`](Self::add) will use.
    #[inline]
    #[must_use]
    pub const fn next_free_index(&self) -> usize {
        self.first_free
    }

    /// Checks if `handle` refers to a live entry.
    #[inline]
    #[must_use]
    pub fn is_live(&self, handle: Handle) -> bool {
        self.live_slot(handle).is_some()
    }

    /// Gets the item for a live handle.
    ///
    /// The handle must match the slot's current occupant exactly, type tag
    /// included. Out-of-range indices and stale generations yield `None`.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.live_slot(handle).map(|slot| &slot.item)
    }

    /// Gets the item for a live handle, mutably.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.live_slot_mut(handle).map(|slot| &mut slot.item)
    }

    /// Iterates over live entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.is_occupied::<L>())
            .map(|slot| (slot.handle, &slot.item))
    }

    /// Iterates mutably over live entries in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .filter(|slot| slot.is_occupied::<L>())
            .map(|slot| (slot.handle, &mut slot.item))
    }

    /// Iterates over every initialized slot with its liveness.
    ///
    /// Free slots report the handle they last held (or a generation-0 handle
    /// if never used) and a default item.
    pub fn entries(&self) -> impl Iterator<Item = (bool, Handle, &T)> + '_ {
        self.slots
            .iter()
            .map(|slot| (slot.is_occupied::<L>(), slot.handle, &slot.item))
    }

    /// Iterates mutably over every initialized slot with its liveness.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = (bool, Handle, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .map(|slot| (slot.is_occupied::<L>(), slot.handle, &mut slot.item))
    }

    /// Visits every slot as `(live, handle, item)`, in index order.
    pub fn for_each_entry<F>(&mut self, mut f: F)
    where
        F: FnMut(bool, Handle, &mut T),
    {
        for (live, handle, item) in self.entries_mut() {
            f(live, handle, item);
        }
    }

    /// Visits live slots only, as `(true, handle, item)`.
    pub fn for_each_live_entry<F>(&mut self, mut f: F)
    where
        F: FnMut(bool, Handle, &mut T),
    {
        for (handle, item) in self.iter_mut() {
            f(true, handle, item);
        }
    }

    /// Visits live slots only, without mutable access.
    pub fn for_each_live_entry_const<F>(&self, mut f: F)
    where
        F: FnMut(bool, Handle, &T),
    {
        for (handle, item) in self.iter() {
            f(true, handle, item);
        }
    }

    /// Walks the arena and verifies the free list and live count.
    ///
    /// Checks that the free list visits every non-live slot exactly once,
    /// never passes through a live slot, and ends past the initialized
    /// slots; that the live count matches; and that no live slot holds
    /// generation 0.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn check_invariants(&self) -> SlotResult<()> {
        if self.live_count > self.limit || self.slots.len() > self.limit {
            return Err(SlotError::LiveCountMismatch {
                expected: self.limit,
                actual: self.live_count.max(self.slots.len()),
            });
        }

        let mut occupied = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.is_occupied::<L>() {
                occupied += 1;
                if slot.live_generation == 0 {
                    return Err(SlotError::ZeroGeneration { index });
                }
            }
        }
        if occupied != self.live_count {
            return Err(SlotError::LiveCountMismatch {
                expected: self.live_count,
                actual: occupied,
            });
        }

        let mut visited = vec![false; self.slots.len()];
        let mut free = 0;
        let mut cursor = self.first_free;
        while let Some(slot) = self.slots.get(cursor) {
            if visited[cursor] || slot.is_occupied::<L>() {
                return Err(SlotError::CorruptFreeList { index: cursor });
            }
            visited[cursor] = true;
            free += 1;
            cursor = slot.next_free;
        }
        if free + occupied != self.slots.len() {
            return Err(SlotError::CorruptFreeList { index: cursor });
        }

        Ok(())
    }

    #[inline]
    fn live_slot(&self, handle: Handle) -> Option<&Slot<T>> {
        let slot = self.slots.get(L::index_of(handle))?;
        (slot.is_occupied::<L>() && slot.handle == handle).then_some(slot)
    }

    #[inline]
    fn live_slot_mut(&mut self, handle: Handle) -> Option<&mut Slot<T>> {
        let slot = self.slots.get_mut(L::index_of(handle))?;
        (slot.is_occupied::<L>() && slot.handle == handle).then_some(slot)
    }

    /// Rejects insertions with a reserved type or when every slot is live.
    fn check_admission(&self, ty: u64) -> SlotResult<()> {
        if ty == 0 {
            return Err(SlotError::InvalidType);
        }
        if self.live_count >= self.limit {
            warn!(limit = self.limit, "slot allocator exhausted");
            return Err(SlotError::CapacityExhausted { limit: self.limit });
        }
        Ok(())
    }

    /// Splices a free, non-head slot out of the free list.
    fn unlink_free(&mut self, target: usize) -> SlotResult<()> {
        let mut prev = self.first_free;
        let mut steps = 0;
        loop {
            let Some(slot) = self.slots.get(prev) else {
                error!(index = target, "fixed insertion target missing from free list");
                return Err(SlotError::CorruptFreeList { index: target });
            };
            if slot.next_free == target {
                break;
            }
            steps += 1;
            if steps > self.slots.len() {
                error!(index = target, "free list walk did not terminate");
                return Err(SlotError::CorruptFreeList { index: target });
            }
            trace!(from = prev, to = slot.next_free, "free list walk");
            prev = slot.next_free;
        }

        let next = self.slots[target].next_free;
        trace!(prev, target, next, "splicing fixed slot out of free list");
        self.slots[prev].next_free = next;
        Ok(())
    }
}

impl<L: HandleLayout, T: Default> SlotAllocator<L, T> {
    /// Creates an allocator with `capacity` slots already initialized and
    /// chained into the free list.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut allocator = Self::new();
        allocator.reserve(capacity);
        allocator
    }

    /// Creates an allocator that never holds more than `limit` slots.
    ///
    /// Storage for all `limit` slots is reserved up front, so the backing
    /// buffer never moves once created. The limit is clamped to the index
    /// space of `L`.
    #[must_use]
    pub fn bounded(limit: usize) -> Self {
        let limit = limit.min(L::max_entries());
        Self {
            slots: Vec::with_capacity(limit),
            first_free: 0,
            live_count: 0,
            limit,
            _layout: PhantomData,
        }
    }

    /// Initializes slots up to `count` (clamped to the limit).
    pub fn reserve(&mut self, count: usize) {
        let count = count.min(self.limit);
        self.grow_to(count, 1);
    }

    /// Removes a live entry, invalidating every copy of its handle.
    ///
    /// Removing a handle that is not live does nothing, so removing twice is
    /// safe. The item is dropped right away and the slot holds a default
    /// value until it is reused.
    ///
    /// # Returns
    ///
    /// `true` if an entry was removed.
    pub fn remove(&mut self, handle: Handle) -> bool {
        let first_free = self.first_free;
        let Some(slot) = self.live_slot_mut(handle) else {
            return false;
        };

        slot.live_generation = L::next_generation(slot.live_generation);
        slot.next_free = first_free;
        slot.item = T::default();

        let index = L::index_of(handle);
        self.first_free = index;
        self.live_count -= 1;

        trace!(%handle, index, next_free = first_free, "slot removed");
        true
    }

    /// Frees every slot while keeping the arena.
    ///
    /// Live slots advance their generation exactly as [`remove`](Self::remove)
    /// would, so no handle issued before the clear resolves afterwards. The
    /// free list is rebuilt in index order.
    pub fn clear(&mut self) {
        let count = self.slots.len();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_occupied::<L>() {
                slot.live_generation = L::next_generation(slot.live_generation);
                slot.item = T::default();
            }
            slot.next_free = index + 1;
        }
        self.first_free = 0;
        self.live_count = 0;
        debug!(slots = count, "slot allocator cleared");
    }

    /// Adds an item and returns its handle.
    ///
    /// # Arguments
    ///
    /// * `item` - The payload to store
    /// * `ty` - Caller type tag, must be non-zero
    ///
    /// # Returns
    ///
    /// The new handle, or [`Handle::INVALID`] if `ty` is 0 or the allocator
    /// is full.
    pub fn add(&mut self, item: T, ty: u64) -> Handle {
        self.try_add(item, ty).unwrap_or(Handle::INVALID)
    }

    /// Adds an item, reporting failures as errors.
    ///
    /// # Errors
    ///
    /// [`SlotError::InvalidType`] for `ty == 0`, [`SlotError::CapacityExhausted`]
    /// or [`SlotError::IndexOutOfRange`] when no slot is available.
    pub fn try_add(&mut self, item: T, ty: u64) -> SlotResult<Handle> {
        self.check_admission(ty)?;

        let index = self.first_free;
        self.ensure_slot(index, ty)?;

        let slot = &mut self.slots[index];
        let handle = L::make(index, slot.live_generation, ty);
        slot.handle = handle;
        slot.item = item;

        self.first_free = slot.next_free;
        self.live_count += 1;

        trace!(%handle, index, first_free = self.first_free, "slot added");
        Ok(handle)
    }

    /// Inserts an item under a previously issued handle, verbatim.
    ///
    /// Used to replay recorded `(handle, item)` pairs so that objects keep
    /// their identity across a snapshot. The target slot may be the free-list
    /// head, a free slot further down the list, or a live slot.
    ///
    /// # Precondition
    ///
    /// If the target slot is already live its item is replaced in place,
    /// without going through [`remove`](Self::remove). Only call this on a
    /// live handle when that overwrite is intended; use
    /// [`try_add_at_fixed_index`](Self::try_add_at_fixed_index) to have it
    /// reported instead.
    ///
    /// # Returns
    ///
    /// `handle` on success, [`Handle::INVALID`] if `ty` is 0, the allocator
    /// is full, or the index is out of range.
    pub fn add_at_fixed_index(&mut self, handle: Handle, item: T, ty: u64) -> Handle {
        self.insert_fixed(handle, item, ty, true)
            .unwrap_or(Handle::INVALID)
    }

    /// Like [`add_at_fixed_index`](Self::add_at_fixed_index), but refuses to
    /// overwrite a live slot.
    ///
    /// # Errors
    ///
    /// [`SlotError::Occupied`] if the slot is live, plus the failures of
    /// [`try_add`](Self::try_add).
    pub fn try_add_at_fixed_index(&mut self, handle: Handle, item: T, ty: u64) -> SlotResult<Handle> {
        self.insert_fixed(handle, item, ty, false)
    }

    fn insert_fixed(&mut self, handle: Handle, item: T, ty: u64, replace: bool) -> SlotResult<Handle> {
        self.check_admission(ty)?;

        let index = L::index_of(handle);
        self.ensure_slot(index, ty)?;

        let target = if self.first_free == index {
            FixedTarget::Head
        } else if self.slots[index].is_occupied::<L>() {
            FixedTarget::Occupied
        } else {
            FixedTarget::Interior
        };

        match target {
            FixedTarget::Head => {
                self.first_free = self.slots[index].next_free;
                self.live_count += 1;
            }
            FixedTarget::Occupied => {
                let current = self.slots[index].handle;
                if !replace {
                    return Err(SlotError::Occupied { handle: current });
                }
                warn!(%current, %handle, "fixed insertion replaced a live slot");
            }
            FixedTarget::Interior => {
                self.unlink_free(index)?;
                self.live_count += 1;
            }
        }

        let slot = &mut self.slots[index];
        slot.handle = handle;
        slot.live_generation = L::generation_of(handle);
        slot.item = item;

        trace!(%handle, index, ?target, first_free = self.first_free, "fixed slot added");
        Ok(handle)
    }

    /// Makes sure `index` is backed by an initialized slot.
    ///
    /// Grows to twice the needed size, clamped to the limit. New slots are
    /// stamped with `ty` and chained in index order, which extends the free
    /// list from its one-past-the-end link.
    fn ensure_slot(&mut self, index: usize, ty: u64) -> SlotResult<()> {
        let needed = index.saturating_add(1);
        if needed > self.limit {
            warn!(index, limit = self.limit, "slot index out of range");
            return Err(SlotError::IndexOutOfRange {
                index,
                limit: self.limit,
            });
        }
        if needed > self.slots.len() {
            let next = needed.saturating_mul(2).min(self.limit);
            self.grow_to(next, ty);
        }
        Ok(())
    }

    fn grow_to(&mut self, count: usize, ty: u64) {
        let current = self.slots.len();
        if count <= current {
            return;
        }
        debug!(current, next = count, "growing slot arena");
        self.slots
            .extend((current..count).map(|index| Slot::vacant::<L>(index, ty)));
    }
}

impl<L: HandleLayout, T> Default for SlotAllocator<L, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{StandardLayout, WideTypeLayout};

    type Basic = SlotAllocator<StandardLayout, i32>;

    #[test]
    fn test_add_get_remove() {
        let mut m = Basic::new();

        let h = m.add(1, 5);
        assert_eq!(m.get(h), Some(&1));
        assert_eq!(m.len(), 1);

        assert!(m.remove(h));
        assert_eq!(m.get(h), None);
        assert!(m.is_empty());

        // Removing twice doesn't affect anything.
        assert!(!m.remove(h));
        assert_eq!(m.get(h), None);
        m.check_invariants().unwrap();
    }

    #[test]
    fn test_slot_reused_with_new_generation() {
        let mut m = Basic::new();

        let h1 = m.add(1, 5);
        m.remove(h1);
        let h2 = m.add(2, 5);

        assert_eq!(StandardLayout::index_of(h2), StandardLayout::index_of(h1));
        assert_ne!(StandardLayout::generation_of(h2), StandardLayout::generation_of(h1));
        assert_eq!(m.get(h1), None);
        assert_eq!(m.get(h2), Some(&2));
    }

    #[test]
    fn test_zero_type_rejected() {
        let mut m = Basic::new();
        assert_eq!(m.add(1, 0), Handle::INVALID);
        assert_eq!(m.try_add(1, 0), Err(SlotError::InvalidType));
        assert!(m.is_empty());
    }

    #[test]
    fn test_free_list_is_lifo() {
        let mut m = Basic::new();
        let a = m.add(1, 1);
        let b = m.add(2, 1);
        let c = m.add(3, 1);

        m.remove(a);
        m.remove(c);
        assert_eq!(m.next_free_index(), StandardLayout::index_of(c));

        let d = m.add(4, 1);
        let e = m.add(5, 1);
        assert_eq!(StandardLayout::index_of(d), StandardLayout::index_of(c));
        assert_eq!(StandardLayout::index_of(e), StandardLayout::index_of(a));
        assert_eq!(m.get(b), Some(&2));
        m.check_invariants().unwrap();
    }

    #[test]
    fn test_get_mut_updates_item() {
        let mut m = Basic::new();
        let h = m.add(10, 3);
        *m.get_mut(h).unwrap() += 5;
        assert_eq!(m.get(h), Some(&15));
    }

    #[test]
    fn test_fabricated_handle_for_free_slot_not_live() {
        let mut m = Basic::with_capacity(4);
        // Slot 2 is initialized and its pending generation is 1, but nothing
        // has been allocated there.
        let fake = StandardLayout::make(2, 1, 5);
        assert!(!m.is_live(fake));
        assert!(!m.remove(fake));
        assert_eq!(m.get_mut(fake), None);
        m.check_invariants().unwrap();
    }

    #[test]
    fn test_out_of_range_get() {
        let m = Basic::new();
        assert_eq!(m.get(StandardLayout::make(1000, 1, 1)), None);
        assert!(!m.is_live(Handle::INVALID));
    }

    #[test]
    fn test_with_capacity_chains_free_list() {
        let mut m = Basic::with_capacity(8);
        assert_eq!(m.slot_count(), 8);
        m.check_invariants().unwrap();

        for expected in 0..8usize {
            let h = m.add(0, 1);
            assert_eq!(StandardLayout::index_of(h), expected);
        }
        m.check_invariants().unwrap();
    }

    #[test]
    fn test_bounded_limit() {
        let mut m: SlotAllocator<StandardLayout, i32> = SlotAllocator::bounded(3);
        assert_eq!(m.max_entries(), 3);
        for i in 0..3 {
            assert!(m.add(i, 1).is_valid());
        }
        assert_eq!(m.add(3, 1), Handle::INVALID);
        assert_eq!(m.try_add(3, 1), Err(SlotError::CapacityExhausted { limit: 3 }));
        assert_eq!(m.slot_count(), 3);
        assert_eq!(
            m.try_add_at_fixed_index(StandardLayout::make(7, 1, 1), 0, 1),
            Err(SlotError::CapacityExhausted { limit: 3 })
        );
    }

    #[test]
    fn test_fixed_index_out_of_range() {
        let mut m: SlotAllocator<StandardLayout, i32> = SlotAllocator::bounded(4);
        let h = StandardLayout::make(4, 1, 2);
        assert_eq!(
            m.try_add_at_fixed_index(h, 1, 5),
            Err(SlotError::IndexOutOfRange { index: 4, limit: 4 })
        );
        assert_eq!(m.add_at_fixed_index(h, 1, 5), Handle::INVALID);
    }

    #[test]
    fn test_fixed_insertion_interior_free_slot() {
        let mut m = Basic::new();
        let h = StandardLayout::make(3, 1, 2);

        assert_eq!(m.add_at_fixed_index(h, 7, 5), h);
        assert_eq!(m.get(h), Some(&7));
        assert_eq!(m.len(), 1);
        m.check_invariants().unwrap();

        // Normal allocation continues from the head, skipping index 3.
        let indices: Vec<usize> = (0..4)
            .map(|i| StandardLayout::index_of(m.add(i, 1)))
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 4]);
        m.check_invariants().unwrap();
    }

    #[test]
    fn test_fixed_insertion_overwrites_live_slot() {
        let mut m = Basic::new();
        let h = m.add(1, 5);

        assert_eq!(m.add_at_fixed_index(h, 9, 5), h);
        assert_eq!(m.get(h), Some(&9));
        assert_eq!(m.len(), 1);
        m.check_invariants().unwrap();
    }

    #[test]
    fn test_try_fixed_insertion_reports_occupied() {
        let mut m = Basic::new();
        let h = m.add(1, 5);

        assert_eq!(
            m.try_add_at_fixed_index(h, 9, 5),
            Err(SlotError::Occupied { handle: h })
        );
        assert_eq!(m.get(h), Some(&1));
    }

    #[test]
    fn test_generation_wraps_on_small_field() {
        // 16 generation bits: after 0xffff comes 1.
        let mut m: SlotAllocator<WideTypeLayout, i32> = SlotAllocator::new();
        let mut previous = 0;
        for _ in 0..(1 << 16) + 4 {
            let h = m.add(1, 5);
            let generation = WideTypeLayout::generation_of(h);
            assert_ne!(generation, 0);
            assert_ne!(generation, previous);
            previous = generation;
            m.remove(h);
        }
        assert_eq!(m.slot_count(), 2);
    }

    #[test]
    fn test_entries_report_liveness() {
        let mut m = Basic::new();
        let a = m.add(1, 5);
        let b = m.add(2, 5);
        m.remove(a);

        let flags: Vec<(bool, Handle)> = m.entries().map(|(live, h, _)| (live, h)).collect();
        assert_eq!(flags.len(), m.slot_count());
        assert_eq!(flags[0], (false, a));
        assert_eq!(flags[1], (true, b));
        assert!(flags[2..].iter().all(|(live, _)| !live));
    }

    #[test]
    fn test_for_each_live_entry_mutates() {
        let mut m = Basic::new();
        let a = m.add(1, 5);
        let b = m.add(2, 5);

        m.for_each_live_entry(|live, _, item| {
            assert!(live);
            *item *= 10;
        });

        assert_eq!(m.get(a), Some(&10));
        assert_eq!(m.get(b), Some(&20));

        let mut sum = 0;
        m.for_each_live_entry_const(|_, _, item| sum += *item);
        assert_eq!(sum, 30);
    }

    #[test]
    fn test_clear_resets() {
        let mut m = Basic::new();
        let h = m.add(1, 5);
        m.clear();
        assert_eq!(m.get(h), None);
        assert!(m.is_empty());
        assert_eq!(m.next_free_index(), 0);
        m.check_invariants().unwrap();
    }

    #[test]
    fn test_handles_stay_dead_across_clear() {
        let mut m = Basic::new();
        let a = m.add(1, 5);
        let b = m.add(2, 5);
        let c = m.add(3, 5);
        m.remove(b);

        m.clear();
        let fresh: Vec<Handle> = (10..13).map(|i| m.add(i, 5)).collect();

        let indices: Vec<usize> = fresh.iter().map(|h| StandardLayout::index_of(*h)).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        for old in [a, b, c] {
            assert!(!fresh.contains(&old));
            assert_eq!(m.get(old), None);
            assert!(!m.remove(old));
        }
        assert_eq!(m.get(fresh[0]), Some(&10));
        m.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_drops_item() {
        use std::rc::Rc;

        let payload = Rc::new(7);
        let mut m: SlotAllocator<StandardLayout, Option<Rc<i32>>> = SlotAllocator::new();
        let h = m.add(Some(Rc::clone(&payload)), 1);
        assert_eq!(Rc::strong_count(&payload), 2);

        m.remove(h);
        assert_eq!(Rc::strong_count(&payload), 1);

        let h = m.add(Some(Rc::clone(&payload)), 1);
        m.clear();
        assert_eq!(Rc::strong_count(&payload), 1);
        assert_eq!(m.get(h), None);
    }
}
