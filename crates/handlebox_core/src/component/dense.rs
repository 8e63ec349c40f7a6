//! # Dense Component Array
//!
//! Data addressed directly by the index bits of an entity handle.
//!
//! There is no free list and no generation check: the caller decides when a
//! slot is live. A handle whose index has been reused by a newer entity
//! resolves to whatever that newer entity stored.

use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::handle::{Handle, HandleLayout};

#[derive(Clone, Debug, Default)]
struct DenseSlot<D> {
    live: bool,
    handle: Handle,
    data: D,
}

/// Flat array of component data indexed by entity.
///
/// # Example
///
/// ```rust
/// use handlebox_core::{DenseComponentArray, HandleLayout, StandardLayout};
///
/// let mut positions: DenseComponentArray<StandardLayout, [f32; 3]> = DenseComponentArray::new();
/// let entity = StandardLayout::make(10, 1, 1);
///
/// positions.add(entity, [1.0, 2.0, 3.0]);
/// assert_eq!(positions.get(entity), Some(&[1.0, 2.0, 3.0]));
///
/// positions.remove(entity);
/// assert_eq!(positions.get(entity), None);
/// ```
#[derive(Clone, Debug)]
pub struct DenseComponentArray<L: HandleLayout, D> {
    items: Vec<DenseSlot<D>>,
    live_count: usize,
    _layout: PhantomData<L>,
}

impl<L: HandleLayout, D: Default> DenseComponentArray<L, D> {
    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            live_count: 0,
            _layout: PhantomData,
        }
    }

    /// Creates an array covering indices `0..capacity` up front.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut array = Self::new();
        array.items.resize_with(capacity, DenseSlot::default);
        array
    }

    /// Returns the number of live slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if no slot is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Returns the number of addressable slots currently allocated.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Stores `data` for `entity`, replacing anything already there.
    ///
    /// # Returns
    ///
    /// `entity`, unchanged.
    pub fn add(&mut self, entity: Handle, data: D) -> Handle {
        let index = L::index_of(entity);
        let slot = self.slot_mut(index);
        let was_live = slot.live;
        slot.live = true;
        slot.handle = entity;
        slot.data = data;
        if !was_live {
            self.live_count += 1;
        }
        trace!(%entity, index, "dense component added");
        entity
    }

    /// Marks the slot for `entity` as not live. The data stays in place.
    pub fn remove(&mut self, entity: Handle) -> bool {
        match self.items.get_mut(L::index_of(entity)) {
            Some(slot) if slot.live => {
                slot.live = false;
                self.live_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Gets the data for `entity` if its slot is live. Never allocates.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Handle) -> Option<&D> {
        self.items
            .get(L::index_of(entity))
            .filter(|slot| slot.live)
            .map(|slot| &slot.data)
    }

    /// Gets the data for `entity` mutably.
    ///
    /// Like a write, this grows the array to cover the index even when the
    /// slot turns out not to be live.
    pub fn get_mut(&mut self, entity: Handle) -> Option<&mut D> {
        let slot = self.slot_mut(L::index_of(entity));
        slot.live.then_some(&mut slot.data)
    }

    /// Drops the backing array.
    pub fn clear(&mut self) {
        self.items = Vec::new();
        self.live_count = 0;
    }

    /// Iterates over live slots as `(handle, data)`.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &D)> + '_ {
        self.items
            .iter()
            .filter(|slot| slot.live)
            .map(|slot| (slot.handle, &slot.data))
    }

    /// Visits every slot as `(live, handle, handle, data)`.
    ///
    /// The handle is passed twice so callbacks written for
    /// [`ComponentStore`](crate::ComponentStore) work unchanged.
    pub fn for_each_component<F>(&mut self, mut f: F)
    where
        F: FnMut(bool, Handle, Handle, &mut D),
    {
        for slot in &mut self.items {
            f(slot.live, slot.handle, slot.handle, &mut slot.data);
        }
    }

    /// Visits live slots only.
    pub fn for_each_live_component<F>(&mut self, mut f: F)
    where
        F: FnMut(bool, Handle, Handle, &mut D),
    {
        for slot in self.items.iter_mut().filter(|slot| slot.live) {
            f(true, slot.handle, slot.handle, &mut slot.data);
        }
    }

    /// Visits live slots only, without mutable access.
    pub fn for_each_live_component_const<F>(&self, mut f: F)
    where
        F: FnMut(bool, Handle, Handle, &D),
    {
        for (handle, data) in self.iter() {
            f(true, handle, handle, data);
        }
    }

    /// Slot at `index`, growing the array to `(index + 1) * 2` if needed.
    fn slot_mut(&mut self, index: usize) -> &mut DenseSlot<D> {
        if index >= self.items.len() {
            let next = index.saturating_add(1).saturating_mul(2);
            debug!(current = self.items.len(), next, "growing dense component array");
            self.items.resize_with(next, DenseSlot::default);
        }
        &mut self.items[index]
    }
}

impl<L: HandleLayout, D: Default> Default for DenseComponentArray<L, D> {
    fn default() -> Self {
        Self::new()
    }
}
