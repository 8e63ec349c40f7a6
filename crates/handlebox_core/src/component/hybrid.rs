//! # Hybrid Component Store
//!
//! Raw indices below a ceiling go to a [`DenseComponentArray`]; indices at
//! or above it go to a hash map. Small dense id spaces get array speed while
//! sparse outliers cost only a map entry.
//!
//! ```text
//!   index:  0 ─────────────── ceiling-1 │ ceiling ───────────────► u64::MAX
//!           DenseComponentArray         │ HashMap<u64, D>
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::component::DenseComponentArray;
use crate::config::HybridConfig;
use crate::handle::{Handle, HandleLayout};

/// Component data keyed by raw index, split between an array and a map.
///
/// # Example
///
/// ```rust
/// use handlebox_core::{HybridComponentStore, StandardLayout};
///
/// let mut store: HybridComponentStore<StandardLayout, u32> = HybridComponentStore::new(16);
/// store.add(3, 30);
/// store.add(1_000_000, 7);
///
/// assert_eq!(store.get(3), Some(&30));
/// assert_eq!(store.get(1_000_000), Some(&7));
/// assert!(store.routes_to_fast(15));
/// assert!(!store.routes_to_fast(16));
/// ```
#[derive(Clone, Debug)]
pub struct HybridComponentStore<L: HandleLayout, D> {
    ceiling: u64,
    fast: DenseComponentArray<L, D>,
    overflow: HashMap<u64, D>,
}

impl<L: HandleLayout, D: Default> HybridComponentStore<L, D> {
    /// Creates a store whose fast array covers indices `0..ceiling`.
    ///
    /// The ceiling is clamped to the index space of `L`.
    #[must_use]
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.min(L::max_entries());
        Self {
            ceiling: ceiling as u64,
            fast: DenseComponentArray::new(),
            overflow: HashMap::new(),
        }
    }

    /// Creates a store from a configuration, preallocating
    /// `initial_capacity` fast slots.
    #[must_use]
    pub fn from_config(config: &HybridConfig) -> Self {
        let mut store = Self::new(config.ceiling);
        let initial = config.initial_capacity.min(config.ceiling);
        store.fast = DenseComponentArray::with_capacity(initial);
        store
    }

    /// Returns the first index served by the overflow map.
    #[inline]
    #[must_use]
    pub const fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Checks if `index` is served by the fast array.
    #[inline]
    #[must_use]
    pub const fn routes_to_fast(&self, index: u64) -> bool {
        index < self.ceiling
    }

    /// Returns the number of live entries across both halves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fast.len() + self.overflow.len()
    }

    /// Returns true if neither half holds an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of entries in the overflow map.
    #[must_use]
    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }

    /// Stores `data` at `index`, replacing any previous value.
    ///
    /// # Returns
    ///
    /// `index`, unchanged.
    pub fn add(&mut self, index: u64, data: D) -> u64 {
        if self.routes_to_fast(index) {
            self.fast.add(Handle::from_raw(index), data);
        } else {
            debug!(index, ceiling = self.ceiling, "component routed to overflow map");
            self.overflow.insert(index, data);
        }
        index
    }

    /// Gets the data stored at `index`.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<&D> {
        if self.routes_to_fast(index) {
            self.fast.get(Handle::from_raw(index))
        } else {
            self.overflow.get(&index)
        }
    }

    /// Gets the data stored at `index`, mutably.
    pub fn get_mut(&mut self, index: u64) -> Option<&mut D> {
        if self.routes_to_fast(index) {
            self.fast.get_mut(Handle::from_raw(index))
        } else {
            self.overflow.get_mut(&index)
        }
    }

    /// Removes the entry at `index`.
    pub fn remove(&mut self, index: u64) -> bool {
        if self.routes_to_fast(index) {
            self.fast.remove(Handle::from_raw(index))
        } else {
            self.overflow.remove(&index).is_some()
        }
    }

    /// Drops both halves.
    pub fn clear(&mut self) {
        self.fast.clear();
        self.overflow.clear();
    }

    /// Visits live entries as `(true, index, index, data)`: the fast array
    /// in index order, then the overflow map in arbitrary order.
    pub fn for_each_live_component<F>(&mut self, mut f: F)
    where
        F: FnMut(bool, Handle, Handle, &mut D),
    {
        self.fast.for_each_live_component(&mut f);
        for (index, data) in &mut self.overflow {
            let handle = Handle::from_raw(*index);
            f(true, handle, handle, data);
        }
    }

    /// Visits live entries without mutable access.
    pub fn for_each_live_component_const<F>(&self, mut f: F)
    where
        F: FnMut(bool, Handle, Handle, &D),
    {
        self.fast.for_each_live_component_const(&mut f);
        for (index, data) in &self.overflow {
            let handle = Handle::from_raw(*index);
            f(true, handle, handle, data);
        }
    }
}

impl<L: HandleLayout, D: Default + PartialEq> HybridComponentStore<L, D> {
    /// Like [`get`](Self::get), but treats a default-valued entry as absent.
    ///
    /// Handle-valued stores use this to tell "no entry" and "entry holding
    /// [`Handle::INVALID`]" apart from a real mapping.
    #[must_use]
    pub fn get_except_zero(&self, index: u64) -> Option<&D> {
        self.get(index).filter(|data| **data != D::default())
    }
}
