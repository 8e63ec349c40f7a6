//! # Boxed Handle Registry
//!
//! Hands out boxed handles for host objects and maps them back.
//!
//! ```text
//!   guest sees:  boxed handle (index | generation | kind)
//!                        │ get / with_item
//!                        ▼
//!   registry:    SlotAllocator<StandardLayout, T> ──► T { underlying, .. }
//!                        ▲
//!                        │ boxed_from_unboxed
//!   host sees:   underlying u64
//! ```
//!
//! Every operation takes the registry's single lock.

use std::collections::HashMap;

use handlebox_core::{Handle, SlotAllocator, SlotResult, SlotSnapshot, StandardLayout};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::kind::HandleKind;

/// A host object that can be boxed.
pub trait Boxed {
    /// The host value this entry wraps, used for reverse lookups.
    fn underlying(&self) -> u64;
}

#[derive(Debug, Default)]
struct Inner<T> {
    store: SlotAllocator<StandardLayout, T>,
    unboxed_to_boxed: HashMap<u64, Handle>,
}

/// Thread-safe table of boxed handles for one family of host objects.
///
/// # Example
///
/// ```rust
/// use handlebox::{kind_of, Boxed, BoxedHandleRegistry, HandleKind};
///
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Buffer {
///     host: u64,
/// }
///
/// impl Boxed for Buffer {
///     fn underlying(&self) -> u64 {
///         self.host
///     }
/// }
///
/// let registry = BoxedHandleRegistry::new();
/// let boxed = registry.add(Buffer { host: 0xb0ff }, HandleKind::Buffer);
///
/// assert_eq!(kind_of(boxed), Some(HandleKind::Buffer));
/// assert_eq!(registry.boxed_from_unboxed(0xb0ff), boxed);
/// assert_eq!(registry.get(boxed).map(|b| b.host), Some(0xb0ff));
/// ```
#[derive(Debug, Default)]
pub struct BoxedHandleRegistry<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Boxed + Default> BoxedHandleRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                store: SlotAllocator::new(),
                unboxed_to_boxed: HashMap::new(),
            }),
        }
    }

    /// Returns the number of live boxed handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().store.len()
    }

    /// Returns true if nothing is boxed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boxes `item` and records its underlying value for reverse lookup.
    ///
    /// # Returns
    ///
    /// The boxed handle, or [`Handle::INVALID`] if the registry is full.
    pub fn add(&self, item: T, kind: HandleKind) -> Handle {
        let underlying = item.underlying();
        let mut inner = self.inner.lock();
        let boxed = inner.store.add(item, kind.tag());
        if boxed.is_valid() {
            inner.unboxed_to_boxed.insert(underlying, boxed);
        }
        trace!(%boxed, %kind, underlying, "handle boxed");
        boxed
    }

    /// Unboxes and forgets a handle. Stale handles are ignored.
    pub fn remove(&self, boxed: Handle) -> bool {
        let mut inner = self.inner.lock();
        let Some(underlying) = inner.store.get(boxed).map(Boxed::underlying) else {
            return false;
        };
        if inner.unboxed_to_boxed.get(&underlying) == Some(&boxed) {
            inner.unboxed_to_boxed.remove(&underlying);
        }
        inner.store.remove(boxed)
    }

    /// Runs `f` on the entry for a live handle while holding the lock.
    ///
    /// `f` must not call back into this registry.
    pub fn with_item<R, F>(&self, boxed: Handle, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock().store.get_mut(boxed).map(f)
    }

    /// Returns the boxed handle for a host value, or [`Handle::INVALID`].
    #[must_use]
    pub fn boxed_from_unboxed(&self, underlying: u64) -> Handle {
        self.inner
            .lock()
            .unboxed_to_boxed
            .get(&underlying)
            .copied()
            .unwrap_or(Handle::INVALID)
    }

    /// Drops every entry. Boxed handles issued before the clear never
    /// resolve again.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.store.clear();
        inner.unboxed_to_boxed.clear();
    }
}

impl<T: Boxed + Copy + Default> BoxedHandleRegistry<T> {
    /// Copies out the entry for a live handle.
    #[must_use]
    pub fn get(&self, boxed: Handle) -> Option<T> {
        self.inner.lock().store.get(boxed).copied()
    }
}

impl<T: Boxed + Clone + Default> BoxedHandleRegistry<T> {
    /// Records every live entry under its boxed handle.
    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot<T> {
        self.inner.lock().store.snapshot()
    }

    /// Replaces the registry contents with a snapshot, keeping every boxed
    /// handle identical, and rebuilds the reverse map.
    ///
    /// # Errors
    ///
    /// Returns the first record that could not be replayed. The registry is
    /// left holding the records replayed before it, with a consistent
    /// reverse map.
    pub fn restore(&self, snapshot: &SlotSnapshot<T>) -> SlotResult<usize> {
        let mut inner = self.inner.lock();
        let result = inner.store.restore(snapshot);

        let Inner {
            store,
            unboxed_to_boxed,
        } = &mut *inner;
        unboxed_to_boxed.clear();
        for (boxed, item) in store.iter() {
            unboxed_to_boxed.insert(item.underlying(), boxed);
        }

        debug!(entries = store.len(), "boxed handle registry restored");
        result
    }
}
