//! # Associative Component Store
//!
//! Components live in their own [`SlotAllocator`] and carry their own
//! handles. Each component remembers the entity it belongs to, and
//! components added with `tracked = true` are also reachable from the entity
//! handle through a reverse map.

use std::collections::HashMap;

use tracing::trace;

use crate::handle::{Handle, HandleLayout};
use crate::slot::SlotAllocator;

/// Per-component bookkeeping stored in the slot arena.
#[derive(Clone, Debug, Default)]
struct ComponentRecord<D> {
    entity: Handle,
    data: D,
    tracked: bool,
}

/// Components with their own generational handles, keyed back to entities.
///
/// # Example
///
/// ```rust
/// use handlebox_core::{ComponentStore, Handle, StandardLayout};
///
/// let mut store: ComponentStore<StandardLayout, &str> = ComponentStore::new();
/// let entity = Handle::from_raw(0x0001_0001_0000_0003);
///
/// let component = store.add(entity, "mesh", 4, true);
/// assert_eq!(store.get_component_handle(entity), component);
/// assert_eq!(store.get_entity_handle(component), entity);
/// assert_eq!(store.get_by_entity(entity), Some(&"mesh"));
/// ```
#[derive(Clone, Debug)]
pub struct ComponentStore<L: HandleLayout, D> {
    components: SlotAllocator<L, ComponentRecord<D>>,
    /// Entity handle to component handle, for tracked components only.
    by_entity: HashMap<Handle, Handle>,
}

impl<L: HandleLayout, D: Default> ComponentStore<L, D> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: SlotAllocator::new(),
            by_entity: HashMap::new(),
        }
    }

    /// Returns the number of live components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if no component is live.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Adds a component owned by `entity`.
    ///
    /// # Arguments
    ///
    /// * `entity` - Owning entity; stored, not validated
    /// * `data` - Component payload
    /// * `ty` - Component type tag, must be non-zero
    /// * `tracked` - Also index the component by `entity`
    ///
    /// # Returns
    ///
    /// The component handle, or [`Handle::INVALID`] on failure. The reverse
    /// map is left untouched when the insertion fails.
    pub fn add(&mut self, entity: Handle, data: D, ty: u64, tracked: bool) -> Handle {
        let component = self.components.add(
            ComponentRecord {
                entity,
                data,
                tracked,
            },
            ty,
        );
        if tracked && component.is_valid() {
            self.by_entity.insert(entity, component);
        }
        trace!(%entity, %component, tracked, "component added");
        component
    }

    /// Removes a component by its own handle. Stale handles are ignored.
    ///
    /// The entity's reverse entry is erased only if it still points at this
    /// component.
    pub fn remove_by_component(&mut self, component: Handle) -> bool {
        let Some(record) = self.components.get(component) else {
            return false;
        };
        if record.tracked && self.by_entity.get(&record.entity) == Some(&component) {
            self.by_entity.remove(&record.entity);
        }
        self.components.remove(component)
    }

    /// Removes the tracked component of `entity`, if any.
    pub fn remove_by_entity(&mut self, entity: Handle) -> bool {
        match self.by_entity.get(&entity).copied() {
            Some(component) => self.remove_by_component(component),
            None => false,
        }
    }

    /// Returns the tracked component of `entity`, or [`Handle::INVALID`].
    #[must_use]
    pub fn get_component_handle(&self, entity: Handle) -> Handle {
        self.by_entity
            .get(&entity)
            .copied()
            .unwrap_or(Handle::INVALID)
    }

    /// Returns the owner of a live component, or [`Handle::INVALID`] for a
    /// stale handle.
    #[must_use]
    pub fn get_entity_handle(&self, component: Handle) -> Handle {
        self.components
            .get(component)
            .map_or(Handle::INVALID, |record| record.entity)
    }

    /// Gets the component data by component handle.
    #[must_use]
    pub fn get_by_component(&self, component: Handle) -> Option<&D> {
        self.components.get(component).map(|record| &record.data)
    }

    /// Gets the component data by component handle, mutably.
    pub fn get_by_component_mut(&mut self, component: Handle) -> Option<&mut D> {
        self.components
            .get_mut(component)
            .map(|record| &mut record.data)
    }

    /// Gets the tracked component data of `entity`.
    #[must_use]
    pub fn get_by_entity(&self, entity: Handle) -> Option<&D> {
        let component = *self.by_entity.get(&entity)?;
        self.get_by_component(component)
    }

    /// Gets the tracked component data of `entity`, mutably.
    pub fn get_by_entity_mut(&mut self, entity: Handle) -> Option<&mut D> {
        let component = *self.by_entity.get(&entity)?;
        self.get_by_component_mut(component)
    }

    /// Drops every component and every reverse entry.
    pub fn clear(&mut self) {
        self.components.clear();
        self.by_entity.clear();
    }

    /// Iterates over live components as `(component, entity, data)`.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, Handle, &D)> + '_ {
        self.components
            .iter()
            .map(|(component, record)| (component, record.entity, &record.data))
    }

    /// Visits every slot as `(live, component, entity, data)`.
    pub fn for_each_component<F>(&mut self, mut f: F)
    where
        F: FnMut(bool, Handle, Handle, &mut D),
    {
        self.components.for_each_entry(|live, component, record| {
            f(live, component, record.entity, &mut record.data);
        });
    }

    /// Visits live components only.
    pub fn for_each_live_component<F>(&mut self, mut f: F)
    where
        F: FnMut(bool, Handle, Handle, &mut D),
    {
        self.components.for_each_live_entry(|live, component, record| {
            f(live, component, record.entity, &mut record.data);
        });
    }

    /// Visits live components only, without mutable access.
    pub fn for_each_live_component_const<F>(&self, mut f: F)
    where
        F: FnMut(bool, Handle, Handle, &D),
    {
        self.components
            .for_each_live_entry_const(|live, component, record| {
                f(live, component, record.entity, &record.data);
            });
    }
}

impl<L: HandleLayout, D: Default> Default for ComponentStore<L, D> {
    fn default() -> Self {
        Self::new()
    }
}
