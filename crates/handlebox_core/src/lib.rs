//! # HANDLEBOX Core
//!
//! Generational handle allocation for in-process object tables:
//! - 64-bit handles packing index, generation and type tag
//! - Stale handles detected by generation, never by pointer chasing
//! - Handles replayable verbatim for snapshot restore
//!
//! ## Building Blocks
//!
//! 1. **[`SlotAllocator`]** - generational arena with an intrusive free list
//! 2. **[`ComponentStore`]** - components with their own handles, reachable
//!    from their entity
//! 3. **[`DenseComponentArray`]** - data indexed by entity index bits
//! 4. **[`HybridComponentStore`]** - dense array below a ceiling, hash map
//!    above
//! 5. **[`HybridSlotAllocator`]** - slot allocator with lock-free reads for
//!    low indices
//!
//! ## Example
//!
//! ```rust
//! use handlebox_core::{HandleLayout, SlotAllocator, StandardLayout};
//!
//! let mut objects: SlotAllocator<StandardLayout, &str> = SlotAllocator::new();
//! let handle = objects.add("instance", 3);
//!
//! assert_eq!(StandardLayout::type_of(handle), 3);
//! assert_eq!(objects.get(handle), Some(&"instance"));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod component;
pub mod config;
pub mod error;
pub mod handle;
pub mod slot;
pub mod sync;

pub use component::{ComponentStore, DenseComponentArray, HybridComponentStore};
pub use config::HybridConfig;
pub use error::{ConfigError, ConfigResult, SlotError, SlotResult};
pub use handle::{BitLayout, Handle, HandleLayout, StandardLayout, WideTypeLayout};
pub use slot::{SlotAllocator, SlotRecord, SlotSnapshot};
pub use sync::{HybridSlotAllocator, SeqLock};
