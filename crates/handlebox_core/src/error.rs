//! # Error Types
//!
//! The allocators report failure through [`Handle::INVALID`] on their hot
//! paths. The `try_*` variants and the configuration loader return these
//! errors instead, with enough context to log or match on.

use thiserror::Error;

use crate::handle::Handle;

/// Errors produced by slot allocation and invariant checking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Type tag 0 is reserved for the invalid handle.
    #[error("type tag 0 is reserved for invalid handles")]
    InvalidType,

    /// Every addressable slot is live.
    #[error("allocator full: {limit} live entries")]
    CapacityExhausted {
        /// Maximum number of live entries.
        limit: usize,
    },

    /// The requested index cannot be addressed by this allocator.
    #[error("index {index} outside of addressable range (limit {limit})")]
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// Number of addressable slots.
        limit: usize,
    },

    /// Fixed insertion targeted a slot that is already live.
    #[error("slot already occupied by handle {handle}")]
    Occupied {
        /// The handle currently stored in the slot.
        handle: Handle,
    },

    /// The free list is broken: a walk left the arena, revisited a slot,
    /// or passed through a live slot.
    #[error("free list corrupted at index {index}")]
    CorruptFreeList {
        /// Index where the walk failed.
        index: usize,
    },

    /// The tracked live count disagrees with the slots.
    #[error("live count mismatch: tracked {expected}, found {actual}")]
    LiveCountMismatch {
        /// Count kept by the allocator.
        expected: usize,
        /// Count observed by walking the slots.
        actual: usize,
    },

    /// A live slot carries the reserved generation 0.
    #[error("live slot {index} holds generation 0")]
    ZeroGeneration {
        /// Index of the offending slot.
        index: usize,
    },
}

/// Result type for slot operations.
pub type SlotResult<T> = Result<T, SlotError>;

/// Errors produced while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration text is not valid TOML for the expected shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A hybrid store needs at least one fast slot.
    #[error("hybrid ceiling must be greater than zero")]
    ZeroCeiling,

    /// The fast-path ceiling is larger than the index space or the
    /// reservation cap.
    #[error("hybrid ceiling {ceiling} exceeds the maximum of {max} slots")]
    CeilingTooLarge {
        /// Requested ceiling.
        ceiling: usize,
        /// Largest accepted ceiling for the handle layout.
        max: usize,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
