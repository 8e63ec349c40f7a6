//! # Handle Codec
//!
//! Handles are opaque 64-bit identifiers. From the low bits to the high bits
//! they pack:
//! - `index`: position in the backing slot array
//! - `generation`: reuse counter for that position (0 = never live)
//! - `type`: caller-supplied object kind (0 = invalid)
//!
//! The widths of the three fields are fixed at compile time by a
//! [`HandleLayout`] and always add up to 64.
//!
//! ```text
//!  63                    I+G                  I                    0
//!  ┌──────────────────────┬───────────────────┬────────────────────┐
//!  │        type          │    generation     │       index        │
//!  └──────────────────────┴───────────────────┴────────────────────┘
//! ```

// Allow u64 to usize casts - index fields never exceed the target's usize
#![allow(clippy::cast_possible_truncation)]

use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Opaque 64-bit identifier handed out by the allocators in this crate.
///
/// The all-zero value is [`Handle::INVALID`], the sentinel shared by entity
/// and component handles. No allocator ever returns it for a successful
/// insertion because the type field of a valid handle is never zero.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize,
    Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Handle(u64);

impl Handle {
    /// The universal invalid handle.
    pub const INVALID: Self = Self(0);

    /// Wraps a raw 64-bit value without interpreting it.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw 64-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this is the invalid sentinel.
    #[inline]
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.0 == 0
    }

    /// Checks if this is anything other than the invalid sentinel.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl From<u64> for Handle {
    #[inline]
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Handle> for u64 {
    #[inline]
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl fmt::LowerHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Mask covering the low `bits` bits of a `u64`.
#[inline]
const fn field_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Bit-width configuration of a handle.
///
/// All codec functions are provided; implementors only choose the widths.
/// Use [`BitLayout`] rather than implementing this by hand, it checks the
/// widths at compile time.
pub trait HandleLayout: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Width of the index field.
    const INDEX_BITS: u32;
    /// Width of the generation field.
    const GENERATION_BITS: u32;
    /// Width of the type field.
    const TYPE_BITS: u32;

    /// Packs the three fields into a handle.
    ///
    /// Each input is masked to its field width so that an out-of-range value
    /// can never bleed into a neighbouring field.
    ///
    /// # Arguments
    ///
    /// * `index` - Slot position
    /// * `generation` - Reuse counter
    /// * `ty` - Object kind
    #[inline]
    #[must_use]
    fn make(index: usize, generation: u64, ty: u64) -> Handle {
        let index = index as u64 & field_mask(Self::INDEX_BITS);
        let generation = generation & field_mask(Self::GENERATION_BITS);
        let ty = ty & field_mask(Self::TYPE_BITS);
        Handle(
            index
                | (generation << Self::INDEX_BITS)
                | (ty << (Self::INDEX_BITS + Self::GENERATION_BITS)),
        )
    }

    /// Returns the index field.
    #[inline]
    #[must_use]
    fn index_of(handle: Handle) -> usize {
        (handle.0 & field_mask(Self::INDEX_BITS)) as usize
    }

    /// Returns the generation field.
    #[inline]
    #[must_use]
    fn generation_of(handle: Handle) -> u64 {
        (handle.0 >> Self::INDEX_BITS) & field_mask(Self::GENERATION_BITS)
    }

    /// Returns the type field.
    #[inline]
    #[must_use]
    fn type_of(handle: Handle) -> u64 {
        (handle.0 >> (Self::INDEX_BITS + Self::GENERATION_BITS)) & field_mask(Self::TYPE_BITS)
    }

    /// Copy of `handle` with the index replaced.
    #[inline]
    #[must_use]
    fn with_index(handle: Handle, index: usize) -> Handle {
        Self::make(index, Self::generation_of(handle), Self::type_of(handle))
    }

    /// Copy of `handle` with the generation replaced.
    #[inline]
    #[must_use]
    fn with_generation(handle: Handle, generation: u64) -> Handle {
        Self::make(Self::index_of(handle), generation, Self::type_of(handle))
    }

    /// Copy of `handle` with the type replaced.
    #[inline]
    #[must_use]
    fn with_type(handle: Handle, ty: u64) -> Handle {
        Self::make(Self::index_of(handle), Self::generation_of(handle), ty)
    }

    /// Number of distinct indices, `2^INDEX_BITS`, saturated to `usize`.
    #[inline]
    #[must_use]
    fn max_entries() -> usize {
        1u64.checked_shl(Self::INDEX_BITS)
            .and_then(|count| usize::try_from(count).ok())
            .unwrap_or(usize::MAX)
    }

    /// Largest value the generation field can hold.
    #[inline]
    #[must_use]
    fn max_generation() -> u64 {
        field_mask(Self::GENERATION_BITS)
    }

    /// Generation that follows `generation` when a slot is recycled.
    ///
    /// Skips 0 (reserved for never-used slots) and wraps from
    /// `2^GENERATION_BITS - 1` back to 1.
    #[inline]
    #[must_use]
    fn next_generation(generation: u64) -> u64 {
        let next = generation.wrapping_add(1);
        if next == 0 || next > Self::max_generation() {
            1
        } else {
            next
        }
    }

    /// Stable-sorts handles by their type field.
    ///
    /// Replay code uses this so that every object of one kind is recreated
    /// before objects of the next kind.
    fn sort_by_type(handles: &mut [Handle]) {
        handles.sort_by_key(|handle| Self::type_of(*handle));
    }
}

/// Compile-time handle layout with `I` index, `G` generation and `T` type bits.
///
/// Using a layout whose widths do not add to 64 (or with fewer than 2
/// generation bits, or a zero-width index or type) fails to compile as soon
/// as any codec function is instantiated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitLayout<const I: u32, const G: u32, const T: u32>;

impl<const I: u32, const G: u32, const T: u32> HandleLayout for BitLayout<I, G, T> {
    const INDEX_BITS: u32 = {
        assert!(
            I + G + T == 64,
            "bits of index, generation, and type must add to 64"
        );
        assert!(I >= 1 && T >= 1, "index and type fields need at least one bit");
        assert!(G >= 2, "generation field needs at least two bits to wrap");
        I
    };
    const GENERATION_BITS: u32 = G;
    const TYPE_BITS: u32 = T;
}

/// 32 index bits, 16 generation bits, 16 type bits.
pub type StandardLayout = BitLayout<32, 16, 16>;

/// 16 index bits, 16 generation bits, 32 type bits.
pub type WideTypeLayout = BitLayout<16, 16, 32>;
