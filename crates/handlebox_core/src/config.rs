//! # Hybrid Store Configuration
//!
//! Runtime knobs for the hybrid stores. Handle bit widths are not here:
//! they are compile-time [`HandleLayout`] parameters.
//!
//! ```toml
//! ceiling = 8192
//! initial_capacity = 256
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::handle::HandleLayout;

/// Configuration shared by [`HybridComponentStore`](crate::HybridComponentStore)
/// and [`HybridSlotAllocator`](crate::HybridSlotAllocator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HybridConfig {
    /// Indices below this value live in the fast array; the rest overflow
    /// into a hash map.
    pub ceiling: usize,
    /// Number of fast slots to initialize up front.
    pub initial_capacity: usize,
}

impl HybridConfig {
    /// Fast-path ceiling used when none is configured.
    pub const DEFAULT_CEILING: usize = 4096;

    /// Largest accepted ceiling. The hybrid slot allocator reserves its
    /// whole fast arena up front.
    pub const MAX_CEILING: usize = 1 << 20;

    /// Creates a configuration with the given ceiling and no preallocation.
    #[must_use]
    pub const fn with_ceiling(ceiling: usize) -> Self {
        Self {
            ceiling,
            initial_capacity: 0,
        }
    }

    /// Parses a configuration from TOML text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed text or unknown keys.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        Ok(config)
    }

    /// Checks the configuration against a handle layout.
    ///
    /// The ceiling may not exceed the index space of `L` nor
    /// [`MAX_CEILING`](Self::MAX_CEILING).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCeiling`] or [`ConfigError::CeilingTooLarge`].
    pub fn validate<L: HandleLayout>(&self) -> ConfigResult<()> {
        if self.ceiling == 0 {
            return Err(ConfigError::ZeroCeiling);
        }
        let max = L::max_entries().min(Self::MAX_CEILING);
        if self.ceiling > max {
            return Err(ConfigError::CeilingTooLarge {
                ceiling: self.ceiling,
                max,
            });
        }
        Ok(())
    }
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self::with_ceiling(Self::DEFAULT_CEILING)
    }
}
