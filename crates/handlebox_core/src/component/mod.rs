//! # Component Storage
//!
//! Three ways to hang data off entity handles:
//!
//! | Store | Keyed by | Own handles | Generation checked |
//! |---|---|---|---|
//! | [`ComponentStore`] | component handle, optionally entity | yes | yes |
//! | [`DenseComponentArray`] | entity index bits | no | no |
//! | [`HybridComponentStore`] | raw index | no | no |

mod associative;
mod dense;
mod hybrid;

pub use associative::ComponentStore;
pub use dense::DenseComponentArray;
pub use hybrid::HybridComponentStore;
