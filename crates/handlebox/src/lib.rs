//! # HANDLEBOX
//!
//! Boxed handles for virtualized graphics objects.
//!
//! A guest never sees a host pointer or host id. It sees a boxed handle
//! issued by a [`BoxedHandleRegistry`]: a generational handle whose type tag
//! names the [`HandleKind`]. The registry maps boxed handles to host entries
//! and host values back to boxed handles, and can snapshot and replay its
//! contents with identical handles.
//!
//! Built on [`handlebox_core`].

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod kind;
pub mod registry;

pub use handlebox_core::{Handle, SlotSnapshot};
pub use kind::{kind_of, HandleKind};
pub use registry::{Boxed, BoxedHandleRegistry};
