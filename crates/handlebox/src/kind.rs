//! # Handle Kinds
//!
//! Type tags stamped into boxed handles. Tag 0 is never used, so no boxed
//! handle can collide with [`Handle::INVALID`].

use std::fmt;

use handlebox_core::{Handle, HandleLayout, StandardLayout};

/// Kind of host object a boxed handle stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u64)]
pub enum HandleKind {
    /// `VkInstance`
    Instance = 1,
    /// `VkPhysicalDevice`
    PhysicalDevice = 2,
    /// `VkDevice`
    Device = 3,
    /// `VkQueue`
    Queue = 4,
    /// `VkCommandBuffer`
    CommandBuffer = 5,
    /// `VkCommandPool`
    CommandPool = 6,
    /// `VkDeviceMemory`
    DeviceMemory = 7,
    /// `VkBuffer`
    Buffer = 8,
    /// `VkImage`
    Image = 9,
    /// `VkImageView`
    ImageView = 10,
    /// `VkSampler`
    Sampler = 11,
    /// `VkSemaphore`
    Semaphore = 12,
    /// `VkFence`
    Fence = 13,
    /// GL rendering context
    GlContext = 32,
    /// GL window or pbuffer surface
    GlSurface = 33,
    /// GL buffer object
    GlBuffer = 34,
    /// GL texture object
    GlTexture = 35,
}

impl HandleKind {
    /// Every kind, in tag order.
    pub const ALL: [Self; 17] = [
        Self::Instance,
        Self::PhysicalDevice,
        Self::Device,
        Self::Queue,
        Self::CommandBuffer,
        Self::CommandPool,
        Self::DeviceMemory,
        Self::Buffer,
        Self::Image,
        Self::ImageView,
        Self::Sampler,
        Self::Semaphore,
        Self::Fence,
        Self::GlContext,
        Self::GlSurface,
        Self::GlBuffer,
        Self::GlTexture,
    ];

    /// Returns the type tag written into handles of this kind.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u64 {
        self as u64
    }

    /// Looks up the kind for a type tag.
    #[must_use]
    pub fn from_tag(tag: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Returns true for Vulkan objects that carry their own dispatch table.
    #[must_use]
    pub const fn is_dispatchable(self) -> bool {
        matches!(
            self,
            Self::Instance | Self::PhysicalDevice | Self::Device | Self::Queue | Self::CommandBuffer
        )
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decodes the kind stamped into a boxed handle.
///
/// Returns `None` for [`Handle::INVALID`] and for tags no kind uses.
#[must_use]
pub fn kind_of(handle: Handle) -> Option<HandleKind> {
    HandleKind::from_tag(StandardLayout::type_of(handle))
}
