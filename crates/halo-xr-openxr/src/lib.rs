//! OpenXR loader binding and the Vulkan backend for `halo-xr`.

pub mod convert;
pub mod platform;
pub mod runtime;
pub mod vulkan;

pub use platform::HostPlatform;
pub use runtime::{OpenXrRuntime, OxrAction, OxrSession};
pub use vulkan::{VulkanImage, VulkanPlugin};

/// The stock runtime: system loader with Vulkan rendering.
pub type VulkanRuntime = OpenXrRuntime<openxr::Vulkan>;
