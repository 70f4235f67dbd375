//! A [FramebufferDriver](crate::gpgpu::FramebufferDriver) for Vulkan 1.3.
//!
//! Vulkan has no mutable framebuffer objects, so the driver maps the
//! attach/declare/restore sequence onto dynamic rendering: attachments are
//! collected while a framebuffer is bound, the batch draw-buffer declaration
//! begins rendering with every declared color output, and restoring the
//! default framebuffer ends rendering.

mod capabilities;
mod particle_vertex_layout;
mod vulkan_driver;

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};

use ash::vk;

use crate::gpgpu::{DriverCapabilities, FramebufferHandle};

pub use self::particle_vertex_layout::{
    particle_vertex_attributes, particle_vertex_binding,
};

/// Records GPGPU passes into a Vulkan command buffer.
pub struct VulkanDriver {
    device: ash::Device,
    capabilities: DriverCapabilities,
    state: RefCell<RecordingState>,
}

#[derive(Debug, Default)]
struct RecordingState {
    command_buffer: vk::CommandBuffer,
    next_framebuffer: u64,
    current: Option<FramebufferHandle>,

    /// Color views attached to the current framebuffer, by slot.
    color_views: BTreeMap<u32, (vk::ImageView, vk::Extent2D)>,

    depth_views: HashMap<FramebufferHandle, vk::ImageView>,
    stencil_views: HashMap<FramebufferHandle, vk::ImageView>,

    /// Slots declared by the last draw-buffer call while rendering.
    declared_slots: Vec<u32>,

    /// The render area of the active dynamic rendering scope.
    rendering: Option<vk::Rect2D>,
}
