use ash::vk;

use crate::gpgpu::DriverCapabilities;

impl DriverCapabilities {
    /// Read the output limits from a Vulkan physical device.
    ///
    /// Fragment output attachments play the role of draw buffers: a fragment
    /// shader cannot write more outputs than that, even when more color
    /// attachments are allowed.
    pub fn from_limits(limits: &vk::PhysicalDeviceLimits) -> Self {
        Self {
            max_draw_buffers: limits.max_fragment_output_attachments,
            max_color_attachments: limits.max_color_attachments,
        }
    }
}
