use ash::vk;
use thiserror::Error;

/// Errors reported by a framebuffer driver implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Vulkan call failed {:?}", .0)]
    Vulkan(#[from] vk::Result),

    #[error("The graphics context is unable to allocate a framebuffer")]
    OutOfFramebuffers,
}

#[derive(Debug, Error)]
pub enum GpgpuError {
    #[error("Unable to allocate a framebuffer object")]
    FramebufferAllocationFailed(#[source] DriverError),

    #[error(
        "The graphics context reports no simultaneous color outputs \
         (draw buffers {}, color attachments {})",
        .max_draw_buffers,
        .max_color_attachments
    )]
    NoColorOutputs {
        max_draw_buffers: u32,
        max_color_attachments: u32,
    },
}
