use crate::gpgpu::{AttachmentDescriptor, DriverError, SurfaceKind};

/// A framebuffer object allocated by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u64);

/// A depth or stencil renderbuffer owned by the graphics context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderbufferHandle(pub u64);

/// The non-color attachment points of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    Depth,
    Stencil,
}

/// Hardware limits which bound how many color outputs a single pass can
/// write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverCapabilities {
    pub max_draw_buffers: u32,
    pub max_color_attachments: u32,
}

impl DriverCapabilities {
    /// The number of attachments which can be written simultaneously.
    pub fn max_simultaneous_outputs(&self) -> u32 {
        self.max_draw_buffers.min(self.max_color_attachments)
    }
}

/// The graphics context operations needed to drive GPGPU render passes.
///
/// Drivers are shared between targets with `Arc` and are only ever used from
/// the render thread, so methods take `&self` and implementations keep any
/// recording state behind interior mutability.
pub trait FramebufferDriver {
    /// Query the output limits of the device. Targets call this once, when
    /// they are created.
    fn capabilities(&self) -> DriverCapabilities;

    fn create_framebuffer(&self) -> Result<FramebufferHandle, DriverError>;

    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle);

    /// Make `framebuffer` the current render destination. `None` restores
    /// the default framebuffer.
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferHandle>);

    fn attach_color(&self, slot: u32, attachment: &AttachmentDescriptor);

    /// Remove whatever is attached at `slot`. The surface kind selects the
    /// 2D or layered detach path.
    fn detach_color(&self, slot: u32, kind: SurfaceKind);

    /// Declare every active color output in one call.
    fn set_draw_buffers(&self, slots: &[u32]);

    fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32);

    /// Clear every declared color output of the current framebuffer.
    fn clear_color(&self, color: [f32; 4]);

    fn attach_renderbuffer(
        &self,
        point: AttachmentPoint,
        renderbuffer: RenderbufferHandle,
    );
}
