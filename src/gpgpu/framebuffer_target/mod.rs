mod active_target;
mod framebuffer_target;

use std::sync::Arc;

use crate::gpgpu::{AttachmentDescriptor, FramebufferDriver, FramebufferHandle};

pub use self::active_target::ActiveTarget;

/// An off-screen render destination which binds a set of surfaces as the
/// color outputs of GPGPU passes.
///
/// The target owns one driver framebuffer. It is destroyed exactly once,
/// either by [FramebufferTarget::release] or when the target is dropped.
pub struct FramebufferTarget {
    framebuffer: FramebufferHandle,

    /// Attachments in output-slot order. Empty while inactive.
    bound_attachments: Vec<AttachmentDescriptor>,

    /// min(max draw buffers, max color attachments), queried at creation.
    max_simultaneous_outputs: u32,

    is_active: bool,
    driver: Arc<dyn FramebufferDriver>,
}

/// The result of binding an attachment set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOutcome {
    /// How many attachments the caller asked for.
    pub requested: usize,

    /// How many attachments were actually bound.
    pub bound: usize,
}

impl BindOutcome {
    /// True when the request exceeded the simultaneous output limit and the
    /// trailing attachments were dropped.
    pub fn is_truncated(&self) -> bool {
        self.bound < self.requested
    }
}
