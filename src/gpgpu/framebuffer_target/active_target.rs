use super::{BindOutcome, FramebufferTarget};
use crate::gpgpu::{AttachmentDescriptor, FramebufferDriver};

/// A bound framebuffer target. The target is unbound when this guard is
/// dropped, including on early returns and panics.
pub struct ActiveTarget<'target> {
    target: &'target mut FramebufferTarget,
    outcome: BindOutcome,
}

impl<'target> ActiveTarget<'target> {
    pub(super) fn new(
        target: &'target mut FramebufferTarget,
        outcome: BindOutcome,
    ) -> Self {
        Self { target, outcome }
    }

    /// How the bind request was satisfied.
    pub fn outcome(&self) -> BindOutcome {
        self.outcome
    }

    pub fn bound_attachments(&self) -> &[AttachmentDescriptor] {
        self.target.bound_attachments()
    }

    /// The driver, for issuing draw commands into the bound outputs.
    pub fn driver(&self) -> &dyn FramebufferDriver {
        self.target.driver()
    }

    /// Size the viewport to cover the attachment bound at `slot`. Does
    /// nothing when the slot is empty.
    pub fn set_viewport_to_attachment(&self, slot: usize) {
        if let Some(attachment) = self.bound_attachments().get(slot) {
            self.driver()
                .set_viewport(0, 0, attachment.width, attachment.height);
        }
    }

    /// Clear every bound output to `color`.
    pub fn clear(&self, color: [f32; 4]) {
        self.driver().clear_color(color);
    }
}

impl Drop for ActiveTarget<'_> {
    fn drop(&mut self) {
        self.target.unbind();
    }
}
