use std::sync::Arc;

use indoc::indoc;

use super::{ActiveTarget, BindOutcome, FramebufferTarget};
use crate::{
    gpgpu::{
        AttachmentDescriptor, AttachmentPoint, FramebufferDriver,
        FramebufferHandle, GpgpuError, RenderbufferHandle,
    },
    logging::PrettyList,
};

impl FramebufferTarget {
    /// Allocate a framebuffer on the driver and query its output limits.
    ///
    /// # Errors
    ///
    /// * The driver cannot allocate a framebuffer.
    /// * The driver reports zero simultaneous color outputs.
    pub fn new(
        driver: Arc<dyn FramebufferDriver>,
    ) -> Result<Self, GpgpuError> {
        let capabilities = driver.capabilities();
        let max_simultaneous_outputs =
            capabilities.max_simultaneous_outputs();
        if max_simultaneous_outputs == 0 {
            return Err(GpgpuError::NoColorOutputs {
                max_draw_buffers: capabilities.max_draw_buffers,
                max_color_attachments: capabilities.max_color_attachments,
            });
        }

        let framebuffer = driver
            .create_framebuffer()
            .map_err(GpgpuError::FramebufferAllocationFailed)?;

        log::debug!(
            indoc!(
                "
                Created framebuffer target {:?}
                  - max draw buffers: {}
                  - max color attachments: {}
                  - simultaneous outputs: {}"
            ),
            framebuffer,
            capabilities.max_draw_buffers,
            capabilities.max_color_attachments,
            max_simultaneous_outputs,
        );

        Ok(Self {
            framebuffer,
            bound_attachments: vec![],
            max_simultaneous_outputs,
            is_active: false,
            driver,
        })
    }

    /// Bind `attachments` to sequential color slots starting at slot 0.
    ///
    /// A target which is already active is unbound first. Attachments beyond
    /// the simultaneous output limit are dropped with a warning.
    pub fn bind(
        &mut self,
        attachments: &[AttachmentDescriptor],
    ) -> BindOutcome {
        if self.is_active {
            self.unbind();
        }

        let requested = attachments.len();
        let allowed = self.max_simultaneous_outputs as usize;
        let count = requested.min(allowed);
        if requested > allowed {
            log::warn!(
                "FramebufferTarget::bind number of attachments exceeds the \
                 max limit: {} > {}",
                requested,
                allowed
            );
        }

        self.driver.bind_framebuffer(Some(self.framebuffer));
        for (slot, attachment) in attachments[..count].iter().enumerate() {
            self.driver.attach_color(slot as u32, attachment);
        }
        let slots: Vec<u32> = (0..count as u32).collect();
        self.driver.set_draw_buffers(&slots);

        self.bound_attachments.extend_from_slice(&attachments[..count]);
        self.is_active = true;

        log::trace!(
            "Bound {:?} with attachments {}",
            self.framebuffer,
            PrettyList(&self.bound_attachments)
        );

        BindOutcome {
            requested,
            bound: count,
        }
    }

    /// Bind `attachments` for the lifetime of the returned guard. The target
    /// is unbound when the guard is dropped.
    pub fn bind_scoped(
        &mut self,
        attachments: &[AttachmentDescriptor],
    ) -> ActiveTarget<'_> {
        let outcome = self.bind(attachments);
        ActiveTarget::new(self, outcome)
    }

    /// Detach every bound surface and restore the default framebuffer.
    ///
    /// Calling this on an inactive target does nothing.
    pub fn unbind(&mut self) {
        if !self.is_active {
            return;
        }
        for (slot, attachment) in self.bound_attachments.iter().enumerate() {
            self.driver.detach_color(slot as u32, attachment.kind);
        }
        self.driver.bind_framebuffer(None);
        self.bound_attachments.clear();
        self.is_active = false;
    }

    /// Clear every attachment to `color`.
    ///
    /// The viewport is sized from the first attachment, so all attachments
    /// must share its extent.
    pub fn clear(
        &mut self,
        color: [f32; 4],
        attachments: &[AttachmentDescriptor],
    ) {
        let Some(first) = attachments.first() else {
            return;
        };
        debug_assert!(
            attachments.iter().all(|a| a.extent() == first.extent()),
            "FramebufferTarget::clear requires attachments with one extent, \
             got {}",
            PrettyList(attachments)
        );

        let active = self.bind_scoped(attachments);
        active.set_viewport_to_attachment(0);
        active.clear(color);
    }

    /// Attach a depth and/or stencil renderbuffer.
    ///
    /// An inactive target is bound for the duration of the call and unbound
    /// afterwards, so the caller's binding state is unchanged.
    pub fn attach_depth_stencil(
        &mut self,
        renderbuffer: RenderbufferHandle,
        want_depth: bool,
        want_stencil: bool,
    ) {
        let was_active = self.is_active;
        let mut target = scopeguard::guard(self, move |target| {
            if !was_active {
                target.unbind();
            }
        });

        if !was_active {
            target.driver.bind_framebuffer(Some(target.framebuffer));
            target.is_active = true;
        }
        if want_depth {
            target
                .driver
                .attach_renderbuffer(AttachmentPoint::Depth, renderbuffer);
        }
        if want_stencil {
            target
                .driver
                .attach_renderbuffer(AttachmentPoint::Stencil, renderbuffer);
        }
    }

    /// Destroy the underlying framebuffer.
    pub fn release(self) {
        drop(self)
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn bound_attachments(&self) -> &[AttachmentDescriptor] {
        &self.bound_attachments
    }

    pub fn max_simultaneous_outputs(&self) -> u32 {
        self.max_simultaneous_outputs
    }

    /// The driver handle for this target's framebuffer.
    pub fn handle(&self) -> FramebufferHandle {
        self.framebuffer
    }

    pub(super) fn driver(&self) -> &dyn FramebufferDriver {
        self.driver.as_ref()
    }
}

impl Drop for FramebufferTarget {
    fn drop(&mut self) {
        self.unbind();
        self.driver.destroy_framebuffer(self.framebuffer);
        log::debug!("Released framebuffer target {:?}", self.framebuffer);
    }
}

impl std::fmt::Debug for FramebufferTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramebufferTarget")
            .field("framebuffer", &self.framebuffer)
            .field("bound_attachments", &self.bound_attachments)
            .field(
                "max_simultaneous_outputs",
                &self.max_simultaneous_outputs,
            )
            .field("is_active", &self.is_active)
            .finish()
    }
}
