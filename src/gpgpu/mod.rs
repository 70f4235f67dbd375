//! Off-screen render targets for GPGPU passes.
//!
//! A [FramebufferTarget] binds a set of surfaces as the color outputs of a
//! pass. The graphics context itself sits behind the [FramebufferDriver]
//! trait so the same target logic drives Vulkan or the recording
//! [HeadlessDriver].

mod attachment;
mod driver;
mod error;
mod framebuffer_target;
mod headless_driver;

pub mod vulkan;

pub use self::{
    attachment::{AttachmentDescriptor, SurfaceHandle, SurfaceKind},
    driver::{
        AttachmentPoint, DriverCapabilities, FramebufferDriver,
        FramebufferHandle, RenderbufferHandle,
    },
    error::{DriverError, GpgpuError},
    framebuffer_target::{ActiveTarget, BindOutcome, FramebufferTarget},
    headless_driver::{DriverCall, HeadlessDriver},
};
