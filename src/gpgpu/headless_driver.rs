use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};

use crate::gpgpu::{
    AttachmentDescriptor, AttachmentPoint, DriverCapabilities, DriverError,
    FramebufferDriver, FramebufferHandle, RenderbufferHandle, SurfaceKind,
};

/// Every driver operation, as recorded by the [HeadlessDriver].
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    CreateFramebuffer(FramebufferHandle),
    DestroyFramebuffer(FramebufferHandle),
    BindFramebuffer(Option<FramebufferHandle>),
    AttachColor {
        slot: u32,
        attachment: AttachmentDescriptor,
    },
    DetachColor {
        slot: u32,
        kind: SurfaceKind,
    },
    SetDrawBuffers(Vec<u32>),
    SetViewport {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    ClearColor([f32; 4]),
    AttachRenderbuffer {
        point: AttachmentPoint,
        renderbuffer: RenderbufferHandle,
    },
}

#[derive(Debug, Default)]
struct HeadlessState {
    calls: Vec<DriverCall>,
    next_handle: u64,
    fail_allocation: bool,
    current: Option<FramebufferHandle>,
    attached: HashMap<FramebufferHandle, BTreeMap<u32, AttachmentDescriptor>>,
}

/// A driver with no device behind it.
///
/// It records each call and tracks which framebuffers exist and what is
/// attached to them, which is enough to run GPGPU passes off-GPU and to
/// check binding behavior.
#[derive(Debug)]
pub struct HeadlessDriver {
    capabilities: DriverCapabilities,
    state: RefCell<HeadlessState>,
}

impl HeadlessDriver {
    pub fn new(capabilities: DriverCapabilities) -> Self {
        Self {
            capabilities,
            state: RefCell::new(HeadlessState {
                next_handle: 1,
                ..Default::default()
            }),
        }
    }

    /// A driver where the draw-buffer and color-attachment limits are equal.
    pub fn with_outputs(max_outputs: u32) -> Self {
        Self::new(DriverCapabilities {
            max_draw_buffers: max_outputs,
            max_color_attachments: max_outputs,
        })
    }

    /// Make every following framebuffer allocation fail.
    pub fn fail_allocations(&self) {
        self.state.borrow_mut().fail_allocation = true;
    }

    /// A copy of every call recorded so far.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.borrow().calls.clone()
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_calls(&self) -> Vec<DriverCall> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    /// The framebuffer which is currently bound, `None` for the default
    /// framebuffer.
    pub fn current_framebuffer(&self) -> Option<FramebufferHandle> {
        self.state.borrow().current
    }

    /// The number of framebuffers which were created and not yet destroyed.
    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().attached.len()
    }

    /// Color slots with a surface attached on the given framebuffer.
    pub fn attached_slots(&self, framebuffer: FramebufferHandle) -> Vec<u32> {
        self.state
            .borrow()
            .attached
            .get(&framebuffer)
            .map(|slots| slots.keys().copied().collect())
            .unwrap_or_default()
    }

    fn record(&self, call: DriverCall) {
        log::trace!("headless driver: {:?}", call);
        self.state.borrow_mut().calls.push(call);
    }
}

impl FramebufferDriver for HeadlessDriver {
    fn capabilities(&self) -> DriverCapabilities {
        self.capabilities
    }

    fn create_framebuffer(&self) -> Result<FramebufferHandle, DriverError> {
        let handle = {
            let mut state = self.state.borrow_mut();
            if state.fail_allocation {
                return Err(DriverError::OutOfFramebuffers);
            }
            let handle = FramebufferHandle(state.next_handle);
            state.next_handle += 1;
            state.attached.insert(handle, BTreeMap::new());
            handle
        };
        self.record(DriverCall::CreateFramebuffer(handle));
        Ok(handle)
    }

    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle) {
        {
            let mut state = self.state.borrow_mut();
            state.attached.remove(&framebuffer);
            if state.current == Some(framebuffer) {
                state.current = None;
            }
        }
        self.record(DriverCall::DestroyFramebuffer(framebuffer));
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferHandle>) {
        self.state.borrow_mut().current = framebuffer;
        self.record(DriverCall::BindFramebuffer(framebuffer));
    }

    fn attach_color(&self, slot: u32, attachment: &AttachmentDescriptor) {
        {
            let mut state = self.state.borrow_mut();
            match state.current {
                Some(current) => {
                    state
                        .attached
                        .entry(current)
                        .or_default()
                        .insert(slot, *attachment);
                }
                None => log::warn!(
                    "attach to slot {} ignored, the default framebuffer is \
                     bound",
                    slot
                ),
            }
        }
        self.record(DriverCall::AttachColor {
            slot,
            attachment: *attachment,
        });
    }

    fn detach_color(&self, slot: u32, kind: SurfaceKind) {
        {
            let mut state = self.state.borrow_mut();
            if let Some(current) = state.current {
                if let Some(slots) = state.attached.get_mut(&current) {
                    slots.remove(&slot);
                }
            }
        }
        self.record(DriverCall::DetachColor { slot, kind });
    }

    fn set_draw_buffers(&self, slots: &[u32]) {
        self.record(DriverCall::SetDrawBuffers(slots.to_vec()));
    }

    fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.record(DriverCall::SetViewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&self, color: [f32; 4]) {
        self.record(DriverCall::ClearColor(color));
    }

    fn attach_renderbuffer(
        &self,
        point: AttachmentPoint,
        renderbuffer: RenderbufferHandle,
    ) {
        self.record(DriverCall::AttachRenderbuffer {
            point,
            renderbuffer,
        });
    }
}
