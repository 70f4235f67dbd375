use std::cell::RefCell;

use ash::vk::{self, Handle};
use indoc::indoc;

use super::{RecordingState, VulkanDriver};
use crate::gpgpu::{
    AttachmentDescriptor, AttachmentPoint, DriverCapabilities, DriverError,
    FramebufferDriver, FramebufferHandle, RenderbufferHandle, SurfaceKind,
};

impl VulkanDriver {
    /// Create a driver which records into `command_buffer`.
    ///
    /// Output limits are read from the physical device once, here.
    ///
    /// # Safety
    ///
    /// Unsafe because:
    ///   - the device must have been created with the dynamicRendering
    ///     feature enabled
    ///   - the command buffer must be in the recording state whenever a pass
    ///     is bound, cleared, or unbound
    ///   - surface and renderbuffer handles given to this driver must be raw
    ///     `vk::ImageView` handles which outlive the recorded commands
    pub unsafe fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        command_buffer: vk::CommandBuffer,
    ) -> Self {
        let properties =
            instance.get_physical_device_properties(physical_device);
        let capabilities = DriverCapabilities::from_limits(&properties.limits);

        log::info!(
            indoc!(
                "
                Vulkan GPGPU driver limits
                  - max fragment output attachments: {}
                  - max color attachments: {}"
            ),
            capabilities.max_draw_buffers,
            capabilities.max_color_attachments,
        );

        Self {
            device,
            capabilities,
            state: RefCell::new(RecordingState {
                command_buffer,
                next_framebuffer: 1,
                ..Default::default()
            }),
        }
    }

    /// Record following passes into a different command buffer. Typically
    /// called once per frame.
    ///
    /// # Safety
    ///
    /// Unsafe because the previous command buffer must not be inside a
    /// rendering scope started by this driver.
    pub unsafe fn set_command_buffer(&self, command_buffer: vk::CommandBuffer) {
        let mut state = self.state.borrow_mut();
        debug_assert!(
            state.rendering.is_none(),
            "command buffer replaced while rendering"
        );
        state.command_buffer = command_buffer;
    }

    fn end_rendering(&self, state: &mut RecordingState) {
        if state.rendering.take().is_some() {
            unsafe { self.device.cmd_end_rendering(state.command_buffer) };
        }
        state.declared_slots.clear();
    }

    fn begin_rendering(&self, state: &mut RecordingState, slots: &[u32]) {
        let Some(framebuffer) = state.current else {
            log::warn!("draw buffers declared for the default framebuffer");
            return;
        };

        let color_attachments: Vec<vk::RenderingAttachmentInfo> = slots
            .iter()
            .map(|slot| {
                let image_view = state
                    .color_views
                    .get(slot)
                    .map(|(view, _)| *view)
                    .unwrap_or_else(vk::ImageView::null);
                vk::RenderingAttachmentInfo {
                    image_view,
                    image_layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                    load_op: vk::AttachmentLoadOp::LOAD,
                    store_op: vk::AttachmentStoreOp::STORE,
                    ..Default::default()
                }
            })
            .collect();
        let depth_attachment =
            state.depth_views.get(&framebuffer).map(|view| {
                vk::RenderingAttachmentInfo {
                    image_view: *view,
                    image_layout:
                        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                    load_op: vk::AttachmentLoadOp::LOAD,
                    store_op: vk::AttachmentStoreOp::STORE,
                    ..Default::default()
                }
            });
        let stencil_attachment =
            state.stencil_views.get(&framebuffer).map(|view| {
                vk::RenderingAttachmentInfo {
                    image_view: *view,
                    image_layout:
                        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                    load_op: vk::AttachmentLoadOp::LOAD,
                    store_op: vk::AttachmentStoreOp::STORE,
                    ..Default::default()
                }
            });

        // every attachment of one pass shares the extent of the first
        let extent = slots
            .first()
            .and_then(|slot| state.color_views.get(slot))
            .map(|(_, extent)| *extent)
            .unwrap_or_default();
        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };
        let rendering_info = vk::RenderingInfo {
            render_area,
            layer_count: 1,
            color_attachment_count: color_attachments.len() as u32,
            p_color_attachments: color_attachments.as_ptr(),
            p_depth_attachment: depth_attachment
                .as_ref()
                .map_or(std::ptr::null(), |info| info as *const _),
            p_stencil_attachment: stencil_attachment
                .as_ref()
                .map_or(std::ptr::null(), |info| info as *const _),
            ..Default::default()
        };

        unsafe {
            self.device
                .cmd_begin_rendering(state.command_buffer, &rendering_info);
        }
        state.rendering = Some(render_area);
        state.declared_slots = slots.to_vec();
    }
}

impl FramebufferDriver for VulkanDriver {
    fn capabilities(&self) -> DriverCapabilities {
        self.capabilities
    }

    fn create_framebuffer(&self) -> Result<FramebufferHandle, DriverError> {
        // dynamic rendering needs no framebuffer object, the handle only keys
        // per-target depth/stencil state
        let mut state = self.state.borrow_mut();
        let handle = FramebufferHandle(state.next_framebuffer);
        state.next_framebuffer += 1;
        Ok(handle)
    }

    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle) {
        let mut state = self.state.borrow_mut();
        if state.current == Some(framebuffer) {
            self.end_rendering(&mut state);
            state.current = None;
            state.color_views.clear();
        }
        state.depth_views.remove(&framebuffer);
        state.stencil_views.remove(&framebuffer);
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferHandle>) {
        let mut state = self.state.borrow_mut();
        self.end_rendering(&mut state);
        state.color_views.clear();
        state.current = framebuffer;
    }

    fn attach_color(&self, slot: u32, attachment: &AttachmentDescriptor) {
        if attachment.kind.is_layered() {
            log::trace!(
                "slot {} expects a view of layer {} for {}",
                slot,
                attachment.layer_or_default(),
                attachment
            );
        }
        let view = vk::ImageView::from_raw(attachment.surface.0);
        let extent = vk::Extent2D {
            width: attachment.width,
            height: attachment.height,
        };
        self.state
            .borrow_mut()
            .color_views
            .insert(slot, (view, extent));
    }

    fn detach_color(&self, slot: u32, kind: SurfaceKind) {
        let mut state = self.state.borrow_mut();
        state.color_views.remove(&slot);
        log::trace!("detached {:?} from slot {}", kind, slot);
    }

    fn set_draw_buffers(&self, slots: &[u32]) {
        let mut state = self.state.borrow_mut();
        self.end_rendering(&mut state);
        self.begin_rendering(&mut state, slots);
    }

    fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        let state = self.state.borrow();
        let viewport = vk::Viewport {
            x: x as f32,
            y: y as f32,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        unsafe {
            self.device
                .cmd_set_viewport(state.command_buffer, 0, &[viewport]);
        }
    }

    fn clear_color(&self, color: [f32; 4]) {
        let state = self.state.borrow();
        let Some(render_area) = state.rendering else {
            log::warn!("clear requested outside of a bound framebuffer");
            return;
        };
        let clear_attachments: Vec<vk::ClearAttachment> = state
            .declared_slots
            .iter()
            .map(|&slot| vk::ClearAttachment {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                color_attachment: slot,
                clear_value: vk::ClearValue {
                    color: vk::ClearColorValue { float32: color },
                },
            })
            .collect();
        let clear_rects = [vk::ClearRect {
            rect: render_area,
            base_array_layer: 0,
            layer_count: 1,
        }];
        unsafe {
            self.device.cmd_clear_attachments(
                state.command_buffer,
                &clear_attachments,
                &clear_rects,
            );
        }
    }

    fn attach_renderbuffer(
        &self,
        point: AttachmentPoint,
        renderbuffer: RenderbufferHandle,
    ) {
        let mut state = self.state.borrow_mut();
        let Some(framebuffer) = state.current else {
            log::warn!("{:?} attachment ignored, no framebuffer bound", point);
            return;
        };
        let view = vk::ImageView::from_raw(renderbuffer.0);
        match point {
            AttachmentPoint::Depth => {
                state.depth_views.insert(framebuffer, view);
            }
            AttachmentPoint::Stencil => {
                state.stencil_views.insert(framebuffer, view);
            }
        }
    }
}

impl std::fmt::Debug for VulkanDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanDriver")
            .field("capabilities", &self.capabilities)
            .field("state", &self.state)
            .finish()
    }
}
