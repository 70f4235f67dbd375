use std::fmt;

/// An opaque surface handle owned by the graphics context.
///
/// For the Vulkan driver this is the raw handle of a `vk::ImageView`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// The dimensionality of a surface bound as a color output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Texture2D,
    Texture3D,
    ArrayLayer,
}

impl SurfaceKind {
    /// Layered surfaces are attached and detached one layer at a time.
    pub fn is_layered(&self) -> bool {
        matches!(self, SurfaceKind::Texture3D | SurfaceKind::ArrayLayer)
    }
}

/// One surface to bind as a color output for a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    pub surface: SurfaceHandle,
    pub kind: SurfaceKind,
    pub layer: Option<u32>,
    pub width: u32,
    pub height: u32,
}

impl AttachmentDescriptor {
    pub fn texture_2d(surface: SurfaceHandle, width: u32, height: u32) -> Self {
        Self {
            surface,
            kind: SurfaceKind::Texture2D,
            layer: None,
            width,
            height,
        }
    }

    /// A single depth slice of a 3D texture.
    pub fn texture_3d_layer(
        surface: SurfaceHandle,
        width: u32,
        height: u32,
        layer: u32,
    ) -> Self {
        Self {
            surface,
            kind: SurfaceKind::Texture3D,
            layer: Some(layer),
            width,
            height,
        }
    }

    /// A single layer of a 2D array texture.
    pub fn array_layer(
        surface: SurfaceHandle,
        width: u32,
        height: u32,
        layer: u32,
    ) -> Self {
        Self {
            surface,
            kind: SurfaceKind::ArrayLayer,
            layer: Some(layer),
            width,
            height,
        }
    }

    /// The layer to attach. 2D surfaces and layered surfaces without an
    /// explicit layer use layer 0.
    pub fn layer_or_default(&self) -> u32 {
        self.layer.unwrap_or(0)
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Display for AttachmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} surface {:#x} ({}x{})",
            self.kind, self.surface.0, self.width, self.height
        )?;
        if let Some(layer) = self.layer {
            write!(f, " layer {}", layer)?;
        }
        Ok(())
    }
}
