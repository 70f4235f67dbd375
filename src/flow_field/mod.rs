//! Dense 2D vector fields which drive particle acceleration.

mod flow_field;
mod obstacle;

use thiserror::Error;

use crate::math::Vec2;

pub use self::obstacle::ObstacleMask;

#[derive(Debug, Error)]
pub enum FlowFieldError {
    #[error("Unable to allocate a {}x{} flow field", .width, .height)]
    AllocationFailed { width: usize, height: usize },

    #[error(
        "RGBA8 mask data for a {}x{} mask has the wrong length: {} bytes",
        .width,
        .height,
        .actual_bytes
    )]
    MaskSizeMismatch {
        width: usize,
        height: usize,
        actual_bytes: usize,
    },
}

/// A row-major grid of 2D vectors.
///
/// Texel `(x, y)` covers the unit square `[x, x+1) x [y, y+1)`, so its
/// center sits at `(x + 0.5, y + 0.5)` in field coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowField {
    width: usize,
    height: usize,
    vectors: Vec<Vec2>,
}
