use super::{FlowField, FlowFieldError};
use crate::math::{finite_or_zero, Vec2};

impl FlowField {
    /// Allocate a zeroed field.
    ///
    /// # Errors
    ///
    /// Returns [FlowFieldError::AllocationFailed] when the texel count
    /// overflows or the storage cannot be reserved.
    pub fn new(width: usize, height: usize) -> Result<Self, FlowFieldError> {
        Ok(Self {
            width,
            height,
            vectors: allocate(width, height)?,
        })
    }

    /// Build a field by evaluating `f(x, y)` for every texel.
    pub fn from_fn<F>(
        width: usize,
        height: usize,
        mut f: F,
    ) -> Result<Self, FlowFieldError>
    where
        F: FnMut(usize, usize) -> Vec2,
    {
        let mut field = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                field.vectors[y * width + x] = f(x, y);
            }
        }
        Ok(field)
    }

    /// Discard the contents and reallocate for a new size.
    ///
    /// Callers should not depend on the contents after a resize.
    pub fn resize(
        &mut self,
        width: usize,
        height: usize,
    ) -> Result<(), FlowFieldError> {
        if width == self.width && height == self.height {
            self.fill(Vec2::zeros());
            return Ok(());
        }
        self.vectors = allocate(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn fill(&mut self, value: Vec2) {
        self.vectors.fill(value);
    }

    /// The vector stored at texel `(x, y)`, if it is inside the field.
    pub fn texel(&self, x: usize, y: usize) -> Option<Vec2> {
        self.index(x, y).map(|index| self.vectors[index])
    }

    pub fn set_texel(&mut self, x: usize, y: usize, value: Vec2) {
        debug_assert!(
            x < self.width && y < self.height,
            "texel ({}, {}) is outside a {}x{} field",
            x,
            y,
            self.width,
            self.height
        );
        if let Some(index) = self.index(x, y) {
            self.vectors[index] = value;
        }
    }

    /// Row-major texels.
    pub fn as_slice(&self) -> &[Vec2] {
        &self.vectors
    }

    pub fn as_mut_slice(&mut self) -> &mut [Vec2] {
        &mut self.vectors
    }

    /// Accumulate `other * scale` into this field, texel by texel.
    ///
    /// Texels of `self` which fall outside of `other` are left unchanged.
    pub fn merge_add(&mut self, other: &FlowField, scale: f32) {
        let rows = self.height.min(other.height);
        let columns = self.width.min(other.width);
        for y in 0..rows {
            let dst = &mut self.vectors[y * self.width..][..columns];
            let src = &other.vectors[y * other.width..][..columns];
            for (d, s) in dst.iter_mut().zip(src) {
                *d += s * scale;
            }
        }
    }

    /// Bilinearly interpolate the field at `(x, y)` in field coordinates.
    ///
    /// Coordinates past the edge texel centers clamp to the edge. Non-finite
    /// coordinates are treated as 0 and an empty field samples to zero.
    pub fn sample(&self, x: f32, y: f32) -> Vec2 {
        if self.is_empty() {
            return Vec2::zeros();
        }

        let fx = (finite_or_zero(x) - 0.5).clamp(0.0, (self.width - 1) as f32);
        let fy =
            (finite_or_zero(y) - 0.5).clamp(0.0, (self.height - 1) as f32);

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let at = |x: usize, y: usize| self.vectors[y * self.width + x];
        let top = at(x0, y0) * (1.0 - tx) + at(x1, y0) * tx;
        let bottom = at(x0, y1) * (1.0 - tx) + at(x1, y1) * tx;
        top * (1.0 - ty) + bottom * ty
    }

    /// The length of the longest vector in the field.
    pub fn max_magnitude(&self) -> f32 {
        self.vectors
            .iter()
            .map(|v| v.norm())
            .fold(0.0, f32::max)
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

fn allocate(width: usize, height: usize) -> Result<Vec<Vec2>, FlowFieldError> {
    let failed = || FlowFieldError::AllocationFailed { width, height };
    let count = width.checked_mul(height).ok_or_else(failed)?;

    let mut vectors = Vec::new();
    vectors.try_reserve_exact(count).map_err(|_| failed())?;
    vectors.resize(count, Vec2::zeros());
    Ok(vectors)
}
