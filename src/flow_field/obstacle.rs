use super::{FlowField, FlowFieldError};
use crate::math::Vec2;

/// Per-channel differences below this threshold count as a key color match.
const KEY_MATCH_THRESHOLD: u8 = 128;

/// A boolean grid marking the texels particles cannot occupy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObstacleMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl ObstacleMask {
    /// A mask with no obstacles.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Build a mask from tightly packed RGBA8 pixels.
    ///
    /// A pixel is an obstacle when it matches `key`, or when it does not
    /// match and `invert` is set. Anti-aliased edges resolve to whichever
    /// side they are closer to.
    pub fn from_rgba8(
        width: usize,
        height: usize,
        pixels: &[u8],
        key: [u8; 4],
        invert: bool,
    ) -> Result<Self, FlowFieldError> {
        if width.checked_mul(height).and_then(|n| n.checked_mul(4))
            != Some(pixels.len())
        {
            return Err(FlowFieldError::MaskSizeMismatch {
                width,
                height,
                actual_bytes: pixels.len(),
            });
        }

        let cells = pixels
            .chunks_exact(4)
            .map(|pixel| {
                let matches = pixel
                    .iter()
                    .zip(key.iter())
                    .all(|(p, k)| p.abs_diff(*k) < KEY_MATCH_THRESHOLD);
                matches != invert
            })
            .collect();

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn from_image(
        image: &image::RgbaImage,
        key: [u8; 4],
        invert: bool,
    ) -> Result<Self, FlowFieldError> {
        Self::from_rgba8(
            image.width() as usize,
            image.height() as usize,
            image.as_raw(),
            key,
            invert,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Texels outside the mask are never obstacles.
    pub fn is_obstacle(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    pub fn set_obstacle(&mut self, x: usize, y: usize, obstacle: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = obstacle;
        }
    }

    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Nearest-neighbor resample to a new extent.
    pub fn resampled(&self, width: usize, height: usize) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut resampled = Self::new(width, height);
        if self.cells.is_empty() {
            return resampled;
        }
        for y in 0..height {
            let sy = (y * self.height / height.max(1)).min(self.height - 1);
            for x in 0..width {
                let sx = (x * self.width / width.max(1)).min(self.width - 1);
                resampled.cells[y * width + x] =
                    self.cells[sy * self.width + sx];
            }
        }
        resampled
    }

    /// Distance from each obstacle texel center to the nearest free texel
    /// center. Free texels are 0. When the mask has no free texels every
    /// distance is infinite.
    ///
    /// Solved with fast sweeping over the 2D Eikonal equation `|grad d| = 1`.
    pub fn distance_to_free(&self) -> Vec<f32> {
        let mut distance: Vec<f32> = self
            .cells
            .iter()
            .map(|&obstacle| if obstacle { f32::INFINITY } else { 0.0 })
            .collect();

        let sweeps: [(bool, bool); 4] =
            [(true, true), (false, true), (true, false), (false, false)];
        for _ in 0..2 {
            for &(forward_x, forward_y) in &sweeps {
                self.sweep(&mut distance, forward_x, forward_y);
            }
        }
        distance
    }

    /// Build the field which pushes particles out of obstacles.
    ///
    /// Each obstacle texel points toward the nearest free texel with a
    /// magnitude of `1 / (1 + d)`. Free texels are zero.
    ///
    /// Directions are upwind: on each axis the step goes toward the
    /// neighbor with the smaller distance. Ties go toward the lower index so
    /// ridges (thin walls, single texels, the middle of odd-width bars) still
    /// push outward.
    pub fn flow_field(&self) -> Result<FlowField, FlowFieldError> {
        let distance = self.distance_to_free();
        let at = |x: isize, y: isize, fallback: f32| -> f32 {
            if x < 0
                || y < 0
                || x as usize >= self.width
                || y as usize >= self.height
            {
                return fallback;
            }
            let d = distance[y as usize * self.width + x as usize];
            if d.is_finite() {
                d
            } else {
                fallback
            }
        };

        FlowField::from_fn(self.width, self.height, |x, y| {
            let d = distance[y * self.width + x];
            if d == 0.0 || !d.is_finite() {
                return Vec2::zeros();
            }
            let (xi, yi) = (x as isize, y as isize);
            let direction = Vec2::new(
                upwind_step(d, at(xi - 1, yi, d), at(xi + 1, yi, d)),
                upwind_step(d, at(xi, yi - 1, d), at(xi, yi + 1, d)),
            );
            let length = direction.norm();
            if length <= f32::EPSILON {
                return Vec2::zeros();
            }
            direction / length / (1.0 + d)
        })
    }

    fn sweep(&self, distance: &mut [f32], forward_x: bool, forward_y: bool) {
        let (w, h) = (self.width, self.height);
        for j in 0..h {
            let y = if forward_y { j } else { h - 1 - j };
            for i in 0..w {
                let x = if forward_x { i } else { w - 1 - i };
                let index = y * w + x;
                if distance[index] == 0.0 {
                    continue;
                }

                let neighbor = |present: bool, at: usize| {
                    if present {
                        distance[at]
                    } else {
                        f32::INFINITY
                    }
                };
                let horizontal = neighbor(x > 0, index.wrapping_sub(1))
                    .min(neighbor(x + 1 < w, index + 1));
                let vertical = neighbor(y > 0, index.wrapping_sub(w))
                    .min(neighbor(y + 1 < h, index + w));

                let candidate = solve_eikonal(horizontal, vertical);
                distance[index] = distance[index].min(candidate);
            }
        }
    }
}

/// Signed step along one axis toward the lower of the `lower` and `upper`
/// neighbor distances. Zero when neither neighbor is closer to free space
/// than `d`.
fn upwind_step(d: f32, lower: f32, upper: f32) -> f32 {
    let down = d - lower;
    let up = d - upper;
    if down <= 0.0 && up <= 0.0 {
        0.0
    } else if up > down {
        up
    } else {
        -down
    }
}

/// Solve `(d - a)^2 + (d - b)^2 = 1` for the upwind neighbor distances `a`
/// and `b`, falling back to the 1D update when only one axis contributes.
fn solve_eikonal(a: f32, b: f32) -> f32 {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    if !a.is_finite() {
        return f32::INFINITY;
    }
    if b - a >= 1.0 {
        return a + 1.0;
    }
    let discriminant = 2.0 - (a - b) * (a - b);
    (a + b + discriminant.sqrt()) * 0.5
}
