use rand::{rngs::StdRng, Rng};

use super::{Arrangement, ParticleError, SpawnSpec};
use crate::math::{is_finite, Vec2};

/// pi * (3 - sqrt(5))
const GOLDEN_ANGLE: f32 = 2.399_963;

impl Default for SpawnSpec {
    fn default() -> Self {
        Self {
            count: 0,
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            dimensions: Vec2::zeros(),
            arrangement: Arrangement::Radial,
            jitter: 0.0,
            radius: 4.0,
        }
    }
}

impl SpawnSpec {
    /// `count` particles in an ellipse with radii `dimensions`.
    pub fn radial(count: usize, position: Vec2, dimensions: Vec2) -> Self {
        Self {
            count,
            position,
            dimensions,
            arrangement: Arrangement::Radial,
            ..Default::default()
        }
    }

    /// `count` particles on a lattice covering `2 * dimensions`.
    pub fn rect(count: usize, position: Vec2, dimensions: Vec2) -> Self {
        Self {
            count,
            position,
            dimensions,
            arrangement: Arrangement::Rect,
            ..Default::default()
        }
    }

    pub fn with_velocity(self, velocity: Vec2) -> Self {
        Self { velocity, ..self }
    }

    pub fn with_jitter(self, jitter: f32) -> Self {
        Self { jitter, ..self }
    }

    pub fn with_radius(self, radius: f32) -> Self {
        Self { radius, ..self }
    }

    /// Reject geometry which cannot produce finite positions.
    pub fn validate(&self) -> Result<(), ParticleError> {
        if !is_finite(&self.position) {
            return Err(ParticleError::InvalidSpawnSpec("position"));
        }
        if !is_finite(&self.velocity) {
            return Err(ParticleError::InvalidSpawnSpec("velocity"));
        }
        if !is_finite(&self.dimensions)
            || self.dimensions.x < 0.0
            || self.dimensions.y < 0.0
        {
            return Err(ParticleError::InvalidSpawnSpec("dimensions"));
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(ParticleError::InvalidSpawnSpec("jitter"));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ParticleError::InvalidSpawnSpec("radius"));
        }
        Ok(())
    }

    /// The position of particle `index` out of a batch of `count`, before
    /// jitter and clamping.
    pub(super) fn layout(&self, index: usize, count: usize) -> Vec2 {
        match self.arrangement {
            Arrangement::Radial => {
                let r = ((index as f32 + 0.5) / count as f32).sqrt();
                let theta = index as f32 * GOLDEN_ANGLE;
                self.position
                    + Vec2::new(
                        r * self.dimensions.x * theta.cos(),
                        r * self.dimensions.y * theta.sin(),
                    )
            }
            Arrangement::Rect => {
                let columns = self.lattice_columns(count);
                let rows = count.div_ceil(columns);
                let column = index % columns;
                let row = index / columns;
                let cell = Vec2::new(
                    2.0 * self.dimensions.x / columns as f32,
                    2.0 * self.dimensions.y / rows as f32,
                );
                self.position - self.dimensions
                    + Vec2::new(
                        (column as f32 + 0.5) * cell.x,
                        (row as f32 + 0.5) * cell.y,
                    )
            }
        }
    }

    pub(super) fn jitter_offset(&self, rng: &mut StdRng) -> Vec2 {
        if self.jitter <= 0.0 {
            return Vec2::zeros();
        }
        Vec2::new(
            rng.gen_range(-self.jitter..=self.jitter),
            rng.gen_range(-self.jitter..=self.jitter),
        )
    }

    fn lattice_columns(&self, count: usize) -> usize {
        let count = count.max(1);
        if self.dimensions.y <= 0.0 {
            return count;
        }
        if self.dimensions.x <= 0.0 {
            return 1;
        }
        let aspect = self.dimensions.x / self.dimensions.y;
        ((count as f32 * aspect).sqrt().ceil() as usize).clamp(1, count)
    }
}
