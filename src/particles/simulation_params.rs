use super::ParticleError;

/// How particles are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayParams {
    /// Point size in world units.
    pub size_display: f32,

    /// Color of a particle at rest.
    pub color_a: [f32; 4],

    /// Color of a particle moving at `speed_for_color_b` or faster.
    pub color_b: [f32; 4],
    pub speed_for_color_b: f32,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            size_display: 8.0,
            color_a: [0.10, 0.50, 0.80, 1.0],
            color_b: [0.05, 0.25, 0.40, 1.0],
            speed_for_color_b: 4.0,
        }
    }
}

impl DisplayParams {
    /// Blend from `color_a` to `color_b` by normalized speed.
    pub fn color_for_speed(&self, speed: f32) -> [f32; 4] {
        let t = if self.speed_for_color_b > 0.0 && speed.is_finite() {
            (speed / self.speed_for_color_b).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut color = self.color_a;
        for (channel, b) in color.iter_mut().zip(self.color_b) {
            *channel += (b - *channel) * t;
        }
        color
    }
}

/// Tuning for [ParticleSimulation](super::ParticleSimulation).
///
/// Distances are in world units, one unit per flow field texel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Sub-steps per call to `update`.
    pub steps: u32,

    /// Velocity multiplier applied every sub-step. 1.0 means no damping.
    pub velocity_damping: f32,

    /// Maximum speed in world units per sub-step. Unlimited by default.
    pub velocity_limit: f32,

    /// Particles closer than this repel each other.
    pub size_collision: f32,

    /// Width of the band past `size_collision` where particles attract.
    pub size_cohesion: f32,

    pub mul_col: f32,
    pub mul_coh: f32,

    /// Weight of the obstacle field relative to the external field.
    pub mul_obs: f32,

    /// Global scale of the pairwise collision and cohesion terms.
    pub collision_mult: f32,

    /// Particles older than this many sub-steps are removed.
    pub max_age: Option<u32>,

    pub display: DisplayParams,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            steps: 2,
            velocity_damping: 0.99,
            velocity_limit: f32::INFINITY,
            size_collision: 8.0,
            size_cohesion: 4.0,
            mul_col: 2.0,
            mul_coh: 2.0,
            mul_obs: 2.0,
            collision_mult: 0.1,
            max_age: None,
            display: DisplayParams::default(),
        }
    }
}

impl SimulationParams {
    /// The largest distance at which two particles interact.
    pub fn interaction_radius(&self) -> f32 {
        self.size_collision + self.size_cohesion
    }

    pub fn validate(&self) -> Result<(), ParticleError> {
        let invalid = |field, reason| ParticleError::InvalidParams {
            field,
            reason,
        };

        if !self.velocity_damping.is_finite() || self.velocity_damping < 0.0 {
            return Err(invalid(
                "velocity_damping",
                "must be finite and non-negative",
            ));
        }
        if self.velocity_limit.is_nan() || self.velocity_limit <= 0.0 {
            return Err(invalid("velocity_limit", "must be positive"));
        }
        if !self.size_collision.is_finite() || self.size_collision <= 0.0 {
            return Err(invalid(
                "size_collision",
                "must be finite and positive",
            ));
        }
        if !self.size_cohesion.is_finite() || self.size_cohesion < 0.0 {
            return Err(invalid(
                "size_cohesion",
                "must be finite and non-negative",
            ));
        }
        let weights = [
            ("mul_col", self.mul_col),
            ("mul_coh", self.mul_coh),
            ("mul_obs", self.mul_obs),
            ("collision_mult", self.collision_mult),
        ];
        for (field, weight) in weights {
            if !weight.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }
        Ok(())
    }
}
