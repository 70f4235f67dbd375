use indoc::indoc;

use super::{
    spatial_hash::SpatialHash, Particle, ParticleBuffer, ParticleError,
    ParticleRenderer, ParticleState, SimulationParams, SpawnOutcome, SpawnSpec,
};
use crate::{
    flow_field::{FlowField, ObstacleMask},
    math::{clamp_to_box, is_finite, limit_length, Vec2},
};

/// Advects a particle buffer through a flow field.
///
/// The world spans `[0, width] x [0, height]` with one world unit per flow
/// field texel. Call [ParticleSimulation::resize_world] before spawning, the
/// world is empty until then.
pub struct ParticleSimulation {
    buffer: ParticleBuffer,
    params: SimulationParams,
    world_size: Vec2,
    obstacle_field: FlowField,
    merged_field: FlowField,
    spatial_hash: SpatialHash,

    /// Per sub-step scratch, reused between frames.
    positions: Vec<Vec2>,
    accelerations: Vec<Vec2>,
}

impl ParticleSimulation {
    /// Create a simulation with room for `capacity` particles.
    ///
    /// # Errors
    ///
    /// * The params are invalid.
    /// * The particle storage cannot be allocated.
    pub fn new(
        capacity: usize,
        params: SimulationParams,
    ) -> Result<Self, ParticleError> {
        params.validate()?;
        Ok(Self::with_buffer(ParticleBuffer::new(capacity)?, params))
    }

    /// Like [ParticleSimulation::new] with deterministic spawn jitter.
    pub fn with_seed(
        capacity: usize,
        params: SimulationParams,
        seed: u64,
    ) -> Result<Self, ParticleError> {
        params.validate()?;
        let buffer = ParticleBuffer::with_seed(capacity, seed)?;
        Ok(Self::with_buffer(buffer, params))
    }

    fn with_buffer(buffer: ParticleBuffer, params: SimulationParams) -> Self {
        Self {
            buffer,
            params,
            world_size: Vec2::zeros(),
            obstacle_field: FlowField::default(),
            merged_field: FlowField::default(),
            spatial_hash: SpatialHash::default(),
            positions: vec![],
            accelerations: vec![],
        }
    }

    /// Set the world bounds. The obstacle field is cleared when the size
    /// changes.
    pub fn resize_world(
        &mut self,
        width: usize,
        height: usize,
    ) -> Result<(), ParticleError> {
        let size = Vec2::new(width as f32, height as f32);
        if size == self.world_size {
            return Ok(());
        }

        self.obstacle_field.resize(width, height)?;
        self.merged_field.resize(width, height)?;
        self.world_size = size;

        log::debug!("Resized particle world to {}x{}", width, height);
        Ok(())
    }

    /// Rebuild the obstacle field from `mask`. Masks which do not match the
    /// world size are resampled to it.
    pub fn create_obstacle_flow_field(
        &mut self,
        mask: &ObstacleMask,
    ) -> Result<(), ParticleError> {
        let (width, height) = (
            self.obstacle_field.width(),
            self.obstacle_field.height(),
        );
        self.obstacle_field = if mask.width() == width
            && mask.height() == height
        {
            mask.flow_field()?
        } else {
            mask.resampled(width, height).flow_field()?
        };

        log::trace!(
            indoc!(
                "
                Created obstacle flow field
                  - obstacle texels: {}
                  - max magnitude: {}"
            ),
            mask.obstacle_count(),
            self.obstacle_field.max_magnitude(),
        );
        Ok(())
    }

    /// Spawn particles described in a `viewport_width x viewport_height`
    /// viewport. The request is rescaled into world coordinates first.
    pub fn spawn(
        &mut self,
        viewport_width: f32,
        viewport_height: f32,
        spec: &SpawnSpec,
    ) -> Result<SpawnOutcome, ParticleError> {
        if !(viewport_width.is_finite() && viewport_width > 0.0)
            || !(viewport_height.is_finite() && viewport_height > 0.0)
        {
            return Err(ParticleError::InvalidSpawnSpec("viewport"));
        }

        let scale = Vec2::new(
            self.world_size.x / viewport_width,
            self.world_size.y / viewport_height,
        );
        let world_spec = SpawnSpec {
            position: spec.position.component_mul(&scale),
            velocity: spec.velocity.component_mul(&scale),
            dimensions: spec.dimensions.component_mul(&scale),
            jitter: spec.jitter * 0.5 * (scale.x + scale.y),
            ..*spec
        };
        self.buffer
            .spawn(self.world_size.x, self.world_size.y, &world_spec)
    }

    /// Advance the simulation by `params.steps` sub-steps.
    pub fn update(&mut self, field: &FlowField) {
        self.update_steps(field, self.params.steps);
    }

    /// Advance the simulation by `steps` sub-steps. Zero is treated as one.
    ///
    /// `field` is the external acceleration field, in world texels.
    pub fn update_steps(&mut self, field: &FlowField, steps: u32) {
        if self.buffer.live_count() == 0 {
            return;
        }

        self.merged_field.fill(Vec2::zeros());
        self.merged_field.merge_add(field, 1.0);
        self.merged_field
            .merge_add(&self.obstacle_field, self.params.mul_obs);

        for _ in 0..steps.max(1) {
            self.sub_step();
            let removed = self.buffer.compact();
            if removed > 0 {
                log::trace!("Removed {} aged out particles", removed);
            }
            if self.buffer.live_count() == 0 {
                break;
            }
        }
    }

    fn sub_step(&mut self) {
        let Self {
            buffer,
            params,
            world_size,
            merged_field,
            spatial_hash,
            positions,
            accelerations,
            ..
        } = self;
        let particles = buffer.live_mut();

        positions.clear();
        positions.extend(particles.iter().map(|p| p.position));
        spatial_hash.rebuild(
            positions,
            *world_size,
            params.interaction_radius(),
        );

        let snapshot: &[Vec2] = positions;
        let hash: &SpatialHash = spatial_hash;
        let params: &SimulationParams = params;
        accelerations.clear();
        for (i, position) in snapshot.iter().enumerate() {
            let pairwise = pairwise_force(i, snapshot, hash, params);
            accelerations.push(
                merged_field.sample(position.x, position.y)
                    + pairwise * params.collision_mult,
            );
        }

        for (particle, acceleration) in
            particles.iter_mut().zip(accelerations.iter())
        {
            integrate(particle, acceleration, params, world_size);
        }
    }

    /// Forget every particle. Storage is kept.
    pub fn reset(&mut self) {
        self.buffer.reset();
    }

    pub fn live_count(&self) -> usize {
        self.buffer.live_count()
    }

    pub fn particles(&self) -> &[Particle] {
        self.buffer.live()
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        self.buffer.live_mut()
    }

    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    pub fn obstacle_field(&self) -> &FlowField {
        &self.obstacle_field
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// The params are checked again before being applied.
    pub fn set_params(
        &mut self,
        params: SimulationParams,
    ) -> Result<(), ParticleError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    /// Hand the live particles to `renderer`.
    pub fn display<R: ParticleRenderer>(&self, renderer: &mut R) {
        renderer.render(
            self.buffer.live(),
            &self.params.display,
            self.world_size,
        );
    }
}

/// Collision and cohesion acting on particle `i`, from the positions
/// snapshot.
///
/// Each pair contributes equal and opposite terms, so the result does not
/// depend on the order particles are visited.
fn pairwise_force(
    i: usize,
    positions: &[Vec2],
    spatial_hash: &SpatialHash,
    params: &SimulationParams,
) -> Vec2 {
    let position = positions[i];
    let radius = params.interaction_radius();
    let mut force = Vec2::zeros();

    spatial_hash.for_each_candidate(&position, |j| {
        if j == i {
            return;
        }
        let offset = position - positions[j];
        let distance_squared = offset.norm_squared();
        // non-finite positions never interact
        if !distance_squared.is_finite() || distance_squared >= radius * radius
        {
            return;
        }

        let distance = distance_squared.sqrt();
        let direction = if distance > f32::EPSILON {
            offset / distance
        } else if i < j {
            // coincident particles separate along x
            Vec2::x()
        } else {
            -Vec2::x()
        };

        if distance < params.size_collision {
            let overlap = 1.0 - distance / params.size_collision;
            force += direction * overlap * params.mul_col;
        } else if params.size_cohesion > 0.0 {
            let t = (distance - params.size_collision) / params.size_cohesion;
            force -= direction * 4.0 * t * (1.0 - t) * params.mul_coh;
        }
    });

    force
}

fn integrate(
    particle: &mut Particle,
    acceleration: &Vec2,
    params: &SimulationParams,
    world_size: &Vec2,
) {
    let previous = particle.position;

    let velocity = particle.velocity * params.velocity_damping + acceleration;
    let mut velocity = limit_length(&velocity, params.velocity_limit);
    let mut position = previous + velocity;

    for axis in 0..2 {
        if position[axis] < 0.0 {
            position[axis] = 0.0;
            velocity[axis] = velocity[axis].abs();
        } else if position[axis] > world_size[axis] {
            position[axis] = world_size[axis];
            velocity[axis] = -velocity[axis].abs();
        }
    }

    if !is_finite(&velocity) {
        velocity = Vec2::zeros();
    }
    if !is_finite(&position) {
        position = clamp_to_box(&previous, world_size);
    }

    particle.position = position;
    particle.velocity = velocity;
    particle.age = particle.age.saturating_add(1);
    if params.max_age.is_some_and(|max_age| particle.age > max_age) {
        particle.state = ParticleState::Removed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_params() -> SimulationParams {
        SimulationParams {
            velocity_damping: 1.0,
            mul_col: 0.0,
            mul_coh: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn velocity_is_clamped_to_the_limit() {
        let params = SimulationParams {
            velocity_limit: 1.0,
            ..quiet_params()
        };
        let mut particle = Particle {
            position: Vec2::new(5.0, 5.0),
            velocity: Vec2::new(3.0, 4.0),
            state: ParticleState::Active,
            ..Default::default()
        };

        integrate(
            &mut particle,
            &Vec2::zeros(),
            &params,
            &Vec2::new(10.0, 10.0),
        );

        assert!((particle.velocity.norm() - 1.0).abs() < 1e-6);
        assert!((particle.position - Vec2::new(5.6, 5.8)).norm() < 1e-5);
    }

    #[test]
    fn leaving_the_world_reflects_the_velocity() {
        let mut particle = Particle {
            position: Vec2::new(9.5, 5.0),
            velocity: Vec2::new(2.0, 0.0),
            state: ParticleState::Active,
            ..Default::default()
        };

        integrate(
            &mut particle,
            &Vec2::zeros(),
            &quiet_params(),
            &Vec2::new(10.0, 10.0),
        );

        assert_eq!(particle.position, Vec2::new(10.0, 5.0));
        assert_eq!(particle.velocity, Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn overlapping_particles_push_apart_symmetrically() {
        let params = SimulationParams::default();
        let positions = [Vec2::new(10.0, 10.0), Vec2::new(12.0, 10.0)];
        let mut hash = SpatialHash::default();
        hash.rebuild(
            &positions,
            Vec2::new(32.0, 32.0),
            params.interaction_radius(),
        );

        let a = pairwise_force(0, &positions, &hash, &params);
        let b = pairwise_force(1, &positions, &hash, &params);

        assert!(a.x < 0.0);
        assert!((a + b).norm() < 1e-6);
    }

    #[test]
    fn particles_in_the_cohesion_band_attract() {
        let params = SimulationParams::default();
        let positions = [Vec2::new(10.0, 10.0), Vec2::new(20.0, 10.0)];
        let mut hash = SpatialHash::default();
        hash.rebuild(
            &positions,
            Vec2::new(32.0, 32.0),
            params.interaction_radius(),
        );

        let a = pairwise_force(0, &positions, &hash, &params);

        assert!(a.x > 0.0);
    }

    #[test]
    fn non_finite_neighbors_exert_no_force() {
        let params = SimulationParams::default();
        let positions = [Vec2::new(f32::NAN, 5.0), Vec2::new(5.0, 5.0)];
        let mut hash = SpatialHash::default();
        hash.rebuild(
            &positions,
            Vec2::new(32.0, 32.0),
            params.interaction_radius(),
        );

        assert_eq!(pairwise_force(1, &positions, &hash, &params), Vec2::zeros());
        assert_eq!(pairwise_force(0, &positions, &hash, &params), Vec2::zeros());
    }
}
