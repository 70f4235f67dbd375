use rand::{rngs::StdRng, SeedableRng};

use super::{Particle, ParticleError, ParticleState, SpawnSpec};
use crate::math::{clamp_to_box, Vec2};

/// How a spawn request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnOutcome {
    pub requested: usize,
    pub spawned: usize,
}

impl SpawnOutcome {
    /// True when the buffer ran out of capacity before every requested
    /// particle was spawned.
    pub fn is_truncated(&self) -> bool {
        self.spawned < self.requested
    }
}

/// A fixed-capacity arena of particle records.
///
/// The first `live_count` records are live. Storage is allocated once and
/// never shrinks, so resetting and respawning does not allocate.
pub struct ParticleBuffer {
    particles: Vec<Particle>,
    live_count: usize,
    rng: StdRng,
}

impl ParticleBuffer {
    /// Allocate storage for `capacity` particles. Spawn jitter is seeded from
    /// system entropy.
    pub fn new(capacity: usize) -> Result<Self, ParticleError> {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    /// Allocate storage with a deterministic jitter sequence.
    pub fn with_seed(
        capacity: usize,
        seed: u64,
    ) -> Result<Self, ParticleError> {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: StdRng) -> Result<Self, ParticleError> {
        let mut particles = Vec::new();
        particles
            .try_reserve_exact(capacity)
            .map_err(|_| ParticleError::AllocationFailed(capacity))?;
        particles.resize(capacity, Particle::default());

        log::debug!("Allocated particle buffer with capacity {}", capacity);

        Ok(Self {
            particles,
            live_count: 0,
            rng,
        })
    }

    /// Append the particles described by `spec`.
    ///
    /// Positions are clamped into `[0, viewport_width] x [0,
    /// viewport_height]`. Requests past the remaining capacity are truncated
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns [ParticleError::InvalidSpawnSpec] for non-finite or negative
    /// geometry. Nothing is spawned in that case.
    pub fn spawn(
        &mut self,
        viewport_width: f32,
        viewport_height: f32,
        spec: &SpawnSpec,
    ) -> Result<SpawnOutcome, ParticleError> {
        spec.validate()?;
        let viewport = Vec2::new(viewport_width, viewport_height);
        if !viewport.x.is_finite()
            || !viewport.y.is_finite()
            || viewport.x < 0.0
            || viewport.y < 0.0
        {
            return Err(ParticleError::InvalidSpawnSpec("viewport"));
        }

        let requested = spec.count;
        let count = requested.min(self.remaining());
        if count < requested {
            log::warn!(
                "ParticleBuffer::spawn request exceeds the remaining \
                 capacity: {} > {}",
                requested,
                count
            );
        }

        let start = self.live_count;
        for (i, particle) in
            self.particles[start..start + count].iter_mut().enumerate()
        {
            let position =
                spec.layout(i, count) + spec.jitter_offset(&mut self.rng);
            *particle = Particle {
                position: clamp_to_box(&position, &viewport),
                velocity: spec.velocity,
                radius: spec.radius,
                age: 0,
                state: ParticleState::Active,
            };
        }
        self.live_count += count;

        Ok(SpawnOutcome {
            requested,
            spawned: count,
        })
    }

    /// Forget every live particle. Storage is kept.
    pub fn reset(&mut self) {
        self.live_count = 0;
    }

    pub fn live(&self) -> &[Particle] {
        &self.particles[..self.live_count]
    }

    pub fn live_mut(&mut self) -> &mut [Particle] {
        &mut self.particles[..self.live_count]
    }

    /// Every record including the ones past `live_count`, which are stale.
    /// Matches the layout of a vertex buffer sized to the capacity.
    pub fn storage(&self) -> &[Particle] {
        &self.particles
    }

    /// The live particle at `index`.
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.live().get(index)
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.live_count
    }

    /// Move every active record to the front, preserving their order, and
    /// shrink the live count to match. Returns how many records were
    /// removed.
    pub fn compact(&mut self) -> usize {
        let mut write = 0;
        for read in 0..self.live_count {
            if self.particles[read].state == ParticleState::Active {
                self.particles[write] = self.particles[read];
                write += 1;
            }
        }
        for particle in &mut self.particles[write..self.live_count] {
            particle.state = ParticleState::Inactive;
        }
        let removed = self.live_count - write;
        self.live_count = write;
        removed
    }
}

impl std::fmt::Debug for ParticleBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleBuffer")
            .field("capacity", &self.capacity())
            .field("live_count", &self.live_count)
            .finish()
    }
}
