//! Particle storage and the flow-field driven simulation step.

mod particle_buffer;
mod renderer;
mod simulation;
mod simulation_params;
mod spatial_hash;
mod spawn_spec;

use thiserror::Error;

use crate::{flow_field::FlowFieldError, math::Vec2};

pub use self::{
    particle_buffer::{ParticleBuffer, SpawnOutcome},
    renderer::ParticleRenderer,
    simulation::ParticleSimulation,
    simulation_params::{DisplayParams, SimulationParams},
};

#[derive(Debug, Error)]
pub enum ParticleError {
    #[error("Unable to allocate storage for {} particles", .0)]
    AllocationFailed(usize),

    #[error("Invalid spawn request, {} must be finite and non-negative", .0)]
    InvalidSpawnSpec(&'static str),

    #[error("Invalid simulation parameter {}: {}", .field, .reason)]
    InvalidParams {
        field: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    FlowField(#[from] FlowFieldError),
}

/// The lifecycle of one particle record.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleState {
    /// Storage past the live count.
    #[default]
    Inactive,
    Active,

    /// Marked for removal, compacted out at the end of the sub-step.
    Removed,
}

/// A single particle record.
///
/// The layout is fixed so the live slice of a
/// [ParticleBuffer] can be uploaded as a vertex buffer as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,

    /// Sub-steps survived since spawning.
    pub age: u32,
    pub state: ParticleState,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            radius: 0.0,
            age: 0,
            state: ParticleState::Inactive,
        }
    }
}

/// How a batch of spawned particles is laid out around its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arrangement {
    /// A filled ellipse with radii `dimensions`, points placed on a
    /// golden-angle spiral.
    #[default]
    Radial,

    /// A row-major lattice covering `2 * dimensions`.
    Rect,
}

/// A request to spawn a batch of particles.
///
/// Coordinates are in the viewport space passed to `spawn`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSpec {
    pub count: usize,
    pub position: Vec2,
    pub velocity: Vec2,

    /// Half extents of the spawn area.
    pub dimensions: Vec2,
    pub arrangement: Arrangement,

    /// Maximum random offset added to each position along each axis.
    pub jitter: f32,
    pub radius: f32,
}
