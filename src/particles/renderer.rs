use super::{DisplayParams, Particle};
use crate::math::Vec2;

/// Draws the live particles of a simulation.
///
/// Implementations own whatever surface they draw into. The simulation only
/// hands over the live records for the duration of the call.
pub trait ParticleRenderer {
    fn render(
        &mut self,
        particles: &[Particle],
        display: &DisplayParams,
        world_size: Vec2,
    );
}
