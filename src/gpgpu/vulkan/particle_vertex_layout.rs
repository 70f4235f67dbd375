use ash::vk;
use memoffset::offset_of;

use crate::particles::Particle;

/// Particles are read directly from the particle buffer, one vertex per
/// record.
pub fn particle_vertex_binding(
    binding: u32,
) -> vk::VertexInputBindingDescription {
    vk::VertexInputBindingDescription {
        binding,
        stride: std::mem::size_of::<Particle>() as u32,
        input_rate: vk::VertexInputRate::VERTEX,
    }
}

/// Position, velocity, and radius at locations 0, 1, and 2.
pub fn particle_vertex_attributes(
    binding: u32,
) -> [vk::VertexInputAttributeDescription; 3] {
    [
        vk::VertexInputAttributeDescription {
            binding,
            location: 0,
            format: vk::Format::R32G32_SFLOAT,
            offset: offset_of!(Particle, position) as u32,
        },
        vk::VertexInputAttributeDescription {
            binding,
            location: 1,
            format: vk::Format::R32G32_SFLOAT,
            offset: offset_of!(Particle, velocity) as u32,
        },
        vk::VertexInputAttributeDescription {
            binding,
            location: 2,
            format: vk::Format::R32_SFLOAT,
            offset: offset_of!(Particle, radius) as u32,
        },
    ]
}
