//! Particles falling through a scene with a rotating obstacle.
//!
//! Runs headless and writes the final frame to a PNG. Usage:
//!
//! ```text
//! cargo run --example flow_field_particles -- [output.png] [frames]
//! ```

use {
    anyhow::{Context, Result},
    ccthw_flowfield::{
        flow_field::{FlowField, ObstacleMask},
        gpgpu::{
            AttachmentDescriptor, FramebufferTarget, HeadlessDriver,
            SurfaceHandle,
        },
        logging,
        math::Vec2,
        particles::{ParticleSimulation, SimulationParams, SpawnSpec},
    },
    image::{Rgba, RgbaImage},
    indoc::indoc,
    std::sync::Arc,
};

mod canvas_renderer;
mod obstacles;

use self::{canvas_renderer::CanvasRenderer, obstacles::draw_obstacles};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 800;
const CAPACITY: usize = 500_000;

/// The scene spawns an extra burst on these frames, like a held mouse
/// button.
const BURST_FRAMES: std::ops::Range<u32> = 60..240;

fn main() -> Result<()> {
    let _logger = logging::setup()?;

    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .unwrap_or_else(|| "flow_field_particles.png".to_owned());
    let frames: u32 = match args.next() {
        Some(frames) => frames
            .parse()
            .with_context(|| format!("Invalid frame count {:?}", frames))?,
        None => 600,
    };

    let params = SimulationParams {
        steps: 2,
        velocity_damping: 0.99,
        velocity_limit: 6.0,
        size_collision: 8.0,
        size_cohesion: 4.0,
        mul_col: 2.0,
        mul_coh: 2.0,
        mul_obs: 2.0,
        collision_mult: 0.1,
        ..Default::default()
    };
    let mut particles = ParticleSimulation::new(CAPACITY, params)
        .context("Unable to create the particle simulation")?;

    // The "up" field scaled by a negative weight pulls everything down.
    let (w, h) = (WIDTH as usize, HEIGHT as usize);
    let up = FlowField::from_fn(w, h, |_, _| Vec2::new(0.0, -1.0))?;
    let mut gravity = FlowField::new(w, h)?;
    gravity.merge_add(&up, -0.05);

    // The GPU side of the pipeline runs against the recording driver.
    let driver = Arc::new(HeadlessDriver::with_outputs(8));
    let mut target = FramebufferTarget::new(driver.clone())
        .context("Unable to create the canvas framebuffer target")?;
    let canvas_surface =
        AttachmentDescriptor::texture_2d(SurfaceHandle(1), WIDTH, HEIGHT);

    let mut obstacle_image = RgbaImage::new(WIDTH, HEIGHT);
    let mut renderer = CanvasRenderer::new(WIDTH, HEIGHT);

    for frame in 0..frames {
        draw_obstacles(&mut obstacle_image, frame);
        particles.resize_world(w, h)?;
        spawn_particles(&mut particles, frame)?;

        let mask = ObstacleMask::from_image(
            &obstacle_image,
            obstacles::OBSTACLE.0,
            false,
        )?;
        particles.create_obstacle_flow_field(&mask)?;
        particles.update(&gravity);

        target.clear([1.0, 1.0, 1.0, 1.0], &[canvas_surface]);
        renderer.clear(Rgba([255, 255, 255, 255]), &obstacle_image);
        particles.display(&mut renderer);

        if frame % 60 == 0 {
            log::info!(
                "frame {} with {} particles",
                frame,
                particles.live_count()
            );
        }
    }

    renderer
        .canvas()
        .save(&output)
        .with_context(|| format!("Unable to write {}", output))?;

    log::info!(
        indoc!(
            "
            Finished {} frames
              - particles: {}
              - driver calls: {}
              - output: {}"
        ),
        frames,
        particles.live_count(),
        driver.calls().len(),
        output,
    );
    target.release();

    Ok(())
}

/// A steady trickle from the top of the scene plus a burst which grows with
/// the particle count.
fn spawn_particles(
    particles: &mut ParticleSimulation,
    frame: u32,
) -> Result<()> {
    let (vw, vh) = (WIDTH as f32, HEIGHT as f32);

    let origin = Vec2::new(vw / 2.0, vh / 4.0);
    let trickle = SpawnSpec::radial(1, origin, Vec2::new(10.0, 10.0))
        .with_velocity(Vec2::new(0.0, -4.0));
    particles.spawn(vw, vh, &trickle)?;

    if BURST_FRAMES.contains(&frame) {
        let count = ((particles.live_count() as f32 * 0.01).ceil() as usize)
            .clamp(1, 10_000);
        let radius = (count as f32).sqrt().ceil();

        // sweep the burst across the upper part of the scene
        let t = (frame - BURST_FRAMES.start) as f32
            / (BURST_FRAMES.end - BURST_FRAMES.start) as f32;
        let position = Vec2::new(vw * (0.2 + 0.6 * t), vh * 0.2);

        let burst =
            SpawnSpec::radial(count, position, Vec2::new(radius, radius))
                .with_velocity(Vec2::new(5.0 * (0.5 - t), 0.0));
        let outcome = particles.spawn(vw, vh, &burst)?;
        if outcome.is_truncated() {
            log::debug!("burst truncated to {} particles", outcome.spawned);
        }
    }

    Ok(())
}
