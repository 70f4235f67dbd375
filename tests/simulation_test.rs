//! Whole-frame behavior of the particle simulation.

use ccthw_flowfield::{
    flow_field::{FlowField, ObstacleMask},
    math::Vec2,
    particles::{
        DisplayParams, Particle, ParticleRenderer, ParticleSimulation,
        SimulationParams, SpawnSpec,
    },
};

/// Params with no damping and no pairwise forces.
fn inertial_params() -> SimulationParams {
    SimulationParams {
        steps: 1,
        velocity_damping: 1.0,
        velocity_limit: 100.0,
        mul_col: 0.0,
        mul_coh: 0.0,
        mul_obs: 0.0,
        ..Default::default()
    }
}

fn simulation(params: SimulationParams, world: usize) -> ParticleSimulation {
    let mut sim = ParticleSimulation::with_seed(256, params, 3).unwrap();
    sim.resize_world(world, world).unwrap();
    sim
}

#[test]
fn particles_move_linearly_without_forces() {
    let mut sim = simulation(inertial_params(), 1000);
    let velocity = Vec2::new(1.5, -0.75);
    let spec = SpawnSpec::radial(1, Vec2::new(100.0, 500.0), Vec2::zeros())
        .with_velocity(velocity);
    sim.spawn(1000.0, 1000.0, &spec).unwrap();
    let field = FlowField::new(1000, 1000).unwrap();

    for _ in 0..100 {
        sim.update_steps(&field, 1);
    }

    let particle = sim.particles()[0];
    let expected = Vec2::new(100.0, 500.0) + velocity * 100.0;
    assert!(
        (particle.position - expected).norm() < 1e-2,
        "expected {} but got {}",
        expected,
        particle.position
    );
    assert_eq!(particle.velocity, velocity);
    assert_eq!(particle.age, 100);
}

#[test]
fn update_runs_the_configured_number_of_steps() {
    let params = SimulationParams {
        steps: 4,
        ..inertial_params()
    };
    let mut sim = simulation(params, 100);
    let spec = SpawnSpec::radial(1, Vec2::new(10.0, 10.0), Vec2::zeros())
        .with_velocity(Vec2::new(1.0, 0.0));
    sim.spawn(100.0, 100.0, &spec).unwrap();

    sim.update(&FlowField::default());

    assert_eq!(sim.particles()[0].age, 4);
    assert!((sim.particles()[0].position.x - 14.0).abs() < 1e-5);
}

#[test]
fn zero_steps_is_treated_as_one() {
    let mut sim = simulation(inertial_params(), 100);
    let spec = SpawnSpec::radial(1, Vec2::new(10.0, 10.0), Vec2::zeros());
    sim.spawn(100.0, 100.0, &spec).unwrap();

    sim.update_steps(&FlowField::default(), 0);

    assert_eq!(sim.particles()[0].age, 1);
}

#[test]
fn updating_an_empty_simulation_changes_nothing() {
    let mut sim = simulation(SimulationParams::default(), 64);
    let spec = SpawnSpec::radial(10, Vec2::new(32.0, 32.0), Vec2::zeros())
        .with_velocity(Vec2::new(1.0, 1.0));
    sim.spawn(64.0, 64.0, &spec).unwrap();
    sim.reset();
    let field = FlowField::from_fn(64, 64, |_, _| Vec2::new(0.0, 1.0)).unwrap();
    let before = sim.buffer().storage().to_vec();

    sim.update(&field);

    assert_eq!(sim.live_count(), 0);
    assert!(sim.particles().is_empty());
    assert_eq!(sim.buffer().storage(), &before[..]);
    assert_eq!(sim.world_size(), Vec2::new(64.0, 64.0));
}

#[test]
fn default_params_do_not_cap_the_speed() {
    let params = SimulationParams {
        steps: 1,
        velocity_damping: 1.0,
        mul_col: 0.0,
        mul_coh: 0.0,
        mul_obs: 0.0,
        ..Default::default()
    };
    let mut sim = simulation(params, 1000);
    let velocity = Vec2::new(9.0, 0.0);
    let spec = SpawnSpec::radial(1, Vec2::new(10.0, 500.0), Vec2::zeros())
        .with_velocity(velocity);
    sim.spawn(1000.0, 1000.0, &spec).unwrap();

    for _ in 0..10 {
        sim.update(&FlowField::default());
    }

    let particle = sim.particles()[0];
    assert_eq!(particle.velocity, velocity);
    assert!((particle.position.x - 100.0).abs() < 1e-3);
}

#[test]
fn a_non_finite_particle_leaves_its_neighbors_alone() {
    let params = SimulationParams {
        steps: 1,
        velocity_damping: 1.0,
        mul_obs: 0.0,
        ..Default::default()
    };
    let mut sim = simulation(params, 100);
    let velocity = Vec2::new(1.0, 0.5);
    let spec = SpawnSpec::rect(2, Vec2::new(5.0, 5.0), Vec2::zeros())
        .with_velocity(velocity);
    sim.spawn(100.0, 100.0, &spec).unwrap();
    sim.particles_mut()[0].position = Vec2::new(f32::NAN, f32::NAN);

    sim.update(&FlowField::default());

    let healthy = sim.particles()[1];
    assert_eq!(healthy.velocity, velocity);
    assert!((healthy.position - Vec2::new(6.0, 5.5)).norm() < 1e-5);
    assert!(sim.particles()[0].position.x.is_finite());
}

#[test]
fn the_field_accelerates_particles() {
    let mut sim = simulation(inertial_params(), 100);
    let spec = SpawnSpec::radial(1, Vec2::new(50.0, 10.0), Vec2::zeros());
    sim.spawn(100.0, 100.0, &spec).unwrap();
    let gravity =
        FlowField::from_fn(100, 100, |_, _| Vec2::new(0.0, 0.5)).unwrap();

    sim.update_steps(&gravity, 2);

    // v1 = 0.5, v2 = 1.0, y = 10 + 0.5 + 1.0
    let particle = sim.particles()[0];
    assert!((particle.velocity.y - 1.0).abs() < 1e-6);
    assert!((particle.position.y - 11.5).abs() < 1e-5);
}

#[test]
fn particles_stay_inside_the_world() {
    let mut sim = simulation(SimulationParams::default(), 50);
    let spec =
        SpawnSpec::rect(100, Vec2::new(25.0, 25.0), Vec2::new(20.0, 20.0))
            .with_velocity(Vec2::new(5.0, -5.0));
    sim.spawn(50.0, 50.0, &spec).unwrap();
    let field = FlowField::new(50, 50).unwrap();

    for _ in 0..200 {
        sim.update(&field);
    }

    for particle in sim.particles() {
        assert!((0.0..=50.0).contains(&particle.position.x));
        assert!((0.0..=50.0).contains(&particle.position.y));
    }
}

#[test]
fn non_finite_state_is_sanitized() {
    let mut sim = simulation(inertial_params(), 100);
    let spec = SpawnSpec::rect(2, Vec2::new(50.0, 50.0), Vec2::new(20.0, 0.0));
    sim.spawn(100.0, 100.0, &spec).unwrap();
    sim.particles_mut()[0].velocity = Vec2::new(f32::NAN, 1.0);
    sim.particles_mut()[1].position = Vec2::new(f32::INFINITY, 20.0);

    sim.update_steps(&FlowField::default(), 1);

    for particle in sim.particles() {
        assert!(particle.position.x.is_finite());
        assert!(particle.position.y.is_finite());
        assert!(particle.velocity.x.is_finite());
        assert!(particle.velocity.y.is_finite());
    }
    assert_eq!(sim.particles()[0].velocity, Vec2::zeros());
}

#[test]
fn aged_out_particles_are_compacted_in_order() {
    let params = SimulationParams {
        max_age: Some(2),
        ..inertial_params()
    };
    let mut sim = simulation(params, 100);
    let old = SpawnSpec::rect(3, Vec2::new(50.0, 20.0), Vec2::new(30.0, 0.0));
    sim.spawn(100.0, 100.0, &old).unwrap();
    let field = FlowField::default();
    sim.update_steps(&field, 2);

    let young =
        SpawnSpec::rect(2, Vec2::new(50.0, 80.0), Vec2::new(30.0, 0.0));
    sim.spawn(100.0, 100.0, &young).unwrap();
    let expected: Vec<Vec2> =
        sim.particles()[3..].iter().map(|p| p.position).collect();

    sim.update_steps(&field, 1);

    let survivors: Vec<Vec2> =
        sim.particles().iter().map(|p| p.position).collect();
    assert_eq!(sim.live_count(), 2);
    assert_eq!(survivors, expected);
}

#[test]
fn obstacles_push_particles_out() {
    let params = SimulationParams {
        mul_obs: 1.0,
        ..inertial_params()
    };
    let mut sim = simulation(params, 20);
    let mut mask = ObstacleMask::new(20, 20);
    for y in 5..15 {
        for x in 5..15 {
            mask.set_obstacle(x, y, true);
        }
    }
    sim.create_obstacle_flow_field(&mask).unwrap();
    assert!(sim.obstacle_field().max_magnitude() > 0.0);

    // just inside the left edge of the obstacle
    let spec = SpawnSpec::radial(1, Vec2::new(5.5, 10.5), Vec2::zeros());
    sim.spawn(20.0, 20.0, &spec).unwrap();

    sim.update_steps(&FlowField::default(), 1);

    assert!(sim.particles()[0].velocity.x < 0.0);
}

#[test]
fn spawn_rescales_the_viewport_into_the_world() {
    let mut sim = simulation(inertial_params(), 200);
    let spec = SpawnSpec::radial(1, Vec2::new(50.0, 25.0), Vec2::zeros())
        .with_velocity(Vec2::new(1.0, 1.0));

    sim.spawn(100.0, 100.0, &spec).unwrap();

    let particle = sim.particles()[0];
    assert_eq!(particle.position, Vec2::new(100.0, 50.0));
    assert_eq!(particle.velocity, Vec2::new(2.0, 2.0));
}

#[test]
fn reset_forgets_every_particle() {
    let mut sim = simulation(inertial_params(), 100);
    let spec = SpawnSpec::radial(10, Vec2::new(50.0, 50.0), Vec2::zeros());
    sim.spawn(100.0, 100.0, &spec).unwrap();

    sim.reset();

    assert_eq!(sim.live_count(), 0);
}

#[derive(Default)]
struct CountingRenderer {
    particles: usize,
    size: f32,
    world: Option<Vec2>,
}

impl ParticleRenderer for CountingRenderer {
    fn render(
        &mut self,
        particles: &[Particle],
        display: &DisplayParams,
        world_size: Vec2,
    ) {
        self.particles = particles.len();
        self.size = display.size_display;
        self.world = Some(world_size);
    }
}

#[test]
fn display_hands_the_live_particles_to_the_renderer() {
    let mut sim = simulation(SimulationParams::default(), 64);
    let spec =
        SpawnSpec::radial(12, Vec2::new(32.0, 32.0), Vec2::new(8.0, 8.0));
    sim.spawn(64.0, 64.0, &spec).unwrap();

    let mut renderer = CountingRenderer::default();
    sim.display(&mut renderer);

    assert_eq!(renderer.particles, 12);
    assert_eq!(renderer.size, 8.0);
    assert_eq!(renderer.world, Some(Vec2::new(64.0, 64.0)));
}
