//! Flow field merging, sampling, and obstacle field generation.

use ccthw_flowfield::{
    flow_field::{FlowField, ObstacleMask},
    math::Vec2,
};

fn pattern(width: usize, height: usize, seed: f32) -> FlowField {
    FlowField::from_fn(width, height, |x, y| {
        Vec2::new(seed * x as f32 - y as f32, seed + (x * y) as f32 * 0.25)
    })
    .unwrap()
}

fn assert_fields_close(a: &FlowField, b: &FlowField) {
    for (i, (va, vb)) in a.as_slice().iter().zip(b.as_slice()).enumerate() {
        assert!(
            (va - vb).norm() < 1e-5,
            "texel {} differs: {} vs {}",
            i,
            va,
            vb
        );
    }
}

#[test]
fn merge_add_is_commutative() {
    let a = pattern(6, 4, 0.5);
    let b = pattern(6, 4, -1.5);

    let mut ab = FlowField::new(6, 4).unwrap();
    ab.merge_add(&a, 1.0);
    ab.merge_add(&b, 1.0);

    let mut ba = FlowField::new(6, 4).unwrap();
    ba.merge_add(&b, 1.0);
    ba.merge_add(&a, 1.0);

    assert_fields_close(&ab, &ba);
}

#[test]
fn merge_add_is_associative() {
    let a = pattern(5, 5, 0.25);
    let b = pattern(5, 5, 2.0);
    let c = pattern(5, 5, -0.75);

    // (a + b) + c
    let mut left = FlowField::new(5, 5).unwrap();
    let mut a_plus_b = FlowField::new(5, 5).unwrap();
    a_plus_b.merge_add(&a, 1.0);
    a_plus_b.merge_add(&b, 1.0);
    left.merge_add(&a_plus_b, 1.0);
    left.merge_add(&c, 1.0);

    // a + (b + c)
    let mut right = FlowField::new(5, 5).unwrap();
    let mut b_plus_c = FlowField::new(5, 5).unwrap();
    b_plus_c.merge_add(&b, 1.0);
    b_plus_c.merge_add(&c, 1.0);
    right.merge_add(&a, 1.0);
    right.merge_add(&b_plus_c, 1.0);

    assert_fields_close(&left, &right);
}

#[test]
fn merge_add_scales_the_other_field() {
    let gravity = FlowField::from_fn(3, 3, |_, _| Vec2::new(0.0, 1.0)).unwrap();
    let mut field = FlowField::new(3, 3).unwrap();

    field.merge_add(&gravity, -0.05);

    for texel in field.as_slice() {
        assert!((texel.y + 0.05).abs() < 1e-7);
        assert_eq!(texel.x, 0.0);
    }
}

#[test]
fn sampling_at_texel_centers_returns_the_texel() {
    let field = pattern(7, 3, 1.25);

    for y in 0..3 {
        for x in 0..7 {
            let sampled = field.sample(x as f32 + 0.5, y as f32 + 0.5);
            let texel = field.texel(x, y).unwrap();
            assert!(
                (sampled - texel).norm() < 1e-5,
                "texel ({}, {}) sampled as {} but stores {}",
                x,
                y,
                sampled,
                texel
            );
        }
    }
}

#[test]
fn sampling_off_the_grid_clamps_to_the_edge() {
    let field = pattern(4, 4, 1.0);

    assert_eq!(field.sample(-10.0, -3.0), field.texel(0, 0).unwrap());
    assert_eq!(field.sample(100.0, 0.5), field.texel(3, 0).unwrap());
    assert_eq!(field.sample(100.0, 100.0), field.texel(3, 3).unwrap());
}

#[test]
fn resize_changes_the_extent() {
    let mut field = pattern(4, 4, 1.0);

    field.resize(8, 2).unwrap();

    assert_eq!((field.width(), field.height()), (8, 2));
    assert_eq!(field.as_slice().len(), 16);
}

fn block_mask() -> ObstacleMask {
    // a 9x9 obstacle block centered in a 15x15 free area
    let mut mask = ObstacleMask::new(15, 15);
    for y in 3..12 {
        for x in 3..12 {
            mask.set_obstacle(x, y, true);
        }
    }
    mask
}

#[test]
fn obstacle_field_is_zero_outside_obstacles() {
    let mask = block_mask();
    let field = mask.flow_field().unwrap();

    for y in 0..15 {
        for x in 0..15 {
            if !mask.is_obstacle(x, y) {
                assert_eq!(field.texel(x, y), Some(Vec2::zeros()));
            }
        }
    }
}

#[test]
fn obstacle_field_points_toward_the_nearest_exit() {
    let field = block_mask().flow_field().unwrap();

    // left edge of the block pushes left, right edge pushes right
    assert!(field.texel(3, 7).unwrap().x < 0.0);
    assert!(field.texel(11, 7).unwrap().x > 0.0);

    // top edge pushes up, bottom edge pushes down
    assert!(field.texel(7, 3).unwrap().y < 0.0);
    assert!(field.texel(7, 11).unwrap().y > 0.0);
}

#[test]
fn obstacle_field_magnitude_decays_with_depth() {
    let field = block_mask().flow_field().unwrap();

    let magnitudes: Vec<f32> =
        (3..=7).map(|x| field.texel(x, 7).unwrap().norm()).collect();
    for pair in magnitudes.windows(2) {
        assert!(
            pair[1] <= pair[0],
            "magnitude should not grow deeper into the obstacle: {:?}",
            magnitudes
        );
    }
    assert!((magnitudes[0] - 0.5).abs() < 1e-5);
}

/// Every obstacle texel of `mask` must push with the `1 / (1 + d)`
/// magnitude.
fn assert_every_obstacle_texel_pushes(mask: &ObstacleMask) {
    let field = mask.flow_field().unwrap();
    let distance = mask.distance_to_free();
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if !mask.is_obstacle(x, y) {
                continue;
            }
            let d = distance[y * mask.width() + x];
            let magnitude = field.texel(x, y).unwrap().norm();
            assert!(
                (magnitude - 1.0 / (1.0 + d)).abs() < 1e-5,
                "texel ({}, {}) at depth {} pushes with {}",
                x,
                y,
                d,
                magnitude
            );
        }
    }
}

#[test]
fn one_texel_wide_walls_push_particles_out() {
    let mut mask = ObstacleMask::new(7, 7);
    for y in 0..7 {
        mask.set_obstacle(3, y, true);
    }

    assert_every_obstacle_texel_pushes(&mask);
    let field = mask.flow_field().unwrap();
    for y in 0..7 {
        let texel = field.texel(3, y).unwrap();
        assert!(texel.x.abs() > 0.0);
        assert_eq!(texel.y, 0.0);
    }
}

#[test]
fn a_single_obstacle_texel_pushes_particles_out() {
    let mut mask = ObstacleMask::new(7, 7);
    mask.set_obstacle(3, 3, true);

    assert_every_obstacle_texel_pushes(&mask);
    assert!((mask.flow_field().unwrap().texel(3, 3).unwrap().norm() - 0.5)
        .abs()
        < 1e-5);
}

#[test]
fn the_middle_of_an_odd_width_bar_pushes_particles_out() {
    let mut mask = ObstacleMask::new(9, 9);
    for y in 0..9 {
        for x in 3..6 {
            mask.set_obstacle(x, y, true);
        }
    }

    assert_every_obstacle_texel_pushes(&mask);
    let center = mask.flow_field().unwrap().texel(4, 4).unwrap();
    assert!((center.norm() - 1.0 / 3.0).abs() < 1e-5);
    assert_eq!(center.y, 0.0);
}

#[test]
fn obstacle_mask_from_image_uses_the_key_color() {
    let mut image = image::RgbaImage::from_pixel(4, 2, image::Rgba([255; 4]));
    image.put_pixel(1, 0, image::Rgba([0, 0, 0, 255]));
    image.put_pixel(2, 1, image::Rgba([10, 10, 10, 250]));

    let mask = ObstacleMask::from_image(&image, [0, 0, 0, 255], false).unwrap();

    assert_eq!(mask.obstacle_count(), 2);
    assert!(mask.is_obstacle(1, 0));
    assert!(mask.is_obstacle(2, 1));
}
