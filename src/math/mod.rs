use nalgebra;

pub type Vec2 = nalgebra::Vector2<f32>;

/// True when both components are finite.
pub fn is_finite(v: &Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Replace a non-finite scalar with 0.
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Clamp each component of `v` into `[0, max.x] x [0, max.y]`.
pub fn clamp_to_box(v: &Vec2, max: &Vec2) -> Vec2 {
    Vec2::new(
        finite_or_zero(v.x).clamp(0.0, max.x.max(0.0)),
        finite_or_zero(v.y).clamp(0.0, max.y.max(0.0)),
    )
}

/// Scale `v` down so its length does not exceed `limit`.
pub fn limit_length(v: &Vec2, limit: f32) -> Vec2 {
    let length_squared = v.norm_squared();
    if length_squared > limit * limit && length_squared > 0.0 {
        v * (limit / length_squared.sqrt())
    } else {
        *v
    }
}
