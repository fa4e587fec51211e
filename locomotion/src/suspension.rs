use crate::{
    config::Config,
    constants::UP,
    types::{GroundSample, Quat, Vec3},
};

/// Spring-damper force toward the ride height, along world up.
///
/// `magnitude = (hover_height - distance) * hover_force_gain - vertical_velocity * hover_damping`.
/// Positive below the ride height, negative above it. Uncapped; stability comes
/// from the damping term. Zero while airborne so the physics engine's gravity
/// takes over.
pub fn hover_force(sample: &GroundSample, vertical_velocity: f32, config: &Config) -> Vec3 {
    if !sample.grounded {
        return Vec3::zeros();
    }

    let height_error = config.hover_height - sample.distance;
    let magnitude = height_error * config.hover_force_gain - vertical_velocity * config.hover_damping;
    if !magnitude.is_finite() {
        return Vec3::zeros();
    }

    UP * magnitude
}

/// Grip-boosting force pressing the body onto the ground, scaled by body speed.
///
/// Points along the body's down axis. Zero while airborne.
pub fn downforce(sample: &GroundSample, orientation: &Quat, body_speed: f32, config: &Config) -> Vec3 {
    if !sample.grounded || body_speed <= 0.0 {
        return Vec3::zeros();
    }

    -(orientation * UP) * (config.downforce * body_speed)
}
