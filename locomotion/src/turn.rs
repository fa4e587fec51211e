use crate::{config::Config, constants::MIN_TURNING_SPEED_MPS, utils::lerp};

/// Yaw change for this tick, in degrees.
///
/// Zero at or below `MIN_TURNING_SPEED_MPS` so a stationary kart cannot spin.
/// Otherwise the yaw rate slides from `base_turn_speed` to `min_turn_speed` as
/// speed approaches `max_speed`, scaled by the response curve. Steering sense
/// flips in reverse.
pub fn yaw_delta(steer: f32, current_speed: f32, config: &Config, dt: f32) -> f32 {
    // Also rejects NaN.
    if !(current_speed.abs() > MIN_TURNING_SPEED_MPS) {
        return 0.0;
    }

    let speed_ratio = (current_speed.abs() / config.max_speed).clamp(0.0, 1.0);
    let multiplier = config.turn_response_curve.evaluate(speed_ratio);
    let adjusted_turn_speed =
        lerp(config.base_turn_speed, config.min_turn_speed, speed_ratio) * multiplier;
    let direction = current_speed.signum();

    steer * direction * adjusted_turn_speed * dt
}
