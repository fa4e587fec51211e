use crate::{
    config::Config,
    constants::SPEED_SNAP_EPS,
    input::InputFrame,
    utils::{finite_or_zero, move_towards},
};

/// Advance the scalar forward speed by one tick.
///
/// Exactly one rule applies per tick, in priority order:
/// 1. brake held: move toward zero at `brake_force`, snapping to zero near it;
/// 2. throttle outside the deadzone: `speed += throttle * acceleration * dt`;
/// 3. otherwise coast: move toward zero at `deceleration`, snapping to zero near it.
///
/// The result is always inside `[max_reverse_speed, max_speed]`.
pub fn step(input: &InputFrame, current_speed: f32, config: &Config, dt: f32) -> f32 {
    let speed = finite_or_zero(current_speed);
    let dt = finite_or_zero(dt).max(0.0);

    let next = if input.brake {
        settle_toward_zero(speed, config.brake_force * dt)
    } else if input.throttle.abs() > config.input_deadzone {
        speed + input.throttle * config.acceleration * dt
    } else {
        settle_toward_zero(speed, config.deceleration * dt)
    };

    finite_or_zero(next).clamp(config.max_reverse_speed(), config.max_speed)
}

fn settle_toward_zero(speed: f32, max_delta: f32) -> f32 {
    let next = move_towards(speed, 0.0, max_delta);
    if next.abs() < SPEED_SNAP_EPS { 0.0 } else { next }
}
