use crate::{
    types::Quat,
    utils::{yaw_of, yaw_rotation},
};

/// Yaw-only rotation sharing `rotation`'s heading.
pub fn level_target(rotation: &Quat) -> Quat {
    yaw_rotation(yaw_of(rotation))
}

/// Ease roll and pitch toward level while keeping yaw.
///
/// Spherically interpolates toward [`level_target`] by `correction_rate * dt`
/// (clamped to `[0, 1]`). Independent of grounded state, so mid-air tumbles
/// right themselves too.
pub fn correct(rotation: Quat, dt: f32, correction_rate: f32) -> Quat {
    let t = (correction_rate * dt).clamp(0.0, 1.0);
    if !(t > 0.0) {
        return rotation;
    }

    let target = level_target(&rotation);
    // `None` only when both are (nearly) the same rotation.
    rotation.try_slerp(&target, t, 1.0e-6).unwrap_or(target)
}
