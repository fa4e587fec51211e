use nalgebra as na;
use num_traits::Float;

use crate::{
    constants::{DIR_EPS, FORWARD, RIGHT, UP},
    types::{Quat, Vec3},
};

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
pub fn move_towards<T: Float>(current: T, target: T, max_delta: T) -> T {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Unclamped linear interpolation.
#[inline]
pub fn lerp<T: Float>(a: T, b: T, t: T) -> T {
    a + (b - a) * t
}

/// Replace non-finite values with zero.
#[inline]
pub fn finite_or_zero<T: Float>(x: T) -> T {
    if x.is_finite() { x } else { T::zero() }
}

/// Yaw (radians about +Y) of a rotation, measured from +Z toward +X.
///
/// Falls back to the body's right axis when the forward axis is (almost) vertical.
pub fn yaw_of(rotation: &Quat) -> f32 {
    let forward = rotation * FORWARD;
    if forward.x * forward.x + forward.z * forward.z > DIR_EPS * DIR_EPS {
        return forward.x.atan2(forward.z);
    }

    // A yaw of θ maps +X to (cos θ, 0, -sin θ).
    let right = rotation * RIGHT;
    (-right.z).atan2(right.x)
}

/// Yaw-only rotation about world up.
#[inline]
pub fn yaw_rotation(yaw_radians: f32) -> Quat {
    Quat::from_axis_angle(&na::Vector3::y_axis(), yaw_radians)
}

/// Project `dir` onto the plane with unit normal `normal`, renormalized.
///
/// Returns `None` if `dir` is parallel to the normal.
pub fn project_on_plane(dir: Vec3, normal: Vec3) -> Option<Vec3> {
    let projected = dir - normal * dir.dot(&normal);
    projected.try_normalize(DIR_EPS)
}

/// Angle between world up and `normal`, in degrees.
#[inline]
pub fn angle_from_up_deg(normal: Vec3) -> f32 {
    normal.dot(&UP).clamp(-1.0, 1.0).acos().to_degrees()
}
