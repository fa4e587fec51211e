/*!
Core data types exchanged between the locomotion components and the host.

Nothing in here runs an algorithm. These are the values that flow through a
tick:
- `GroundSample`:    what the ground probe saw this tick (never cached)
- `BodySnapshot`:    what the physics engine reports about the body before the tick
- `LocomotionState`: the vehicle's own memory of momentum and proposed pose
*/

use nalgebra as na;

use crate::constants::{REVERSE_SPEED_RATIO, UP};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// Result of one ground probe pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSample {
    /// The center probe found terrain within range.
    pub grounded: bool,
    /// Distance from the probe origin to the surface (meters).
    /// Equals the probe range when not grounded.
    pub distance: f32,
    /// World-space unit surface normal. World up when not grounded.
    pub normal: Vec3,
    /// Fraction (0..=1) of all probes (center + offsets) that hit terrain.
    pub ground_ratio: f32,
}

impl GroundSample {
    /// An airborne sample for a probe of the given range.
    #[inline]
    pub fn airborne(range: f32) -> Self {
        Self {
            grounded: false,
            distance: range.max(0.0),
            normal: UP,
            ground_ratio: 0.0,
        }
    }
}

/// Pose and velocity of the rigid body as reported by the physics integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
}

impl BodySnapshot {
    /// Snapshot for a purely kinematic vehicle that has no physics body:
    /// the pose comes from the previous state and the body never has velocity of its own.
    #[inline]
    pub fn kinematic(state: &LocomotionState) -> Self {
        Self {
            position: state.position,
            orientation: state.orientation,
            linear_velocity: Vec3::zeros(),
        }
    }

    /// Vertical velocity, with non-finite values read as zero.
    #[inline]
    pub fn vertical_velocity(&self) -> f32 {
        let vy = self.linear_velocity.dot(&UP);
        if vy.is_finite() { vy } else { 0.0 }
    }

    /// Speed magnitude, with non-finite values read as zero.
    #[inline]
    pub fn speed(&self) -> f32 {
        let s = self.linear_velocity.norm();
        if s.is_finite() { s } else { 0.0 }
    }
}

/// The vehicle's persistent memory.
///
/// `current_speed` is the scalar forward speed integrated by the core; it is
/// never re-derived from the physics engine's velocity. `position` and
/// `orientation` hold the pose proposed by the last tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionState {
    pub current_speed: f32,
    pub position: Vec3,
    pub orientation: Quat,
}

impl LocomotionState {
    /// A vehicle at rest at the given pose.
    #[inline]
    pub fn at_rest(position: Vec3, orientation: Quat) -> Self {
        Self {
            current_speed: 0.0,
            position,
            orientation,
        }
    }

    /// Same pose, speed clamped into `[-max_speed * REVERSE_SPEED_RATIO, max_speed]`.
    #[inline]
    pub fn with_speed(self, speed: f32, max_speed: f32) -> Self {
        let speed = if speed.is_finite() { speed } else { 0.0 };
        Self {
            current_speed: speed.clamp(-max_speed * REVERSE_SPEED_RATIO, max_speed),
            ..self
        }
    }
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self::at_rest(Vec3::zeros(), Quat::identity())
    }
}
