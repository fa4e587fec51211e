use crate::types::Vec3;

/// World up axis. Hover force, slope angles and yaw all refer to it.
pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Body-local forward axis. A yaw of zero faces +Z; positive yaw turns +Z toward +X.
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Body-local right axis, used to recover yaw when the nose points straight up or down.
pub const RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Reverse top speed as a fraction of the forward top speed.
///
/// Convention: reverse is intentionally weaker, so the speed range is
/// `[-max_speed * REVERSE_SPEED_RATIO, max_speed]`.
pub const REVERSE_SPEED_RATIO: f32 = 0.5;

/// Speeds within this band of zero snap to exactly zero while braking or coasting (m/s).
pub const SPEED_SNAP_EPS: f32 = 0.01;

/// At or below this absolute speed the vehicle cannot turn (m/s).
///
/// Keeps a stationary kart from spinning in place.
pub const MIN_TURNING_SPEED_MPS: f32 = 1.0;

/// Default throttle deadzone. Throttle magnitudes at or below this count as coasting.
pub const DEFAULT_INPUT_DEADZONE: f32 = 0.1;

/// Planar length below which a direction is treated as degenerate.
pub const DIR_EPS: f32 = 1.0e-6;
