/*!
Vehicle tuning and its validation.

A `Config` is set once at construction and read-only for the vehicle's life.
`Config::validate` is the single gate for every invariant; a `LocomotionCore`
can only be built from a config that passes it. Values are never silently
clamped into range.

Notes
- Distances are in meters, time in seconds, angles in degrees.
- `max_reverse_speed` is derived from `max_speed`, not stored.
*/

use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_INPUT_DEADZONE, REVERSE_SPEED_RATIO},
    curve::TurnResponseCurve,
    types::Vec3,
};

/// Errors raised while building or validating a vehicle configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("`{field}` must be finite")]
    NonFinite { field: &'static str },

    #[error("`{field}` must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error(
        "ground_check_distance ({ground_check_distance}) must be greater than hover_height ({hover_height})"
    )]
    GroundCheckTooShort {
        ground_check_distance: f32,
        hover_height: f32,
    },

    #[error("max_slope_angle must be within [0, 90] degrees, got {0}")]
    SlopeAngleOutOfRange(f32),

    #[error("input_deadzone must be within [0, 1), got {0}")]
    DeadzoneOutOfRange(f32),

    #[error("grip must be within [0, 1], got {0}")]
    GripOutOfRange(f32),

    #[error("turn curve key {index} ({ratio}, {multiplier}) lies outside the unit square")]
    CurveKeyOutOfRange {
        index: usize,
        ratio: f32,
        multiplier: f32,
    },

    #[error("turn curve key {index} does not increase in speed ratio")]
    CurveNotSorted { index: usize },

    #[error("turn curve increases at key {index}; turn authority must not grow with speed")]
    CurveNotMonotonic { index: usize },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Optional behaviors. Each prototype controller maps to a combination of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Spring-damper ride height above terrain.
    pub hover: bool,
    /// Slide forces on steep slopes and slope-hugging movement on gentle ones.
    pub slope_handling: bool,
    /// Roll/pitch correction toward level.
    pub upright: bool,
    /// Speed-proportional downforce while grounded.
    pub downforce: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            hover: true,
            slope_handling: true,
            upright: true,
            downforce: false,
        }
    }
}

/// How the tick's translation is handed to the physics integrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Emit a position delta (`MovePosition`).
    #[default]
    Kinematic,
    /// Emit a target velocity (`SetLinearVelocity`), blended by `grip`.
    Velocity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ---- SPEED ----
    /// Throttle acceleration (m/s²).
    pub acceleration: f32,
    /// Coasting deceleration toward zero (m/s²).
    pub deceleration: f32,
    /// Braking deceleration toward zero (m/s²).
    pub brake_force: f32,
    /// Forward top speed (m/s).
    pub max_speed: f32,
    /// Throttle magnitudes at or below this count as no throttle.
    pub input_deadzone: f32,

    // ---- STEERING ----
    /// Yaw rate at standstill (deg/s).
    pub base_turn_speed: f32,
    /// Yaw rate at top speed (deg/s).
    pub min_turn_speed: f32,
    pub turn_response_curve: TurnResponseCurve,

    // ---- GROUND / HOVER ----
    /// Ground probe length (m). Must exceed `hover_height`.
    pub ground_check_distance: f32,
    /// Target ride height above terrain (m).
    pub hover_height: f32,
    pub hover_force_gain: f32,
    pub hover_damping: f32,
    /// Layer bits of terrain the probe may hit.
    pub terrain_mask: u32,
    /// Extra body-local probe origins, e.g. one per wheel.
    pub probe_offsets: Vec<[f32; 3]>,

    // ---- SLOPES ----
    /// Steepest traversable slope (degrees).
    pub max_slope_angle: f32,
    pub slope_slide_force: f32,

    // ---- STABILITY ----
    /// Upright correction rate (1/s); `rate * dt` is the slerp fraction per tick.
    pub upright_rate: f32,
    pub downforce: f32,
    /// Velocity-mode blend toward the target velocity per tick, in `[0, 1]`.
    pub grip: f32,
    pub ground_linear_damping: f32,
    pub air_linear_damping: f32,
    pub angular_damping: f32,

    pub features: Features,
    pub drive_mode: DriveMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            acceleration: 8.0,
            deceleration: 10.0,
            brake_force: 20.0,
            max_speed: 40.0,
            input_deadzone: DEFAULT_INPUT_DEADZONE,

            base_turn_speed: 100.0,
            min_turn_speed: 40.0,
            turn_response_curve: TurnResponseCurve::default(),

            ground_check_distance: 2.0,
            hover_height: 1.0,
            hover_force_gain: 50.0,
            hover_damping: 10.0,
            terrain_mask: u32::MAX,
            probe_offsets: Vec::new(),

            max_slope_angle: 45.0,
            slope_slide_force: 20.0,

            upright_rate: 5.0,
            downforce: 100.0,
            grip: 0.95,
            ground_linear_damping: 0.05,
            air_linear_damping: 0.05,
            angular_damping: 0.5,

            features: Features::default(),
            drive_mode: DriveMode::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document. Missing keys fall back to `Config::default()`.
    /// The result is validated.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Most negative speed the vehicle may reach.
    #[inline]
    pub fn max_reverse_speed(&self) -> f32 {
        -self.max_speed * REVERSE_SPEED_RATIO
    }

    /// Extra probe origins as vectors.
    pub fn probe_offset_vectors(&self) -> Vec<Vec3> {
        self.probe_offsets
            .iter()
            .map(|&[x, y, z]| Vec3::new(x, y, z))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("brake_force", self.brake_force),
            ("max_speed", self.max_speed),
            ("input_deadzone", self.input_deadzone),
            ("base_turn_speed", self.base_turn_speed),
            ("min_turn_speed", self.min_turn_speed),
            ("ground_check_distance", self.ground_check_distance),
            ("hover_height", self.hover_height),
            ("hover_force_gain", self.hover_force_gain),
            ("hover_damping", self.hover_damping),
            ("max_slope_angle", self.max_slope_angle),
            ("slope_slide_force", self.slope_slide_force),
            ("upright_rate", self.upright_rate),
            ("downforce", self.downforce),
            ("grip", self.grip),
            ("ground_linear_damping", self.ground_linear_damping),
            ("air_linear_damping", self.air_linear_damping),
            ("angular_damping", self.angular_damping),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }
        if self
            .probe_offsets
            .iter()
            .flatten()
            .any(|v| !v.is_finite())
        {
            return Err(ConfigError::NonFinite {
                field: "probe_offsets",
            });
        }

        for (field, value) in [
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("brake_force", self.brake_force),
            ("max_speed", self.max_speed),
            ("ground_check_distance", self.ground_check_distance),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        for (field, value) in [
            ("base_turn_speed", self.base_turn_speed),
            ("min_turn_speed", self.min_turn_speed),
            ("hover_height", self.hover_height),
            ("hover_force_gain", self.hover_force_gain),
            ("hover_damping", self.hover_damping),
            ("slope_slide_force", self.slope_slide_force),
            ("upright_rate", self.upright_rate),
            ("downforce", self.downforce),
            ("ground_linear_damping", self.ground_linear_damping),
            ("air_linear_damping", self.air_linear_damping),
            ("angular_damping", self.angular_damping),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.ground_check_distance <= self.hover_height {
            return Err(ConfigError::GroundCheckTooShort {
                ground_check_distance: self.ground_check_distance,
                hover_height: self.hover_height,
            });
        }
        if !(0.0..=90.0).contains(&self.max_slope_angle) {
            return Err(ConfigError::SlopeAngleOutOfRange(self.max_slope_angle));
        }
        if !(0.0..1.0).contains(&self.input_deadzone) {
            return Err(ConfigError::DeadzoneOutOfRange(self.input_deadzone));
        }
        if !(0.0..=1.0).contains(&self.grip) {
            return Err(ConfigError::GripOutOfRange(self.grip));
        }

        self.turn_response_curve.validate()
    }
}
