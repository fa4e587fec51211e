pub mod config;
pub mod constants;
pub mod controller;
pub mod curve;
pub mod ground;
pub mod input;
pub mod orientation;
pub mod slope;
pub mod speed;
pub mod suspension;
pub mod telemetry;
pub mod turn;
pub mod types;
pub mod utils;

pub use config::{Config, ConfigError, DriveMode, Features};
pub use constants::{
    FORWARD, MIN_TURNING_SPEED_MPS, REVERSE_SPEED_RATIO, SPEED_SNAP_EPS, UP,
};
pub use controller::{BodyCommand, LocomotionCore, TickOutput};
pub use curve::TurnResponseCurve;
pub use ground::{GroundSensor, RayHit, TerrainProbe};
pub use input::{InputFrame, InputLatch};
pub use slope::{SlopeKind, SlopeReading};
pub use telemetry::{LogSink, Telemetry, TelemetrySink};
pub use types::{BodySnapshot, GroundSample, LocomotionState, Quat, Vec3};
