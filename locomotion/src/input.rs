use parking_lot::Mutex;

use crate::utils::finite_or_zero;

/// Normalized driver input for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Forward/reverse throttle in `[-1, 1]`.
    pub throttle: f32,
    /// Steering in `[-1, 1]`; positive turns +Z toward +X.
    pub steer: f32,
    pub brake: bool,
}

impl InputFrame {
    pub fn new(throttle: f32, steer: f32, brake: bool) -> Self {
        Self {
            throttle,
            steer,
            brake,
        }
    }

    /// Both axes finite and inside `[-1, 1]`.
    pub fn is_well_formed(&self) -> bool {
        [self.throttle, self.steer]
            .iter()
            .all(|v| v.is_finite() && (-1.0..=1.0).contains(v))
    }

    /// Non-finite axes become zero; everything is clamped into `[-1, 1]`.
    pub fn sanitized(self) -> Self {
        if self.is_well_formed() {
            return self;
        }

        log::warn!(
            "sanitizing degenerate input: throttle={} steer={}",
            self.throttle,
            self.steer
        );
        Self {
            throttle: finite_or_zero(self.throttle).clamp(-1.0, 1.0),
            steer: finite_or_zero(self.steer).clamp(-1.0, 1.0),
            brake: self.brake,
        }
    }
}

/// Latest-wins mailbox between the input cadence and the fixed tick.
///
/// Writers replace the whole frame; readers copy it out. A frame is never
/// observed half-written.
#[derive(Debug, Default)]
pub struct InputLatch {
    frame: Mutex<InputFrame>,
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame` (sanitized), replacing whatever was there.
    pub fn publish(&self, frame: InputFrame) {
        *self.frame.lock() = frame.sanitized();
    }

    /// Copy of the most recently published frame.
    pub fn latest(&self) -> InputFrame {
        *self.frame.lock()
    }
}
