use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Speed-ratio → turn-authority multiplier, as piecewise-linear keys.
///
/// Keys are `(speed_ratio, multiplier)` pairs, both in `[0, 1]`, sorted by
/// strictly increasing `speed_ratio`. Between keys the curve interpolates
/// linearly; outside them it holds the nearest key's value. An empty curve
/// is the constant 1.0.
///
/// In TOML: `turn_response_curve = [[0.0, 1.0], [1.0, 0.4]]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnResponseCurve {
    keys: Vec<(f32, f32)>,
}

impl TurnResponseCurve {
    pub fn new(keys: Vec<(f32, f32)>) -> Self {
        Self { keys }
    }

    /// Straight line from `(0, at_rest)` to `(1, at_top_speed)`.
    pub fn linear(at_rest: f32, at_top_speed: f32) -> Self {
        Self::new(vec![(0.0, at_rest), (1.0, at_top_speed)])
    }

    /// Full authority at every speed.
    pub fn constant() -> Self {
        Self::new(Vec::new())
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Evaluate at `speed_ratio` (clamped into `[0, 1]`).
    pub fn evaluate(&self, speed_ratio: f32) -> f32 {
        let x = speed_ratio.clamp(0.0, 1.0);
        let (Some(&(x0, y0)), Some(&(xn, yn))) = (self.keys.first(), self.keys.last()) else {
            return 1.0;
        };
        if x <= x0 {
            return y0;
        }
        if x >= xn {
            return yn;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if x <= b.0 {
                let t = (x - a.0) / (b.0 - a.0);
                return a.1 + (b.1 - a.1) * t;
            }
        }
        yn
    }

    /// Keys must be finite, inside the unit square, strictly increasing in
    /// speed ratio, and non-increasing in multiplier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, &(ratio, multiplier)) in self.keys.iter().enumerate() {
            let inside = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
            if !inside(ratio) || !inside(multiplier) {
                return Err(ConfigError::CurveKeyOutOfRange {
                    index,
                    ratio,
                    multiplier,
                });
            }
        }

        for (i, pair) in self.keys.windows(2).enumerate() {
            if pair[1].0 <= pair[0].0 {
                return Err(ConfigError::CurveNotSorted { index: i + 1 });
            }
            if pair[1].1 > pair[0].1 {
                return Err(ConfigError::CurveNotMonotonic { index: i + 1 });
            }
        }

        Ok(())
    }
}

impl Default for TurnResponseCurve {
    fn default() -> Self {
        Self::linear(1.0, 0.4)
    }
}
