use crate::{
    config::Config,
    types::{GroundSample, Vec3},
    utils::{angle_from_up_deg, project_on_plane},
};

/// Terrain classification for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SlopeKind {
    /// No terrain under the vehicle.
    Airborne,
    /// Surface normal is exactly world up.
    Flat,
    /// `0 < angle <= max_slope_angle`: movement hugs the surface plane.
    Traversable { normal: Vec3 },
    /// `angle > max_slope_angle`: the vehicle is pushed off the slope.
    Steep { slide_force: Vec3 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlopeReading {
    /// Angle between world up and the surface normal (degrees). Zero when airborne.
    pub angle_deg: f32,
    pub kind: SlopeKind,
}

impl SlopeReading {
    /// Classify the ground under the vehicle.
    pub fn classify(sample: &GroundSample, config: &Config) -> Self {
        if !sample.grounded {
            return Self {
                angle_deg: 0.0,
                kind: SlopeKind::Airborne,
            };
        }

        let angle_deg = angle_from_up_deg(sample.normal);
        let kind = if angle_deg > config.max_slope_angle {
            // Normal with its vertical component flipped. An arcade stand-in for
            // gravity along the slope; tuned, not derived.
            let n = sample.normal;
            let slide_direction = Vec3::new(n.x, -n.y, n.z);
            SlopeKind::Steep {
                slide_force: slide_direction * config.slope_slide_force,
            }
        } else if angle_deg > 0.0 {
            SlopeKind::Traversable {
                normal: sample.normal,
            }
        } else {
            SlopeKind::Flat
        };

        Self { angle_deg, kind }
    }

    /// Reading used when slope handling is switched off.
    pub fn ignored(sample: &GroundSample) -> Self {
        Self {
            angle_deg: if sample.grounded {
                angle_from_up_deg(sample.normal)
            } else {
                0.0
            },
            kind: if sample.grounded {
                SlopeKind::Flat
            } else {
                SlopeKind::Airborne
            },
        }
    }

    pub fn on_traversable_slope(&self) -> bool {
        matches!(self.kind, SlopeKind::Traversable { .. })
    }

    pub fn slide_force(&self) -> Option<Vec3> {
        match self.kind {
            SlopeKind::Steep { slide_force } => Some(slide_force),
            _ => None,
        }
    }

    /// Direction to move this tick: `forward` projected onto the slope plane on a
    /// traversable slope, `forward` unchanged otherwise.
    pub fn move_direction(&self, forward: Vec3) -> Vec3 {
        match self.kind {
            SlopeKind::Traversable { normal } => project_on_plane(forward, normal).unwrap_or(forward),
            _ => forward,
        }
    }
}
