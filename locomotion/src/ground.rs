use crate::{
    config::{Config, ConfigError},
    constants::DIR_EPS,
    types::{GroundSample, Quat, Vec3},
};

/// A single downward ray hit reported by the terrain collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit (meters).
    pub distance: f32,
    /// World-space surface normal at the hit.
    pub normal: Vec3,
}

/// Terrain query collaborator.
///
/// Implementations cast a ray from `origin` straight down (world -Y), up to
/// `max_distance`, against terrain whose layer bits intersect `mask`.
/// `None` means nothing was hit.
pub trait TerrainProbe {
    fn cast_down(&self, origin: Vec3, max_distance: f32, mask: u32) -> Option<RayHit>;
}

impl<P: TerrainProbe + ?Sized> TerrainProbe for &P {
    fn cast_down(&self, origin: Vec3, max_distance: f32, mask: u32) -> Option<RayHit> {
        (**self).cast_down(origin, max_distance, mask)
    }
}

/// Casts the center probe (plus any per-wheel probes) each tick.
///
/// Samples are recomputed on every call; nothing is cached between ticks.
#[derive(Clone, Debug)]
pub struct GroundSensor {
    range: f32,
    mask: u32,
    offsets: Vec<Vec3>,
}

impl GroundSensor {
    pub fn new(range: f32, mask: u32, offsets: Vec<Vec3>) -> Result<Self, ConfigError> {
        if !range.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "ground_check_distance",
            });
        }
        if range <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "ground_check_distance",
                value: range,
            });
        }
        if offsets.iter().any(|o| !o.iter().all(|v| v.is_finite())) {
            return Err(ConfigError::NonFinite {
                field: "probe_offsets",
            });
        }

        Ok(Self {
            range,
            mask,
            offsets,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(
            config.ground_check_distance,
            config.terrain_mask,
            config.probe_offset_vectors(),
        )
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    /// Probe the terrain below `position`. Offsets are rotated by `orientation`.
    pub fn sample(
        &self,
        probe: &impl TerrainProbe,
        position: Vec3,
        orientation: Quat,
    ) -> GroundSample {
        let center = self.cast(probe, position);

        let mut hits = usize::from(center.is_some());
        for offset in &self.offsets {
            if self.cast(probe, position + orientation * offset).is_some() {
                hits += 1;
            }
        }
        let ground_ratio = hits as f32 / (self.offsets.len() + 1) as f32;

        match center {
            Some(hit) => GroundSample {
                grounded: true,
                distance: hit.distance,
                normal: hit.normal,
                ground_ratio,
            },
            None => GroundSample {
                ground_ratio,
                ..GroundSample::airborne(self.range)
            },
        }
    }

    /// One ray. Hits that are out of range or carry a non-finite distance or a
    /// degenerate normal count as misses.
    fn cast(&self, probe: &impl TerrainProbe, origin: Vec3) -> Option<RayHit> {
        let hit = probe.cast_down(origin, self.range, self.mask)?;
        let normal = hit.normal.try_normalize(DIR_EPS);

        match normal {
            Some(normal)
                if hit.distance.is_finite() && (0.0..=self.range).contains(&hit.distance) =>
            {
                Some(RayHit {
                    distance: hit.distance,
                    normal,
                })
            }
            _ => {
                log::warn!(
                    "discarding terrain hit: distance={} normal={:?}",
                    hit.distance,
                    hit.normal
                );
                None
            }
        }
    }
}
