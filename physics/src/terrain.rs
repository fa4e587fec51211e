//! Rapier query world for static terrain.
//!
//! Built once from a list of terrain pieces and queried every tick by the
//! ground probe. The world is immutable after construction.
//!
//! Determinism
//! - Pieces are sorted by `id` before insertion, so the same input always builds
//!   identical sets.

use kart_locomotion::{RayHit, TerrainProbe, UP, Vec3};
use nalgebra::{Translation3, UnitQuaternion};
use rapier3d::prelude::*;

/// Layer mask that matches every terrain piece.
pub const ALL_LAYERS: u32 = u32::MAX;

/// One immutable terrain collider.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion.
/// - Planes face the pose's local +Y.
#[derive(Clone, Debug)]
pub struct TerrainDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vector<f32>,
    /// World-space rotation (unit quaternion).
    pub rotation: UnitQuaternion<f32>,
    pub shape: TerrainShape,
    /// Layer bits. A probe only sees pieces whose layers intersect its mask.
    pub layers: u32,
}

impl TerrainDef {
    /// Axis-aligned piece on every layer.
    pub fn new(id: u32, translation: Vector<f32>, shape: TerrainShape) -> Self {
        Self {
            id,
            translation,
            rotation: UnitQuaternion::identity(),
            shape,
            layers: ALL_LAYERS,
        }
    }

    pub fn rotated(self, rotation: UnitQuaternion<f32>) -> Self {
        Self { rotation, ..self }
    }

    pub fn on_layers(self, layers: u32) -> Self {
        Self { layers, ..self }
    }
}

/// Supported terrain shapes.
#[derive(Clone, Debug)]
pub enum TerrainShape {
    /// Infinite ground plane (half-space) through the pose origin, facing local +Y,
    /// shifted by `offset_along_normal`.
    Plane { offset_along_normal: f32 },

    /// Oriented box with given half-extents (meters).
    Cuboid { half_extents: Vector<f32> },

    Ball { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },

    /// Y-aligned cone (meters).
    ConeY { radius: f32, half_height: f32 },
}

/// Rapier sets needed for scene queries against the static terrain.
pub struct TerrainWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
}

impl TerrainWorld {
    pub fn build(mut defs: Vec<TerrainDef>) -> Self {
        // Ensure deterministic insertion order.
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Each piece is a fixed rigid-body carrying the pose, with one attached collider.
        for def in defs.iter() {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
            let rb_handle = bodies.insert(RigidBodyBuilder::fixed().pose(iso).build());

            let collider = collider_builder(&def.shape)
                .user_data(u128::from(def.layers))
                .build();
            colliders.insert_with_parent(collider, rb_handle, &mut bodies);
        }

        // Collision detection only (no dynamics) so the broad-phase BVH is populated.
        // Rapier 0.31: step(prediction_distance, broad_phase, narrow_phase, bodies, colliders, hooks, events)
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        log::info!("terrain world built with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Borrowed `QueryPipeline` view over the terrain.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

impl TerrainProbe for TerrainWorld {
    fn cast_down(&self, origin: Vec3, max_distance: f32, mask: u32) -> Option<RayHit> {
        let in_layers =
            |_: ColliderHandle, collider: &Collider| (collider.user_data as u32) & mask != 0;
        let pipeline = self.query_pipeline(QueryFilter::default().predicate(&in_layers));

        let ray = Ray::new(Point::from(origin), -Vector::y());
        let (_, hit) = pipeline.cast_ray_and_get_normal(&ray, max_distance, true)?;

        // A solid cast that starts inside terrain stops at 0 with no normal.
        // The body is sunk into the ground, which reads as touching it.
        if hit.time_of_impact <= 0.0 && hit.normal.norm_squared() <= f32::EPSILON {
            return Some(RayHit {
                distance: 0.0,
                normal: UP,
            });
        }

        Some(RayHit {
            distance: hit.time_of_impact,
            normal: hit.normal,
        })
    }
}

/// Collider builder for a shape, with identity local transform except for
/// the plane offset. The pose lives on the parent rigid-body.
fn collider_builder(shape: &TerrainShape) -> ColliderBuilder {
    match shape {
        TerrainShape::Plane {
            offset_along_normal,
        } => ColliderBuilder::halfspace(Vector::y_axis())
            .translation(vector![0.0, *offset_along_normal, 0.0]),

        TerrainShape::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        TerrainShape::Ball { radius } => ColliderBuilder::ball(*radius),

        TerrainShape::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),

        TerrainShape::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),

        TerrainShape::ConeY {
            radius,
            half_height,
        } => ColliderBuilder::cone(*half_height, *radius),
    }
}
