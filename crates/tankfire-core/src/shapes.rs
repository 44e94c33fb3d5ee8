//! Collider shapes and the pairwise overlap predicates.
//!
//! All tests are discrete: two shapes collide when they overlap at the
//! positions given, with no sweeping between ticks.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::ColliderKind;

/// Collision shape, centred on the owner's world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColliderShape {
    Sphere { radius: f64 },
    /// Axis-aligned box.
    Box { half_extents: DVec3 },
}

impl ColliderShape {
    /// Finite and strictly positive in every dimension.
    pub fn is_valid(&self) -> bool {
        match self {
            ColliderShape::Sphere { radius } => radius.is_finite() && *radius > 0.0,
            ColliderShape::Box { half_extents } => {
                half_extents.is_finite() && half_extents.cmpgt(DVec3::ZERO).all()
            }
        }
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn from_center(center: DVec3, half_extents: DVec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn closest_point(&self, point: DVec3) -> DVec3 {
        point.clamp(self.min, self.max)
    }
}

/// Anything that takes part in collision testing.
///
/// Reactions are dispatched by the collision system on the type tag.
pub trait Collidable {
    fn collider_shape(&self) -> ColliderShape;
    fn position(&self) -> DVec3;
    fn kind(&self) -> ColliderKind;
}

/// Sphere–sphere test: centre distance strictly less than the radius sum.
pub fn spheres_overlap(a: DVec3, ra: f64, b: DVec3, rb: f64) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

pub fn sphere_box_overlap(center: DVec3, radius: f64, aabb: &Aabb) -> bool {
    let closest = aabb.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Dispatch on the shape pair.
pub fn shapes_overlap(a: &ColliderShape, pa: DVec3, b: &ColliderShape, pb: DVec3) -> bool {
    match (a, b) {
        (ColliderShape::Sphere { radius: ra }, ColliderShape::Sphere { radius: rb }) => {
            spheres_overlap(pa, *ra, pb, *rb)
        }
        (ColliderShape::Box { half_extents: ha }, ColliderShape::Box { half_extents: hb }) => {
            Aabb::from_center(pa, *ha).intersects(&Aabb::from_center(pb, *hb))
        }
        (ColliderShape::Sphere { radius }, ColliderShape::Box { half_extents }) => {
            sphere_box_overlap(pa, *radius, &Aabb::from_center(pb, *half_extents))
        }
        (ColliderShape::Box { half_extents }, ColliderShape::Sphere { radius }) => {
            sphere_box_overlap(pb, *radius, &Aabb::from_center(pa, *half_extents))
        }
    }
}

/// Point containment for a shape centred at `center`.
pub fn shape_contains(shape: &ColliderShape, center: DVec3, point: DVec3) -> bool {
    match shape {
        ColliderShape::Sphere { radius } => center.distance_squared(point) <= radius * radius,
        ColliderShape::Box { half_extents } => {
            Aabb::from_center(center, *half_extents).contains(point)
        }
    }
}

/// How far two shapes interpenetrate; zero when they do not overlap.
///
/// Positive exactly when [`shapes_overlap`] holds. For a sphere centred
/// inside a box the depth includes the distance to the nearest face.
pub fn penetration_depth(a: &ColliderShape, pa: DVec3, b: &ColliderShape, pb: DVec3) -> f64 {
    match (a, b) {
        (ColliderShape::Sphere { radius: ra }, ColliderShape::Sphere { radius: rb }) => {
            (ra + rb - pa.distance(pb)).max(0.0)
        }
        (ColliderShape::Box { half_extents: ha }, ColliderShape::Box { half_extents: hb }) => {
            let a = Aabb::from_center(pa, *ha);
            let b = Aabb::from_center(pb, *hb);
            let overlap = a.max.min(b.max) - a.min.max(b.min);
            if overlap.cmpgt(DVec3::ZERO).all() {
                overlap.min_element()
            } else {
                0.0
            }
        }
        (ColliderShape::Sphere { radius }, ColliderShape::Box { half_extents }) => {
            sphere_box_depth(pa, *radius, &Aabb::from_center(pb, *half_extents))
        }
        (ColliderShape::Box { half_extents }, ColliderShape::Sphere { radius }) => {
            sphere_box_depth(pb, *radius, &Aabb::from_center(pa, *half_extents))
        }
    }
}

fn sphere_box_depth(center: DVec3, radius: f64, aabb: &Aabb) -> f64 {
    if aabb.contains(center) {
        let inner = (center - aabb.min).min(aabb.max - center).min_element();
        return radius + inner;
    }
    (radius - center.distance(aabb.closest_point(center))).max(0.0)
}
