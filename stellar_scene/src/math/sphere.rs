/// Bounding sphere, used as the culling volume for probe-local passes and
/// as the per-cascade bound of the shadow splitter.

use glam::Vec3;
use super::aabb::AABB;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    /// True if the nearest point of `aabb` lies within the sphere.
    ///
    /// Invalid boxes never intersect.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        if !aabb.is_valid() {
            return false;
        }
        self.contains_point(aabb.closest_point(self.center))
    }
}

#[cfg(test)]
#[path = "sphere_tests.rs"]
mod tests;
