//! Bounding volumes used for culling and scene bounds.

mod aabb;
mod sphere;

pub use aabb::AABB;
pub use sphere::BoundingSphere;
