/// Frustum — six clipping planes plus the eight corner points.
///
/// Each plane is a Vec4 (A, B, C, D) with an inward-pointing unit normal
/// (A, B, C); a point P is inside when `dot(plane, (P, 1)) >= 0` for all six.
/// Matrices follow glam's right-handed convention with clip-space depth in
/// [0, 1] (`Mat4::perspective_rh`, `Mat4::orthographic_rh`).

use glam::{Mat4, Vec3, Vec4};
use crate::math::AABB;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Normalized-device-space frustum corners.
///
/// Indices 0..4 lie on the near plane, 4..8 on the far plane, and corner
/// `i + 4` is the far partner of near corner `i`.
pub const NDC_CORNERS: [Vec3; 8] = [
    Vec3::new(-1.0, 1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
];

#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
    /// World-space corners, ordered like `NDC_CORNERS`
    pub corners: [Vec3; 8],
}

impl Frustum {
    /// Extract planes and corners from a view-projection matrix.
    ///
    /// Planes use the Gribb & Hartmann method on the matrix rows; corners
    /// are the NDC cube corners pushed through the inverse matrix.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near (depth 0)
            r3 - r2, // far
        ];

        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        let inverse = vp.inverse();
        let corners = NDC_CORNERS.map(|ndc| inverse.project_point3(ndc));

        Self { planes, corners }
    }

    /// Signed distance of `point` to plane `index` (positive = inside)
    pub fn signed_distance(&self, index: usize, point: Vec3) -> f32 {
        self.planes[index].truncate().dot(point) + self.planes[index].w
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..6).all(|i| self.signed_distance(i, point) >= 0.0)
    }

    /// Test if an AABB intersects this frustum ("positive vertex" test).
    ///
    /// For each plane, the corner furthest along the normal is tested; if it
    /// is outside, the whole box is. Conservative: may report false positives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        for plane in &self.planes {
            let normal = plane.truncate();

            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            if normal.dot(p_vertex) + plane.w < 0.0 {
                return false;
            }
        }

        true
    }

    /// Two-directional box visibility test used by the render queue.
    ///
    /// 1. Reject if all 8 box corners are behind any single frustum plane.
    /// 2. Reject if all 8 frustum corners lie beyond the box on any single
    ///    axis-aligned side.
    ///
    /// The second pass removes most of the false positives that plane tests
    /// alone leave near frustum edges. Still conservative: no false negatives
    /// for a convex frustum and a valid box. Invalid boxes are rejected by
    /// the second pass.
    pub fn box_in_frustum(&self, aabb: &AABB) -> bool {
        let box_corners = aabb.corners();

        for index in 0..6 {
            let all_outside = box_corners
                .iter()
                .all(|corner| self.signed_distance(index, *corner) < 0.0);
            if all_outside {
                return false;
            }
        }

        for axis in 0..3 {
            if self.corners.iter().all(|c| c[axis] > aabb.max[axis]) {
                return false;
            }
            if self.corners.iter().all(|c| c[axis] < aabb.min[axis]) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
