/// Camera — view and projection plus the data derived from them.
///
/// The owner drives the camera by setting matrices; every setter refreshes
/// the cached frustum so culling never sees a stale volume. The near and far
/// clip distances are kept alongside the projection because the shadow
/// splitter needs them and they cannot be recovered robustly from an
/// arbitrary projection matrix.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;

#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    near_plane: f32,
    far_plane: f32,
    frustum: Frustum,
}

impl Camera {
    /// Create a camera from explicit matrices and the projection's clip range.
    pub fn new(view: Mat4, projection: Mat4, near_plane: f32, far_plane: f32) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            near_plane,
            far_plane,
            frustum: Frustum::from_view_projection(&(projection * view)),
        }
    }

    /// Right-handed perspective camera looking from `eye` to `target`.
    pub fn perspective(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect: f32,
        near_plane: f32,
        far_plane: f32,
    ) -> Self {
        Self::new(
            Mat4::look_at_rh(eye, target, up),
            Mat4::perspective_rh(fov_y, aspect, near_plane, far_plane),
            near_plane,
            far_plane,
        )
    }

    // ===== GETTERS =====

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    pub fn inverse_view_matrix(&self) -> Mat4 {
        self.view_matrix.inverse()
    }

    /// World-space eye position (translation of the inverse view).
    pub fn position(&self) -> Vec3 {
        self.inverse_view_matrix().w_axis.truncate()
    }

    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    // ===== SETTERS =====

    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
        self.refresh_frustum();
    }

    pub fn set_projection(&mut self, matrix: Mat4, near_plane: f32, far_plane: f32) {
        self.projection_matrix = matrix;
        self.near_plane = near_plane;
        self.far_plane = far_plane;
        self.refresh_frustum();
    }

    fn refresh_frustum(&mut self) {
        self.frustum = Frustum::from_view_projection(&self.view_projection_matrix());
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
