/// Cascaded shadow splitting.
///
/// Once per frame the camera's view frustum is cut into depth slices, each
/// covered by its own orthographic light projection. Slices are fitted with
/// a bounding sphere rather than a tight box so their size does not change
/// as the camera rotates, and the projection translation is snapped to the
/// shadow-map texel grid so it does not swim as the camera moves.
///
/// # Split scheme
///
/// Split `i` of `N` blends a logarithmic and a uniform distribution over
/// `[min_z, max_z]`:
///
/// ```text
/// p       = (i + 1) / N
/// log     = min_z * (max_z / min_z)^p
/// uniform = min_z + (max_z - min_z) * p
/// d       = lambda * (log - uniform) + uniform
/// split_i = (d - near) / (far - near)
/// ```

use glam::{Mat4, Vec3, Vec4};
use crate::camera::{Camera, NDC_CORNERS};
use crate::math::BoundingSphere;
use crate::{engine_debug, engine_trace};

// ===== CONFIG =====

#[derive(Debug, Clone)]
pub struct CascadeConfig {
    /// Number of cascades
    pub num_cascades: usize,
    /// 1.0 = pure logarithmic splits, 0.0 = pure uniform
    pub split_lambda: f32,
    /// Start of the shadowed range, as a fraction of the clip range
    pub min_distance: f32,
    /// End of the shadowed range, as a fraction of the clip range
    pub max_distance: f32,
    /// Shadow map edge length in texels
    pub shadow_map_size: u32,
    /// Cascade radii are rounded up to a multiple of `1 / radius_granularity`
    pub radius_granularity: f32,
    /// World-space point kept on a texel corner by texel snapping
    pub snap_reference_point: Vec3,
    /// Enable texel snapping
    pub antiflicker: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            num_cascades: 4,
            split_lambda: 1.0,
            min_distance: 0.0,
            max_distance: 1.0,
            shadow_map_size: 2048,
            radius_granularity: 16.0,
            snap_reference_point: Vec3::new(100.0, -333.0, 0.0),
            antiflicker: true,
        }
    }
}

// ===== OUTPUT =====

/// Per-frame data consumed by the shadow and lighting passes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeData {
    /// Light view-projection per cascade
    pub view_projections: Vec<Mat4>,
    /// Far boundary of each cascade as camera view-space depth (negative,
    /// the camera looks down -Z)
    pub split_depths: Vec<f32>,
    /// Inverse of the camera view matrix
    pub inverse_view: Mat4,
}

impl CascadeData {
    /// std140 layout: `mat4 inverse_view; mat4 view_projections[N];
    /// vec4 split_depths[N]` (depth in `.x`).
    pub fn to_gpu_bytes(&self) -> Vec<u8> {
        let count = self.view_projections.len();
        let mut bytes = Vec::with_capacity(64 + count * 64 + self.split_depths.len() * 16);
        bytes.extend_from_slice(bytemuck::bytes_of(&self.inverse_view));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.view_projections));
        for depth in &self.split_depths {
            bytes.extend_from_slice(bytemuck::bytes_of(&Vec4::new(*depth, 0.0, 0.0, 0.0)));
        }
        bytes
    }
}

/// One fitted cascade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cascade {
    /// World-space slice corners, near 0..4 then far 4..8
    pub corners: [Vec3; 8],
    /// Sphere around the slice, radius already rounded up
    pub bounding_sphere: BoundingSphere,
    pub light_view: Mat4,
    /// Orthographic projection, texel-snapped when antiflicker is on
    pub light_projection: Mat4,
}

impl Cascade {
    pub fn view_projection(&self) -> Mat4 {
        self.light_projection * self.light_view
    }
}

// ===== SPLITTER =====

pub struct CascadedShadow {
    config: CascadeConfig,
    split_distances: Vec<f32>,
    cascades: Vec<Cascade>,
    data: CascadeData,
}

impl CascadedShadow {
    pub fn new(config: CascadeConfig) -> Self {
        Self {
            config,
            split_distances: Vec::new(),
            cascades: Vec::new(),
            data: CascadeData::default(),
        }
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.config.shadow_map_size
    }

    /// Use the larger of the two dimensions as shadow map size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.shadow_map_size = width.max(height);
        engine_debug!("stellar::CascadedShadow", "Shadow map resized to {}", self.config.shadow_map_size);
    }

    /// Refit every cascade to `camera` for a light shining along
    /// `light_direction`.
    pub fn frame_update(&mut self, camera: &Camera, light_direction: Vec3) {
        let near = camera.near_plane();
        let far = camera.far_plane();
        let clip_range = far - near;

        self.split_distances = compute_split_distances(near, far, &self.config);

        let frustum_corners = camera.frustum().corners;
        let direction = light_direction.normalize_or_zero();
        let direction = if direction == Vec3::ZERO { Vec3::NEG_Y } else { direction };
        let up = if direction.dot(Vec3::Y).abs() > 0.99 { Vec3::Z } else { Vec3::Y };

        self.cascades.clear();
        self.data.view_projections.clear();
        self.data.split_depths.clear();
        self.data.inverse_view = camera.inverse_view_matrix();

        let mut prev_split = self.config.min_distance;
        for &split in &self.split_distances {
            let cascade = self.fit_cascade(&frustum_corners, prev_split, split, direction, up);

            self.data.view_projections.push(cascade.view_projection());
            self.data.split_depths.push(-(near + split * clip_range));
            self.cascades.push(cascade);
            prev_split = split;
        }

        engine_trace!("stellar::CascadedShadow",
            "Fitted {} cascades over [{}, {}], radii {:?}",
            self.cascades.len(), near, far,
            self.cascades.iter().map(|c| c.bounding_sphere.radius).collect::<Vec<_>>());
    }

    fn fit_cascade(
        &self,
        frustum_corners: &[Vec3; 8],
        prev_split: f32,
        split: f32,
        direction: Vec3,
        up: Vec3,
    ) -> Cascade {
        let mut corners = *frustum_corners;
        for i in 0..4 {
            let ray = frustum_corners[i + 4] - frustum_corners[i];
            corners[i + 4] = frustum_corners[i] + ray * split;
            corners[i] = frustum_corners[i] + ray * prev_split;
        }

        let center = corners.iter().copied().sum::<Vec3>() / 8.0;
        let radius = corners
            .iter()
            .map(|corner| corner.distance(center))
            .fold(0.0_f32, f32::max);
        let granularity = self.config.radius_granularity;
        let radius = if granularity > 0.0 {
            (radius * granularity).ceil() / granularity
        } else {
            radius
        };

        let light_position = center - direction * radius;
        let light_view = Mat4::look_at_rh(light_position, center, up);
        let mut light_projection = Mat4::orthographic_rh(-radius, radius, -radius, radius, 0.0, 2.0 * radius);

        if self.config.antiflicker {
            light_projection.w_axis += self.texel_snap_offset(&(light_projection * light_view));
        }

        Cascade {
            corners,
            bounding_sphere: BoundingSphere::new(center, radius),
            light_view,
            light_projection,
        }
    }

    /// Clip-space XY offset that puts the reference point on a texel corner
    fn texel_snap_offset(&self, view_projection: &Mat4) -> Vec4 {
        let half_size = self.config.shadow_map_size as f32 / 2.0;
        let origin = *view_projection * self.config.snap_reference_point.extend(1.0);
        let origin = origin * half_size;
        let offset = (origin.round() - origin) / half_size;
        Vec4::new(offset.x, offset.y, 0.0, 0.0)
    }

    // ===== ACCESSORS =====

    pub fn cascade_data(&self) -> &CascadeData {
        &self.data
    }

    pub fn cascades(&self) -> &[Cascade] {
        &self.cascades
    }

    /// Split fractions of the clip range from the last update
    pub fn split_distances(&self) -> &[f32] {
        &self.split_distances
    }

    pub fn cascade_sphere(&self, index: usize) -> Option<BoundingSphere> {
        self.cascades.get(index).map(|c| c.bounding_sphere)
    }

    pub fn light_view_matrix(&self, index: usize) -> Option<Mat4> {
        self.cascades.get(index).map(|c| c.light_view)
    }

    pub fn light_projection_matrix(&self, index: usize) -> Option<Mat4> {
        self.cascades.get(index).map(|c| c.light_projection)
    }
}

/// Far boundary of every cascade as a fraction of `far - near`.
pub fn compute_split_distances(near: f32, far: f32, config: &CascadeConfig) -> Vec<f32> {
    let clip_range = far - near;
    let min_z = near + config.min_distance * clip_range;
    let max_z = near + config.max_distance * clip_range;
    let range = max_z - min_z;
    let ratio = max_z / min_z;
    let count = config.num_cascades as f32;

    (0..config.num_cascades)
        .map(|i| {
            let p = (i + 1) as f32 / count;
            let log = min_z * ratio.powf(p);
            let uniform = min_z + range * p;
            let d = config.split_lambda * (log - uniform) + uniform;
            (d - near) / clip_range
        })
        .collect()
}

#[cfg(test)]
#[path = "cascaded_shadow_tests.rs"]
mod tests;
