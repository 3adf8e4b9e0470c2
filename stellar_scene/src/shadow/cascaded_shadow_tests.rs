use glam::{Mat4, Vec3, Vec4};
use crate::camera::Camera;
use super::*;

// ============================================================================
// Helpers
// ============================================================================

fn test_camera() -> Camera {
    Camera::perspective(
        Vec3::new(0.0, 5.0, 10.0),
        Vec3::ZERO,
        Vec3::Y,
        60.0_f32.to_radians(),
        16.0 / 9.0,
        0.5,
        200.0,
    )
}

fn light_direction() -> Vec3 {
    Vec3::new(-0.3, -1.0, -0.4)
}

/// Reference point close to the scene so clip coordinates stay small
fn local_snap_config() -> CascadeConfig {
    CascadeConfig {
        shadow_map_size: 1024,
        snap_reference_point: Vec3::new(0.3, 0.1, -2.0),
        ..CascadeConfig::default()
    }
}

fn updated_shadow(config: CascadeConfig) -> (CascadedShadow, Camera) {
    let camera = test_camera();
    let mut shadow = CascadedShadow::new(config);
    shadow.frame_update(&camera, light_direction());
    (shadow, camera)
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_default_config() {
    let config = CascadeConfig::default();

    assert_eq!(config.num_cascades, 4);
    assert_eq!(config.split_lambda, 1.0);
    assert_eq!(config.min_distance, 0.0);
    assert_eq!(config.max_distance, 1.0);
    assert_eq!(config.shadow_map_size, 2048);
    assert_eq!(config.radius_granularity, 16.0);
    assert_eq!(config.snap_reference_point, Vec3::new(100.0, -333.0, 0.0));
    assert!(config.antiflicker);
}

#[test]
fn test_resize_uses_larger_dimension() {
    let mut shadow = CascadedShadow::new(CascadeConfig::default());

    shadow.resize(1024, 4096);
    assert_eq!(shadow.shadow_map_size(), 4096);

    shadow.resize(512, 256);
    assert_eq!(shadow.shadow_map_size(), 512);
}

// ============================================================================
// Split distances
// ============================================================================

#[test]
fn test_uniform_splits() {
    let config = CascadeConfig { split_lambda: 0.0, ..CascadeConfig::default() };

    let splits = compute_split_distances(1.0, 101.0, &config);

    let expected = [0.25, 0.5, 0.75, 1.0];
    for (split, expected) in splits.iter().zip(expected) {
        assert!((split - expected).abs() < 1e-5, "{} vs {}", split, expected);
    }
}

#[test]
fn test_logarithmic_splits() {
    let config = CascadeConfig::default();

    let splits = compute_split_distances(1.0, 100.0, &config);

    // (100^p - 1) / 99
    for (i, split) in splits.iter().enumerate() {
        let p = (i + 1) as f32 / 4.0;
        let expected = (100.0_f32.powf(p) - 1.0) / 99.0;
        assert!((split - expected).abs() < 1e-4, "split {}: {} vs {}", i, split, expected);
    }
}

#[test]
fn test_splits_increase_and_end_at_max_distance() {
    for lambda in [0.0, 0.3, 0.75, 1.0] {
        let config = CascadeConfig { split_lambda: lambda, ..CascadeConfig::default() };
        let splits = compute_split_distances(0.5, 200.0, &config);

        assert_eq!(splits.len(), 4);
        assert!(splits.windows(2).all(|w| w[0] < w[1]), "lambda {}: {:?}", lambda, splits);
        assert!((splits[3] - 1.0).abs() < 1e-4);
    }
}

// ============================================================================
// frame_update — coverage
// ============================================================================

#[test]
fn test_split_depths_cover_clip_range() {
    let (shadow, camera) = updated_shadow(CascadeConfig::default());
    let data = shadow.cascade_data();
    let near = camera.near_plane();
    let far = camera.far_plane();

    assert_eq!(data.split_depths.len(), 4);
    assert_eq!(data.view_projections.len(), 4);
    for (depth, split) in data.split_depths.iter().zip(shadow.split_distances()) {
        assert!((depth + (near + split * (far - near))).abs() < 1e-3);
    }
    assert!(data.split_depths.windows(2).all(|w| w[0] > w[1]), "{:?}", data.split_depths);
    assert!(data.split_depths[0] < -near);
    assert!((data.split_depths[3] + far).abs() < 1e-2);
}

#[test]
fn test_cascade_slices_are_contiguous() {
    let (shadow, camera) = updated_shadow(CascadeConfig::default());
    let cascades = shadow.cascades();

    // First slice starts on the camera near plane
    for i in 0..4 {
        assert!(cascades[0].corners[i].abs_diff_eq(camera.frustum().corners[i], 1e-4));
    }
    // Each slice starts where the previous one ends
    for pair in cascades.windows(2) {
        for i in 0..4 {
            assert_eq!(pair[1].corners[i], pair[0].corners[i + 4]);
        }
    }
    // Last slice ends on the far plane
    for i in 0..4 {
        assert!(cascades[3].corners[i + 4].abs_diff_eq(camera.frustum().corners[i + 4], 1e-1));
    }
}

// ============================================================================
// frame_update — fitting
// ============================================================================

#[test]
fn test_sphere_encloses_slice_and_radius_is_rounded() {
    let (shadow, _) = updated_shadow(CascadeConfig::default());

    for cascade in shadow.cascades() {
        let sphere = cascade.bounding_sphere;
        for corner in &cascade.corners {
            assert!(corner.distance(sphere.center) <= sphere.radius + 1e-4);
        }
        let steps = sphere.radius * 16.0;
        assert!((steps - steps.round()).abs() < 1e-3, "radius {} not a multiple of 1/16", sphere.radius);
    }
}

#[test]
fn test_slice_projects_inside_light_clip_volume() {
    let (shadow, _) = updated_shadow(CascadeConfig::default());

    for (cascade, view_projection) in shadow.cascades().iter().zip(&shadow.cascade_data().view_projections) {
        assert_eq!(cascade.view_projection(), *view_projection);
        for corner in &cascade.corners {
            let clip = view_projection.project_point3(*corner);
            assert!(clip.x.abs() <= 1.0 + 2e-3, "x = {}", clip.x);
            assert!(clip.y.abs() <= 1.0 + 2e-3, "y = {}", clip.y);
            assert!(clip.z >= -1e-3 && clip.z <= 1.0 + 1e-3, "z = {}", clip.z);
        }
    }
}

#[test]
fn test_light_looks_at_slice_center_along_direction() {
    let (shadow, _) = updated_shadow(CascadeConfig::default());
    let direction = light_direction().normalize();

    for cascade in shadow.cascades() {
        let view = cascade.light_view;
        // Center sits `radius` in front of the light (RH: -Z forward)
        let center_in_view = view.transform_point3(cascade.bounding_sphere.center);
        assert!(center_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -cascade.bounding_sphere.radius), 1e-2));
        // Forward axis of the view is the light direction
        let forward = -view.inverse().z_axis.truncate();
        assert!(forward.abs_diff_eq(direction, 1e-4));
    }
}

#[test]
fn test_texel_snapping_locks_reference_point_to_texel_grid() {
    let config = local_snap_config();
    let reference = config.snap_reference_point;
    let half_size = config.shadow_map_size as f32 / 2.0;
    let (shadow, _) = updated_shadow(config);

    for view_projection in &shadow.cascade_data().view_projections {
        let texel = (*view_projection * reference.extend(1.0)) * half_size;
        assert!((texel.x - texel.x.round()).abs() < 1e-2, "x = {}", texel.x);
        assert!((texel.y - texel.y.round()).abs() < 1e-2, "y = {}", texel.y);
    }
}

#[test]
fn test_without_antiflicker_projection_is_plain_ortho() {
    let config = CascadeConfig { antiflicker: false, ..CascadeConfig::default() };
    let (shadow, _) = updated_shadow(config);

    for cascade in shadow.cascades() {
        let r = cascade.bounding_sphere.radius;
        assert_eq!(cascade.light_projection, Mat4::orthographic_rh(-r, r, -r, r, 0.0, 2.0 * r));
    }
}

#[test]
fn test_snap_offset_is_sub_texel() {
    let (snapped, _) = updated_shadow(local_snap_config());
    let (plain, _) = updated_shadow(CascadeConfig { antiflicker: false, ..local_snap_config() });

    for (a, b) in snapped.cascades().iter().zip(plain.cascades()) {
        let offset = a.light_projection.w_axis - b.light_projection.w_axis;
        assert!(offset.x.abs() <= 1.0 / 512.0 + 1e-6);
        assert!(offset.y.abs() <= 1.0 / 512.0 + 1e-6);
        assert_eq!(offset.z, 0.0);
        assert_eq!(offset.w, 0.0);
    }
}

#[test]
fn test_vertical_light_direction_stays_finite() {
    let camera = test_camera();
    let mut shadow = CascadedShadow::new(CascadeConfig::default());

    shadow.frame_update(&camera, Vec3::NEG_Y);
    assert!(shadow.cascade_data().view_projections.iter().all(|m| m.is_finite()));

    shadow.frame_update(&camera, Vec3::ZERO);
    assert!(shadow.cascade_data().view_projections.iter().all(|m| m.is_finite()));
}

#[test]
fn test_inverse_view_and_accessors() {
    let (shadow, camera) = updated_shadow(CascadeConfig::default());

    assert_eq!(shadow.cascade_data().inverse_view, camera.inverse_view_matrix());
    assert!(shadow.cascade_sphere(0).is_some());
    assert!(shadow.cascade_sphere(4).is_none());
    assert_eq!(shadow.light_view_matrix(2), Some(shadow.cascades()[2].light_view));
    assert_eq!(shadow.light_projection_matrix(3), Some(shadow.cascades()[3].light_projection));
    assert!(shadow.light_view_matrix(9).is_none());
}

#[test]
fn test_zero_cascades_produce_empty_data() {
    let config = CascadeConfig { num_cascades: 0, ..CascadeConfig::default() };
    let (shadow, camera) = updated_shadow(config);

    assert!(shadow.cascades().is_empty());
    assert!(shadow.cascade_data().view_projections.is_empty());
    assert_eq!(shadow.cascade_data().inverse_view, camera.inverse_view_matrix());
}

// ============================================================================
// GPU upload
// ============================================================================

#[test]
fn test_gpu_bytes_layout() {
    let (shadow, _) = updated_shadow(CascadeConfig::default());
    let data = shadow.cascade_data();

    let bytes = data.to_gpu_bytes();

    assert_eq!(bytes.len(), 64 + 4 * 64 + 4 * 16);
    assert_eq!(&bytes[0..64], bytemuck::bytes_of(&data.inverse_view));
    assert_eq!(&bytes[64..128], bytemuck::bytes_of(&data.view_projections[0]));
    let split: Vec4 = bytemuck::pod_read_unaligned(&bytes[320..336]);
    assert_eq!(split, Vec4::new(data.split_depths[0], 0.0, 0.0, 0.0));
}
