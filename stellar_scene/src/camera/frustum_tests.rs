use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_4, PI};
use crate::math::AABB;
use super::*;

fn perspective_vp() -> Mat4 {
    let projection = Mat4::perspective_rh(FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    projection * view
}

/// Orthographic 20x20 box, rotated 45° around Z: a diamond in XY.
fn diamond_vp() -> Mat4 {
    let projection = Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0);
    projection * Mat4::from_rotation_z(PI / 4.0)
}

// ============================================================================
// Frustum::from_view_projection
// ============================================================================

#[test]
fn test_frustum_planes_are_normalized() {
    for vp in [Mat4::IDENTITY, perspective_vp(), diamond_vp()] {
        let frustum = Frustum::from_view_projection(&vp);
        for plane in &frustum.planes {
            let normal_len = plane.truncate().length();
            assert!((normal_len - 1.0).abs() < 1e-4, "plane normal should be unit length");
        }
    }
}

#[test]
fn test_frustum_identity_corners_are_ndc_cube() {
    let frustum = Frustum::from_view_projection(&Mat4::IDENTITY);

    for (corner, ndc) in frustum.corners.iter().zip(NDC_CORNERS.iter()) {
        assert!((*corner - *ndc).length() < 1e-5);
    }
}

#[test]
fn test_frustum_perspective_corners_on_clip_planes() {
    let frustum = Frustum::from_view_projection(&perspective_vp());

    // Camera at z = 5 looking down -Z: near corners at z = 4.9, far at z = -95
    for corner in &frustum.corners[0..4] {
        assert!((corner.z - 4.9).abs() < 1e-2, "near corner z = {}", corner.z);
    }
    for corner in &frustum.corners[4..8] {
        assert!((corner.z + 95.0).abs() < 0.5, "far corner z = {}", corner.z);
    }
    // Far corners spread wider than near corners
    assert!(frustum.corners[5].x > frustum.corners[1].x);
}

#[test]
fn test_frustum_near_plane_uses_zero_depth() {
    let frustum = Frustum::from_view_projection(&perspective_vp());

    // Just in front of the near plane vs. just behind it
    assert!(frustum.signed_distance(PLANE_NEAR, Vec3::new(0.0, 0.0, 4.8)) > 0.0);
    assert!(frustum.signed_distance(PLANE_NEAR, Vec3::new(0.0, 0.0, 4.95)) < 0.0);
}

// ============================================================================
// Frustum::contains_point
// ============================================================================

#[test]
fn test_contains_point() {
    let frustum = Frustum::from_view_projection(&perspective_vp());

    assert!(frustum.contains_point(Vec3::ZERO));
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)), "behind the camera");
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -200.0)), "beyond far plane");
    assert!(!frustum.contains_point(Vec3::new(50.0, 0.0, 0.0)), "far off to the right");
}

// ============================================================================
// Frustum::intersects_aabb
// ============================================================================

#[test]
fn test_intersects_aabb_inside_and_outside() {
    let frustum = Frustum::from_view_projection(&perspective_vp());

    let inside = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    assert!(frustum.intersects_aabb(&inside));

    let behind = AABB::new(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 12.0));
    assert!(!frustum.intersects_aabb(&behind));
}

// ============================================================================
// Frustum::box_in_frustum
// ============================================================================

#[test]
fn test_box_in_frustum_visible_box() {
    let frustum = Frustum::from_view_projection(&perspective_vp());
    let aabb = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));

    assert!(frustum.box_in_frustum(&aabb));
}

#[test]
fn test_box_in_frustum_rejects_box_behind_a_plane() {
    let frustum = Frustum::from_view_projection(&perspective_vp());
    let behind = AABB::new(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 12.0));

    assert!(!frustum.box_in_frustum(&behind));
}

#[test]
fn test_box_in_frustum_accepts_box_enclosing_frustum() {
    let frustum = Frustum::from_view_projection(&perspective_vp());
    let huge = AABB::new(Vec3::splat(-1000.0), Vec3::splat(1000.0));

    assert!(frustum.box_in_frustum(&huge));
}

#[test]
fn test_box_in_frustum_accepts_box_straddling_frustum() {
    let frustum = Frustum::from_view_projection(&perspective_vp());
    // Long thin box crossing the view from far left to far right
    let bar = AABB::new(Vec3::new(-500.0, -0.1, -0.1), Vec3::new(500.0, 0.1, 0.1));

    assert!(frustum.box_in_frustum(&bar));
}

#[test]
fn test_box_in_frustum_rejects_plane_test_false_positive() {
    let frustum = Frustum::from_view_projection(&diamond_vp());
    // Just past the diamond's right tip (x ≈ 14.14). Every plane has at
    // least one box corner on its inner side, so plane tests alone accept it.
    let aabb = AABB::new(Vec3::new(14.5, -1.0, -50.0), Vec3::new(16.0, 1.0, -40.0));

    assert!(frustum.intersects_aabb(&aabb), "plane-only test is conservative");
    assert!(!frustum.box_in_frustum(&aabb), "corner test rejects it");
}

#[test]
fn test_box_in_frustum_rejects_empty_box() {
    let frustum = Frustum::from_view_projection(&perspective_vp());

    assert!(!frustum.box_in_frustum(&AABB::EMPTY));
}
