use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_4;
use super::*;

fn test_camera() -> Camera {
    Camera::perspective(
        Vec3::new(0.0, 2.0, 10.0),
        Vec3::ZERO,
        Vec3::Y,
        FRAC_PI_4,
        1.0,
        0.5,
        200.0,
    )
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_camera_new_stores_matrices() {
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
    let projection = Mat4::perspective_rh(FRAC_PI_4, 1.0, 0.1, 50.0);
    let camera = Camera::new(view, projection, 0.1, 50.0);

    assert_eq!(*camera.view_matrix(), view);
    assert_eq!(*camera.projection_matrix(), projection);
    assert_eq!(camera.view_projection_matrix(), projection * view);
    assert_eq!(camera.near_plane(), 0.1);
    assert_eq!(camera.far_plane(), 50.0);
}

#[test]
fn test_camera_position_from_inverse_view() {
    let camera = test_camera();
    let position = camera.position();

    assert!((position - Vec3::new(0.0, 2.0, 10.0)).length() < 1e-4);
}

#[test]
fn test_camera_frustum_matches_matrices() {
    let camera = test_camera();
    let expected = Frustum::from_view_projection(&camera.view_projection_matrix());

    for (a, b) in camera.frustum().planes.iter().zip(expected.planes.iter()) {
        assert!((*a - *b).length() < 1e-6);
    }
    assert!(camera.frustum().contains_point(Vec3::ZERO));
}

// ============================================================================
// Setters refresh the frustum
// ============================================================================

#[test]
fn test_set_view_refreshes_frustum() {
    let mut camera = test_camera();
    assert!(camera.frustum().contains_point(Vec3::ZERO));

    // Look the other way
    camera.set_view(Mat4::look_at_rh(
        Vec3::new(0.0, 2.0, 10.0),
        Vec3::new(0.0, 2.0, 20.0),
        Vec3::Y,
    ));

    assert!(!camera.frustum().contains_point(Vec3::ZERO));
    assert!(camera.frustum().contains_point(Vec3::new(0.0, 2.0, 15.0)));
}

#[test]
fn test_set_projection_updates_clip_range() {
    let mut camera = test_camera();

    camera.set_projection(Mat4::perspective_rh(FRAC_PI_4, 1.0, 1.0, 5.0), 1.0, 5.0);

    assert_eq!(camera.near_plane(), 1.0);
    assert_eq!(camera.far_plane(), 5.0);
    // Origin is ~10.2 units away: now beyond the far plane
    assert!(!camera.frustum().contains_point(Vec3::ZERO));
}
