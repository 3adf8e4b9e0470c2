//! Camera module — view/projection container and its culling frustum.

mod camera;
mod frustum;

pub use camera::Camera;
pub use frustum::{
    Frustum, NDC_CORNERS,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
