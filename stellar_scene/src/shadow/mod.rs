//! Cascaded shadow maps for a single directional light.

mod cascaded_shadow;

pub use cascaded_shadow::{
    compute_split_distances, Cascade, CascadeConfig, CascadeData, CascadedShadow,
};
