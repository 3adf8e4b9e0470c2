//! Resource references consumed by the scene core
//!
//! Meshes and materials are owned by the asset and GPU layers. The scene only
//! keeps shared handles to them: identities for sorting, a local bounding box
//! for culling, and the material's shading classification for bucketing.

pub mod mesh;
pub mod material;
mod mesh_group;

pub use mesh::{Mesh, MeshHandle};
pub use material::{Material, MaterialFlags, MaterialKind, ShaderHandle};
pub use mesh_group::MeshGroup;
