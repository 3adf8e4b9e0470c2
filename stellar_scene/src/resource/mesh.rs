//! Resource-level mesh reference.
//!
//! A `Mesh` is the scene's view of a GPU mesh: an opaque batch identity
//! (`MeshHandle`) used to group draws that share vertex buffers, a debug name,
//! and the object-space bounding box the culler transforms every frame.

use crate::math::AABB;

/// Opaque mesh-batch identity supplied by the GPU layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Clone)]
pub struct Mesh {
    handle: MeshHandle,
    name: String,
    local_aabb: AABB,
}

impl Mesh {
    pub fn new(handle: MeshHandle, name: impl Into<String>, local_aabb: AABB) -> Self {
        Self {
            handle,
            name: name.into(),
            local_aabb,
        }
    }

    pub fn handle(&self) -> MeshHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Object-space bounding box
    pub fn local_aabb(&self) -> &AABB {
        &self.local_aabb
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
