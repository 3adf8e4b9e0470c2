/// RenderCommand — one draw of one mesh node for one frame.
///
/// Commands are rebuilt every frame from the scene nodes and never outlive
/// the queue that holds them. The material's pass state is copied in so
/// classification does not chase the material again.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::math::AABB;
use crate::resource::{Material, MaterialFlags, MaterialKind, Mesh, MeshHandle, ShaderHandle};
use crate::scene::SceneNode;

#[derive(Debug, Clone)]
pub struct RenderCommand {
    pub mesh: Arc<Mesh>,
    pub material: Arc<Material>,
    pub world_trafo: Mat4,
    pub prev_world_trafo: Mat4,
    /// World-space box used for culling and depth sorting
    pub bounding_box: AABB,
    pub kind: MaterialKind,
    pub flags: MaterialFlags,
}

impl RenderCommand {
    pub fn new(
        mesh: Arc<Mesh>,
        material: Arc<Material>,
        world_trafo: Mat4,
        prev_world_trafo: Mat4,
        bounding_box: AABB,
    ) -> Self {
        let kind = material.kind();
        let flags = material.flags();
        Self {
            mesh,
            material,
            world_trafo,
            prev_world_trafo,
            bounding_box,
            kind,
            flags,
        }
    }

    /// Build the command for a scene node. `None` unless the node has both
    /// a mesh and a material.
    pub fn from_node(node: &SceneNode) -> Option<Self> {
        let mesh = node.mesh()?;
        let material = node.material()?;
        Some(Self::new(
            Arc::clone(mesh),
            Arc::clone(material),
            *node.world_trafo(),
            *node.prev_world_trafo(),
            *node.bounding_box(),
        ))
    }

    pub fn shader(&self) -> ShaderHandle {
        self.material.shader()
    }

    pub fn mesh_handle(&self) -> MeshHandle {
        self.mesh.handle()
    }

    pub fn is_blending(&self) -> bool {
        self.flags.contains(MaterialFlags::BLEND)
    }

    pub fn casts_shadow(&self) -> bool {
        self.flags.contains(MaterialFlags::CAST_SHADOW)
    }

    pub fn tool_draw_index(&self) -> Option<u32> {
        match self.kind {
            MaterialKind::Tool { draw_index } => Some(draw_index),
            _ => None,
        }
    }

    /// Point used for depth sorting: box center, or the world translation
    /// when the box is invalid.
    pub fn sort_position(&self) -> Vec3 {
        if self.bounding_box.is_valid() {
            self.bounding_box.center()
        } else {
            self.world_trafo.w_axis.truncate()
        }
    }
}

#[cfg(test)]
#[path = "render_command_tests.rs"]
mod tests;
