/// Vob — a placeable scene object owning a mesh-node hierarchy.
///
/// The Vob's position/rotation/scale drive the local transform of its root
/// node. Nothing propagates on its own: call `update_trafo` after changing
/// the TRS values to refresh world transforms and the cached bounding box.

use std::sync::Arc;
use glam::{Mat4, Quat, Vec3};
use crate::math::AABB;
use crate::resource::MeshGroup;
use super::node::NodeTree;

/// Type tag of a Vob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VobType {
    Normal,
    /// Light probe; `probe_index` addresses its baked data
    Probe { probe_index: u32 },
}

#[derive(Debug, Clone)]
pub struct Vob {
    position: Vec3,
    /// Always unit length
    rotation: Quat,
    scale: Vec3,
    selectable: bool,
    deletable: bool,
    nodes: NodeTree,
    /// Union of all mesh node boxes, refreshed by `update_trafo`
    bounding_box: AABB,
    vob_type: VobType,
    /// Shared container the node tree was instantiated from, if any
    mesh_group: Option<Arc<MeshGroup>>,
}

impl Vob {
    /// Create a Vob owning `nodes`.
    pub fn new(nodes: NodeTree) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            selectable: true,
            deletable: true,
            nodes,
            bounding_box: AABB::EMPTY,
            vob_type: VobType::Normal,
            mesh_group: None,
        }
    }

    /// Create a Vob drawing a shared mesh group.
    ///
    /// The group stays shared; the Vob owns only the lightweight nodes it
    /// instantiates from it.
    pub fn from_mesh_group(group: Arc<MeshGroup>) -> Self {
        let mut vob = Self::new(group.create_node_tree());
        vob.mesh_group = Some(group);
        vob
    }

    /// Create a probe Vob visualizing probe `probe_index` with `group`.
    pub fn probe(group: Arc<MeshGroup>, probe_index: u32) -> Self {
        let mut vob = Self::from_mesh_group(group);
        vob.vob_type = VobType::Probe { probe_index };
        vob
    }

    // ===== TYPE =====

    pub fn vob_type(&self) -> VobType {
        self.vob_type
    }

    pub fn is_probe(&self) -> bool {
        matches!(self.vob_type, VobType::Probe { .. })
    }

    pub fn probe_index(&self) -> Option<u32> {
        match self.vob_type {
            VobType::Probe { probe_index } => Some(probe_index),
            VobType::Normal => None,
        }
    }

    pub fn mesh_group(&self) -> Option<&Arc<MeshGroup>> {
        self.mesh_group.as_ref()
    }

    // ===== NODES =====

    pub fn nodes(&self) -> &NodeTree {
        &self.nodes
    }

    /// Mutable node access. Structural edits take effect on the next
    /// `update_trafo`.
    pub fn nodes_mut(&mut self) -> &mut NodeTree {
        &mut self.nodes
    }

    /// Cached world bounding box (invalid if the Vob has no mesh)
    pub fn bounding_box(&self) -> &AABB {
        &self.bounding_box
    }

    // ===== TRS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Translation of the root node's world transform
    pub fn position_world(&self) -> Vec3 {
        self.nodes
            .get(self.nodes.root())
            .map_or(self.position, |root| root.world_trafo().w_axis.truncate())
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Set the orientation (normalized on the way in)
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    /// Non-uniform scale. Zero components give a degenerate transform.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Orientation from euler angles in radians, applied X then Y then Z
    /// (`Rz * Ry * Rx`).
    pub fn set_orientation(&mut self, euler: Vec3) {
        let rot_x = Quat::from_rotation_x(euler.x);
        let rot_y = Quat::from_rotation_y(euler.y);
        let rot_z = Quat::from_rotation_z(euler.z);
        self.rotation = (rot_z * rot_y * rot_x).normalize();
    }

    /// Replace position, rotation and scale by decomposing `trafo`.
    pub fn set_trafo(&mut self, trafo: &Mat4) {
        let (scale, rotation, position) = trafo.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation.normalize();
        self.position = position;
    }

    /// Rotate around `axis` given in parent space.
    ///
    /// The axis is brought into the object's local frame before composing,
    /// so the result equals a pre-multiplied world rotation.
    pub fn rotate_global(&mut self, axis: Vec3, angle: f32) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        let local_axis = (self.rotation.inverse() * axis).normalize();
        self.rotation = (self.rotation * Quat::from_axis_angle(local_axis, angle)).normalize();
    }

    /// Rotate around the parent-space X, Y then Z axes.
    pub fn rotate_global_euler(&mut self, euler: Vec3) {
        self.rotate_global(Vec3::X, euler.x);
        self.rotate_global(Vec3::Y, euler.y);
        self.rotate_global(Vec3::Z, euler.z);
    }

    /// Rotate around the object's own X, Y then Z axes.
    pub fn rotate_local(&mut self, euler: Vec3) {
        for (axis, angle) in [(Vec3::X, euler.x), (Vec3::Y, euler.y), (Vec3::Z, euler.z)] {
            self.rotation = (self.rotation * Quat::from_axis_angle(axis, angle)).normalize();
        }
    }

    // ===== FLAGS =====

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn set_selectable(&mut self, selectable: bool) {
        self.selectable = selectable;
    }

    pub fn is_deletable(&self) -> bool {
        self.deletable
    }

    pub fn set_deletable(&mut self, deletable: bool) {
        self.deletable = deletable;
    }

    // ===== UPDATE =====

    /// Local transform of the root node: `T(position) * R(rotation) * S(scale)`
    pub fn local_trafo(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Push TRS into the root node, propagate world transforms and
    /// recompute the cached bounding box.
    pub fn update_trafo(&mut self, reset_prev_world_trafo: bool) {
        let root = self.nodes.root();
        self.nodes.set_local_trafo(root, self.local_trafo());
        self.nodes.update_world_trafo_hierarchy(root, reset_prev_world_trafo);
        self.recalculate_bounding_box();
    }

    /// Re-union the mesh node boxes without propagating transforms.
    pub fn recalculate_bounding_box(&mut self) {
        self.bounding_box = self.nodes.mesh_bounding_box(self.nodes.root());
    }
}

#[cfg(test)]
#[path = "vob_tests.rs"]
mod tests;
