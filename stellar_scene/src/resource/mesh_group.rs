/// MeshGroup — an externally owned list of mesh/material pairs.
///
/// Loaded models and baked probe geometry live in a `MeshGroup` that outlives
/// any single Vob. Several Vobs may share one group; each of them instantiates
/// its own lightweight `NodeTree` from it and owns only those nodes.

use std::sync::Arc;
use crate::math::AABB;
use crate::resource::{Material, Mesh};
use crate::scene::{NodeTree, SceneNode};

#[derive(Debug, Clone, Default)]
pub struct MeshGroup {
    entries: Vec<(Arc<Mesh>, Arc<Material>)>,
}

impl MeshGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<(Arc<Mesh>, Arc<Material>)>) -> Self {
        Self { entries }
    }

    pub fn add(&mut self, mesh: Arc<Mesh>, material: Arc<Material>) {
        self.entries.push((mesh, material));
    }

    pub fn entries(&self) -> &[(Arc<Mesh>, Arc<Material>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union of every mesh's object-space box (EMPTY for an empty group)
    pub fn local_aabb(&self) -> AABB {
        self.entries
            .iter()
            .fold(AABB::EMPTY, |acc, (mesh, _)| acc.union(mesh.local_aabb()))
    }

    /// Build a fresh tree: an empty root with one mesh child per entry.
    pub fn create_node_tree(&self) -> NodeTree {
        let mut tree = NodeTree::new();
        let root = tree.root();
        for (mesh, material) in &self.entries {
            let child = tree.insert(SceneNode::with_mesh(Arc::clone(mesh), Arc::clone(material)));
            tree.add_child(root, child);
        }
        tree
    }
}

#[cfg(test)]
#[path = "mesh_group_tests.rs"]
mod tests;
