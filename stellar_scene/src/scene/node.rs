/// Scene nodes — the mesh hierarchy inside a Vob.
///
/// A `NodeTree` is an arena of `SceneNode`s addressed by stable `NodeKey`s.
/// Children are stored as key lists and the parent as an optional key, so the
/// tree can be walked in both directions without shared ownership. Removing a
/// node removes its whole subtree from the arena.
///
/// Transform propagation is explicit: setting a local transform never touches
/// world state. `update_world_trafo_hierarchy` recomputes world transforms,
/// previous-frame transforms and mesh bounding boxes top-down.

use std::collections::VecDeque;
use std::sync::Arc;
use glam::Mat4;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::math::AABB;
use crate::resource::{Material, Mesh};
use crate::{engine_err, engine_handle_err};

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a SceneNode within its NodeTree.
    ///
    /// A key becomes invalid only when its own node (or an ancestor)
    /// is removed.
    pub struct NodeKey;
}

// ===== SCENE NODE =====

#[derive(Debug, Clone)]
pub struct SceneNode {
    local_trafo: Mat4,
    world_trafo: Mat4,
    prev_world_trafo: Mat4,
    mesh: Option<Arc<Mesh>>,
    material: Option<Arc<Material>>,
    /// World-space box of `mesh`, EMPTY until the first propagation
    bounding_box: AABB,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneNode {
    /// Create an empty transform node
    pub fn new() -> Self {
        Self {
            local_trafo: Mat4::IDENTITY,
            world_trafo: Mat4::IDENTITY,
            prev_world_trafo: Mat4::IDENTITY,
            mesh: None,
            material: None,
            bounding_box: AABB::EMPTY,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a node drawing `mesh` with `material`
    pub fn with_mesh(mesh: Arc<Mesh>, material: Arc<Material>) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
            ..Self::new()
        }
    }

    pub fn local_trafo(&self) -> &Mat4 {
        &self.local_trafo
    }

    pub fn world_trafo(&self) -> &Mat4 {
        &self.world_trafo
    }

    /// World transform of the previous propagation (motion vectors)
    pub fn prev_world_trafo(&self) -> &Mat4 {
        &self.prev_world_trafo
    }

    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        self.mesh.as_ref()
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn bounding_box(&self) -> &AABB {
        &self.bounding_box
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn set_local_trafo(&mut self, trafo: Mat4) {
        self.local_trafo = trafo;
    }

    pub fn set_mesh(&mut self, mesh: Option<Arc<Mesh>>) {
        self.mesh = mesh;
    }

    pub fn set_material(&mut self, material: Option<Arc<Material>>) {
        self.material = material;
    }
}

// ===== NODE TREE =====

/// Arena owning one node hierarchy. Always has a root node.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// Create a tree holding a single empty root node
    pub fn new() -> Self {
        Self::with_root(SceneNode::new())
    }

    /// Create a tree whose root is `root` (its links are reset)
    pub fn with_root(mut root: SceneNode) -> Self {
        root.parent = None;
        root.children.clear();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(root);
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// Insert a detached node. Attach it with `add_child`.
    pub fn insert(&mut self, mut node: SceneNode) -> NodeKey {
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    /// Append `child` to `parent` and set its parent link.
    ///
    /// No cycle or double-attach check: the caller guarantees `child` is
    /// detached and not an ancestor of `parent`. Use `reparent` for edits
    /// that come from user input. Returns false if either key is invalid.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> bool {
        if !self.nodes.contains_key(child) {
            return false;
        }
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return false;
        };
        parent_node.children.push(child);
        self.nodes[child].parent = Some(parent);
        true
    }

    /// Detach `child` from `parent`. The child stays in the arena as a
    /// detached subtree root. Returns false if it was not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> bool {
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return false;
        };
        let Some(index) = parent_node.children.iter().position(|&c| c == child) else {
            return false;
        };
        parent_node.children.remove(index);
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = None;
        }
        true
    }

    /// Remove `key` and all of its descendants from the arena.
    ///
    /// Returns the number of removed nodes. The root cannot be removed.
    pub fn remove_subtree(&mut self, key: NodeKey) -> Result<usize> {
        if !self.nodes.contains_key(key) {
            return Err(engine_handle_err!("stellar::NodeTree",
                "remove_subtree: unknown node {:?}", key));
        }
        if key == self.root {
            return Err(engine_err!("stellar::NodeTree",
                "remove_subtree: the root node cannot be removed"));
        }

        if let Some(parent) = self.nodes[key].parent {
            self.remove_child(parent, key);
        }

        let mut removed = 0;
        let mut queue = VecDeque::from([key]);
        while let Some(current) = queue.pop_front() {
            if let Some(node) = self.nodes.remove(current) {
                queue.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// Children of `key` in insertion order (empty for an invalid key)
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(key)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// True if `node` lies strictly below `ancestor`.
    pub fn has_descendant(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = self.parent(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.parent(key);
        }
        false
    }

    /// Move `node` under `new_parent`, or leave it at root position (`None`).
    ///
    /// Rejected with `InvalidArgument`:
    /// - moving the root under another node
    /// - moving a non-root node to root position
    /// - moving a node under itself or one of its descendants
    pub fn reparent(&mut self, node: NodeKey, new_parent: Option<NodeKey>) -> Result<()> {
        if !self.nodes.contains_key(node) {
            return Err(engine_handle_err!("stellar::NodeTree",
                "reparent: unknown node {:?}", node));
        }

        let Some(new_parent) = new_parent else {
            if node != self.root {
                return Err(engine_err!("stellar::NodeTree",
                    "reparent: node {:?} is not a root node", node));
            }
            return Ok(());
        };

        if !self.nodes.contains_key(new_parent) {
            return Err(engine_handle_err!("stellar::NodeTree",
                "reparent: unknown parent {:?}", new_parent));
        }
        if node == self.root {
            return Err(engine_err!("stellar::NodeTree",
                "reparent: the root node cannot be moved under {:?}", new_parent));
        }
        if new_parent == node || self.has_descendant(node, new_parent) {
            return Err(engine_err!("stellar::NodeTree",
                "reparent: {:?} is inside the subtree of {:?}", new_parent, node));
        }

        if let Some(old_parent) = self.nodes[node].parent {
            self.remove_child(old_parent, node);
        }
        self.add_child(new_parent, node);
        Ok(())
    }

    /// Replace the local transform of `key`. Does not propagate.
    /// Returns false if the key is invalid.
    pub fn set_local_trafo(&mut self, key: NodeKey, trafo: Mat4) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                node.set_local_trafo(trafo);
                true
            }
            None => false,
        }
    }

    /// Recompute world transforms of `start` and everything below it.
    ///
    /// `start` is treated as parentless: its world transform becomes its
    /// local transform. Mesh nodes get their world bounding box refreshed.
    /// With `reset_prev_world_trafo` the previous-frame transform is set to
    /// the new world transform (no motion across a teleport); otherwise it
    /// keeps the world transform from before this update.
    pub fn update_world_trafo_hierarchy(&mut self, start: NodeKey, reset_prev_world_trafo: bool) {
        let mut queue = VecDeque::from([(start, Mat4::IDENTITY)]);

        while let Some((key, parent_world)) = queue.pop_front() {
            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };

            let world = parent_world * node.local_trafo;
            node.prev_world_trafo = if reset_prev_world_trafo { world } else { node.world_trafo };
            node.world_trafo = world;

            if let Some(mesh) = &node.mesh {
                node.bounding_box = mesh.local_aabb().transformed(&world);
            }

            queue.extend(node.children.iter().map(|&child| (child, world)));
        }
    }

    /// Breadth-first walk from `start` (parent before child).
    pub fn breadth_first(&self, start: NodeKey) -> BreadthFirst<'_> {
        let queue = if self.nodes.contains_key(start) {
            VecDeque::from([start])
        } else {
            VecDeque::new()
        };
        BreadthFirst { tree: self, queue }
    }

    /// Union of the world boxes of every mesh node at or below `start`.
    ///
    /// Starts from `AABB::EMPTY`, so a subtree without meshes yields an
    /// invalid box.
    pub fn mesh_bounding_box(&self, start: NodeKey) -> AABB {
        self.breadth_first(start)
            .filter(|(_, node)| node.mesh.is_some())
            .fold(AABB::EMPTY, |acc, (_, node)| acc.union(&node.bounding_box))
    }
}

// ===== BREADTH-FIRST ITERATOR =====

pub struct BreadthFirst<'a> {
    tree: &'a NodeTree,
    queue: VecDeque<NodeKey>,
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = (NodeKey, &'a SceneNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(key) = self.queue.pop_front() {
            if let Some(node) = self.tree.nodes.get(key) {
                self.queue.extend(node.children.iter().copied());
                return Some((key, node));
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
