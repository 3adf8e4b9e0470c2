/// Scene — owner of all Vobs and of the active subset.
///
/// The scene state sits behind a single exclusive lock. Every read or
/// mutation goes through a `SceneAccess`, obtained with `acquire_lock`, so
/// holding the lock is checked by the compiler rather than by convention.
/// A loader thread can add and activate Vobs between frames while the frame
/// thread takes the lock once per traversal.
///
/// Invariant after every operation:
/// `active_probes ⊆ active ⊆ vobs` and
/// `active_probes == active ∩ { v | v.is_probe() }`.

use std::sync::{Mutex, MutexGuard, PoisonError};
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::math::AABB;
use crate::render::{RenderCommand, RenderCommandQueue};
use crate::{engine_debug, engine_handle_err, engine_trace};
use super::node::NodeTree;
use super::vob::Vob;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a Vob within a Scene.
    ///
    /// Keys remain valid even after other Vobs are removed.
    /// A key becomes invalid only when its own Vob is deleted.
    pub struct VobKey;
}

// ===== FRAME STATE =====

/// Snapshot of scene-wide derived data, computed fresh on request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrameState {
    /// Union of the active Vobs' boxes (EMPTY when nothing is active)
    pub bounding_box: AABB,
    pub active_count: usize,
    pub active_probe_count: usize,
}

// ===== SCENE =====

#[derive(Debug)]
struct SceneState {
    vobs: SlotMap<VobKey, Vob>,
    active: FxHashSet<VobKey>,
    active_probes: FxHashSet<VobKey>,
    bounding_box: AABB,
    has_changed: bool,
}

#[derive(Debug)]
pub struct Scene {
    state: Mutex<SceneState>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SceneState {
                vobs: SlotMap::with_key(),
                active: FxHashSet::default(),
                active_probes: FxHashSet::default(),
                bounding_box: AABB::EMPTY,
                has_changed: false,
            }),
        }
    }

    /// Take the scene lock.
    ///
    /// A poisoned lock is recovered: a panic on another thread must not stop
    /// the frame loop.
    pub fn acquire_lock(&self) -> SceneAccess<'_> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        SceneAccess { state }
    }

    /// Lock once and push every drawable node of the active Vobs.
    pub fn collect_render_commands(&self, queue: &mut RenderCommandQueue, do_culling: bool) {
        self.acquire_lock().collect_render_commands(queue, do_culling);
    }
}

// ===== SCENE ACCESS =====

/// Exclusive access to the scene state, valid while the lock is held
pub struct SceneAccess<'a> {
    state: MutexGuard<'a, SceneState>,
}

impl<'a> SceneAccess<'a> {
    // ===== OWNERSHIP =====

    /// Move `vob` into the scene, optionally activating it.
    pub fn add_vob(&mut self, vob: Vob, set_active: bool) -> VobKey {
        let is_probe = vob.is_probe();
        let key = self.state.vobs.insert(vob);
        if set_active {
            self.activate(key, is_probe);
        }
        self.state.has_changed = true;
        engine_debug!("stellar::Scene", "Added vob {:?} (active: {}, probe: {})", key, set_active, is_probe);
        key
    }

    /// Create a normal Vob owning `nodes` and add it.
    pub fn create_vob(&mut self, nodes: NodeTree, set_active: bool) -> VobKey {
        self.add_vob(Vob::new(nodes), set_active)
    }

    /// Remove a Vob from the scene and hand it back.
    ///
    /// The Vob is deactivated first, so no active entry ever outlives its
    /// Vob. Returns `None` for an unknown key.
    pub fn delete_vob(&mut self, key: VobKey) -> Option<Vob> {
        let state = &mut *self.state;
        let vob = state.vobs.remove(key)?;
        state.active.remove(&key);
        state.active_probes.remove(&key);
        state.has_changed = true;
        engine_debug!("stellar::Scene", "Deleted vob {:?}", key);
        Some(vob)
    }

    /// Remove every Vob.
    pub fn clear(&mut self) {
        let state = &mut *self.state;
        state.active.clear();
        state.active_probes.clear();
        state.vobs.clear();
        state.bounding_box = AABB::EMPTY;
        state.has_changed = true;
        engine_debug!("stellar::Scene", "Cleared scene");
    }

    // ===== ACTIVATION =====

    /// Mark an owned Vob active. Activating an active Vob is a no-op.
    pub fn add_active_vob(&mut self, key: VobKey) -> Result<()> {
        let Some(vob) = self.state.vobs.get(key) else {
            return Err(engine_handle_err!("stellar::Scene",
                "add_active_vob: vob {:?} is not owned by this scene", key));
        };
        let is_probe = vob.is_probe();
        self.activate(key, is_probe);
        self.state.has_changed = true;
        Ok(())
    }

    /// Remove a Vob from the active set. Returns false if it was not active.
    pub fn remove_active_vob(&mut self, key: VobKey) -> bool {
        let state = &mut *self.state;
        let removed = state.active.remove(&key);
        state.active_probes.remove(&key);
        if removed {
            state.has_changed = true;
        }
        removed
    }

    fn activate(&mut self, key: VobKey, is_probe: bool) {
        let state = &mut *self.state;
        state.active.insert(key);
        if is_probe {
            state.active_probes.insert(key);
        }
    }

    pub fn is_active(&self, key: VobKey) -> bool {
        self.state.active.contains(&key)
    }

    // ===== QUERIES =====

    pub fn vob(&self, key: VobKey) -> Option<&Vob> {
        self.state.vobs.get(key)
    }

    pub fn vob_mut(&mut self, key: VobKey) -> Option<&mut Vob> {
        self.state.vobs.get_mut(key)
    }

    pub fn contains(&self, key: VobKey) -> bool {
        self.state.vobs.contains_key(key)
    }

    /// All owned Vobs, active or not
    pub fn vobs(&self) -> impl Iterator<Item = (VobKey, &Vob)> {
        self.state.vobs.iter()
    }

    pub fn active_vobs(&self) -> impl Iterator<Item = (VobKey, &Vob)> {
        let state = &*self.state;
        state.active.iter().filter_map(move |&key| state.vobs.get(key).map(|vob| (key, vob)))
    }

    pub fn active_probe_vobs(&self) -> impl Iterator<Item = (VobKey, &Vob)> {
        let state = &*self.state;
        state.active_probes.iter().filter_map(move |&key| state.vobs.get(key).map(|vob| (key, vob)))
    }

    pub fn vob_count(&self) -> usize {
        self.state.vobs.len()
    }

    pub fn active_count(&self) -> usize {
        self.state.active.len()
    }

    pub fn active_probe_count(&self) -> usize {
        self.state.active_probes.len()
    }

    pub fn has_changed(&self) -> bool {
        self.state.has_changed
    }

    pub fn set_has_changed(&mut self, changed: bool) {
        self.state.has_changed = changed;
    }

    // ===== PER FRAME =====

    /// `update_trafo` on every active Vob.
    pub fn update_world_trafo_hierarchy(&mut self, reset_prev_world_trafo: bool) {
        let state = &mut *self.state;
        for key in &state.active {
            if let Some(vob) = state.vobs.get_mut(*key) {
                vob.update_trafo(reset_prev_world_trafo);
            }
        }
        state.has_changed = true;
    }

    /// Recompute the scene box as the union of the active Vobs' boxes.
    pub fn calc_scene_bounding_box(&mut self) -> AABB {
        let bounding_box = self
            .active_vobs()
            .fold(AABB::EMPTY, |acc, (_, vob)| acc.union(vob.bounding_box()));
        self.state.bounding_box = bounding_box;
        self.state.has_changed = true;
        bounding_box
    }

    /// Scene box from the last `calc_scene_bounding_box`
    pub fn bounding_box(&self) -> &AABB {
        &self.state.bounding_box
    }

    /// Fresh scene-wide snapshot for this frame.
    pub fn frame_state(&mut self) -> SceneFrameState {
        SceneFrameState {
            bounding_box: self.calc_scene_bounding_box(),
            active_count: self.active_count(),
            active_probe_count: self.active_probe_count(),
        }
    }

    /// Push one command per drawable node of every active Vob.
    ///
    /// Nodes are visited breadth-first per Vob. A node with a mesh but no
    /// material cannot be classified and is skipped.
    pub fn collect_render_commands(&self, queue: &mut RenderCommandQueue, do_culling: bool) {
        let mut skipped = 0usize;

        for (_, vob) in self.active_vobs() {
            let nodes = vob.nodes();
            for (_, node) in nodes.breadth_first(nodes.root()) {
                match RenderCommand::from_node(node) {
                    Some(command) => queue.push(command, do_culling),
                    None if node.mesh().is_some() => skipped += 1,
                    None => {}
                }
            }
        }

        if skipped > 0 {
            engine_trace!("stellar::Scene", "Skipped {} mesh nodes without material", skipped);
        }
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
