/// RenderCommandQueue — per-frame culling, bucketing and sorting.
///
/// One frame is `clear()` → `push()`* → `sort()`. Between `clear` and `sort`
/// the queue is in the Fill phase; after `sort` it is Sorted and the buckets
/// may be read in `RenderBucket::SUBMISSION_ORDER`. Pushing while Sorted is a
/// contract violation (debug-asserted only).
///
/// Only one culling volume is active at a time: the camera frustum or a
/// sphere. With no volume set, culling rejects everything.

use glam::Vec3;
use rdst::{RadixKey, RadixSort};
use rustc_hash::FxHashSet;
use crate::camera::{Camera, Frustum};
use crate::engine_trace;
use crate::math::{BoundingSphere, AABB};
use crate::resource::{MaterialFlags, MaterialKind, ShaderHandle};
use super::render_command::RenderCommand;

// ===== CULLING VOLUME =====

#[derive(Debug, Clone, Copy)]
pub enum CullingVolume {
    /// Nothing passes when culling is requested
    None,
    /// Camera frustum and the camera position (for depth sorting)
    Frustum { frustum: Frustum, position: Vec3 },
    /// Local sphere, e.g. for probe rendering
    Sphere(BoundingSphere),
}

// ===== PHASE / STATS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePhase {
    Fill,
    Sorted,
}

/// Per-frame counters, reset by `clear`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Commands handed to `push`
    pub pushed: usize,
    /// Commands dropped by culling
    pub culled: usize,
}

// ===== BUCKETS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderBucket {
    Shadow,
    DeferredOpaque,
    Forward,
    PreTransparent,
    Probe,
    Transparent,
    Tool,
}

impl RenderBucket {
    /// Order in which the GPU layer consumes the buckets
    pub const SUBMISSION_ORDER: [RenderBucket; 7] = [
        RenderBucket::Shadow,
        RenderBucket::DeferredOpaque,
        RenderBucket::Forward,
        RenderBucket::PreTransparent,
        RenderBucket::Probe,
        RenderBucket::Transparent,
        RenderBucket::Tool,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RenderBucket::Shadow => "shadow",
            RenderBucket::DeferredOpaque => "deferred_opaque",
            RenderBucket::Forward => "forward",
            RenderBucket::PreTransparent => "pre_transparent",
            RenderBucket::Probe => "probe",
            RenderBucket::Transparent => "transparent",
            RenderBucket::Tool => "tool",
        }
    }
}

/// Radix sort entry: (shader, mesh) packed into 64 bits plus the
/// command's index in its bucket.
#[derive(Debug, Clone, Copy)]
struct SortEntry {
    key: u64,
    index: u32,
}

impl RadixKey for SortEntry {
    const LEVELS: usize = 8;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.key >> (level * 8)) as u8
    }
}

// ===== QUEUE =====

pub struct RenderCommandQueue {
    deferred_opaque: Vec<RenderCommand>,
    forward: Vec<RenderCommand>,
    pre_transparent: Vec<RenderCommand>,
    probe: Vec<RenderCommand>,
    transparent: Vec<RenderCommand>,
    /// Kept ordered by draw index; equal indices stay in push order
    tool: Vec<RenderCommand>,
    shadow: Vec<RenderCommand>,
    shaders_in_use: FxHashSet<ShaderHandle>,
    culling: CullingVolume,
    phase: QueuePhase,
    stats: QueueStats,
}

impl Default for RenderCommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderCommandQueue {
    pub fn new() -> Self {
        Self {
            deferred_opaque: Vec::new(),
            forward: Vec::new(),
            pre_transparent: Vec::new(),
            probe: Vec::new(),
            transparent: Vec::new(),
            tool: Vec::new(),
            shadow: Vec::new(),
            shaders_in_use: FxHashSet::default(),
            culling: CullingVolume::None,
            phase: QueuePhase::Fill,
            stats: QueueStats::default(),
        }
    }

    // ===== CULLING SETUP =====

    /// Cull against `camera`'s frustum. Replaces any culling sphere.
    pub fn use_camera_culling(&mut self, camera: &Camera) {
        self.culling = CullingVolume::Frustum {
            frustum: *camera.frustum(),
            position: camera.position(),
        };
    }

    /// Cull against `sphere`. Replaces any camera frustum.
    pub fn use_sphere_culling(&mut self, sphere: BoundingSphere) {
        self.culling = CullingVolume::Sphere(sphere);
    }

    pub fn clear_culling(&mut self) {
        self.culling = CullingVolume::None;
    }

    pub fn culling_volume(&self) -> &CullingVolume {
        &self.culling
    }

    /// Reference point for transparent depth sorting
    pub fn cull_position(&self) -> Option<Vec3> {
        match &self.culling {
            CullingVolume::None => None,
            CullingVolume::Frustum { position, .. } => Some(*position),
            CullingVolume::Sphere(sphere) => Some(sphere.center),
        }
    }

    /// Test a world box against the active culling volume
    pub fn is_visible(&self, aabb: &AABB) -> bool {
        match &self.culling {
            CullingVolume::None => false,
            CullingVolume::Frustum { frustum, .. } => frustum.box_in_frustum(aabb),
            CullingVolume::Sphere(sphere) => sphere.intersects_aabb(aabb),
        }
    }

    // ===== FRAME =====

    /// Empty every bucket and return to the Fill phase.
    /// The culling volume is kept.
    pub fn clear(&mut self) {
        self.deferred_opaque.clear();
        self.forward.clear();
        self.pre_transparent.clear();
        self.probe.clear();
        self.transparent.clear();
        self.tool.clear();
        self.shadow.clear();
        self.shaders_in_use.clear();
        self.phase = QueuePhase::Fill;
        self.stats = QueueStats::default();
    }

    /// Cull (optionally) and classify one command.
    ///
    /// A culled command lands in no bucket, not even the shadow bucket.
    /// Otherwise it goes to exactly one primary bucket, plus the shadow
    /// bucket when its material casts shadows.
    pub fn push(&mut self, command: RenderCommand, do_culling: bool) {
        debug_assert_eq!(self.phase, QueuePhase::Fill, "push after sort without clear");
        self.stats.pushed += 1;

        if do_culling && !self.is_visible(&command.bounding_box) {
            self.stats.culled += 1;
            return;
        }

        self.shaders_in_use.insert(command.shader());

        if command.casts_shadow() {
            self.shadow.push(command.clone());
        }

        let blending = command.is_blending();
        if command.kind == MaterialKind::DeferredPbr && !blending {
            self.deferred_opaque.push(command);
        } else if command.flags.contains(MaterialFlags::RENDER_BEFORE_TRANSPARENTS) {
            self.pre_transparent.push(command);
        } else if blending {
            self.transparent.push(command);
        } else if command.kind == MaterialKind::Probe {
            self.probe.push(command);
        } else if let Some(draw_index) = command.tool_draw_index() {
            let position = self.tool.partition_point(|c| {
                c.tool_draw_index().unwrap_or(0) <= draw_index
            });
            self.tool.insert(position, command);
        } else {
            self.forward.push(command);
        }
    }

    /// Order the buckets for submission and enter the Sorted phase.
    ///
    /// Deferred opaque and shadow: by (shader, mesh) to minimize state
    /// changes. Transparent: back to front from `cull_position`. The other
    /// buckets keep push order.
    pub fn sort(&mut self) {
        sort_by_state(&mut self.deferred_opaque);
        sort_by_state(&mut self.shadow);

        let origin = self.cull_position().unwrap_or(Vec3::ZERO);
        self.transparent.sort_by(|a, b| {
            let distance_a = origin.distance_squared(a.sort_position());
            let distance_b = origin.distance_squared(b.sort_position());
            distance_b.total_cmp(&distance_a)
        });

        self.phase = QueuePhase::Sorted;

        engine_trace!("stellar::RenderQueue",
            "Sorted {} commands ({} culled): opaque={} forward={} pre={} probe={} transparent={} tool={} shadow={} shaders={}",
            self.stats.pushed - self.stats.culled, self.stats.culled,
            self.deferred_opaque.len(), self.forward.len(), self.pre_transparent.len(),
            self.probe.len(), self.transparent.len(), self.tool.len(), self.shadow.len(),
            self.shaders_in_use.len());
    }

    // ===== ACCESSORS =====

    pub fn phase(&self) -> QueuePhase {
        self.phase
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    pub fn bucket(&self, bucket: RenderBucket) -> &[RenderCommand] {
        match bucket {
            RenderBucket::Shadow => &self.shadow,
            RenderBucket::DeferredOpaque => &self.deferred_opaque,
            RenderBucket::Forward => &self.forward,
            RenderBucket::PreTransparent => &self.pre_transparent,
            RenderBucket::Probe => &self.probe,
            RenderBucket::Transparent => &self.transparent,
            RenderBucket::Tool => &self.tool,
        }
    }

    pub fn deferred_opaque_commands(&self) -> &[RenderCommand] {
        &self.deferred_opaque
    }

    pub fn forward_commands(&self) -> &[RenderCommand] {
        &self.forward
    }

    pub fn pre_transparent_commands(&self) -> &[RenderCommand] {
        &self.pre_transparent
    }

    pub fn probe_commands(&self) -> &[RenderCommand] {
        &self.probe
    }

    pub fn transparent_commands(&self) -> &[RenderCommand] {
        &self.transparent
    }

    pub fn tool_commands(&self) -> &[RenderCommand] {
        &self.tool
    }

    pub fn shadow_commands(&self) -> &[RenderCommand] {
        &self.shadow
    }

    /// Distinct shaders referenced by accepted commands this frame
    pub fn shaders_in_use(&self) -> &FxHashSet<ShaderHandle> {
        &self.shaders_in_use
    }

    /// Number of commands across the primary buckets (shadow excluded)
    pub fn len(&self) -> usize {
        self.deferred_opaque.len()
            + self.forward.len()
            + self.pre_transparent.len()
            + self.probe.len()
            + self.transparent.len()
            + self.tool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reorder `commands` by (shader, mesh) with a radix sort on packed keys.
fn sort_by_state(commands: &mut Vec<RenderCommand>) {
    if commands.len() < 2 {
        return;
    }

    let mut entries: Vec<SortEntry> = commands
        .iter()
        .enumerate()
        .map(|(index, command)| SortEntry {
            key: (u64::from(command.shader().0) << 32) | u64::from(command.mesh_handle().0),
            index: index as u32,
        })
        .collect();
    entries.radix_sort_unstable();

    let mut slots: Vec<Option<RenderCommand>> = commands.drain(..).map(Some).collect();
    commands.extend(entries.iter().filter_map(|entry| slots[entry.index as usize].take()));
}

#[cfg(test)]
#[path = "render_queue_tests.rs"]
mod tests;
