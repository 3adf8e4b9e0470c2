//! Resource-level material classification.
//!
//! The scene does not bind materials; it only needs to know which pass a
//! material belongs to. `MaterialKind` is a closed set of shading families and
//! `MaterialFlags` carries the per-material pass state the render queue reads.
//!
//! # Bucketing order
//!
//! The render queue checks, in this order:
//! 1. `DeferredPbr` without `BLEND` → deferred opaque
//! 2. `RENDER_BEFORE_TRANSPARENTS` → pre-transparent
//! 3. `BLEND` → transparent
//! 4. `Probe` → probe
//! 5. `Tool { draw_index }` → tool (ordered by `draw_index`)
//! 6. anything else → forward
//!
//! `CAST_SHADOW` additionally routes the draw into the shadow bucket.

use bitflags::bitflags;

/// Opaque shader/pipeline identity supplied by the GPU layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShaderHandle(pub u32);

/// Shading family of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Physically based, G-buffer compatible
    DeferredPbr,
    /// Forward-shaded material
    Forward,
    /// Probe visualization
    Probe,
    /// Editor/debug overlay, drawn in ascending `draw_index` order
    Tool { draw_index: u32 },
    Other,
}

bitflags! {
    /// Pass state copied into every render command
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialFlags: u32 {
        /// Alpha blending enabled
        const BLEND = 1 << 0;
        /// Rendered into the shadow maps
        const CAST_SHADOW = 1 << 1;
        /// Drawn after opaque geometry but before transparent geometry
        const RENDER_BEFORE_TRANSPARENTS = 1 << 2;
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    shader: ShaderHandle,
    kind: MaterialKind,
    flags: MaterialFlags,
}

impl Material {
    pub fn new(shader: ShaderHandle, kind: MaterialKind, flags: MaterialFlags) -> Self {
        Self { shader, kind, flags }
    }

    /// Opaque deferred PBR material casting shadows
    pub fn deferred_pbr(shader: ShaderHandle) -> Self {
        Self::new(shader, MaterialKind::DeferredPbr, MaterialFlags::CAST_SHADOW)
    }

    /// Tool/debug overlay; never casts shadows
    pub fn tool(shader: ShaderHandle, draw_index: u32) -> Self {
        Self::new(shader, MaterialKind::Tool { draw_index }, MaterialFlags::empty())
    }

    pub fn shader(&self) -> ShaderHandle {
        self.shader
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn flags(&self) -> MaterialFlags {
        self.flags
    }

    pub fn is_blending(&self) -> bool {
        self.flags.contains(MaterialFlags::BLEND)
    }

    pub fn casts_shadow(&self) -> bool {
        self.flags.contains(MaterialFlags::CAST_SHADOW)
    }

    pub fn renders_before_transparents(&self) -> bool {
        self.flags.contains(MaterialFlags::RENDER_BEFORE_TRANSPARENTS)
    }

    /// Draw order of a tool material, `None` for every other kind
    pub fn tool_draw_index(&self) -> Option<u32> {
        match self.kind {
            MaterialKind::Tool { draw_index } => Some(draw_index),
            _ => None,
        }
    }

    pub fn set_flags(&mut self, flags: MaterialFlags) {
        self.flags = flags;
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
