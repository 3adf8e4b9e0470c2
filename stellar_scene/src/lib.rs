/*!
# Stellar Scene

Per-frame scene management core of the Stellar 3D engine.

Every frame this crate decides which objects exist, which of them take part
in rendering, which are visible, which pass each visible draw belongs to and
in what order draws are submitted. It also fits the light-space projections
of a directional light's cascaded shadow maps.

## Architecture

- **NodeTree / SceneNode**: arena-backed mesh hierarchy with explicit
  world-transform propagation
- **Vob**: placeable object owning a node tree, driven by position /
  rotation / scale
- **Scene**: lock-guarded owner of all Vobs and of the active subset;
  `SceneAccess` is the lock capability
- **RenderCommandQueue**: culls, buckets and sorts the draws of one frame
- **CascadedShadow**: splits the camera frustum into shadow cascades

GPU submission, asset loading and material binding live outside this crate;
meshes and materials are referenced through opaque handles.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod math;
pub mod camera;
pub mod resource;
pub mod scene;
pub mod render;
pub mod shadow;

// Main stellar namespace module
pub mod stellar {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, macros stay at the crate root)
    pub mod log {
        pub use crate::log::{format_entry, DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    pub mod math {
        pub use crate::math::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod render {
        pub use crate::render::*;
    }

    pub mod shadow {
        pub use crate::shadow::*;
    }
}

// Re-export math library at crate root
pub use glam;
