//! Render command generation
//!
//! Each frame the scene walks its active Vobs and pushes one `RenderCommand`
//! per drawable node into a `RenderCommandQueue`, which culls, buckets and
//! sorts them for the GPU submission layer.

mod render_command;
mod render_queue;

pub use render_command::RenderCommand;
pub use render_queue::{
    CullingVolume, QueuePhase, QueueStats, RenderBucket, RenderCommandQueue,
};
