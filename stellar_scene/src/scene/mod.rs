//! Scene management module
//!
//! Node hierarchies (`NodeTree`), placeable objects (`Vob`) and the
//! lock-guarded `Scene` that owns them and tracks which ones are active.

mod node;
mod vob;
mod scene;

pub use node::{BreadthFirst, NodeKey, NodeTree, SceneNode};
pub use vob::{Vob, VobType};
pub use scene::{Scene, SceneAccess, SceneFrameState, VobKey};
