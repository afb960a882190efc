//! Scene data consumed by the geometry pass.
//!
//! Responsibilities:
//! - hold world-space triangle meshes decoded from a glTF asset
//! - expose a flat traversal (`draw_items`) in load order
//! - describe the camera the geometry pass renders through
//!
//! Node transforms are baked into the vertices at load time, so the pass only
//! needs a single view-projection matrix.

mod camera;
mod loader;
mod mesh;

pub use camera::Camera;
pub use loader::load;
pub use mesh::{Bounds, Mesh, Scene, SceneId, Vertex};
