pub mod mesh;
pub mod node;
pub mod scene;
pub mod transform;

pub use mesh::{ClipPlaneRef, MaterialSlot, MeshId, SceneMesh};
pub use node::{NodeId, SceneNode};
pub use scene::SceneGraph;
pub use transform::Transform;
