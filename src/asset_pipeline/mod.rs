pub mod gltf_scene;

pub use gltf_scene::{load_gltf, scene_from_gltf};
