//! Construction-step playback for node-graph 3D assets.
//!
//! A loaded [`SceneGraph`] is split into ordered steps by [`segment`], which a
//! [`Timeline`] walks through while a [`RevealOrchestrator`] plays the
//! overlay and clip-plane sweep. [`Viewer`] ties them together.

pub mod asset_pipeline;
pub mod config;
pub mod error;
pub mod explosion;
pub mod layers;
pub mod math;
pub mod playback;
pub mod reveal;
pub mod scene_graph;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::ViewerError;
pub use explosion::ExplosionEngine;
pub use layers::{segment, LayerVisualizerData};
pub use playback::{Timeline, TimelinePosition};
pub use reveal::{RevealOrchestrator, RevealStage, RevealTarget};
pub use scene_graph::SceneGraph;
pub use viewer::Viewer;
