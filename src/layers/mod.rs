pub mod segmenter;
pub mod step;

pub use segmenter::segment;
pub use step::{LayerVisualizerData, StepMetadata, VisualizerStep};
