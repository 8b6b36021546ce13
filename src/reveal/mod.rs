pub mod orchestrator;
pub mod overlay;

pub use orchestrator::{RevealOrchestrator, RevealStage, RevealTarget, VerticalExtent};
pub use overlay::{OverlayAnimation, OverlayDirection, OverlayFrame, OVERLAY_PEAK_INTENSITY};
