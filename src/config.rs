use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct ViewerConfig {
    pub segmenter: SegmenterConfig,
    pub timeline: TimelineConfig,
    pub reveal: RevealTiming,
    pub explosion: ExplosionConfig,
}

/// How a scene whose mesh nodes all live under one top-level child is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlattenPolicy {
    /// Flatten only when there is a single top-level group holding more than
    /// one mesh node.
    #[default]
    Auto,
    /// Always one step per top-level group.
    Never,
    /// Always one step per mesh node.
    Always,
}

#[derive(Debug, Clone, Default)]
pub struct SegmenterConfig {
    pub flatten: FlattenPolicy,
}

#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Step interval at speed 1.0.
    pub base_interval: Duration,
    /// Wait between loading a model and starting its forward reveal.
    pub initial_reveal_delay: Duration,
    pub default_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(2000),
            initial_reveal_delay: Duration::from_millis(300),
            default_speed: 1.0,
            min_speed: 0.5,
            max_speed: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RevealTiming {
    /// Total overlay animation length.
    pub overlay_duration: Duration,
    /// Portion of `overlay_duration` spent growing in place.
    pub overlay_growth: Duration,
    /// Delay between the forward trigger and the clip sweep.
    pub sweep_delay: Duration,
    pub sweep_duration: Duration,
    /// Extra wait after the reverse sweep before the sequence settles.
    pub settle_margin: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            overlay_duration: Duration::from_millis(2000),
            overlay_growth: Duration::from_millis(1000),
            sweep_delay: Duration::from_millis(1000),
            sweep_duration: Duration::from_millis(1000),
            settle_margin: Duration::from_millis(150),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExplosionConfig {
    pub animation_duration: Duration,
    /// Seed for the fallback directions of meshes sitting at the scene center.
    pub seed: u64,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            animation_duration: Duration::from_millis(500),
            seed: 0x5eed,
        }
    }
}
