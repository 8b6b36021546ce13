use std::time::Duration;

use crate::config::ViewerConfig;
use crate::explosion::ExplosionEngine;
use crate::layers::{segment, LayerVisualizerData};
use crate::playback::{Timeline, TimelinePosition, TimelineSignal};
use crate::reveal::{OverlayFrame, RevealOrchestrator, RevealStage, RevealTarget, VerticalExtent};
use crate::scene_graph::{ClipPlaneRef, SceneGraph};

/// Borrows the pieces of a [`Viewer`] the orchestrator may touch, leaving
/// the orchestrator itself free to borrow mutably.
macro_rules! host {
    ($viewer:expr) => {
        ViewerHost {
            model: $viewer.model.as_mut(),
            timeline: &mut $viewer.timeline,
            overlay: &mut $viewer.overlay,
        }
    };
}

/// The two copies of a loaded model. `baseline` stays untouched apart from
/// clip planes; `working` carries visibility and explosion offsets.
#[derive(Debug)]
pub struct LoadedModel {
    pub baseline: SceneGraph,
    pub working: SceneGraph,
}

/// Owns a loaded model and keeps the timeline, reveal and explosion in step
/// with it. The host calls [`Viewer::tick`] once per frame.
#[derive(Debug)]
pub struct Viewer {
    config: ViewerConfig,
    model: Option<LoadedModel>,
    layers: LayerVisualizerData,
    timeline: Timeline,
    reveal: RevealOrchestrator,
    explosion: ExplosionEngine,
    overlay: OverlayFrame,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            timeline: Timeline::new(config.timeline.clone()),
            reveal: RevealOrchestrator::new(config.reveal.clone()),
            explosion: ExplosionEngine::new(config.explosion.clone()),
            config,
            model: None,
            layers: LayerVisualizerData::default(),
            overlay: OverlayFrame::HIDDEN,
        }
    }

    pub fn load(&mut self, scene: SceneGraph, now: Duration) {
        self.reset();

        self.layers = segment(&scene, &self.config.segmenter);
        let working = scene.clone();
        self.explosion.attach(&working);
        self.model = Some(LoadedModel {
            baseline: scene,
            working,
        });
        self.timeline.load(&self.layers, now);
        self.apply_visibility();
    }

    /// Drops the model and everything scheduled against it.
    pub fn reset(&mut self) {
        self.timeline.reset();
        self.reveal.shutdown();
        self.explosion.detach();
        self.model = None;
        self.layers = LayerVisualizerData::default();
        self.overlay = OverlayFrame::HIDDEN;
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn layers(&self) -> &LayerVisualizerData {
        &self.layers
    }

    /// False means the passive "no layers detected" state.
    pub fn has_layers(&self) -> bool {
        !self.timeline.is_disabled()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn reveal_stage(&self) -> RevealStage {
        self.reveal.stage()
    }

    pub fn overlay(&self) -> OverlayFrame {
        self.overlay
    }

    pub fn explode_amount(&self) -> f32 {
        self.explosion.progress()
    }

    pub fn set_step_index(&mut self, index: isize) {
        self.timeline.set_index(index);
        self.apply_visibility();
    }

    pub fn next_step(&mut self) {
        self.timeline.next();
        self.apply_visibility();
    }

    pub fn previous_step(&mut self) {
        self.timeline.previous();
        self.apply_visibility();
    }

    pub fn play(&mut self) {
        self.timeline.play();
        self.apply_visibility();
    }

    pub fn pause(&mut self) {
        self.timeline.pause();
    }

    pub fn toggle_play_pause(&mut self) {
        self.timeline.toggle_play_pause();
        self.apply_visibility();
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.timeline.set_speed(speed);
    }

    /// Replays the forward reveal on the loaded model.
    pub fn reveal(&mut self, now: Duration) {
        let mut host = host!(self);
        self.reveal.reveal(now, &mut host);
    }

    /// Sweeps the model away and lands on the first step.
    pub fn return_to_overview(&mut self, now: Duration) {
        let mut host = host!(self);
        self.reveal.reverse_reveal(now, &mut host);
    }

    pub fn set_explode_amount(&mut self, amount: f32) {
        if let Some(model) = self.model.as_mut() {
            self.explosion.set_progress(&mut model.working, amount);
        }
    }

    pub fn animate_explode_to(&mut self, amount: f32, now: Duration) {
        self.explosion.animate_to(amount, now);
    }

    pub fn is_exploding(&self) -> bool {
        self.explosion.is_animating()
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        if let Some(model) = self.model.as_mut() {
            model.working.set_wireframe(wireframe);
        }
    }

    pub fn tick(&mut self, now: Duration) {
        for signal in self.timeline.tick(now) {
            match signal {
                TimelineSignal::RevealDue => {
                    let mut host = host!(self);
                    self.reveal.reveal(now, &mut host);
                }
                TimelineSignal::Advanced(index) => log::debug!("Advanced to step {index}"),
                TimelineSignal::PlaybackFinished => log::debug!("Playback finished"),
            }
        }

        let mut host = host!(self);
        self.reveal.tick(now, &mut host);

        if let Some(model) = self.model.as_mut() {
            self.explosion.tick(now, &mut model.working);
        }

        self.apply_visibility();
    }

    fn apply_visibility(&mut self) {
        let Some(model) = self.model.as_mut() else {
            return;
        };

        if !matches!(self.timeline.position(), TimelinePosition::AtStep(_)) {
            model.working.set_all_visible(true);
            return;
        }

        for (node_id, node) in model.working.nodes.iter_mut() {
            node.visible = self
                .timeline
                .is_visible(self.layers.step_ordinal_for_node(node_id));
        }
    }
}

struct ViewerHost<'a> {
    model: Option<&'a mut LoadedModel>,
    timeline: &'a mut Timeline,
    overlay: &'a mut OverlayFrame,
}

impl RevealTarget for ViewerHost<'_> {
    fn vertical_extent(&self) -> Option<VerticalExtent> {
        let model = self.model.as_ref()?;
        let bounds = model.baseline.world_bounds();
        if bounds.is_empty() {
            return Some(VerticalExtent { bottom: 0.0, top: 0.0 });
        }
        Some(VerticalExtent {
            bottom: bounds.min.y,
            top: bounds.max.y,
        })
    }

    fn attach_clip_plane(&mut self, plane: &ClipPlaneRef) {
        if let Some(model) = self.model.as_mut() {
            model.baseline.attach_clip_plane(plane);
            model.working.attach_clip_plane(plane);
        }
    }

    fn clear_clip_planes(&mut self) {
        if let Some(model) = self.model.as_mut() {
            model.baseline.clear_clip_planes();
            model.working.clear_clip_planes();
        }
    }

    fn show_overlay(&mut self, frame: OverlayFrame) {
        *self.overlay = frame;
    }

    fn reveal_finished(&mut self) {
        self.timeline.reveal_completed();
    }

    fn reverse_settled(&mut self) {
        self.timeline.set_index(0);
    }
}
