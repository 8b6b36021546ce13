use std::time::Duration;

use crate::config::TimelineConfig;
use crate::error::ViewerError;
use crate::layers::LayerVisualizerData;
use crate::playback::scheduler::{Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelinePosition {
    /// No steps to play.
    Disabled,
    /// The whole model is shown, no step is active.
    PreviewingFull,
    AtStep(usize),
}

/// What a [`Timeline::tick`] did that its owner has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineSignal {
    /// The post-load delay elapsed; the forward reveal should start now.
    RevealDue,
    Advanced(usize),
    /// Playback ran off the last step and stopped.
    PlaybackFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimelineEvent {
    InitialReveal,
    Advance,
}

#[derive(Debug)]
pub struct Timeline {
    config: TimelineConfig,
    step_count: usize,
    position: TimelinePosition,
    is_playing: bool,
    speed: f32,
    scheduler: Scheduler<TimelineEvent>,
    reveal_timer: Option<TimerHandle>,
    playback_timer: Option<TimerHandle>,
}

impl Timeline {
    pub fn new(config: TimelineConfig) -> Self {
        let speed = config.default_speed.clamp(config.min_speed, config.max_speed);
        Self {
            config,
            step_count: 0,
            position: TimelinePosition::Disabled,
            is_playing: false,
            speed,
            scheduler: Scheduler::new(),
            reveal_timer: None,
            playback_timer: None,
        }
    }

    pub fn position(&self) -> TimelinePosition {
        self.position
    }

    /// `-1` unless a step is active.
    pub fn active_index(&self) -> isize {
        match self.position {
            TimelinePosition::AtStep(index) => index as isize,
            _ => -1,
        }
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_disabled(&self) -> bool {
        self.position == TimelinePosition::Disabled
    }

    pub fn step_interval(&self) -> Duration {
        self.config.base_interval.div_f32(self.speed)
    }

    pub fn has_pending_reveal(&self) -> bool {
        self.reveal_timer
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    /// Takes over the steps of a freshly segmented model.
    ///
    /// A model with only the synthetic start step leaves the timeline
    /// disabled. Otherwise a timeline with no active index enters the full
    /// preview and schedules the forward reveal.
    pub fn load(&mut self, data: &LayerVisualizerData, now: Duration) {
        self.scheduler.sync(now);
        self.cancel_timers();
        self.is_playing = false;

        if !data.has_layers() {
            self.step_count = 0;
            self.position = TimelinePosition::Disabled;
            log::debug!("Timeline disabled: no layers detected");
            return;
        }

        self.step_count = data.step_count();
        match self.position {
            TimelinePosition::Disabled => {
                self.position = TimelinePosition::PreviewingFull;
                self.reveal_timer = Some(
                    self.scheduler
                        .after(self.config.initial_reveal_delay, TimelineEvent::InitialReveal),
                );
                log::debug!(
                    "Timeline loaded with {} steps, reveal in {:?}",
                    self.step_count,
                    self.config.initial_reveal_delay
                );
            }
            TimelinePosition::AtStep(index) => {
                self.position = TimelinePosition::AtStep(index.min(self.step_count - 1));
            }
            TimelinePosition::PreviewingFull => {}
        }
    }

    /// Back to `Disabled` with no steps and no pending timers.
    pub fn reset(&mut self) {
        self.cancel_timers();
        self.is_playing = false;
        self.step_count = 0;
        self.position = TimelinePosition::Disabled;
        log::debug!("Timeline reset");
    }

    pub fn checked_index(&self, index: isize) -> Result<usize, ViewerError> {
        usize::try_from(index)
            .ok()
            .filter(|index| *index < self.step_count)
            .ok_or(ViewerError::InvalidIndex {
                requested: index,
                step_count: self.step_count,
            })
    }

    /// Scrubs to `index`. Negative values select the full preview and values
    /// past the end select the last step. Always stops playback.
    pub fn set_index(&mut self, index: isize) {
        if self.is_disabled() {
            return;
        }
        self.stop_playback();

        if index < 0 {
            self.position = TimelinePosition::PreviewingFull;
            return;
        }

        let index = match self.checked_index(index) {
            Ok(index) => index,
            Err(err) => {
                log::debug!("{err}, clamping");
                self.step_count - 1
            }
        };
        self.position = TimelinePosition::AtStep(index);
    }

    pub fn next(&mut self) {
        match self.position {
            TimelinePosition::Disabled => {}
            TimelinePosition::PreviewingFull => self.set_index(0),
            TimelinePosition::AtStep(index) if index + 1 < self.step_count => {
                self.set_index(index as isize + 1)
            }
            TimelinePosition::AtStep(_) => {}
        }
    }

    pub fn previous(&mut self) {
        if let TimelinePosition::AtStep(index) = self.position {
            if index > 0 {
                self.set_index(index as isize - 1);
            }
        }
    }

    /// Starts stepping forward. From the full preview or the last step,
    /// playback restarts at step 0.
    pub fn play(&mut self) {
        if self.is_disabled() {
            return;
        }

        let at_end = self.position == TimelinePosition::AtStep(self.step_count - 1);
        if self.position == TimelinePosition::PreviewingFull || at_end {
            self.position = TimelinePosition::AtStep(0);
        }

        self.is_playing = true;
        self.arm_playback_timer();
        log::debug!("Playback started at {:?}, every {:?}", self.position, self.step_interval());
    }

    pub fn pause(&mut self) {
        if self.is_playing {
            log::debug!("Playback paused at {:?}", self.position);
        }
        self.stop_playback();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        let speed = if speed.is_finite() {
            speed.clamp(self.config.min_speed, self.config.max_speed)
        } else {
            self.config.default_speed
        };
        self.speed = speed;

        if self.is_playing {
            self.arm_playback_timer();
        }
    }

    /// The forward reveal finished: leave the preview for the start step.
    pub fn reveal_completed(&mut self) {
        if self.position == TimelinePosition::PreviewingFull {
            self.position = TimelinePosition::AtStep(0);
            log::debug!("Reveal complete, timeline at step 0");
        }
    }

    /// Whether an element owned by step `ordinal` should be drawn. Elements
    /// without a step are always drawn.
    pub fn is_visible(&self, ordinal: Option<usize>) -> bool {
        match (self.position, ordinal) {
            (TimelinePosition::AtStep(active), Some(ordinal)) => ordinal <= active,
            _ => true,
        }
    }

    pub fn tick(&mut self, now: Duration) -> Vec<TimelineSignal> {
        let mut signals = Vec::new();

        while let Some(fired) = self.scheduler.pop_due(now) {
            match fired.event {
                TimelineEvent::InitialReveal => {
                    self.reveal_timer = None;
                    signals.push(TimelineSignal::RevealDue);
                }
                TimelineEvent::Advance => {
                    if !self.is_playing {
                        continue;
                    }
                    match self.position {
                        TimelinePosition::AtStep(index) if index + 1 < self.step_count => {
                            self.position = TimelinePosition::AtStep(index + 1);
                            signals.push(TimelineSignal::Advanced(index + 1));
                        }
                        _ => {
                            self.stop_playback();
                            log::debug!("Playback finished at {:?}", self.position);
                            signals.push(TimelineSignal::PlaybackFinished);
                        }
                    }
                }
            }
        }

        signals
    }

    fn arm_playback_timer(&mut self) {
        if let Some(handle) = self.playback_timer.take() {
            self.scheduler.cancel(handle);
        }
        let interval = self.step_interval();
        self.playback_timer = Some(self.scheduler.every(interval, TimelineEvent::Advance));
    }

    fn stop_playback(&mut self) {
        self.is_playing = false;
        if let Some(handle) = self.playback_timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_timers(&mut self) {
        self.scheduler.cancel_all();
        self.reveal_timer = None;
        self.playback_timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmenterConfig;
    use crate::layers::segment;
    use crate::scene_graph::{SceneGraph, SceneMesh, SceneNode};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Three top-level mesh nodes: start step plus three layers.
    fn four_step_data() -> LayerVisualizerData {
        let mut scene = SceneGraph::new();
        for name in ["a", "b", "c"] {
            let mesh = scene.add_mesh(SceneMesh::new(name, 1, None));
            scene.add_node(SceneNode::named(name).with_mesh(mesh), None);
        }
        segment(&scene, &SegmenterConfig::default())
    }

    fn loaded_timeline() -> Timeline {
        let mut timeline = Timeline::new(TimelineConfig::default());
        timeline.load(&four_step_data(), Duration::ZERO);
        timeline
    }

    #[test]
    fn load_previews_then_requests_reveal() {
        let mut timeline = loaded_timeline();
        assert_eq!(timeline.position(), TimelinePosition::PreviewingFull);
        assert_eq!(timeline.active_index(), -1);
        assert!(timeline.has_pending_reveal());

        assert!(timeline.tick(ms(299)).is_empty());
        assert_eq!(timeline.tick(ms(300)), vec![TimelineSignal::RevealDue]);
        assert!(!timeline.has_pending_reveal());

        timeline.reveal_completed();
        assert_eq!(timeline.position(), TimelinePosition::AtStep(0));
    }

    #[test]
    fn model_without_layers_disables_timeline() {
        let mut scene = SceneGraph::new();
        scene.add_node(SceneNode::named("transform only"), None);
        let data = segment(&scene, &SegmenterConfig::default());

        let mut timeline = Timeline::new(TimelineConfig::default());
        timeline.load(&data, Duration::ZERO);
        assert!(timeline.is_disabled());
        assert_eq!(timeline.step_count(), 0);

        timeline.play();
        timeline.set_index(2);
        assert!(!timeline.is_playing());
        assert!(timeline.is_disabled());
    }

    #[test]
    fn set_index_clamps_both_ends() {
        let mut timeline = loaded_timeline();
        timeline.set_index(-5);
        assert_eq!(timeline.position(), TimelinePosition::PreviewingFull);
        timeline.set_index(4 + 5);
        assert_eq!(timeline.position(), TimelinePosition::AtStep(3));
        assert!(matches!(
            timeline.checked_index(9),
            Err(ViewerError::InvalidIndex {
                requested: 9,
                step_count: 4
            })
        ));
    }

    #[test]
    fn playback_advances_and_stops_at_last_step() {
        let mut timeline = loaded_timeline();
        assert_eq!(timeline.tick(ms(300)), vec![TimelineSignal::RevealDue]);
        timeline.set_index(1);
        timeline.play();
        assert_eq!(timeline.position(), TimelinePosition::AtStep(1));

        assert_eq!(timeline.tick(ms(2300)), vec![TimelineSignal::Advanced(2)]);
        assert_eq!(
            timeline.tick(ms(6300)),
            vec![TimelineSignal::Advanced(3), TimelineSignal::PlaybackFinished]
        );
        assert!(!timeline.is_playing());
        assert_eq!(timeline.position(), TimelinePosition::AtStep(3));
        assert!(timeline.tick(ms(20_000)).is_empty());
    }

    #[test]
    fn play_from_preview_or_end_restarts_at_zero() {
        let mut timeline = loaded_timeline();
        timeline.play();
        assert_eq!(timeline.position(), TimelinePosition::AtStep(0));

        timeline.set_index(3);
        timeline.play();
        assert_eq!(timeline.position(), TimelinePosition::AtStep(0));
        assert!(timeline.is_playing());
    }

    #[test]
    fn scrubbing_stops_playback_and_cancels_ticks() {
        let mut timeline = loaded_timeline();
        timeline.play();
        timeline.set_index(2);
        assert!(!timeline.is_playing());
        assert!(timeline.tick(ms(10_000)).iter().all(|s| *s == TimelineSignal::RevealDue));
        assert_eq!(timeline.position(), TimelinePosition::AtStep(2));
    }

    #[test]
    fn pause_keeps_index() {
        let mut timeline = loaded_timeline();
        timeline.tick(ms(300));
        timeline.play();
        timeline.tick(ms(2300));
        timeline.pause();
        assert_eq!(timeline.position(), TimelinePosition::AtStep(1));
        assert!(timeline.tick(ms(10_000)).is_empty());
        assert_eq!(timeline.position(), TimelinePosition::AtStep(1));
    }

    #[test]
    fn speed_changes_rearm_interval() {
        let mut timeline = loaded_timeline();
        timeline.tick(ms(300));
        timeline.play();
        timeline.set_speed(2.0);
        assert_eq!(timeline.step_interval(), ms(1000));
        assert_eq!(timeline.tick(ms(1300)), vec![TimelineSignal::Advanced(1)]);

        timeline.set_speed(10.0);
        assert_eq!(timeline.speed(), 2.0);
        timeline.set_speed(0.1);
        assert_eq!(timeline.speed(), 0.5);
    }

    #[test]
    fn next_and_previous_stay_in_range() {
        let mut timeline = loaded_timeline();
        timeline.previous();
        assert_eq!(timeline.position(), TimelinePosition::PreviewingFull);
        timeline.next();
        assert_eq!(timeline.position(), TimelinePosition::AtStep(0));
        timeline.previous();
        assert_eq!(timeline.position(), TimelinePosition::AtStep(0));
        for _ in 0..10 {
            timeline.next();
        }
        assert_eq!(timeline.position(), TimelinePosition::AtStep(3));
    }

    #[test]
    fn reset_clears_everything() {
        let mut timeline = loaded_timeline();
        timeline.play();
        timeline.reset();
        assert!(timeline.is_disabled());
        assert!(!timeline.is_playing());
        assert!(timeline.tick(ms(60_000)).is_empty());
    }

    #[test]
    fn visibility_follows_active_step() {
        let mut timeline = loaded_timeline();
        assert!(timeline.is_visible(Some(3)));
        timeline.set_index(1);
        assert!(timeline.is_visible(Some(1)));
        assert!(!timeline.is_visible(Some(2)));
        assert!(timeline.is_visible(None));
    }
}
