use std::time::Duration;

use glam::Vec3;

use crate::config::RevealTiming;
use crate::math::Plane;
use crate::playback::easing::{Easing, Tween};
use crate::playback::scheduler::Scheduler;
use crate::reveal::overlay::{OverlayAnimation, OverlayDirection, OverlayFrame};
use crate::scene_graph::ClipPlaneRef;

/// Lowest and highest world-space y of the loaded model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalExtent {
    pub bottom: f32,
    pub top: f32,
}

impl VerticalExtent {
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// Everything the orchestrator touches outside itself.
pub trait RevealTarget {
    /// `None` when no model is loaded; stages that fire then do nothing.
    fn vertical_extent(&self) -> Option<VerticalExtent>;

    /// Points the clip slots of every loaded scene copy at `plane`.
    fn attach_clip_plane(&mut self, plane: &ClipPlaneRef);

    fn clear_clip_planes(&mut self);

    fn show_overlay(&mut self, frame: OverlayFrame);

    /// The forward sweep finished and the model is fully revealed.
    fn reveal_finished(&mut self) {}

    /// The reverse sequence is over: jump to the first step and stop playback.
    fn reverse_settled(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStage {
    Idle,
    /// Forward overlay growing, sweep not started.
    Previewing,
    /// Forward sweep uncovering the model.
    Revealing,
    /// Reverse sweep hiding the model while the overlay descends.
    SweepingClip,
    /// Reverse sweep done, waiting for the sequence to settle.
    Descending,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevealEvent {
    BeginSweep { session: u64 },
    Settle { session: u64 },
}

#[derive(Debug, Clone, Copy)]
struct ClipSweep {
    tween: Tween,
    reverse: bool,
}

/// Runs the forward and reverse reveal sequences.
///
/// At most one sequence is live. Every trigger bumps the session counter and
/// drops all pending timers first, and timer events carry the session they
/// were scheduled in, so a late event from an abandoned sequence is ignored.
#[derive(Debug)]
pub struct RevealOrchestrator {
    timing: RevealTiming,
    stage: RevealStage,
    scheduler: Scheduler<RevealEvent>,
    session: u64,
    reverse_active: bool,
    overlay: Option<OverlayAnimation>,
    sweep: Option<ClipSweep>,
    clip_plane: ClipPlaneRef,
}

impl RevealOrchestrator {
    pub fn new(timing: RevealTiming) -> Self {
        Self {
            timing,
            stage: RevealStage::Idle,
            scheduler: Scheduler::new(),
            session: 0,
            reverse_active: false,
            overlay: None,
            sweep: None,
            clip_plane: ClipPlaneRef::default(),
        }
    }

    pub fn stage(&self) -> RevealStage {
        self.stage
    }

    pub fn is_reverse_active(&self) -> bool {
        self.reverse_active
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn clip_plane(&self) -> Plane {
        self.clip_plane.get()
    }

    /// Starts the forward sequence: overlay growth now, clip sweep after
    /// `sweep_delay`.
    pub fn reveal(&mut self, now: Duration, target: &mut dyn RevealTarget) {
        self.cancel(now);

        if target.vertical_extent().is_none() {
            log::debug!("Reveal requested with no model loaded");
            return;
        }

        self.overlay = Some(OverlayAnimation::new(now, OverlayDirection::Forward));
        self.scheduler.after(
            self.timing.sweep_delay,
            RevealEvent::BeginSweep {
                session: self.session,
            },
        );
        self.set_stage(RevealStage::Previewing);
    }

    /// Starts the reverse sequence: the overlay descends while the clip plane
    /// sweeps the model away, then the sequence settles at step 0. A sweep
    /// still in flight is reversed from where it currently is.
    pub fn reverse_reveal(&mut self, now: Duration, target: &mut dyn RevealTarget) {
        let from = match (self.sweep, self.stage) {
            (Some(sweep), _) => sweep.tween.sample(now),
            (None, RevealStage::Descending) => 0.0,
            _ => 1.0,
        };
        self.cancel(now);

        let Some(extent) = target.vertical_extent() else {
            log::debug!("Reverse reveal requested with no model loaded");
            return;
        };

        self.reverse_active = true;
        self.overlay = Some(OverlayAnimation::new(now, OverlayDirection::Reverse));
        let tween = Tween::new(now, self.timing.sweep_duration, from, 0.0, Easing::EaseInCubic);
        self.start_sweep(ClipSweep { tween, reverse: true }, extent, target);
        self.scheduler.after(
            self.timing.sweep_duration + self.timing.settle_margin,
            RevealEvent::Settle {
                session: self.session,
            },
        );
        self.set_stage(RevealStage::SweepingClip);
    }

    /// Cancels whatever is running and returns to `Idle`. Clip planes are
    /// left to the caller, who is usually unloading the model anyway.
    pub fn shutdown(&mut self) {
        self.scheduler.cancel_all();
        self.session += 1;
        self.reverse_active = false;
        self.overlay = None;
        self.sweep = None;
        self.set_stage(RevealStage::Idle);
    }

    /// Fires due stage timers and advances the overlay and sweep to `now`.
    pub fn tick(&mut self, now: Duration, target: &mut dyn RevealTarget) {
        while let Some(fired) = self.scheduler.pop_due(now) {
            match fired.event {
                RevealEvent::BeginSweep { session } if session == self.session => {
                    match target.vertical_extent() {
                        Some(extent) => {
                            let tween = Tween::new(
                                fired.at,
                                self.timing.sweep_duration,
                                0.0,
                                1.0,
                                Easing::EaseOutCubic,
                            );
                            let sweep = ClipSweep {
                                tween,
                                reverse: false,
                            };
                            self.start_sweep(sweep, extent, target);
                            self.set_stage(RevealStage::Revealing);
                        }
                        None => log::debug!("Model gone before clip sweep, skipping"),
                    }
                }
                RevealEvent::Settle { session } if session == self.session => {
                    self.settle(target);
                }
                stale => log::trace!("Dropping stale reveal event {stale:?}"),
            }
        }

        if let Some(overlay) = self.overlay {
            target.show_overlay(overlay.frame(now, &self.timing));
            if overlay.is_finished(now, &self.timing) {
                self.overlay = None;
            }
        }

        if let Some(sweep) = self.sweep {
            let Some(extent) = target.vertical_extent() else {
                return;
            };
            self.clip_plane.set(sweep_plane(extent, sweep.tween.sample(now)));

            if sweep.tween.is_finished(now) {
                self.sweep = None;
                self.finish_sweep(sweep, target);
            }
        }
    }

    fn cancel(&mut self, now: Duration) {
        let cancelled = self.scheduler.cancel_all();
        if cancelled > 0 {
            log::debug!("Cancelled {cancelled} pending reveal timers");
        }
        self.scheduler.sync(now);
        self.session += 1;
        self.reverse_active = false;
        self.sweep = None;
        self.overlay = None;
    }

    fn start_sweep(
        &mut self,
        sweep: ClipSweep,
        extent: VerticalExtent,
        target: &mut dyn RevealTarget,
    ) {
        self.clip_plane.set(sweep_plane(extent, sweep.tween.from));
        target.attach_clip_plane(&self.clip_plane);
        self.sweep = Some(sweep);
    }

    fn finish_sweep(&mut self, sweep: ClipSweep, target: &mut dyn RevealTarget) {
        if sweep.reverse {
            self.set_stage(RevealStage::Descending);
            return;
        }

        // A reverse sequence may have started since this sweep began.
        if self.reverse_active {
            return;
        }
        target.clear_clip_planes();
        self.set_stage(RevealStage::Settled);
        target.reveal_finished();
    }

    fn settle(&mut self, target: &mut dyn RevealTarget) {
        self.scheduler.cancel_all();
        self.sweep = None;
        target.reverse_settled();
        self.reverse_active = false;
        target.clear_clip_planes();
        self.set_stage(RevealStage::Settled);
    }

    fn set_stage(&mut self, stage: RevealStage) {
        if self.stage != stage {
            log::debug!("Reveal stage {:?} -> {:?}", self.stage, stage);
            self.stage = stage;
        }
    }
}

/// Plane keeping everything below `bottom + progress * height`.
fn sweep_plane(extent: VerticalExtent, progress: f32) -> Plane {
    Plane::new(Vec3::NEG_Y, extent.bottom + progress * extent.height())
}
