use std::time::Duration;

use crate::config::RevealTiming;
use crate::playback::easing::{elapsed_fraction, Easing};

/// Intensity the overlay shader reaches at the end of the growth phase.
pub const OVERLAY_PEAK_INTENSITY: f32 = 4.259_921;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub visible: bool,
    pub intensity: f32,
    /// Height above the model's base, as a fraction of model height.
    pub elevation: f32,
}

impl OverlayFrame {
    pub const HIDDEN: OverlayFrame = OverlayFrame {
        visible: false,
        intensity: 0.0,
        elevation: 0.0,
    };

    /// Overlay state `t` into the forward animation.
    ///
    /// The growth phase fades intensity in at the base. The remainder lifts
    /// the overlay to the top of the model while fading it out.
    pub fn at(t: Duration, timing: &RevealTiming) -> OverlayFrame {
        let growth = timing.overlay_growth.min(timing.overlay_duration);

        if t <= growth {
            let progress = Easing::EaseInOutSine.apply(elapsed_fraction(Duration::ZERO, growth, t));
            return OverlayFrame {
                visible: true,
                intensity: progress * OVERLAY_PEAK_INTENSITY,
                elevation: 0.0,
            };
        }

        let rise = timing.overlay_duration - growth;
        let fraction = elapsed_fraction(growth, rise, t);
        OverlayFrame {
            visible: true,
            intensity: (1.0 - Easing::Linear.apply(fraction)) * OVERLAY_PEAK_INTENSITY,
            elevation: Easing::EaseOutCubic.apply(fraction),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayDirection {
    /// Grow at the base, then rise and fade.
    Forward,
    /// The forward animation played backwards: descend, then shrink.
    Reverse,
}

#[derive(Debug, Clone, Copy)]
pub struct OverlayAnimation {
    pub start: Duration,
    pub direction: OverlayDirection,
}

impl OverlayAnimation {
    pub fn new(start: Duration, direction: OverlayDirection) -> Self {
        Self { start, direction }
    }

    pub fn is_finished(&self, now: Duration, timing: &RevealTiming) -> bool {
        now >= self.start + timing.overlay_duration
    }

    pub fn frame(&self, now: Duration, timing: &RevealTiming) -> OverlayFrame {
        if self.is_finished(now, timing) {
            return OverlayFrame::HIDDEN;
        }

        let elapsed = now.saturating_sub(self.start);
        let t = match self.direction {
            OverlayDirection::Forward => elapsed,
            OverlayDirection::Reverse => timing.overlay_duration.saturating_sub(elapsed),
        };
        OverlayFrame::at(t, timing)
    }
}
