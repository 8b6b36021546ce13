use std::f32::consts::PI;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseInOutSine,
    EaseInCubic,
    EaseOutCubic,
}

impl Easing {
    /// Maps `t` in `[0, 1]` onto the curve. Inputs outside are clamped.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Fraction of `duration` elapsed between `start` and `now`, clamped to `[0, 1]`.
pub fn elapsed_fraction(start: Duration, duration: Duration, now: Duration) -> f32 {
    if duration.is_zero() {
        return if now >= start { 1.0 } else { 0.0 };
    }
    let elapsed = now.saturating_sub(start);
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

/// A single eased value moving from `from` to `to`, sampled against the frame clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub start: Duration,
    pub duration: Duration,
    pub from: f32,
    pub to: f32,
    pub easing: Easing,
}

impl Tween {
    pub fn new(start: Duration, duration: Duration, from: f32, to: f32, easing: Easing) -> Self {
        Self {
            start,
            duration,
            from,
            to,
            easing,
        }
    }

    pub fn sample(&self, now: Duration) -> f32 {
        let t = self.easing.apply(elapsed_fraction(self.start, self.duration, now));
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        now >= self.start + self.duration
    }
}
