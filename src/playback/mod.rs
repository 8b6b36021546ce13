pub mod easing;
pub mod scheduler;
pub mod timeline;

pub use easing::{Easing, Tween};
pub use scheduler::{FiredTimer, Scheduler, TimerHandle};
pub use timeline::{Timeline, TimelinePosition, TimelineSignal};
