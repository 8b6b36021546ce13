use std::time::Duration;

/// Identifies one scheduled timer. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
pub struct FiredTimer<E> {
    pub handle: TimerHandle,
    pub at: Duration,
    pub event: E,
}

#[derive(Debug, Clone)]
struct PendingTimer<E> {
    handle: TimerHandle,
    due: Duration,
    period: Option<Duration>,
    event: E,
}

/// Cancellable timers on a host-driven clock.
///
/// Nothing fires on its own: the owner drains due timers with [`pop_due`]
/// from its per-frame tick. While draining, [`now`] reports the due time of
/// the timer just popped, so anything scheduled in response is measured from
/// when the timer was meant to fire rather than from the frame time.
///
/// [`pop_due`]: Scheduler::pop_due
/// [`now`]: Scheduler::now
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now: Duration,
    next_handle: u64,
    pending: Vec<PendingTimer<E>>,
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock forward without firing anything. Earlier times are ignored.
    pub fn sync(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    pub fn after(&mut self, delay: Duration, event: E) -> TimerHandle {
        self.insert(self.now + delay, None, event)
    }

    pub fn every(&mut self, period: Duration, event: E) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.insert(self.now + period, Some(period), event)
    }

    fn insert(&mut self, due: Duration, period: Option<Duration>, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(PendingTimer {
            handle,
            due,
            period,
            event,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Removes and returns the earliest timer due at or before `now`. Ties
    /// fire in scheduling order. Periodic timers are re-armed one period
    /// after their due time. Returns `None` once nothing is due, leaving the
    /// clock at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<FiredTimer<E>> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.handle.0))
            .map(|(index, _)| index);

        let Some(index) = index else {
            self.sync(now);
            return None;
        };

        let fired = match self.pending[index].period {
            Some(period) => {
                let timer = &mut self.pending[index];
                let fired = FiredTimer {
                    handle: timer.handle,
                    at: timer.due,
                    event: timer.event.clone(),
                };
                timer.due += period;
                fired
            }
            None => {
                let timer = self.pending.swap_remove(index);
                FiredTimer {
                    handle: timer.handle,
                    at: timer.due,
                    event: timer.event,
                }
            }
        };

        self.sync(fired.at);
        Some(fired)
    }
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
