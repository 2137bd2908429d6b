//! Cancellable deadlines measured against [`GameClock`](super::time::GameClock) time.
//!
//! A `TimerSlot` holds at most one pending deadline. Scheduling a new one
//! replaces the old, so a slot can never fire twice for one activation.

/// Identifies one scheduling of a [`TimerSlot`]. Stale handles never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    deadline_ms: Option<f64>,
    generation: u64,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a deadline `delay_ms` after `now_ms`, cancelling any pending one.
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64) -> TimerHandle {
        self.generation += 1;
        self.deadline_ms = Some(now_ms + delay_ms.max(0.0));
        TimerHandle(self.generation)
    }

    /// Drop the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline_ms.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Whether `handle` refers to the currently pending deadline.
    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.is_pending() && handle.0 == self.generation
    }

    /// Fire the deadline if it has passed. Fires at most once per scheduling.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Milliseconds left before the deadline, or 0 when nothing is pending.
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        self.deadline_ms.map_or(0.0, |d| (d - now_ms).max(0.0))
    }
}

/// One observable step of a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// The visible counter changed to this value.
    Tick(u32),
    /// The countdown ran out.
    Done,
}

/// Counts down from `start` to zero, one step per interval.
///
/// `start(now, 3, 1000)` shows 3 immediately, then yields Tick(2), Tick(1)
/// and Done at one second intervals.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: u32,
    interval_ms: f64,
    slot: TimerSlot,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now_ms: f64, count: u32, interval_ms: f64) {
        self.remaining = count;
        self.interval_ms = interval_ms;
        if count == 0 {
            self.slot.schedule(now_ms, 0.0);
        } else {
            self.slot.schedule(now_ms, interval_ms);
        }
    }

    pub fn cancel(&mut self) {
        self.slot.cancel();
        self.remaining = 0;
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_pending()
    }

    /// The value currently on display.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance to `now_ms`, returning the step that became due, if any.
    /// Call once per tick; a stalled clock yields at most one step per call.
    pub fn poll(&mut self, now_ms: f64) -> Option<CountdownStep> {
        if !self.slot.poll(now_ms) {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            Some(CountdownStep::Done)
        } else {
            self.slot.schedule(now_ms, self.interval_ms);
            Some(CountdownStep::Tick(self.remaining))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_fires_once() {
        let mut slot = TimerSlot::new();
        slot.schedule(0.0, 100.0);
        assert!(!slot.poll(50.0));
        assert!(slot.poll(100.0));
        assert!(!slot.poll(200.0));
        assert!(!slot.is_pending());
    }

    #[test]
    fn rescheduling_replaces_deadline() {
        let mut slot = TimerSlot::new();
        let first = slot.schedule(0.0, 100.0);
        let second = slot.schedule(80.0, 100.0);
        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));
        assert!(!slot.poll(120.0));
        assert!(slot.poll(180.0));
    }

    #[test]
    fn cancel_reports_pending() {
        let mut slot = TimerSlot::new();
        assert!(!slot.cancel());
        slot.schedule(0.0, 10.0);
        assert!(slot.cancel());
        assert_eq!(slot.remaining_ms(0.0), 0.0);
    }

    #[test]
    fn countdown_steps() {
        let mut cd = Countdown::new();
        cd.start(0.0, 3, 1000.0);
        assert_eq!(cd.remaining(), 3);
        assert_eq!(cd.poll(999.0), None);
        assert_eq!(cd.poll(1000.0), Some(CountdownStep::Tick(2)));
        assert_eq!(cd.poll(2000.0), Some(CountdownStep::Tick(1)));
        assert_eq!(cd.poll(3000.0), Some(CountdownStep::Done));
        assert_eq!(cd.poll(4000.0), None);
        assert!(!cd.is_running());
    }

    #[test]
    fn cancelled_countdown_never_finishes() {
        let mut cd = Countdown::new();
        cd.start(0.0, 2, 1000.0);
        cd.cancel();
        assert_eq!(cd.poll(5000.0), None);
    }
}
