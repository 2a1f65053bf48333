//! One-shot timers for hosts driven by a polling loop.

use std::time::{Duration, Instant};

use typeahead_core::{TimerId, TimerKind};

#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    deadlines: Vec<(TimerId, TimerKind, Instant)>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, kind: TimerKind, now: Instant, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.deadlines.push((id, kind, now + delay));
        id
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.deadlines.retain(|(t, _, _)| *t != id);
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().map(|(_, _, at)| *at).min()
    }

    /// How long a poll may block before the next timer is due.
    pub fn poll_timeout(&self, now: Instant, cap: Duration) -> Duration {
        match self.next_deadline() {
            Some(at) => at.saturating_duration_since(now).min(cap),
            None => cap,
        }
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due: Vec<(TimerId, Instant)> = Vec::new();
        self.deadlines.retain(|(id, _, at)| {
            if *at <= now {
                due.push((*id, *at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(id, at)| (*at, *id));
        due.into_iter().map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_timers_come_out_in_deadline_order() {
        let mut timers = Timers::new();
        let start = Instant::now();
        let late = timers.schedule_at(TimerKind::BlurClose, start, Duration::from_millis(300));
        let early = timers.schedule_at(TimerKind::Query, start, Duration::from_millis(100));

        assert!(timers.take_due(start).is_empty());
        assert_eq!(timers.take_due(start + Duration::from_millis(400)), vec![early, late]);
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = Timers::new();
        let start = Instant::now();
        let id = timers.schedule_at(TimerKind::Query, start, Duration::from_millis(10));
        timers.cancel(id);
        assert!(timers.take_due(start + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn poll_timeout_is_capped_by_next_deadline() {
        let mut timers = Timers::new();
        let start = Instant::now();
        let cap = Duration::from_millis(250);
        assert_eq!(timers.poll_timeout(start, cap), cap);

        timers.schedule_at(TimerKind::Query, start, Duration::from_millis(150));
        assert_eq!(timers.poll_timeout(start, cap), Duration::from_millis(150));
        assert_eq!(timers.poll_timeout(start + Duration::from_secs(1), cap), Duration::ZERO);
    }
}
