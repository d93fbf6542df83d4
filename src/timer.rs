//! Timer abstraction the slideshow schedules its jobs through.
//!
//! The core never sleeps. It asks a [`Scheduler`] to run a [`Job`] after a
//! delay and the driver decides how time passes: the tokio task maps the
//! queue onto real instants, tests and dry runs advance it by hand.

use std::collections::BTreeMap;
use std::time::Duration;

/// Periodic units of work multiplexed onto one execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    /// Advance the slideshow.
    ShowTick,
    /// Refresh the clock label.
    ClockTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

pub trait Scheduler {
    /// Run `job` once, `after` from now.
    fn schedule(&mut self, job: Job, after: Duration) -> TimerId;

    /// Drop a pending timer. Unknown or already fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

/// Deadline of a timer scheduled too far out to represent; it stays pending
/// but never comes due.
pub const NEVER: Duration = Duration::MAX;

/// Pending timers ordered by deadline on a virtual clock.
///
/// Timers with equal deadlines fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, TimerId), Job>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time since the queue was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
            .filter(|deadline| *deadline < NEVER)
    }

    /// Move the clock forward. Time never runs backwards.
    pub fn advance_to(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Pop the earliest timer whose deadline has passed.
    pub fn pop_due(&mut self) -> Option<(TimerId, Job)> {
        let (&(deadline, id), _) = self.pending.first_key_value()?;
        if deadline > self.now || deadline == NEVER {
            return None;
        }
        self.pending.remove(&(deadline, id)).map(|job| (id, job))
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.keys().any(|(_, pending)| *pending == id)
    }

    /// Number of pending timers for `job`.
    pub fn pending_for(&self, job: Job) -> usize {
        self.pending.values().filter(|pending| **pending == job).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, job: Job, after: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now.checked_add(after).unwrap_or(NEVER);
        self.pending.insert((deadline, id), job);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(_, pending), _| *pending != id);
    }
}
