use std::time::Duration;

use tracing::{debug, info, warn};

use crate::finder::{Avoid, RenderProbe, find_next};
use crate::pool::ViewPool;
use crate::presentation::PresentationSink;
use crate::timer::{Job, Scheduler, TimerId};

pub const DEFAULT_WAIT_TIME: Duration = Duration::from_millis(30_000);
pub const DEFAULT_START_DELAY: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Paused,
    NoPhotos,
}

/// Selection and timing state for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerState {
    selected: Option<usize>,
    last_selected: Option<usize>,
    started: bool,
    first_animation_done: bool,
    paused: bool,
    wait_time: Duration,
    no_photos: bool,
}

impl RunnerState {
    /// Slot currently in front.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Slot shown before the current one.
    pub fn last_selected(&self) -> Option<usize> {
        self.last_selected
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn wait_time(&self) -> Duration {
        self.wait_time
    }

    pub fn has_no_photos(&self) -> bool {
        self.no_photos
    }

    pub fn phase(&self) -> Phase {
        if self.no_photos {
            Phase::NoPhotos
        } else if self.paused {
            Phase::Paused
        } else if self.started {
            Phase::Running
        } else {
            Phase::NotStarted
        }
    }
}

impl Default for RunnerState {
    fn default() -> Self {
        Self {
            selected: None,
            last_selected: None,
            started: false,
            first_animation_done: false,
            paused: false,
            wait_time: DEFAULT_WAIT_TIME,
            no_photos: false,
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Terminal state; nothing was rescheduled.
    Halted,
    /// Paused; selection untouched, timer kept alive.
    Paused,
    /// No displayable slot this time; retried next interval.
    Missed,
    /// `slot` is now in front. `first` marks the show's first photo.
    Advanced { slot: usize, first: bool },
}

/// Drives the slideshow one tick at a time.
///
/// Rules:
/// - Exactly one tick is pending at any moment until the show halts.
/// - Every tick reschedules the next one, whatever it found, so a run of bad
///   photos never stops the loop.
/// - The first tick shows slot 0 itself to trigger its entry animation.
/// - Once `set_no_photos` is called nothing is ever scheduled again.
#[derive(Debug, Default)]
pub struct SlideshowRunner {
    state: RunnerState,
    pending: Option<TimerId>,
}

impl SlideshowRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RunnerState {
        &self.state
    }

    pub fn is_started(&self) -> bool {
        self.state.started
    }

    /// `true` once the first full animation cycle has run.
    pub fn is_animating(&self) -> bool {
        self.state.first_animation_done
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedule the first tick after `initial_delay`.
    ///
    /// A configured transition base (seconds) replaces the wait time.
    pub fn start<Sc>(
        &mut self,
        sched: &mut Sc,
        initial_delay: Duration,
        transition_base_seconds: Option<u64>,
    ) where
        Sc: Scheduler + ?Sized,
    {
        if self.state.no_photos {
            debug!("start ignored; no usable photos");
            return;
        }
        if let Some(secs) = transition_base_seconds {
            self.set_wait_time(Duration::from_secs(secs));
        }
        info!(
            delay = ?initial_delay,
            wait = ?self.state.wait_time,
            "slideshow starting"
        );
        self.schedule_tick(sched, initial_delay);
    }

    pub fn tick<P, S, Sc>(
        &mut self,
        pool: &mut ViewPool,
        probe: &mut P,
        sink: &mut S,
        sched: &mut Sc,
    ) -> TickOutcome
    where
        P: RenderProbe + ?Sized,
        S: PresentationSink + ?Sized,
        Sc: Scheduler + ?Sized,
    {
        if self.state.no_photos {
            if let Some(id) = self.pending.take() {
                sched.cancel(id);
            }
            return TickOutcome::Halted;
        }

        let outcome = if self.state.paused {
            TickOutcome::Paused
        } else {
            self.advance(pool, probe, sink)
        };

        let wait = self.state.wait_time;
        self.schedule_tick(sched, wait);
        outcome
    }

    fn advance<P, S>(&mut self, pool: &mut ViewPool, probe: &mut P, sink: &mut S) -> TickOutcome
    where
        P: RenderProbe + ?Sized,
        S: PresentationSink + ?Sized,
    {
        if pool.is_empty() {
            return TickOutcome::Missed;
        }

        let started = self.state.started;
        let cur = if started {
            self.state.selected.unwrap_or(0)
        } else {
            0
        };
        let prev = pool.prev_index(cur);
        let next = if !started {
            // First page re-displays slot 0 so its entry animation runs.
            cur
        } else {
            if !self.state.first_animation_done {
                self.state.first_animation_done = true;
            }
            pool.next_index(cur)
        };

        let avoid = Avoid {
            current: started.then_some(cur),
            last_selected: self.state.last_selected,
            previous: Some(prev),
        };
        let Some(found) = find_next(pool, probe, next, avoid) else {
            debug!(candidate = next, "no photo ready; retrying next interval");
            return TickOutcome::Missed;
        };

        let first = !started;
        if first {
            self.state.started = true;
        }
        self.state.last_selected = self.state.selected;
        self.state.selected = Some(found);
        if let Some(slot) = pool.get(found) {
            debug!(slot = found, last = ?self.state.last_selected, "advancing slideshow");
            sink.render(found, slot.photo());
        }
        TickOutcome::Advanced { slot: found, first }
    }

    pub fn pause(&mut self) -> bool {
        let changed = !self.state.paused;
        self.state.paused = true;
        changed
    }

    pub fn resume(&mut self) -> bool {
        let changed = self.state.paused;
        self.state.paused = false;
        changed
    }

    /// Flip the pause state and return the new value.
    pub fn toggle_paused(&mut self) -> bool {
        self.state.paused = !self.state.paused;
        self.state.paused
    }

    /// Interval for future ticks; an in-flight timer keeps its deadline.
    pub fn set_wait_time(&mut self, wait: Duration) {
        if wait.is_zero() {
            warn!("ignoring zero slideshow wait time");
            return;
        }
        self.state.wait_time = wait;
    }

    /// Enter the terminal state. Returns `false` if it was already entered.
    pub fn set_no_photos<Sc>(&mut self, sched: &mut Sc) -> bool
    where
        Sc: Scheduler + ?Sized,
    {
        if let Some(id) = self.pending.take() {
            sched.cancel(id);
        }
        if self.state.no_photos {
            return false;
        }
        info!("no usable photos; slideshow halted");
        self.state.no_photos = true;
        true
    }

    /// Whether `index` is one of the two slots taking part in the transition.
    pub fn is_current_pair(&self, index: usize) -> bool {
        self.state.selected == Some(index) || self.state.last_selected == Some(index)
    }

    pub fn teardown<Sc>(&mut self, sched: &mut Sc)
    where
        Sc: Scheduler + ?Sized,
    {
        if let Some(id) = self.pending.take() {
            sched.cancel(id);
        }
    }

    fn schedule_tick<Sc>(&mut self, sched: &mut Sc, after: Duration)
    where
        Sc: Scheduler + ?Sized,
    {
        if let Some(id) = self.pending.take() {
            sched.cancel(id);
        }
        self.pending = Some(sched.schedule(Job::ShowTick, after));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Displayable, PhotoRef};
    use crate::timer::TimerQueue;

    #[derive(Default)]
    struct Rendered(Vec<usize>);

    impl PresentationSink for Rendered {
        fn render(&mut self, slot: usize, _photo: &PhotoRef) {
            self.0.push(slot);
        }

        fn set_time_label(&mut self, _label: &str) {}

        fn set_paused(&mut self, _paused: bool) {}

        fn show_no_photos(&mut self) {}
    }

    fn pool(n: usize) -> ViewPool {
        ViewPool::build((0..n).map(|i| PhotoRef::new(i.to_string())), None)
    }

    fn index_of(photo: &PhotoRef) -> usize {
        photo.as_str().parse().unwrap()
    }

    #[test]
    fn first_tick_shows_slot_zero_then_advances() {
        let mut pool = pool(5);
        let mut runner = SlideshowRunner::new();
        let mut queue = TimerQueue::new();
        let mut sink = Rendered::default();
        let mut probe = |_: &PhotoRef| true;

        runner.start(&mut queue, DEFAULT_START_DELAY, None);
        assert_eq!(queue.next_deadline(), Some(DEFAULT_START_DELAY));

        let first = runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        assert_eq!(first, TickOutcome::Advanced { slot: 0, first: true });
        assert!(runner.is_started());
        assert!(!runner.is_animating());

        let second = runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        assert_eq!(second, TickOutcome::Advanced { slot: 1, first: false });
        assert!(runner.is_animating());
        assert_eq!(runner.state().last_selected(), Some(0));
        assert!(runner.is_current_pair(0));
        assert!(runner.is_current_pair(1));
        assert!(!runner.is_current_pair(2));
        assert_eq!(sink.0, vec![0, 1]);
    }

    #[test]
    fn failed_slot_is_skipped_and_never_probed_again() {
        let mut pool = pool(5);
        let mut runner = SlideshowRunner::new();
        let mut queue = TimerQueue::new();
        let mut sink = Rendered::default();
        let mut probes_of_two = 0;
        let mut probe = |photo: &PhotoRef| {
            let index = index_of(photo);
            if index == 2 {
                probes_of_two += 1;
            }
            index != 2
        };

        runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        let third = runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        assert_eq!(third, TickOutcome::Advanced { slot: 3, first: false });
        assert_eq!(pool.get(2).unwrap().displayable(), Displayable::No);

        for _ in 0..10 {
            runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        }
        assert_eq!(probes_of_two, 1);
        assert!(!sink.0.contains(&2));
    }

    #[test]
    fn miss_keeps_selection_and_reschedules() {
        let mut pool = pool(3);
        let mut runner = SlideshowRunner::new();
        let mut queue = TimerQueue::new();
        let mut sink = Rendered::default();
        let mut probe = |_: &PhotoRef| false;

        let outcome = runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        assert_eq!(outcome, TickOutcome::Missed);
        assert_eq!(runner.state().selected(), None);
        assert!(!runner.is_started());
        assert_eq!(queue.pending_for(Job::ShowTick), 1);
        assert_eq!(queue.next_deadline(), Some(DEFAULT_WAIT_TIME));
    }

    #[test]
    fn pause_freezes_selection_but_keeps_timer() {
        let mut pool = pool(4);
        let mut runner = SlideshowRunner::new();
        let mut queue = TimerQueue::new();
        let mut sink = Rendered::default();
        let mut probe = |_: &PhotoRef| true;

        runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        assert!(runner.pause());
        assert!(!runner.pause());
        assert_eq!(runner.state().phase(), Phase::Paused);
        for _ in 0..5 {
            assert_eq!(
                runner.tick(&mut pool, &mut probe, &mut sink, &mut queue),
                TickOutcome::Paused
            );
        }
        assert_eq!(runner.state().selected(), Some(0));
        assert!(runner.has_pending_tick());

        assert!(runner.resume());
        assert_eq!(
            runner.tick(&mut pool, &mut probe, &mut sink, &mut queue),
            TickOutcome::Advanced { slot: 1, first: false }
        );
        assert_eq!(runner.state().phase(), Phase::Running);
    }

    #[test]
    fn transition_base_sets_wait_time() {
        let mut runner = SlideshowRunner::new();
        let mut queue = TimerQueue::new();
        runner.start(&mut queue, Duration::ZERO, Some(12));
        assert_eq!(runner.state().wait_time(), Duration::from_secs(12));

        runner.set_wait_time(Duration::ZERO);
        assert_eq!(runner.state().wait_time(), Duration::from_secs(12));
    }

    #[test]
    fn wait_time_change_applies_to_next_reschedule_only() {
        let mut pool = pool(3);
        let mut runner = SlideshowRunner::new();
        let mut queue = TimerQueue::new();
        let mut sink = Rendered::default();
        let mut probe = |_: &PhotoRef| true;

        runner.start(&mut queue, Duration::from_secs(2), None);
        runner.set_wait_time(Duration::from_secs(5));
        assert_eq!(queue.next_deadline(), Some(Duration::from_secs(2)));

        queue.advance_to(Duration::from_secs(2));
        queue.pop_due();
        runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        assert_eq!(queue.next_deadline(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn no_photos_is_terminal_and_idempotent() {
        let mut pool = pool(3);
        let mut runner = SlideshowRunner::new();
        let mut queue = TimerQueue::new();
        let mut sink = Rendered::default();
        let mut probe = |_: &PhotoRef| true;

        runner.start(&mut queue, DEFAULT_START_DELAY, None);
        assert!(runner.set_no_photos(&mut queue));
        assert!(!runner.set_no_photos(&mut queue));
        assert!(queue.is_empty());

        runner.start(&mut queue, DEFAULT_START_DELAY, None);
        assert!(queue.is_empty());
        assert_eq!(
            runner.tick(&mut pool, &mut probe, &mut sink, &mut queue),
            TickOutcome::Halted
        );
        assert!(queue.is_empty());
        assert_eq!(runner.state().phase(), Phase::NoPhotos);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn restart_keeps_a_single_pending_tick() {
        let mut runner = SlideshowRunner::new();
        let mut queue = TimerQueue::new();
        runner.start(&mut queue, DEFAULT_START_DELAY, None);
        runner.start(&mut queue, DEFAULT_START_DELAY, None);
        assert_eq!(queue.pending_for(Job::ShowTick), 1);
        runner.teardown(&mut queue);
        assert!(queue.is_empty());
    }

    #[test]
    fn two_slots_alternate() {
        let mut pool = pool(2);
        let mut runner = SlideshowRunner::new();
        let mut queue = TimerQueue::new();
        let mut sink = Rendered::default();
        let mut probe = |_: &PhotoRef| true;
        for _ in 0..5 {
            runner.tick(&mut pool, &mut probe, &mut sink, &mut queue);
        }
        assert_eq!(sink.0, vec![0, 1, 0, 1, 0]);
    }
}
