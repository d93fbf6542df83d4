//! One slideshow session: the pool, the runner, the clock and their outside
//! collaborators wired together.

use std::time::Duration;

use chrono::{Local, NaiveTime};
use rand::Rng;
use tracing::{debug, info};

use crate::clock::{TimeAnnotator, TimeFormat};
use crate::config::Configuration;
use crate::events::ShowCommand;
use crate::finder::RenderProbe;
use crate::pool::{PhotoRef, ViewPool};
use crate::presentation::{PresentationSetup, PresentationSink};
use crate::runner::{DEFAULT_START_DELAY, SlideshowRunner, TickOutcome};
use crate::timer::{Job, Scheduler, TimerQueue};

/// Settings read once when the session is set up.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub start_delay: Duration,
    pub transition_base_seconds: Option<u64>,
    pub time_format: TimeFormat,
    pub clock_interval: Duration,
    pub max_views: Option<usize>,
    pub presentation: PresentationSetup,
}

impl SessionOptions {
    pub fn from_config<R: Rng + ?Sized>(cfg: &Configuration, rng: &mut R) -> Self {
        Self {
            start_delay: cfg.start_delay,
            transition_base_seconds: cfg.transition_base_seconds,
            time_format: cfg.show_time,
            clock_interval: cfg.clock_interval,
            max_views: cfg.max_views,
            presentation: PresentationSetup::resolve(cfg.photo_sizing, cfg.photo_transition, rng),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            start_delay: DEFAULT_START_DELAY,
            transition_base_seconds: None,
            time_format: TimeFormat::Off,
            clock_interval: Duration::from_secs(61),
            max_views: None,
            presentation: PresentationSetup::default(),
        }
    }
}

fn local_time() -> NaiveTime {
    Local::now().time()
}

pub struct Slideshow<P, S> {
    pool: ViewPool,
    runner: SlideshowRunner,
    clock: TimeAnnotator,
    probe: P,
    sink: S,
    wall_clock: fn() -> NaiveTime,
    options: SessionOptions,
    torn_down: bool,
}

impl<P, S> Slideshow<P, S>
where
    P: RenderProbe,
    S: PresentationSink,
{
    pub fn new<I>(photos: I, options: SessionOptions, probe: P, sink: S) -> Self
    where
        I: IntoIterator<Item = PhotoRef>,
    {
        let pool = ViewPool::build(photos, options.max_views);
        let clock = TimeAnnotator::new(options.time_format, options.clock_interval);
        Self {
            pool,
            runner: SlideshowRunner::new(),
            clock,
            probe,
            sink,
            wall_clock: local_time,
            options,
            torn_down: false,
        }
    }

    /// Replace the source of the displayed time.
    pub fn with_wall_clock(mut self, wall_clock: fn() -> NaiveTime) -> Self {
        self.wall_clock = wall_clock;
        self
    }

    pub fn pool(&self) -> &ViewPool {
        &self.pool
    }

    pub fn runner(&self) -> &SlideshowRunner {
        &self.runner
    }

    pub fn clock(&self) -> &TimeAnnotator {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn is_current_pair(&self, index: usize) -> bool {
        self.runner.is_current_pair(index)
    }

    /// Start the show. An empty pool goes straight to "no photos".
    pub fn launch<Sc>(&mut self, sched: &mut Sc) -> bool
    where
        Sc: Scheduler + ?Sized,
    {
        if self.torn_down || self.runner.state().has_no_photos() {
            return false;
        }
        if self.pool.is_empty() {
            self.set_no_photos(sched);
            return false;
        }
        info!(views = self.pool.len(), "launching slideshow");
        self.sink.configure(&self.options.presentation);
        self.clock.initialize(sched);
        self.runner.start(
            sched,
            self.options.start_delay,
            self.options.transition_base_seconds,
        );
        true
    }

    /// Run one fired timer.
    pub fn dispatch<Sc>(&mut self, job: Job, sched: &mut Sc)
    where
        Sc: Scheduler + ?Sized,
    {
        if self.torn_down {
            return;
        }
        match job {
            Job::ShowTick => {
                let outcome =
                    self.runner
                        .tick(&mut self.pool, &mut self.probe, &mut self.sink, sched);
                if let TickOutcome::Advanced { first: true, .. } = outcome {
                    let now = (self.wall_clock)();
                    self.clock.refresh(true, now, &mut self.sink);
                }
            }
            Job::ClockTick => {
                let now = (self.wall_clock)();
                let started = self.runner.is_started();
                self.clock.on_tick(started, now, &mut self.sink, sched);
            }
        }
    }

    pub fn apply<Sc>(&mut self, command: ShowCommand, sched: &mut Sc)
    where
        Sc: Scheduler + ?Sized,
    {
        if self.torn_down {
            return;
        }
        debug!(?command, "slideshow command");
        match command {
            ShowCommand::Pause => {
                if self.runner.pause() {
                    self.sink.set_paused(true);
                }
            }
            ShowCommand::Resume => {
                if self.runner.resume() {
                    self.sink.set_paused(false);
                }
            }
            ShowCommand::TogglePause => {
                let paused = self.runner.toggle_paused();
                self.sink.set_paused(paused);
            }
            ShowCommand::SetWaitTime(wait) => self.runner.set_wait_time(wait),
            ShowCommand::LoadFailed(slot) => {
                if self.pool.record_load_failure(slot) {
                    debug!(slot, "recorded photo load failure");
                }
            }
            ShowCommand::NoPhotos => {
                self.set_no_photos(sched);
            }
        }
    }

    /// Halt for good; the sink is told once.
    pub fn set_no_photos<Sc>(&mut self, sched: &mut Sc) -> bool
    where
        Sc: Scheduler + ?Sized,
    {
        let halted = self.runner.set_no_photos(sched);
        if halted {
            self.clock.teardown(sched);
            self.sink.show_no_photos();
        }
        halted
    }

    /// Declare "no photos" once every slot has failed.
    pub fn declare_no_photos_if_exhausted<Sc>(&mut self, sched: &mut Sc) -> bool
    where
        Sc: Scheduler + ?Sized,
    {
        if self.runner.state().has_no_photos() || !self.pool.is_exhausted() {
            return false;
        }
        self.set_no_photos(sched)
    }

    /// Run every timer that is due on `queue`.
    pub fn run_due(&mut self, queue: &mut TimerQueue) {
        while let Some((_, job)) = queue.pop_due() {
            self.dispatch(job, queue);
        }
    }

    /// Move `queue`'s clock forward by `by`, firing timers as their deadlines pass.
    pub fn advance(&mut self, queue: &mut TimerQueue, by: Duration) {
        let target = queue.now().saturating_add(by);
        while let Some(deadline) = queue.next_deadline().filter(|d| *d <= target) {
            queue.advance_to(deadline);
            self.run_due(queue);
        }
        queue.advance_to(target);
    }

    /// End the session; no timer fires for it afterwards.
    pub fn teardown<Sc>(&mut self, sched: &mut Sc)
    where
        Sc: Scheduler + ?Sized,
    {
        self.runner.teardown(sched);
        self.clock.teardown(sched);
        self.torn_down = true;
    }
}
