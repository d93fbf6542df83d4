use std::time::Duration;

use chrono::NaiveTime;
use serde::Deserialize;
use tracing::debug;

use crate::presentation::PresentationSink;
use crate::timer::{Job, Scheduler, TimerId};

/// How the on-screen clock is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "12-hour")]
    TwelveHour,
    #[serde(rename = "24-hour")]
    TwentyFourHour,
}

impl TimeFormat {
    /// Map a numeric show-time mode: 0 is off, 1 is 12-hour, anything higher 24-hour.
    pub fn from_mode(mode: u8) -> Self {
        match mode {
            0 => Self::Off,
            1 => Self::TwelveHour,
            _ => Self::TwentyFourHour,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }

    /// Short label such as `1:05` or `13:05`; empty when off.
    pub fn format(self, time: NaiveTime) -> String {
        match self {
            Self::Off => String::new(),
            Self::TwelveHour => time.format("%-I:%M").to_string(),
            Self::TwentyFourHour => time.format("%H:%M").to_string(),
        }
    }
}

/// Keeps the clock label current on its own cadence.
///
/// The label stays empty until the slideshow has shown its first photo.
#[derive(Debug)]
pub struct TimeAnnotator {
    format: TimeFormat,
    interval: Duration,
    timer: Option<TimerId>,
    label: String,
}

impl TimeAnnotator {
    pub fn new(format: TimeFormat, interval: Duration) -> Self {
        Self {
            format,
            interval,
            timer: None,
            label: String::new(),
        }
    }

    pub fn format(&self) -> TimeFormat {
        self.format
    }

    /// Last label published.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_scheduled(&self) -> bool {
        self.timer.is_some()
    }

    /// Start the periodic refresh when the clock is enabled.
    pub fn initialize<Sc>(&mut self, sched: &mut Sc)
    where
        Sc: Scheduler + ?Sized,
    {
        if !self.format.is_enabled() || self.interval.is_zero() {
            return;
        }
        if let Some(id) = self.timer.take() {
            sched.cancel(id);
        }
        debug!(interval = ?self.interval, "clock refresh scheduled");
        self.timer = Some(sched.schedule(Job::ClockTick, self.interval));
    }

    /// Publish the current label without touching the timer.
    pub fn refresh<S>(&mut self, started: bool, now: NaiveTime, sink: &mut S)
    where
        S: PresentationSink + ?Sized,
    {
        self.label = if started {
            self.format.format(now)
        } else {
            String::new()
        };
        sink.set_time_label(&self.label);
    }

    /// Periodic refresh; keeps itself scheduled.
    pub fn on_tick<S, Sc>(&mut self, started: bool, now: NaiveTime, sink: &mut S, sched: &mut Sc)
    where
        S: PresentationSink + ?Sized,
        Sc: Scheduler + ?Sized,
    {
        self.refresh(started, now, sink);
        self.initialize(sched);
    }

    pub fn teardown<Sc>(&mut self, sched: &mut Sc)
    where
        Sc: Scheduler + ?Sized,
    {
        if let Some(id) = self.timer.take() {
            sched.cancel(id);
        }
    }
}
