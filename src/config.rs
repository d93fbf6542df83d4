use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::clock::TimeFormat;
use crate::error::Error;

/// Configured photo fit; `random` picks one per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhotoSizingMode {
    #[default]
    Letterbox,
    Zoom,
    Frame,
    Full,
    Random,
}

/// Configured transition between photos; `random` picks one per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionMode {
    #[default]
    ScaleUp,
    Fade,
    SlideFromRight,
    SlideDown,
    SpinUp,
    SlideUp,
    SlideFromBottom,
    SlideRight,
    Random,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Root directory to scan recursively for photos.
    pub photo_library_path: Option<PathBuf>,
    /// Additional photo candidates (paths or URIs) appended to the scan.
    pub photos: Vec<String>,
    /// Upper bound on the number of view slots in a session.
    pub max_views: Option<usize>,
    /// Seconds between photo advances; replaces the 30s default when set.
    pub transition_base_seconds: Option<u64>,
    /// Delay before the first photo so the initial paint settles.
    #[serde(with = "humantime_serde")]
    pub start_delay: Duration,
    /// Clock label refresh cadence.
    #[serde(with = "humantime_serde")]
    pub clock_interval: Duration,
    pub show_time: TimeFormat,
    pub photo_sizing: PhotoSizingMode,
    pub photo_transition: TransitionMode,
    /// Optional deterministic seed for photo order and random appearance modes.
    pub shuffle_seed: Option<u64>,
    /// Fully decode photos when checking they render instead of reading headers.
    pub probe_decode: bool,
    /// Halt with "no photos" once every slot has failed.
    pub stop_when_exhausted: bool,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.photo_library_path.is_some() || !self.photos.is_empty(),
            "configure photo-library-path or photos"
        );
        ensure!(
            self.transition_base_seconds != Some(0),
            "transition-base-seconds must be greater than zero"
        );
        ensure!(
            self.max_views != Some(0),
            "max-views must be greater than zero"
        );
        ensure!(
            !self.clock_interval.is_zero(),
            "clock-interval must be greater than zero"
        );
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            photo_library_path: None,
            photos: Vec::new(),
            max_views: None,
            transition_base_seconds: None,
            start_delay: Duration::from_secs(2),
            clock_interval: Duration::from_secs(61),
            show_time: TimeFormat::Off,
            photo_sizing: PhotoSizingMode::default(),
            photo_transition: TransitionMode::default(),
            shuffle_seed: None,
            probe_decode: false,
            stop_when_exhausted: true,
        }
    }
}
