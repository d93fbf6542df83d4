//! The boundary between the slideshow core and whatever paints the screen.

use std::fmt;

use rand::Rng;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::{PhotoSizingMode, TransitionMode};
use crate::pool::PhotoRef;

/// How a photo is fitted to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSizing {
    Letterbox,
    Zoom,
    Frame,
    Full,
}

impl PhotoSizing {
    pub const ALL: [Self; 4] = [Self::Letterbox, Self::Zoom, Self::Frame, Self::Full];

    /// Resolve a configured mode, picking uniformly when it is `random`.
    pub fn resolve<R: Rng + ?Sized>(mode: PhotoSizingMode, rng: &mut R) -> Self {
        match mode {
            PhotoSizingMode::Letterbox => Self::Letterbox,
            PhotoSizingMode::Zoom => Self::Zoom,
            PhotoSizingMode::Frame => Self::Frame,
            PhotoSizingMode::Full => Self::Full,
            PhotoSizingMode::Random => Self::ALL[rng.random_range(0..Self::ALL.len())],
        }
    }

    /// Object-fit keyword for the simple modes; frame and full lay out by hand.
    pub fn css_fit(self) -> Option<&'static str> {
        match self {
            Self::Letterbox => Some("contain"),
            Self::Zoom => Some("cover"),
            Self::Frame | Self::Full => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ScaleUp,
    Fade,
    SlideFromRight,
    SlideDown,
    SpinUp,
    SlideUp,
    SlideFromBottom,
    SlideRight,
}

impl Transition {
    pub const ALL: [Self; 8] = [
        Self::ScaleUp,
        Self::Fade,
        Self::SlideFromRight,
        Self::SlideDown,
        Self::SpinUp,
        Self::SlideUp,
        Self::SlideFromBottom,
        Self::SlideRight,
    ];

    pub fn resolve<R: Rng + ?Sized>(mode: TransitionMode, rng: &mut R) -> Self {
        match mode {
            TransitionMode::ScaleUp => Self::ScaleUp,
            TransitionMode::Fade => Self::Fade,
            TransitionMode::SlideFromRight => Self::SlideFromRight,
            TransitionMode::SlideDown => Self::SlideDown,
            TransitionMode::SpinUp => Self::SpinUp,
            TransitionMode::SlideUp => Self::SlideUp,
            TransitionMode::SlideFromBottom => Self::SlideFromBottom,
            TransitionMode::SlideRight => Self::SlideRight,
            TransitionMode::Random => Self::ALL[rng.random_range(0..Self::ALL.len())],
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::ScaleUp => "scale-up",
            Self::Fade => "fade",
            Self::SlideFromRight => "slide-from-right",
            Self::SlideDown => "slide-down",
            Self::SpinUp => "spin-up",
            Self::SlideUp => "slide-up",
            Self::SlideFromBottom => "slide-from-bottom",
            Self::SlideRight => "slide-right",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appearance settings fixed for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationSetup {
    pub sizing: PhotoSizing,
    pub transition: Transition,
}

impl PresentationSetup {
    pub fn resolve<R: Rng + ?Sized>(
        sizing: PhotoSizingMode,
        transition: TransitionMode,
        rng: &mut R,
    ) -> Self {
        Self {
            sizing: PhotoSizing::resolve(sizing, rng),
            transition: Transition::resolve(transition, rng),
        }
    }
}

impl Default for PresentationSetup {
    fn default() -> Self {
        Self {
            sizing: PhotoSizing::Letterbox,
            transition: Transition::ScaleUp,
        }
    }
}

/// Consumes the commands the core issues. Every call is fire-and-forget.
pub trait PresentationSink {
    fn configure(&mut self, _setup: &PresentationSetup) {}

    /// Transition the screen to `slot`.
    fn render(&mut self, slot: usize, photo: &PhotoRef);

    fn set_time_label(&mut self, label: &str);

    fn set_paused(&mut self, paused: bool);

    /// Show the terminal "no photos" message.
    fn show_no_photos(&mut self);
}

/// Presentation commands as plain data, for sinks that forward them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationEvent {
    Configured(PresentationSetup),
    Render { slot: usize, photo: PhotoRef },
    TimeLabel(String),
    Paused(bool),
    NoPhotos,
}

/// Forwards every command to an external renderer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<PresentationEvent>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<PresentationEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: PresentationEvent) {
        if self.tx.send(event).is_err() {
            warn!("presentation channel closed; dropping command");
        }
    }
}

impl PresentationSink for ChannelSink {
    fn configure(&mut self, setup: &PresentationSetup) {
        self.send(PresentationEvent::Configured(*setup));
    }

    fn render(&mut self, slot: usize, photo: &PhotoRef) {
        self.send(PresentationEvent::Render {
            slot,
            photo: photo.clone(),
        });
    }

    fn set_time_label(&mut self, label: &str) {
        self.send(PresentationEvent::TimeLabel(label.to_owned()));
    }

    fn set_paused(&mut self, paused: bool) {
        self.send(PresentationEvent::Paused(paused));
    }

    fn show_no_photos(&mut self) {
        self.send(PresentationEvent::NoPhotos);
    }
}

/// Headless viewer: reports each command through tracing.
#[derive(Debug, Default)]
pub struct LogSink;

impl PresentationSink for LogSink {
    fn configure(&mut self, setup: &PresentationSetup) {
        info!(sizing = ?setup.sizing, transition = %setup.transition, "presentation configured");
    }

    fn render(&mut self, slot: usize, photo: &PhotoRef) {
        info!(slot, photo = %photo, "showing photo");
    }

    fn set_time_label(&mut self, label: &str) {
        debug!(label, "time label");
    }

    fn set_paused(&mut self, paused: bool) {
        info!(paused, "slideshow pause state changed");
    }

    fn show_no_photos(&mut self) {
        warn!("no photos available");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::mpsc;

    #[test]
    fn fixed_modes_resolve_directly() {
        let mut rng = StdRng::seed_from_u64(1);
        let setup =
            PresentationSetup::resolve(PhotoSizingMode::Zoom, TransitionMode::Fade, &mut rng);
        assert_eq!(setup.sizing, PhotoSizing::Zoom);
        assert_eq!(setup.transition, Transition::Fade);
        assert_eq!(setup.sizing.css_fit(), Some("cover"));
        assert_eq!(PhotoSizing::Full.css_fit(), None);
    }

    #[test]
    fn random_modes_cover_every_choice() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sizings = Vec::new();
        let mut transitions = Vec::new();
        for _ in 0..400 {
            let setup = PresentationSetup::resolve(
                PhotoSizingMode::Random,
                TransitionMode::Random,
                &mut rng,
            );
            if !sizings.contains(&setup.sizing) {
                sizings.push(setup.sizing);
            }
            if !transitions.contains(&setup.transition) {
                transitions.push(setup.transition);
            }
        }
        assert_eq!(sizings.len(), PhotoSizing::ALL.len());
        assert_eq!(transitions.len(), Transition::ALL.len());
    }

    #[test]
    fn channel_sink_forwards_commands() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sink = ChannelSink::new(tx);
        sink.render(3, &PhotoRef::new("/a.jpg"));
        sink.set_paused(true);
        sink.show_no_photos();
        assert_eq!(
            rx.try_recv().unwrap(),
            PresentationEvent::Render {
                slot: 3,
                photo: PhotoRef::new("/a.jpg")
            }
        );
        assert_eq!(rx.try_recv().unwrap(), PresentationEvent::Paused(true));
        assert_eq!(rx.try_recv().unwrap(), PresentationEvent::NoPhotos);
    }
}
