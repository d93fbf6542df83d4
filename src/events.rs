use std::time::Duration;

/// Requests from outside the slideshow loop (input handlers, signals, the
/// presentation layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowCommand {
    Pause,
    Resume,
    TogglePause,
    /// Interval for future photo advances.
    SetWaitTime(Duration),
    /// The presentation layer failed to load the photo bound to this slot.
    LoadFailed(usize),
    /// No usable photos exist; halt for good.
    NoPhotos,
}
