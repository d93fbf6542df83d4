//! The fixed circular sequence of view slots a session cycles through.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opaque handle to one photo candidate (a filesystem path or a URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoRef(Arc<str>);

impl PhotoRef {
    pub fn new(uri: impl AsRef<str>) -> Self {
        Self(Arc::from(uri.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the handle carries a URI scheme such as `https://`.
    pub fn is_remote(&self) -> bool {
        self.0.split_once("://").is_some_and(|(scheme, _)| {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
    }

    pub fn as_path(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl fmt::Display for PhotoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhotoRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<PathBuf> for PhotoRef {
    fn from(value: PathBuf) -> Self {
        Self::new(value.to_string_lossy())
    }
}

/// Whether a slot's photo renders. Resolved at most once per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Displayable {
    #[default]
    Unknown,
    Yes,
    No,
}

#[derive(Debug, Clone)]
pub struct ViewSlot {
    index: usize,
    photo: PhotoRef,
    displayable: Displayable,
}

impl ViewSlot {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn photo(&self) -> &PhotoRef {
        &self.photo
    }

    pub fn displayable(&self) -> Displayable {
        self.displayable
    }

    /// Resolve an `Unknown` slot. Already resolved slots keep their state.
    pub(crate) fn resolve(&mut self, renders: bool) -> Displayable {
        if self.displayable == Displayable::Unknown {
            self.displayable = if renders {
                Displayable::Yes
            } else {
                Displayable::No
            };
        }
        self.displayable
    }
}

/// Exactly N slots for the life of a session; never resized.
#[derive(Debug, Clone, Default)]
pub struct ViewPool {
    slots: Vec<ViewSlot>,
}

impl ViewPool {
    /// Bind one slot per photo, keeping at most `max_views` when given.
    pub fn build<I>(photos: I, max_views: Option<usize>) -> Self
    where
        I: IntoIterator<Item = PhotoRef>,
    {
        let limit = max_views.unwrap_or(usize::MAX);
        let slots = photos
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, photo)| ViewSlot {
                index,
                photo,
                displayable: Displayable::Unknown,
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ViewSlot> {
        self.slots.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut ViewSlot> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewSlot> {
        self.slots.iter()
    }

    /// Index following `index`, wrapping past the last slot. Empty pools yield 0.
    pub fn next_index(&self, index: usize) -> usize {
        match self.slots.len() {
            0 => 0,
            n => (index % n + 1) % n,
        }
    }

    /// Index preceding `index`, wrapping before slot 0. Empty pools yield 0.
    pub fn prev_index(&self, index: usize) -> usize {
        match self.slots.len() {
            0 => 0,
            n => (index % n + n - 1) % n,
        }
    }

    /// Record an asynchronous load failure reported by the presentation layer.
    ///
    /// Returns `true` if the slot was `Unknown` and is now `No`.
    pub fn record_load_failure(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.displayable == Displayable::Unknown => {
                slot.resolve(false);
                true
            }
            _ => false,
        }
    }

    pub fn count(&self, state: Displayable) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.displayable == state)
            .count()
    }

    /// No slot can ever become displayable again.
    pub fn is_exhausted(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.displayable == Displayable::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> ViewPool {
        ViewPool::build((0..n).map(|i| PhotoRef::new(format!("/p/{i}.jpg"))), None)
    }

    #[test]
    fn circular_neighbours_wrap() {
        let pool = pool(4);
        assert_eq!(pool.next_index(3), 0);
        assert_eq!(pool.next_index(1), 2);
        assert_eq!(pool.prev_index(0), 3);
        assert_eq!(pool.prev_index(2), 1);
    }

    #[test]
    fn single_slot_wraps_onto_itself() {
        let pool = pool(1);
        assert_eq!(pool.next_index(0), 0);
        assert_eq!(pool.prev_index(0), 0);
    }

    #[test]
    fn max_views_truncates() {
        let pool = ViewPool::build((0..10).map(|i| PhotoRef::new(i.to_string())), Some(3));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(2).map(|s| s.index()), Some(2));
    }

    #[test]
    fn resolution_happens_once() {
        let mut pool = pool(2);
        let slot = pool.get_mut(0).unwrap();
        assert_eq!(slot.resolve(true), Displayable::Yes);
        assert_eq!(slot.resolve(false), Displayable::Yes);
        assert!(!pool.record_load_failure(0));
        assert!(pool.record_load_failure(1));
        assert_eq!(pool.get(1).unwrap().displayable(), Displayable::No);
    }

    #[test]
    fn exhaustion_requires_every_slot_failed() {
        let mut pool = pool(2);
        assert!(!pool.is_exhausted());
        pool.record_load_failure(0);
        assert!(!pool.is_exhausted());
        pool.record_load_failure(1);
        assert!(pool.is_exhausted());
        assert!(ViewPool::default().is_exhausted());
    }

    #[test]
    fn remote_refs_are_detected() {
        assert!(PhotoRef::new("https://example.com/a.jpg").is_remote());
        assert!(!PhotoRef::new("/photos/a.jpg").is_remote());
        assert!(!PhotoRef::new("C:/photos/a.jpg").is_remote());
    }
}
