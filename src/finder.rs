use tracing::{debug, trace};

use crate::pool::{Displayable, PhotoRef, ViewPool};

/// Attempts to render a photo and reports whether it succeeded.
pub trait RenderProbe {
    fn try_render(&mut self, photo: &PhotoRef) -> bool;
}

impl<F> RenderProbe for F
where
    F: FnMut(&PhotoRef) -> bool,
{
    fn try_render(&mut self, photo: &PhotoRef) -> bool {
        self(photo)
    }
}

/// Slots the search should not pick outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avoid {
    /// Slot currently on screen; never returned.
    pub current: Option<usize>,
    /// Previously shown slot; returned only when nothing else qualifies.
    pub last_selected: Option<usize>,
    /// Slot just before the current one; returned only when nothing else qualifies.
    pub previous: Option<usize>,
}

impl Avoid {
    fn defers(&self, index: usize) -> bool {
        self.last_selected == Some(index) || self.previous == Some(index)
    }
}

/// Find the next displayable slot at or after `candidate`, wrapping around.
///
/// Rules:
/// - At most one full circuit; each slot is rendered at most once per call.
/// - `Unknown` slots are resolved by the probe as they are reached; failures
///   are marked `No` and never probed again.
/// - Deferred slots (see [`Avoid`]) are only probed after the circuit found
///   no other qualifying slot, so at most one `Unknown` slot becomes `Yes`.
pub fn find_next<P>(
    pool: &mut ViewPool,
    probe: &mut P,
    candidate: usize,
    avoid: Avoid,
) -> Option<usize>
where
    P: RenderProbe + ?Sized,
{
    let n = pool.len();
    if n == 0 {
        return None;
    }

    let start = candidate % n;
    let mut deferred: [Option<usize>; 2] = [None, None];
    let mut probes = 0usize;

    while probes < n {
        let index = (start + probes) % n;
        probes += 1;

        if avoid.current == Some(index) {
            continue;
        }
        if avoid.defers(index) {
            if let Some(free) = deferred.iter_mut().find(|d| d.is_none()) {
                *free = Some(index);
            }
            continue;
        }
        if qualifies(pool, probe, index) {
            trace!(slot = index, probes, "found displayable slot");
            return Some(index);
        }
    }

    // Only the deferred slots remain; they were inspected but not yet rendered.
    for index in deferred.into_iter().flatten() {
        if qualifies(pool, probe, index) {
            trace!(slot = index, "falling back to recently shown slot");
            return Some(index);
        }
    }

    debug!(
        candidate = start,
        failed = pool.count(Displayable::No),
        "no displayable slot in full circuit"
    );
    None
}

fn qualifies<P>(pool: &mut ViewPool, probe: &mut P, index: usize) -> bool
where
    P: RenderProbe + ?Sized,
{
    let Some(slot) = pool.get_mut(index) else {
        return false;
    };
    match slot.displayable() {
        Displayable::Yes => true,
        Displayable::No => false,
        Displayable::Unknown => {
            let renders = probe.try_render(slot.photo());
            if !renders {
                debug!(slot = index, photo = %slot.photo(), "photo failed to render; skipping");
            }
            slot.resolve(renders) == Displayable::Yes
        }
    }
}
