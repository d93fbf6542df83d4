//! Discovers the photo candidates a session is built from.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::config::Configuration;
use crate::error::Error;
use crate::pool::PhotoRef;

const SUPPORTED_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Return `true` if `path` has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTS.iter().any(|e| *e == ext)
        })
}

/// Collect photo candidates from the library directory and the explicit list.
///
/// The result is shuffled, deterministically when `shuffle-seed` is set.
///
/// # Errors
/// [`Error::BadDir`] if the library path is not a directory, [`Error::EmptyScan`]
/// if no candidates were found.
pub fn discover(cfg: &Configuration) -> Result<Vec<PhotoRef>, Error> {
    let mut found = Vec::new();

    if let Some(root) = &cfg.photo_library_path {
        if !root.is_dir() {
            return Err(Error::BadDir(root.display().to_string()));
        }
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            // Skip hidden dot-directories *below* the root only.
            .filter_entry(|e| !should_skip_dir(e))
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            if is_supported_image(entry.path()) {
                debug!(path = %entry.path().display(), "discovered photo");
                found.push(PhotoRef::from(entry.into_path()));
            }
        }
    }
    found.extend(cfg.photos.iter().map(PhotoRef::new));

    if found.is_empty() {
        return Err(Error::EmptyScan);
    }

    // Sort first so a seeded shuffle does not depend on directory order.
    found.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    found.dedup();
    match cfg.shuffle_seed {
        Some(seed) => found.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => found.shuffle(&mut rand::rng()),
    }
    info!(discovered = found.len(), "photo scan complete (shuffled)");
    Ok(found)
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 {
        return false;
    }
    if !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}
