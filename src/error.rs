use thiserror::Error;

/// Library error type for slideshow setup.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured photo directory is missing or not a directory.
    #[error("invalid photo directory: {0}")]
    BadDir(String),

    /// The scan completed but found no photo candidates.
    #[error("no photos found in configured sources")]
    EmptyScan,

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
