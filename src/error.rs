//! Shared error type for the album viewer library.

use album_model::AlbumError;

/// Crate error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The album handed to `load_album` was rejected; viewer state is untouched.
    #[error("invalid album: {0}")]
    InvalidAlbum(#[from] AlbumError),

    /// Required slot elements are absent; the viewer cannot be constructed.
    #[error("missing viewer elements: {}", .0.join(", "))]
    MissingElements(Vec<String>),

    /// The directory to build an album from is missing or not a directory.
    #[error("invalid album directory: {0}")]
    BadDir(String),

    /// The directory scan found no images.
    #[error("no images found in album directory")]
    EmptyScan,

    /// An album file is not valid YAML (or JSON) for an album descriptor.
    #[error("unreadable album file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Wrapper for std IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
