//! Album sources: descriptor files and image directories.

use std::path::Path;

use album_model::{AlbumDescriptor, ImageEntry};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

/// Options controlling directory scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional maximum recursion depth. `None` or `Some(0)` means unlimited.
    pub max_depth: Option<usize>,
    /// Optional override for allowed extensions (lowercase, without dot).
    pub exts: Option<Vec<&'static str>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: None,
            exts: None,
        }
    }
}

/// Return `true` if `path` has an allowed image extension.
#[must_use]
pub fn is_supported_image(path: &Path, exts: Option<&[&str]>) -> bool {
    let default_exts: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
    let exts = exts.unwrap_or(default_exts);
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| *e == ext)
        })
}

/// Reads an album descriptor from a YAML or JSON file.
///
/// The descriptor is not validated here; that happens on `load_album`.
pub fn album_from_file(path: &Path) -> Result<AlbumDescriptor, Error> {
    let raw = std::fs::read_to_string(path)?;
    let descriptor = AlbumDescriptor::from_yaml_str(&raw)?;
    debug!(path = %path.display(), name = ?descriptor.name, "album file read");
    Ok(descriptor)
}

/// Album named after `dir` whose entries are the images below it, in path
/// order, relative to `dir` and joined with `/`. The album location is `dir`.
///
/// # Errors
/// [`Error::BadDir`] if `dir` is missing or not a directory, [`Error::EmptyScan`]
/// if it holds no supported image.
pub fn album_from_dir(dir: &Path, opts: &ScanOptions) -> Result<AlbumDescriptor, Error> {
    if !dir.is_dir() {
        return Err(Error::BadDir(dir.to_string_lossy().into_owned()));
    }

    let mut wd = WalkDir::new(dir).sort_by_file_name();
    if !opts.recursive {
        wd = wd.max_depth(1);
    } else if let Some(d) = opts.max_depth
        && d > 0
    {
        wd = wd.max_depth(d);
    }

    let mut images = Vec::new();
    for entry in wd
        .into_iter()
        // Skip hidden dot-directories *below* the root only.
        .filter_entry(|e| !should_skip_dir(e))
        .flatten()
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_supported_image(path, opts.exts.as_deref()) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        images.push(ImageEntry::Name(name));
    }
    if images.is_empty() {
        return Err(Error::EmptyScan);
    }
    debug!(dir = %dir.display(), images = images.len(), "album directory scanned");

    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "album".to_string());
    Ok(AlbumDescriptor::new(name, images).with_location(dir.to_string_lossy()))
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
