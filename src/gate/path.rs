//! Image sources and path validation.
//!
//! A request reads from an [`ImageSource`]: either a filesystem path or a
//! byte buffer. Buffers go to the engine untouched. Paths must first become a
//! [`ValidatedPath`], which proves, in this order:
//!
//! 1. the path is non-empty UTF-8 with no embedded null byte (checked before
//!    the filesystem is touched);
//! 2. it resolves to a canonical absolute path (symlinks, `.` and `..`
//!    collapsed), which is what the engine receives;
//! 3. the resolved path is a regular file;
//! 4. the file can actually be opened for reading.
//!
//! Error messages name the file by its base name only, so a failure never
//! reveals where on disk the gate looked.

use crate::error::WandError;
use crate::imaging::EngineInput;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Where the image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Buffer(Vec<u8>),
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::Path(PathBuf::from(path))
    }
}

impl From<String> for ImageSource {
    fn from(path: String) -> Self {
        ImageSource::Path(PathBuf::from(path))
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Buffer(bytes)
    }
}

impl From<&[u8]> for ImageSource {
    fn from(bytes: &[u8]) -> Self {
        ImageSource::Buffer(bytes.to_vec())
    }
}

impl ImageSource {
    /// Validate a path source; pass a buffer through. This is the one place
    /// the two variants are told apart.
    pub fn into_engine_input(self) -> Result<EngineInput, WandError> {
        match self {
            ImageSource::Path(path) => Ok(EngineInput::Path(validate_path(&path)?.into_inner())),
            ImageSource::Buffer(bytes) => Ok(EngineInput::Buffer(bytes)),
        }
    }
}

/// An absolute, canonical path to a readable regular file.
///
/// Owned by a single request; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPath(PathBuf);

impl ValidatedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_inner(self) -> PathBuf {
        self.0
    }
}

/// Base name of a caller path for error messages.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Map a filesystem failure on `path` to a caller-facing error.
fn fs_error(err: &io::Error, path: &Path) -> WandError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => WandError::PermissionDenied(display_name(path)),
        _ => WandError::NotFound(display_name(path)),
    }
}

/// Prove `path` names a readable regular file and resolve it.
pub fn validate_path(path: &Path) -> Result<ValidatedPath, WandError> {
    let raw = path.as_os_str();
    if raw.is_empty() {
        return Err(WandError::InvalidPath(
            "image path must be a non-empty string".into(),
        ));
    }
    if raw.to_str().is_none() {
        return Err(WandError::InvalidPath(
            "image path must be a valid UTF-8 string".into(),
        ));
    }
    if raw.as_encoded_bytes().contains(&0) {
        return Err(WandError::InvalidPath(
            "image path contains a null byte".into(),
        ));
    }

    let resolved = fs::canonicalize(path).map_err(|e| fs_error(&e, path))?;

    let metadata = fs::metadata(&resolved).map_err(|e| fs_error(&e, path))?;
    if !metadata.is_file() {
        return Err(WandError::InvalidPath(format!(
            "image path must be a file: {}",
            display_name(path)
        )));
    }

    // Mode bits can deny reads even after a successful stat.
    File::open(&resolved).map_err(|e| fs_error(&e, path))?;

    Ok(ValidatedPath(resolved))
}
