//! Directory declarations.
use std::path::{Path, PathBuf};

use super::paths;
use crate::error::ConfigError;

/// A directory that must exist after provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Path as written in the manifest, kept for messages.
    pub raw: String,
    /// Fully expanded absolute path.
    pub path: PathBuf,
}

/// Expand every raw directory entry against `home`.
///
/// # Errors
///
/// Returns [`ConfigError::Expansion`] for the first entry that references an
/// unset variable.
pub(super) fn resolve(raw: &[String], home: &Path) -> Result<Vec<Directory>, ConfigError> {
    raw.iter()
        .map(|entry| {
            Ok(Directory {
                raw: entry.clone(),
                path: paths::expand(entry, home)?,
            })
        })
        .collect()
}
