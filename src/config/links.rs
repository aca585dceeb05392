//! Link declarations.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths;
use crate::error::ConfigError;
use crate::resources::symlink::ConflictPolicy;

/// A symbolic link to create: `target` pointing at `source` in the dotfiles root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Path relative to the dotfiles root, as written in the manifest.
    pub source: String,
    /// Target as written in the manifest (may use `~`).
    pub raw_target: String,
    /// Fully expanded absolute target path.
    pub target: PathBuf,
}

impl Link {
    /// Absolute path of the link source under `root`.
    #[must_use]
    pub fn source_path(&self, root: &Path) -> PathBuf {
        root.join(&self.source)
    }
}

/// A single link entry: either `["src", "~/dst"]` or `{ source, target }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkEntry {
    Pair(String, String),
    Table { source: String, target: String },
}

impl LinkEntry {
    fn into_parts(self) -> (String, String) {
        match self {
            Self::Pair(source, target) | Self::Table { source, target } => (source, target),
        }
    }
}

/// The `[links]` table of the manifest.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct LinksSection {
    pub on_conflict: ConflictPolicy,
    entries: Vec<LinkEntry>,
}

impl LinksSection {
    /// Expand every entry's target against `home`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Expansion`] for the first target that
    /// references an unset variable.
    pub fn resolve(self, home: &Path) -> Result<Vec<Link>, ConfigError> {
        self.entries
            .into_iter()
            .map(|entry| {
                let (source, raw_target) = entry.into_parts();
                let target = paths::expand(&raw_target, home)?;
                Ok(Link {
                    source,
                    raw_target,
                    target,
                })
            })
            .collect()
    }
}
