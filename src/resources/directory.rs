//! Directory resource.
use anyhow::Result;
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ResourceError;

/// A directory that must exist.
#[derive(Debug, Clone)]
pub struct DirectoryResource {
    pub path: PathBuf,
}

impl DirectoryResource {
    /// Ensure `path` exists as a directory.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Applicable for DirectoryResource {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        std::fs::create_dir_all(&self.path).map_err(|source| ResourceError::Directory {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DirectoryResource {
    fn current_state(&self) -> Result<ResourceState> {
        if self.path.is_dir() {
            return Ok(ResourceState::Correct);
        }
        if self.path.symlink_metadata().is_ok() {
            return Ok(ResourceState::Invalid {
                reason: "path exists and is not a directory".to_string(),
            });
        }
        Ok(ResourceState::Missing)
    }
}
