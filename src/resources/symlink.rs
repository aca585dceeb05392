//! Symlink resource.
use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, occupied, remove_existing};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ResourceError;

/// What to do when a link target is already occupied by something else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the existing file or link alone and fail.
    #[default]
    Refuse,
    /// Remove the existing file or link and create ours.
    Replace,
}

/// A symlink resource that can be checked and applied.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The file the link points to.
    pub source: PathBuf,
    /// Where the link is created.
    pub target: PathBuf,
    pub on_conflict: ConflictPolicy,
}

impl SymlinkResource {
    /// Link `target` to `source`, resolving an occupied target per `on_conflict`.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf, on_conflict: ConflictPolicy) -> Self {
        Self {
            source,
            target,
            on_conflict,
        }
    }

    /// Whether `target` is a link pointing at `source`.
    fn points_at_source(&self) -> bool {
        std::fs::read_link(&self.target).is_ok_and(|existing| existing == self.source)
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.points_at_source() {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        ensure_parent_dir(&self.target)?;

        if occupied(&self.target) {
            match self.on_conflict {
                ConflictPolicy::Refuse => {
                    return Err(ResourceError::Conflict {
                        target: self.target.display().to_string(),
                        current: describe_occupant(&self.target),
                    }
                    .into());
                }
                ConflictPolicy::Replace => remove_existing(&self.target)?,
            }
        }

        create_symlink(&self.source, &self.target)?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if !occupied(&self.target) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        if !self.points_at_source() {
            return Ok(ResourceChange::Skipped {
                reason: format!("{} is not our link", self.target.display()),
            });
        }
        std::fs::remove_file(&self.target)
            .with_context(|| format!("removing link: {}", self.target.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        let Ok(meta) = self.target.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };

        if meta.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: "target is a real directory".to_string(),
            });
        }

        if self.points_at_source() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: describe_occupant(&self.target),
            })
        }
    }
}

/// Describe whatever currently sits at `path`.
fn describe_occupant(path: &Path) -> String {
    std::fs::read_link(path).map_or_else(
        |_| "target is a regular file".to_string(),
        |existing| format!("points to {}", existing.display()),
    )
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link).with_context(|| {
        format!(
            "creating symlink {} -> {}",
            link.display(),
            target.display()
        )
    })?;

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}
