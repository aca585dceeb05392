//! Package installation resource.
use std::collections::HashSet;

use anyhow::Result;
use serde::Deserialize;

use super::{Applicable, ResourceChange, ResourceState};
use crate::error::{PhaseError, ResourceError};
use crate::exec::Executor;
use crate::platform::{Os, Platform};

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// Homebrew (macOS and Linux).
    Brew,
    /// Debian/Ubuntu (apt-get + dpkg).
    Apt,
    /// Arch Linux (pacman).
    Pacman,
    /// Fedora/RHEL (dnf + rpm).
    Dnf,
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brew => write!(f, "brew"),
            Self::Apt => write!(f, "apt"),
            Self::Pacman => write!(f, "pacman"),
            Self::Dnf => write!(f, "dnf"),
        }
    }
}

impl PackageManager {
    /// Managers probed on `platform`, in preference order.
    #[must_use]
    pub const fn candidates(platform: &Platform) -> &'static [Self] {
        match platform.os {
            Os::MacOs => &[Self::Brew],
            Os::Linux | Os::Other => &[Self::Apt, Self::Pacman, Self::Dnf, Self::Brew],
        }
    }

    /// Whether this manager can exist on `platform` at all.
    #[must_use]
    pub const fn supported_on(self, platform: &Platform) -> bool {
        match platform.os {
            Os::MacOs => matches!(self, Self::Brew),
            Os::Linux | Os::Other => true,
        }
    }

    /// Program whose presence on `PATH` indicates this manager.
    #[must_use]
    pub const fn probe(self) -> &'static str {
        match self {
            Self::Brew => "brew",
            Self::Apt => "apt-get",
            Self::Pacman => "pacman",
            Self::Dnf => "dnf",
        }
    }

    /// Return `explicit` if set, otherwise the first candidate found on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::NoPackageManager`] if no candidate is installed.
    pub fn detect(
        explicit: Option<Self>,
        platform: &Platform,
        executor: &dyn Executor,
    ) -> Result<Self, PhaseError> {
        if let Some(manager) = explicit {
            return Ok(manager);
        }
        let candidates = Self::candidates(platform);
        candidates
            .iter()
            .copied()
            .find(|m| executor.which(m.probe()))
            .ok_or_else(|| PhaseError::NoPackageManager {
                tried: candidates
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Command listing installed package names, one per line.
    const fn query_command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Brew => ("brew", &["list", "-1"]),
            Self::Apt => ("dpkg-query", &["-W", "-f=${Package}\\n"]),
            Self::Pacman => ("pacman", &["-Qq"]),
            Self::Dnf => ("rpm", &["-qa", "--qf", "%{NAME}\\n"]),
        }
    }

    /// Command installing one package, without the package name.
    const fn install_command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Brew => ("brew", &["install"]),
            Self::Apt => ("sudo", &["apt-get", "install", "-y"]),
            Self::Pacman => ("sudo", &["pacman", "-S", "--needed", "--noconfirm"]),
            Self::Dnf => ("sudo", &["dnf", "install", "-y"]),
        }
    }
}

/// A system package resource that can be checked and installed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    pub name: String,
    pub manager: PackageManager,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Package `name`, installed through `manager` via `executor`.
    #[must_use]
    pub const fn new(name: String, manager: PackageManager, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            manager,
            executor,
        }
    }

    /// Determine the resource state from a pre-fetched set of installed package names.
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.name) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

/// Query the full set of installed package names for `manager`.
///
/// Runs a single command regardless of how many packages are declared. A
/// query that exits non-zero yields an empty set, so every package is
/// treated as missing and handed to the manager, which skips installed ones.
///
/// # Errors
///
/// Returns an error if the query command cannot be spawned.
pub fn get_installed_packages(
    manager: PackageManager,
    executor: &dyn Executor,
) -> Result<HashSet<String>> {
    let (program, args) = manager.query_command();
    let result = executor.run_unchecked(program, args)?;
    if !result.success {
        return Ok(HashSet::new());
    }
    Ok(result
        .stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect())
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.name, self.manager)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let (program, base) = self.manager.install_command();
        let mut args: Vec<&str> = base.to_vec();
        args.push(self.name.as_str());
        self.executor
            .run(program, &args)
            .map_err(|e| ResourceError::PackageInstall {
                package: self.name.clone(),
                source: e.into(),
            })?;
        Ok(ResourceChange::Applied)
    }
}
