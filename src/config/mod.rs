//! Manifest loading.
//!
//! `provision.toml` in the dotfiles root declares packages, directories,
//! links and an optional post-install command. Paths are expanded once at
//! load time; phases only ever see absolute paths.
pub mod directories;
pub mod links;
pub mod packages;
pub mod paths;
pub mod post_install;
pub mod toml_loader;
pub mod validation;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::resources::package::PackageManager;
use crate::resources::symlink::ConflictPolicy;

pub use directories::Directory;
pub use links::Link;
pub use packages::{Confirmation, Package};
pub use post_install::PostInstall;

/// Manifest file name looked up in the dotfiles root.
pub const MANIFEST_FILE: &str = "provision.toml";

/// On-disk shape of the manifest.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Manifest {
    directories: Vec<String>,
    packages: packages::PackagesSection,
    links: links::LinksSection,
    post_install: Option<PostInstall>,
}

/// All declarations for one provisioning run.
///
/// Loaded once at startup and shared read-only by every phase.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dotfiles root; link sources resolve against it.
    pub root: PathBuf,
    /// Manifest the declarations were read from.
    pub manifest_path: PathBuf,
    /// Whether the manifest file existed.
    pub manifest_found: bool,
    pub packages: Vec<Package>,
    /// Explicit package manager; detected from the platform when `None`.
    pub package_manager: Option<PackageManager>,
    /// Gate asked before any package is installed.
    pub confirm: Option<Confirmation>,
    pub directories: Vec<Directory>,
    pub links: Vec<Link>,
    pub on_conflict: ConflictPolicy,
    pub post_install: Option<PostInstall>,
}

/// Link sources are written into links verbatim, so the root must not be
/// relative to the current directory.
fn absolute_root(root: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(root).map_err(|source| ConfigError::Io {
        path: root.display().to_string(),
        source,
    })
}

impl Config {
    /// Load the manifest for `root`.
    ///
    /// `manifest` overrides the default `<root>/provision.toml`. Paths are
    /// expanded against `home`. A missing manifest yields empty declarations
    /// with [`manifest_found`](Self::manifest_found) cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or parsed, a path
    /// cannot be expanded, or the post-install command is empty.
    pub fn load(root: &Path, manifest: Option<&Path>, home: &Path) -> Result<Self, ConfigError> {
        let root = &absolute_root(root)?;
        let manifest_path = manifest.map_or_else(|| root.join(MANIFEST_FILE), Path::to_path_buf);
        let manifest_found = manifest_path.exists();
        let raw: Manifest = toml_loader::load_config(&manifest_path)?;
        Self::from_manifest(root, manifest_path, manifest_found, raw, home)
    }

    /// Build a config from manifest text instead of a file.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus I/O.
    pub fn from_toml(root: &Path, content: &str, home: &Path) -> Result<Self, ConfigError> {
        let root = &absolute_root(root)?;
        let manifest_path = root.join(MANIFEST_FILE);
        let raw: Manifest = toml_loader::parse_config(&manifest_path, content)?;
        Self::from_manifest(root, manifest_path, true, raw, home)
    }

    fn from_manifest(
        root: &Path,
        manifest_path: PathBuf,
        manifest_found: bool,
        raw: Manifest,
        home: &Path,
    ) -> Result<Self, ConfigError> {
        if let Some(post) = &raw.post_install {
            post.check()?;
        }

        let packages = raw.packages.packages();
        let directories = directories::resolve(&raw.directories, home)?;
        let on_conflict = raw.links.on_conflict;
        let links = raw.links.resolve(home)?;

        Ok(Self {
            root: root.to_path_buf(),
            manifest_path,
            manifest_found,
            packages,
            package_manager: raw.packages.manager,
            confirm: raw.packages.confirm,
            directories,
            links,
            on_conflict,
            post_install: raw.post_install,
        })
    }

    /// Whether the manifest declares nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
            && self.directories.is_empty()
            && self.links.is_empty()
            && self.post_install.is_none()
    }
}
