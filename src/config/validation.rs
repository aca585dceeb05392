//! Manifest checks that produce warnings instead of errors.
use std::collections::HashSet;
use std::path::Path;

use super::directories::Directory;
use super::links::Link;
use super::packages::Package;
use super::post_install::PostInstall;
use crate::exec::Executor;
use crate::platform::Platform;
use crate::resources::package::PackageManager;

/// A validation warning detected while checking the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The manifest section (e.g., "packages", "links").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning about `item` raised by validator `source`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.source, self.item, self.message)
    }
}

/// Trait for manifest validators.
///
/// Validators never fail; they report anything suspicious as warnings and
/// leave the decision to the caller.
pub trait ConfigValidator {
    /// Validate the declarations and return any warnings found.
    fn validate(&self, root: &Path, platform: &Platform) -> Vec<ValidationWarning>;

    /// Manifest section this validator covers.
    fn name(&self) -> &'static str;
}

/// Validator for package declarations.
#[derive(Debug)]
pub struct PackageValidator<'a> {
    packages: &'a [Package],
    manager: Option<PackageManager>,
}

impl<'a> PackageValidator<'a> {
    /// Validate `packages` for the (optional) explicit `manager`.
    #[must_use]
    pub const fn new(packages: &'a [Package], manager: Option<PackageManager>) -> Self {
        Self { packages, manager }
    }
}

impl ConfigValidator for PackageValidator<'_> {
    fn validate(&self, _root: &Path, platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let Some(manager) = self.manager
            && !manager.supported_on(platform)
        {
            warnings.push(ValidationWarning::new(
                self.name(),
                manager.to_string(),
                format!("package manager is not available on {}", platform.os),
            ));
        }

        let mut seen = HashSet::new();
        for package in self.packages {
            if package.name.is_empty() {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    &package.name,
                    "package name is empty",
                ));
            } else if !seen.insert(package.name.as_str()) {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    &package.name,
                    "package is declared more than once",
                ));
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "packages"
    }
}

/// Validator for directory declarations.
#[derive(Debug)]
pub struct DirectoryValidator<'a> {
    directories: &'a [Directory],
}

impl<'a> DirectoryValidator<'a> {
    /// Validate declared `directories`.
    #[must_use]
    pub const fn new(directories: &'a [Directory]) -> Self {
        Self { directories }
    }
}

impl ConfigValidator for DirectoryValidator<'_> {
    fn validate(&self, _root: &Path, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut seen = HashSet::new();
        self.directories
            .iter()
            .filter(|dir| !seen.insert(dir.path.as_path()))
            .map(|dir| {
                ValidationWarning::new(
                    self.name(),
                    &dir.raw,
                    "directory is declared more than once",
                )
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "directories"
    }
}

/// Validator for link declarations.
#[derive(Debug)]
pub struct LinkValidator<'a> {
    links: &'a [Link],
}

impl<'a> LinkValidator<'a> {
    /// Validate declared `links` against the dotfiles root.
    #[must_use]
    pub const fn new(links: &'a [Link]) -> Self {
        Self { links }
    }
}

impl ConfigValidator for LinkValidator<'_> {
    fn validate(&self, root: &Path, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut targets = HashSet::new();

        for link in self.links {
            if Path::new(&link.source).is_absolute() {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    &link.source,
                    "source path should be relative to the dotfiles root",
                ));
            } else {
                let source = link.source_path(root);
                if !source.exists() {
                    warnings.push(ValidationWarning::new(
                        self.name(),
                        &link.source,
                        format!("source does not exist: {}", source.display()),
                    ));
                }
            }

            // `~/x` and absolute paths are explicit; anything else silently lands in $HOME
            if !link.raw_target.starts_with('~')
                && !link.raw_target.starts_with('$')
                && !Path::new(&link.raw_target).is_absolute()
            {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    &link.raw_target,
                    format!(
                        "relative target resolves to {}; write it as ~/{}",
                        link.target.display(),
                        link.raw_target
                    ),
                ));
            }

            if !targets.insert(link.target.as_path()) {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    &link.raw_target,
                    "target is declared more than once",
                ));
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "links"
    }
}

/// Validator for the post-install command.
#[derive(Debug)]
pub struct PostInstallValidator<'a> {
    post_install: Option<&'a PostInstall>,
    executor: &'a dyn Executor,
}

impl<'a> PostInstallValidator<'a> {
    /// Validate the post-install command, looking its program up through `executor`.
    #[must_use]
    pub const fn new(post_install: Option<&'a PostInstall>, executor: &'a dyn Executor) -> Self {
        Self {
            post_install,
            executor,
        }
    }
}

impl ConfigValidator for PostInstallValidator<'_> {
    fn validate(&self, _root: &Path, _platform: &Platform) -> Vec<ValidationWarning> {
        let Some(post) = self.post_install else {
            return Vec::new();
        };
        let program = post.program();
        if self.executor.which(program) {
            Vec::new()
        } else {
            vec![ValidationWarning::new(
                self.name(),
                program,
                "program not found on PATH",
            )]
        }
    }

    fn name(&self) -> &'static str {
        "post_install"
    }
}

/// Run every validator over `config` and collect their warnings.
#[must_use]
pub fn validate_all(
    config: &super::Config,
    platform: &Platform,
    executor: &dyn Executor,
) -> Vec<ValidationWarning> {
    let validators: [&dyn ConfigValidator; 4] = [
        &PackageValidator::new(&config.packages, config.package_manager),
        &DirectoryValidator::new(&config.directories),
        &LinkValidator::new(&config.links),
        &PostInstallValidator::new(config.post_install.as_ref(), executor),
    ];
    validators
        .iter()
        .flat_map(|v| v.validate(&config.root, platform))
        .collect()
}
