//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary carry them as [`anyhow::Error`] via the standard `?` operator.
//! Callers that need the kind can still `downcast_ref` to:
//!
//! ```text
//! ConfigError     manifest reading, parsing, path expansion
//! PhaseError      sequencer-level failures
//! ResourceError   packages, directories, symlinks
//! ```

use thiserror::Error;

/// Errors that arise while loading the provisioning manifest.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The manifest (or the root it lives in) could not be read.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or does not match the schema.
    #[error("Invalid manifest {path}: {source}")]
    Parse {
        /// Path to the manifest.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A value is syntactically valid but semantically unusable.
    #[error("Invalid value for {field}: {message}")]
    Invalid {
        /// Dotted key of the offending value (e.g. `post_install.command`).
        field: String,
        /// Human-readable reason.
        message: String,
    },

    /// A `~` or `$VAR` shorthand in a path could not be expanded.
    #[error("Cannot expand path '{path}': {source}")]
    Expansion {
        /// The raw path as written in the manifest.
        path: String,
        /// Underlying lookup error.
        source: shellexpand::LookupError<std::env::VarError>,
    },
}

/// Errors that arise at the phase level of the sequencer.
#[derive(Error, Debug)]
pub enum PhaseError {
    /// No supported package manager could be found on `PATH`.
    #[error("No supported package manager found (tried {tried})")]
    NoPackageManager {
        /// Comma-separated list of the managers that were probed.
        tried: String,
    },

    /// The user declined the confirmation gate.
    #[error("'{0}' declined")]
    Declined(String),
}

/// Errors that arise from resource operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The symlink target is occupied and the conflict policy refuses to replace it.
    #[error("Refusing to replace {target}: {current}")]
    Conflict {
        /// Path where the link should be created.
        target: String,
        /// Description of what currently occupies the path.
        current: String,
    },

    /// The package manager failed to install a package.
    #[error("Package installation failed: {package}")]
    PackageInstall {
        /// Name of the package that could not be installed.
        package: String,
        /// Underlying error from the package manager invocation.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A directory could not be created.
    #[error("Cannot create directory {path}: {source}")]
    Directory {
        /// Directory path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
