//! Optional command run after every link is in place.
use serde::Deserialize;

use crate::error::ConfigError;

/// The `[post_install]` table of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostInstall {
    /// Program followed by its arguments.
    pub command: Vec<String>,
    /// Capture output instead of handing the terminal to the command.
    #[serde(default)]
    pub capture: bool,
}

impl PostInstall {
    /// Reject an empty or blank program name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if there is nothing to run.
    pub fn check(&self) -> Result<(), ConfigError> {
        match self.command.first() {
            Some(program) if !program.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::Invalid {
                field: "post_install.command".to_string(),
                message: "must name a program to run".to_string(),
            }),
        }
    }

    /// The program to spawn.
    #[must_use]
    pub fn program(&self) -> &str {
        self.command.first().map_or("", String::as_str)
    }

    /// Arguments passed to [`program`](Self::program).
    #[must_use]
    pub fn args(&self) -> Vec<&str> {
        self.command.iter().skip(1).map(String::as_str).collect()
    }
}
