//! Package declarations and the confirmation gate that guards them.
use serde::Deserialize;

use crate::resources::package::PackageManager;

/// A package to install, by the name the package manager knows it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
}

/// Yes/no question asked before packages are installed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Confirmation {
    /// Identifier used in logs and the run summary.
    #[serde(default = "default_confirm_name")]
    pub name: String,
    /// Question text shown to the user.
    #[serde(default = "default_confirm_prompt")]
    pub prompt: String,
    /// Answer used when no question is asked.
    #[serde(default = "default_true")]
    pub default: bool,
    /// Answer highlighted as recommended, if any.
    #[serde(default)]
    pub recommended: Option<bool>,
    /// Never ask; always take `default`.
    #[serde(default)]
    pub noprompt: bool,
}

fn default_confirm_name() -> String {
    "install_packages".to_string()
}

fn default_confirm_prompt() -> String {
    "Install packages?".to_string()
}

const fn default_true() -> bool {
    true
}

/// The `[packages]` table of the manifest.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct PackagesSection {
    pub manager: Option<PackageManager>,
    pub names: Vec<String>,
    pub confirm: Option<Confirmation>,
}

impl PackagesSection {
    /// Convert raw names into declarations, preserving order.
    pub fn packages(&self) -> Vec<Package> {
        self.names
            .iter()
            .map(|name| Package {
                name: name.trim().to_string(),
            })
            .collect()
    }
}
