//! Home-directory and environment shorthand expansion for manifest paths.
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Expand `~` and `$VAR` in `raw` and anchor relative results at `home`.
///
/// `~` always resolves to `home` (not the process's `$HOME`) so runs can be
/// pointed at an alternate home directory.
///
/// # Errors
///
/// Returns [`ConfigError::Expansion`] if a referenced variable is unset or
/// not valid unicode.
pub fn expand(raw: &str, home: &Path) -> Result<PathBuf, ConfigError> {
    let home_str = home.to_string_lossy().into_owned();
    let expanded = shellexpand::full_with_context(
        raw,
        || Some(home_str),
        |var| std::env::var(var).map(Some),
    )
    .map_err(|source| ConfigError::Expansion {
        path: raw.to_string(),
        source,
    })?;

    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(home.join(path))
    }
}
