//! Shared state handed to every phase.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::prompt::Prompter;

/// Run-wide switches set from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    /// Report what would change without changing anything.
    pub dry_run: bool,
    /// Never ask; confirmation gates take their default answer.
    pub no_prompt: bool,
    /// Downgrade item failures to warnings and keep running later phases.
    pub keep_going: bool,
}

/// Shared context for phase execution.
pub struct Context {
    /// Declarations loaded from the manifest.
    pub config: Arc<Config>,
    pub platform: Platform,
    /// Logger for output and phase recording.
    pub log: Arc<dyn Log>,
    pub dry_run: bool,
    pub no_prompt: bool,
    pub keep_going: bool,
    /// Home directory `~` expanded to.
    pub home: PathBuf,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Asks confirmation questions.
    pub prompter: Arc<dyn Prompter>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("no_prompt", &self.no_prompt)
            .field("keep_going", &self.keep_going)
            .field("home", &self.home)
            .field("executor", &"<dyn Executor>")
            .field("prompter", &"<dyn Prompter>")
            .finish()
    }
}

impl Context {
    /// Creates a new context for phase execution.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        platform: Platform,
        log: Arc<dyn Log>,
        flags: RunFlags,
        home: PathBuf,
        executor: Arc<dyn Executor>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            config,
            platform,
            log,
            dry_run: flags.dry_run,
            no_prompt: flags.no_prompt,
            keep_going: flags.keep_going,
            home,
            executor,
            prompter,
        }
    }

    /// Root directory of the dotfiles repository.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.config.root
    }

    /// Whether confirmation gates must be decided without asking.
    ///
    /// Dry runs never prompt.
    #[must_use]
    pub const fn non_interactive(&self) -> bool {
        self.no_prompt || self.dry_run
    }

    /// Create a copy of this context with a different logger.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            platform: self.platform,
            log,
            dry_run: self.dry_run,
            no_prompt: self.no_prompt,
            keep_going: self.keep_going,
            home: self.home.clone(),
            executor: Arc::clone(&self.executor),
            prompter: Arc::clone(&self.prompter),
        }
    }
}

/// Resolve the current user's home directory from the environment.
///
/// # Errors
///
/// Returns an error if `HOME` (or `USERPROFILE` on Windows) is not set.
pub fn home_dir() -> Result<PathBuf> {
    let home = if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE")
            .or_else(|_| std::env::var("HOME"))
            .map_err(|_| {
                anyhow::anyhow!("neither USERPROFILE nor HOME environment variable is set")
            })?
    } else {
        std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?
    };
    Ok(PathBuf::from(home))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use crate::phases::test_helpers::{empty_config, make_context};

    #[test]
    fn root_returns_config_root() {
        let ctx = make_context(empty_config(PathBuf::from("/dotfiles")));
        assert_eq!(ctx.root(), std::path::Path::new("/dotfiles"));
    }

    #[test]
    fn dry_run_is_non_interactive() {
        let mut ctx = make_context(empty_config(PathBuf::from("/dotfiles")));
        assert!(!ctx.non_interactive());
        ctx.dry_run = true;
        assert!(ctx.non_interactive());
    }

    #[test]
    fn with_log_preserves_other_fields() {
        let (log, _tmp, _guard) = isolated_logger();
        let mut ctx = make_context(empty_config(PathBuf::from("/dotfiles")));
        ctx.keep_going = true;
        let ctx2 = ctx.with_log(Arc::new(log));
        assert_eq!(ctx2.root(), ctx.root());
        assert_eq!(ctx2.home, ctx.home);
        assert!(ctx2.keep_going);
    }

    #[test]
    fn debug_format_includes_key_fields() {
        let ctx = make_context(empty_config(PathBuf::from("/dotfiles")));
        let debug = format!("{ctx:?}");
        assert!(debug.contains("Context"));
        assert!(debug.contains("dry_run"));
        assert!(debug.contains("keep_going"));
    }
}
