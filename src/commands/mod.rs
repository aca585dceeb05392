//! Top-level subcommands and the setup they share.
pub mod check;
pub mod install;
pub mod uninstall;

use anyhow::{Context as _, Result};
use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::validation::{self, ValidationWarning};
use crate::config::{Config, MANIFEST_FILE};
use crate::exec::Executor;
use crate::logging::{Log, Logger};
use crate::phases::{self, Context, Phase, RunFlags};
use crate::platform::Platform;
use crate::prompt::Prompter;

/// Environment variable naming the dotfiles root.
pub const ROOT_ENV: &str = "PROVISION_ROOT";

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    pub platform: Platform,
    pub config: Arc<Config>,
    pub home: PathBuf,
    /// Everything suspicious found in the manifest.
    pub warnings: Vec<ValidationWarning>,
}

impl CommandSetup {
    /// Resolve the root, load the manifest and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or home directory cannot be determined,
    /// or the manifest cannot be loaded.
    pub fn init(global: &GlobalOpts, log: &dyn Log, executor: &dyn Executor) -> Result<Self> {
        let root = resolve_root(global)?;
        let home = phases::context::home_dir()?;
        Self::load(&root, global.config.as_deref(), home, log, executor)
    }

    /// Load and validate the manifest for an already-resolved root and home.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded.
    pub fn load(
        root: &Path,
        manifest: Option<&Path>,
        home: PathBuf,
        log: &dyn Log,
        executor: &dyn Executor,
    ) -> Result<Self> {
        let platform = Platform::detect();

        log.stage("Loading manifest");
        let config = Config::load(root, manifest, &home)?;
        log.debug(&format!("root: {}", config.root.display()));
        log.debug(&format!("manifest: {}", config.manifest_path.display()));
        log.info(&format!(
            "loaded {} packages, {} directories, {} links{}",
            config.packages.len(),
            config.directories.len(),
            config.links.len(),
            if config.post_install.is_some() {
                ", post-install command"
            } else {
                ""
            }
        ));

        if config.manifest_found && config.is_empty() {
            log.info(&format!(
                "nothing declared in {}",
                config.manifest_path.display()
            ));
        }

        let mut warnings = Vec::new();
        if !config.manifest_found {
            warnings.push(ValidationWarning::new(
                "manifest",
                config.manifest_path.display().to_string(),
                "not found; nothing is declared",
            ));
        }
        warnings.extend(validation::validate_all(&config, &platform, executor));

        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} manifest warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self {
            platform,
            config: Arc::new(config),
            home,
            warnings,
        })
    }

    /// Build the phase context for this run.
    ///
    /// Prompts are disabled by `--no-prompt` or when stdin is not a terminal.
    #[must_use]
    pub fn context(
        &self,
        global: &GlobalOpts,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        prompter: Arc<dyn Prompter>,
    ) -> Context {
        let flags = RunFlags {
            dry_run: global.dry_run,
            no_prompt: global.no_prompt || !std::io::stdin().is_terminal(),
            keep_going: global.keep_going,
        };
        Context::new(
            Arc::clone(&self.config),
            self.platform,
            log,
            flags,
            self.home.clone(),
            executor,
            prompter,
        )
    }
}

/// Resolve the dotfiles root directory.
///
/// # Errors
///
/// Returns an error if no root is given and the current directory holds no
/// manifest.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    resolve_root_from(
        global.root.as_deref(),
        std::env::var(ROOT_ENV).ok(),
        &cwd,
    )
}

/// Pick the root from `--root`, then `$PROVISION_ROOT`, then `cwd` if it
/// holds a manifest.
///
/// Relative roots are taken relative to `cwd`. The result is canonical so
/// links written from it never depend on where the command ran.
///
/// # Errors
///
/// Returns an error if none of them applies, or the chosen root does not
/// exist.
pub fn resolve_root_from(
    explicit: Option<&Path>,
    env: Option<String>,
    cwd: &Path,
) -> Result<PathBuf> {
    let root = if let Some(root) = explicit {
        root.to_path_buf()
    } else if let Some(root) = env.filter(|r| !r.is_empty()) {
        PathBuf::from(root)
    } else if cwd.join(MANIFEST_FILE).exists() {
        cwd.to_path_buf()
    } else {
        anyhow::bail!(
            "cannot determine dotfiles root: no {MANIFEST_FILE} in {}. Use --root or set {ROOT_ENV}",
            cwd.display()
        );
    };
    let root = cwd.join(root);
    std::fs::canonicalize(&root)
        .with_context(|| format!("dotfiles root {} is not accessible", root.display()))
}

/// Run `phases` in sequence, print the summary, and bail if any failed.
///
/// # Errors
///
/// Returns an error if one or more phases recorded a failure.
pub fn run_phases_to_completion<'a>(
    phases: impl IntoIterator<Item = &'a dyn Phase>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    phases::run_sequence(phases, ctx);

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} phase(s) failed");
    }
    Ok(())
}
