//! Command-line interface.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "provision",
    about = "Install packages, create config directories and link dotfiles",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override dotfiles root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Manifest to read instead of <root>/provision.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Never prompt; confirmation questions take their default answer
    #[arg(long, global = true)]
    pub no_prompt: bool,

    /// Keep running after a failed item or phase
    #[arg(long, global = true)]
    pub keep_going: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install packages, create directories, link files and run the post-install step
    Install(InstallOpts),
    /// Remove links that point into the dotfiles root
    Uninstall,
    /// Validate the manifest without changing anything
    Check,
    /// Print a shell completion script
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Uninstall => "uninstall",
            Self::Check => "check",
            Self::Completions { .. } => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip phases whose name contains any of these words
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only phases whose name contains any of these words
    #[arg(long, value_delimiter = ',', conflicts_with = "skip")]
    pub only: Vec<String>,
}

impl InstallOpts {
    /// Whether the phase called `name` passes the `--skip`/`--only` filters.
    #[must_use]
    pub fn selects(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if !self.only.is_empty() {
            return self.only.iter().any(|o| name.contains(&o.to_lowercase()));
        }
        !self.skip.iter().any(|s| name.contains(&s.to_lowercase()))
    }
}
