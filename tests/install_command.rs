#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the install sequence.
//!
//! These tests run the real phases against a temporary root and home,
//! with package manager and post-install calls captured by a recording
//! executor.

mod common;

use std::sync::Arc;

use common::{RecordingExecutor, ScriptedPrompter, TestEnvBuilder};
use provision_cli::cli::InstallOpts;
use provision_cli::logging::PhaseStatus;
use provision_cli::phases::{self, HALTED, Phase, RunFlags};

const GITCONFIG_MANIFEST: &str = r#"
directories = ["~/.config"]

[packages]
manager = "brew"
names = ["git", "tmux"]

[links]
entries = [["git/.gitconfig", "~/.gitconfig"]]
"#;

fn run_install(ctx: &phases::Context) -> usize {
    let all = phases::all_install_phases();
    phases::run_sequence(all.iter().map(AsRef::as_ref), ctx)
}

fn statuses(log: &provision_cli::logging::Logger) -> Vec<(String, PhaseStatus)> {
    log.phase_entries()
        .into_iter()
        .map(|e| (e.name, e.status))
        .collect()
}

// ---------------------------------------------------------------------------
// Full sequence
// ---------------------------------------------------------------------------

#[test]
fn packages_then_directories_then_links() {
    let env = TestEnvBuilder::new()
        .with_manifest(GITCONFIG_MANIFEST)
        .with_source("git/.gitconfig")
        .build();
    let executor = Arc::new(RecordingExecutor::new());
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 0);

    assert_eq!(
        executor.commands(),
        vec!["brew list -1", "brew install git", "brew install tmux"]
    );
    assert!(env.home_path().join(".config").is_dir());
    let link = env.home_path().join(".gitconfig");
    assert_eq!(
        std::fs::read_link(&link).unwrap(),
        env.root_path().join("git/.gitconfig")
    );
    assert_eq!(
        statuses(&log),
        vec![
            ("Install packages".to_string(), PhaseStatus::Ok),
            ("Create directories".to_string(), PhaseStatus::Ok),
            ("Link config files".to_string(), PhaseStatus::Ok),
            ("Run post-install".to_string(), PhaseStatus::NotApplicable),
        ]
    );
}

#[test]
fn post_install_runs_once_after_links() {
    let env = TestEnvBuilder::new()
        .with_manifest(&format!(
            "{GITCONFIG_MANIFEST}\n[post_install]\ncommand = [\"nvim\", \"+PlugInstall\", \"+qa\"]\n"
        ))
        .with_source("git/.gitconfig")
        .build();
    let executor =
        Arc::new(RecordingExecutor::new().watching(env.home_path().join(".gitconfig")));
    let (ctx, _log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 0);

    let calls = executor.calls();
    let post: Vec<_> = calls
        .iter()
        .filter(|c| c.command == "nvim +PlugInstall +qa")
        .collect();
    assert_eq!(post.len(), 1, "post-install must run exactly once");
    assert!(post[0].watched_existed, "links must exist before post-install");
    assert_eq!(calls.last().unwrap().command, "nvim +PlugInstall +qa");
}

#[test]
fn post_install_exit_code_does_not_fail_run() {
    let env = TestEnvBuilder::new()
        .with_manifest("[post_install]\ncommand = [\"false\"]\ncapture = true\n")
        .build();
    let executor = Arc::new(RecordingExecutor::new().with_failure("false"));
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 0);
    assert_eq!(log.failure_count(), 0);
    assert_eq!(executor.commands(), vec!["false"]);
}

// ---------------------------------------------------------------------------
// Empty and partial declarations
// ---------------------------------------------------------------------------

#[test]
fn empty_packages_make_no_calls() {
    let env = TestEnvBuilder::new()
        .with_manifest(
            "directories = [\"~/.config/nvim\"]\n[links]\nentries = [[\"vim/.vimrc\", \"~/.vimrc\"]]\n",
        )
        .with_source("vim/.vimrc")
        .build();
    let executor = Arc::new(RecordingExecutor::new());
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 0);
    assert!(executor.commands().is_empty());
    assert!(env.home_path().join(".config/nvim").is_dir());
    assert!(env.home_path().join(".vimrc").is_symlink());
    assert_eq!(
        log.phase_entries()[0].status,
        PhaseStatus::NotApplicable,
        "package phase has nothing to do"
    );
}

#[test]
fn missing_manifest_does_nothing() {
    let env = TestEnvBuilder::new().build();
    let executor = Arc::new(RecordingExecutor::new());
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert!(!ctx.config.manifest_found);
    assert_eq!(run_install(&ctx), 0);
    assert!(executor.commands().is_empty());
    assert!(
        log.phase_entries()
            .iter()
            .all(|e| e.status == PhaseStatus::NotApplicable)
    );
}

// ---------------------------------------------------------------------------
// Confirmation gate
// ---------------------------------------------------------------------------

#[test]
fn noprompt_gate_with_default_no_makes_no_calls() {
    let env = TestEnvBuilder::new()
        .with_manifest(
            "[packages]\nmanager = \"brew\"\nnames = [\"git\"]\nconfirm = { default = false, noprompt = true }\n",
        )
        .build();
    let executor = Arc::new(RecordingExecutor::new());
    let prompter = Arc::new(ScriptedPrompter::answering(true));
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::clone(&prompter) as _,
    );

    assert_eq!(run_install(&ctx), 0);
    assert!(executor.commands().is_empty());
    assert_eq!(prompter.times_asked(), 0);
    let entry = &log.phase_entries()[0];
    assert_eq!(entry.status, PhaseStatus::Skipped);
    assert_eq!(entry.message.as_deref(), Some("'install_packages' declined"));
}

#[test]
fn declined_gate_still_runs_later_phases() {
    let env = TestEnvBuilder::new()
        .with_manifest(
            "directories = [\"~/.local/bin\"]\n[packages]\nnames = [\"git\"]\nconfirm = { name = \"pkgs\" }\n",
        )
        .build();
    let executor = Arc::new(RecordingExecutor::new());
    let prompter = Arc::new(ScriptedPrompter::answering(false));
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::clone(&prompter) as _,
    );

    assert_eq!(run_install(&ctx), 0);
    assert_eq!(prompter.times_asked(), 1);
    assert!(executor.commands().is_empty());
    assert!(env.home_path().join(".local/bin").is_dir());
    assert_eq!(log.phase_entries()[1].status, PhaseStatus::Ok);
}

#[test]
fn accepted_gate_installs() {
    let env = TestEnvBuilder::new()
        .with_manifest("[packages]\nnames = [\"jq\"]\nconfirm = { default = false }\n")
        .build();
    let executor = Arc::new(RecordingExecutor::new());
    let prompter = Arc::new(ScriptedPrompter::answering(true));
    let (ctx, _log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::clone(&prompter) as _,
    );

    assert_eq!(run_install(&ctx), 0);
    assert_eq!(prompter.times_asked(), 1);
    assert_eq!(executor.commands(), vec!["brew list -1", "brew install jq"]);
}

// ---------------------------------------------------------------------------
// Idempotence and dry run
// ---------------------------------------------------------------------------

#[test]
fn second_run_changes_nothing() {
    let env = TestEnvBuilder::new()
        .with_manifest(GITCONFIG_MANIFEST)
        .with_source("git/.gitconfig")
        .build();

    let first = Arc::new(RecordingExecutor::new());
    let (ctx, _log) = env.context(
        RunFlags::default(),
        Arc::clone(&first) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );
    assert_eq!(run_install(&ctx), 0);

    let second = Arc::new(RecordingExecutor::new().with_output("brew list -1", "git\ntmux\n"));
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::clone(&second) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );
    assert_eq!(run_install(&ctx), 0);
    assert_eq!(second.commands(), vec!["brew list -1"]);
    assert_eq!(log.failure_count(), 0);
}

#[test]
fn dry_run_changes_nothing() {
    let env = TestEnvBuilder::new()
        .with_manifest(&format!(
            "{GITCONFIG_MANIFEST}\n[post_install]\ncommand = [\"nvim\", \"+qa\"]\n"
        ))
        .with_source("git/.gitconfig")
        .build();
    let executor = Arc::new(RecordingExecutor::new());
    let (ctx, log) = env.context(
        RunFlags {
            dry_run: true,
            ..RunFlags::default()
        },
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 0);
    assert_eq!(executor.commands(), vec!["brew list -1"]);
    assert!(!env.home_path().join(".config").exists());
    assert!(!env.home_path().join(".gitconfig").exists());
    assert!(
        log.phase_entries()
            .iter()
            .all(|e| e.status == PhaseStatus::DryRun)
    );
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn link_conflict_halts_before_post_install() {
    let env = TestEnvBuilder::new()
        .with_manifest(&format!(
            "{GITCONFIG_MANIFEST}\n[post_install]\ncommand = [\"nvim\", \"+qa\"]\n"
        ))
        .with_source("git/.gitconfig")
        .with_home_file(".gitconfig", "[user]\n")
        .build();
    let executor = Arc::new(RecordingExecutor::new());
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 1);
    assert!(!executor.commands().iter().any(|c| c.starts_with("nvim")));
    assert_eq!(
        std::fs::read_to_string(env.home_path().join(".gitconfig")).unwrap(),
        "[user]\n",
        "refused conflicts leave the file alone"
    );
    let entries = log.phase_entries();
    assert_eq!(entries[2].status, PhaseStatus::Failed);
    assert_eq!(entries[3].status, PhaseStatus::Skipped);
    assert_eq!(entries[3].message.as_deref(), Some(HALTED));
}

#[test]
fn replace_policy_overwrites_conflicts() {
    let env = TestEnvBuilder::new()
        .with_manifest(
            "[links]\non_conflict = \"replace\"\nentries = [{ source = \"tmux/.tmux.conf\", target = \"~/.tmux.conf\" }]\n",
        )
        .with_source("tmux/.tmux.conf")
        .with_home_file(".tmux.conf", "old")
        .build();
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::new(RecordingExecutor::new()),
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 0);
    assert!(env.home_path().join(".tmux.conf").is_symlink());
    assert_eq!(log.failure_count(), 0);
}

#[test]
fn failed_install_halts_sequence() {
    let env = TestEnvBuilder::new()
        .with_manifest(GITCONFIG_MANIFEST)
        .with_source("git/.gitconfig")
        .build();
    let executor = Arc::new(RecordingExecutor::new().with_failure("brew install git"));
    let (ctx, log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 1);
    assert_eq!(executor.commands(), vec!["brew list -1", "brew install git"]);
    assert!(!env.home_path().join(".config").exists());
    let entries = log.phase_entries();
    assert_eq!(entries[0].status, PhaseStatus::Failed);
    assert!(entries[1..].iter().all(|e| e.status == PhaseStatus::Skipped));
}

#[test]
fn keep_going_continues_past_failed_install() {
    let env = TestEnvBuilder::new()
        .with_manifest(GITCONFIG_MANIFEST)
        .with_source("git/.gitconfig")
        .build();
    let executor = Arc::new(RecordingExecutor::new().with_failure("brew install git"));
    let (ctx, log) = env.context(
        RunFlags {
            keep_going: true,
            ..RunFlags::default()
        },
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 0);
    assert_eq!(
        executor.commands(),
        vec!["brew list -1", "brew install git", "brew install tmux"]
    );
    assert!(env.home_path().join(".gitconfig").is_symlink());
    assert_eq!(log.failure_count(), 0);
}

// ---------------------------------------------------------------------------
// Phase selection
// ---------------------------------------------------------------------------

#[test]
fn only_links_skips_everything_else() {
    let env = TestEnvBuilder::new()
        .with_manifest(GITCONFIG_MANIFEST)
        .with_source("git/.gitconfig")
        .build();
    let executor = Arc::new(RecordingExecutor::new());
    let (ctx, _log) = env.context(
        RunFlags::default(),
        Arc::clone(&executor) as _,
        Arc::new(ScriptedPrompter::answering(true)),
    );
    let opts = InstallOpts {
        skip: vec![],
        only: vec!["link".into()],
    };

    let all = phases::all_install_phases();
    let selected = all
        .iter()
        .map(AsRef::as_ref)
        .filter(|p: &&dyn Phase| opts.selects(p.name()));
    assert_eq!(phases::run_sequence(selected, &ctx), 0);
    assert!(executor.commands().is_empty());
    assert!(env.home_path().join(".gitconfig").is_symlink());
    assert!(!env.home_path().join(".config").exists());
}

// ---------------------------------------------------------------------------
// Root resolution
// ---------------------------------------------------------------------------

#[test]
fn relative_root_creates_resolvable_links() {
    use provision_cli::cli::GlobalOpts;
    use provision_cli::commands::{CommandSetup, resolve_root_from};
    use provision_cli::logging::Logger;

    let env = TestEnvBuilder::new()
        .with_manifest("[links]\nentries = [[\"git/.gitconfig\", \"~/.gitconfig\"]]\n")
        .with_source("git/.gitconfig")
        .build();
    let parent = env.root_path().parent().unwrap();
    let relative = env.root_path().file_name().unwrap();

    let root = resolve_root_from(Some(std::path::Path::new(relative)), None, parent).unwrap();
    assert!(root.is_absolute());

    let log = Arc::new(Logger::new("integration"));
    let executor = Arc::new(RecordingExecutor::new());
    let setup = CommandSetup::load(
        &root,
        None,
        env.home_path().to_path_buf(),
        log.as_ref(),
        executor.as_ref(),
    )
    .unwrap();
    let ctx = setup.context(
        &GlobalOpts::default(),
        Arc::clone(&log) as _,
        executor,
        Arc::new(ScriptedPrompter::answering(true)),
    );

    assert_eq!(run_install(&ctx), 0);
    let link = env.home_path().join(".gitconfig");
    assert!(std::fs::read_link(&link).unwrap().is_absolute());
    assert_eq!(
        std::fs::read_to_string(&link).unwrap(),
        "git/.gitconfig",
        "link must resolve to the source file"
    );
}
