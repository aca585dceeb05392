// Shared helpers for integration tests.
//
// Provides a temporary dotfiles root and home directory, a recording
// executor and a scripted prompter, so each integration test can run the
// real phases without touching the machine it runs on.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use provision_cli::config::{Config, MANIFEST_FILE};
use provision_cli::exec::{ExecResult, Executor, display_command};
use provision_cli::logging::{Log, Logger};
use provision_cli::phases::{Context, RunFlags};
use provision_cli::platform::{Os, Platform};
use provision_cli::prompt::{Prompter, Question};

/// One external command seen by [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Display form: `program arg1 arg2`.
    pub command: String,
    /// Whether the watched path existed when the command ran.
    pub watched_existed: bool,
}

/// Executor that records every call and answers from canned output.
///
/// Every command succeeds unless listed in `failing`.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<Call>>,
    outputs: HashMap<String, String>,
    failing: Vec<String>,
    watch: Option<PathBuf>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` with `stdout`.
    pub fn with_output(mut self, command: &str, stdout: &str) -> Self {
        self.outputs.insert(command.to_string(), stdout.to_string());
        self
    }

    /// Make `command` exit non-zero.
    pub fn with_failure(mut self, command: &str) -> Self {
        self.failing.push(command.to_string());
        self
    }

    /// Note whether `path` exists at the time of every call.
    pub fn watching(mut self, path: PathBuf) -> Self {
        self.watch = Some(path);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    fn record(&self, program: &str, args: &[&str]) -> ExecResult {
        let command = display_command(program, args);
        let watched_existed = self
            .watch
            .as_ref()
            .is_some_and(|p| p.symlink_metadata().is_ok());
        self.calls.lock().expect("calls lock").push(Call {
            command: command.clone(),
            watched_existed,
        });
        let success = !self.failing.contains(&command);
        ExecResult {
            stdout: self.outputs.get(&command).cloned().unwrap_or_default(),
            stderr: String::new(),
            success,
            code: Some(i32::from(!success)),
        }
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.record(program, args);
        if !result.success {
            anyhow::bail!("{} exited with 1", display_command(program, args));
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.record(program, args))
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.record(program, args))
    }

    fn which(&self, program: &str) -> bool {
        program == "brew"
    }
}

/// Prompter that always gives the same answer and counts questions.
#[derive(Debug)]
pub struct ScriptedPrompter {
    answer: bool,
    asked: AtomicUsize,
}

impl ScriptedPrompter {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, _question: &Question) -> anyhow::Result<bool> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

/// A dotfiles root and a separate home directory, both temporary.
pub struct TestEnv {
    pub root: tempfile::TempDir,
    pub home: tempfile::TempDir,
}

impl TestEnv {
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    /// Load the manifest written by the builder.
    pub fn load_config(&self) -> Config {
        Config::load(self.root.path(), None, self.home.path()).expect("load config")
    }

    /// Build a phase context over this environment.
    pub fn context(
        &self,
        flags: RunFlags,
        executor: Arc<dyn Executor>,
        prompter: Arc<dyn Prompter>,
    ) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::new("integration"));
        let ctx = Context::new(
            Arc::new(self.load_config()),
            Platform::new(Os::MacOs),
            Arc::clone(&log) as Arc<dyn Log>,
            flags,
            self.home.path().to_path_buf(),
            executor,
            prompter,
        );
        (ctx, log)
    }
}

/// Fluent builder for [`TestEnv`].
pub struct TestEnvBuilder {
    env: TestEnv,
}

impl TestEnvBuilder {
    pub fn new() -> Self {
        Self {
            env: TestEnv {
                root: tempfile::tempdir().expect("create root dir"),
                home: tempfile::tempdir().expect("create home dir"),
            },
        }
    }

    /// Write `content` as the root's manifest.
    pub fn with_manifest(self, content: &str) -> Self {
        std::fs::write(self.env.root.path().join(MANIFEST_FILE), content)
            .expect("write manifest");
        self
    }

    /// Create a link source file under the dotfiles root.
    pub fn with_source(self, relative: &str) -> Self {
        let path = self.env.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create source parent");
        }
        std::fs::write(&path, relative).expect("write source file");
        self
    }

    /// Create a regular file in the home directory.
    pub fn with_home_file(self, relative: &str, content: &str) -> Self {
        let path = self.env.home.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create home parent");
        }
        std::fs::write(path, content).expect("write home file");
        self
    }

    pub fn build(self) -> TestEnv {
        self.env
    }
}
