//! Phase 4: the optional post-install command.
use anyhow::{Context as _, Result};

use super::{Context, Phase, PhaseResult};
use crate::exec::display_command;

/// Run the configured post-install command once every link is in place.
///
/// A non-zero exit is reported as a warning; only failing to start the
/// command fails the phase.
#[derive(Debug)]
pub struct RunPostInstall;

impl Phase for RunPostInstall {
    fn name(&self) -> &'static str {
        "Run post-install"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.post_install.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<PhaseResult> {
        let Some(post) = &ctx.config.post_install else {
            return Ok(PhaseResult::Skipped("no post-install command".to_string()));
        };
        let program = post.program();
        let args = post.args();
        let shown = display_command(program, &args);

        if ctx.dry_run {
            ctx.log.dry_run(&format!("would run: {shown}"));
            return Ok(PhaseResult::DryRun);
        }

        ctx.log.note(&format!("running: {shown}"));
        let spawned = if post.capture {
            ctx.executor.run_unchecked(program, &args)
        } else {
            ctx.executor.run_interactive(program, &args)
        };
        let result = spawned.with_context(|| format!("starting post-install command: {shown}"))?;

        for line in result.stdout.lines().chain(result.stderr.lines()) {
            if !line.trim().is_empty() {
                ctx.log.info(line);
            }
        }

        if !result.success {
            let code = result
                .code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            ctx.log
                .warn(&format!("post-install command exited with {code}: {shown}"));
        }
        Ok(PhaseResult::Ok)
    }
}
