//! The fixed provisioning sequence and the phases it runs.
//!
//! Install runs [`packages::InstallPackages`], [`directories::CreateDirectories`],
//! [`links::LinkConfigFiles`] and [`post_install::RunPostInstall`] in that
//! order. A failed phase halts the sequence unless the run keeps going.
pub mod context;
pub mod directories;
pub mod links;
pub mod packages;
pub mod post_install;
mod processing;

pub use context::{Context, RunFlags};
pub use processing::{
    PhaseStats, ProcessOpts, process_resource_states, process_resources,
    process_resources_remove,
};

use anyhow::Result;

use crate::logging::{Head, PhaseStatus};

/// Reason recorded for phases that never ran because an earlier one failed.
pub const HALTED: &str = "halted after earlier failure";

/// Result of a single phase execution.
///
/// # Examples
///
/// ```
/// use provision_cli::phases::PhaseResult;
///
/// let skipped = PhaseResult::Skipped("'install_packages' declined".into());
/// assert!(matches!(skipped, PhaseResult::Skipped(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseResult {
    /// Phase completed successfully.
    Ok,
    /// Phase chose not to run (e.g. its confirmation gate was declined).
    Skipped(String),
    /// Phase ran in dry-run mode.
    DryRun,
}

/// One step of the provisioning sequence.
pub trait Phase {
    /// Human-readable phase name, shown as the stage header.
    fn name(&self) -> &'static str;

    /// Whether the phase has anything to do. Phases with nothing declared
    /// are recorded as not applicable and make no calls.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the phase.
    ///
    /// # Errors
    ///
    /// Returns an error if an item fails (and the run does not keep going)
    /// or the phase cannot start at all.
    fn run(&self, ctx: &Context) -> Result<PhaseResult>;
}

/// The install sequence, in execution order.
#[must_use]
pub fn all_install_phases() -> Vec<Box<dyn Phase>> {
    vec![
        Box::new(packages::InstallPackages),
        Box::new(directories::CreateDirectories),
        Box::new(links::LinkConfigFiles),
        Box::new(post_install::RunPostInstall),
    ]
}

/// The uninstall sequence, in execution order.
#[must_use]
pub fn all_uninstall_phases() -> Vec<Box<dyn Phase>> {
    vec![Box::new(links::UnlinkConfigFiles)]
}

/// Execute a phase inside its stage heading and record the result.
pub fn execute(phase: &dyn Phase, ctx: &Context) -> PhaseStatus {
    if !phase.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping phase: {} (nothing declared)", phase.name()));
        ctx.log
            .record_phase(phase.name(), PhaseStatus::NotApplicable, None);
        return PhaseStatus::NotApplicable;
    }

    let _head = Head::enter(ctx.log.as_ref(), phase.name());

    let (status, message) = match phase.run(ctx) {
        Ok(PhaseResult::Ok) => (PhaseStatus::Ok, None),
        Ok(PhaseResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            (PhaseStatus::Skipped, Some(reason))
        }
        Ok(PhaseResult::DryRun) => (PhaseStatus::DryRun, None),
        Err(e) => {
            let message = format!("{e:#}");
            ctx.log.error(&format!("{}: {message}", phase.name()));
            (PhaseStatus::Failed, Some(message))
        }
    };
    ctx.log
        .record_phase(phase.name(), status, message.as_deref());
    status
}

/// Run `phases` in order and return how many failed.
///
/// After the first failure the remaining phases are recorded as skipped,
/// unless the context keeps going.
pub fn run_sequence<'a>(phases: impl IntoIterator<Item = &'a dyn Phase>, ctx: &Context) -> usize {
    let mut failures = 0;
    for phase in phases {
        if failures > 0 && !ctx.keep_going {
            ctx.log
                .record_phase(phase.name(), PhaseStatus::Skipped, Some(HALTED));
            continue;
        }
        if execute(phase, ctx) == PhaseStatus::Failed {
            failures += 1;
        }
    }
    failures
}
