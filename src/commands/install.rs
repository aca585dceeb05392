//! Install command: run the provisioning sequence.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::phases::{self, Phase};
use crate::prompt::TerminalPrompter;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or any phase fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    let version = option_env!("PROVISION_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("provision {version}"));

    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let setup = super::CommandSetup::init(global, log.as_ref(), executor.as_ref())?;
    let ctx = setup.context(
        global,
        Arc::clone(log) as Arc<dyn Log>,
        executor,
        Arc::new(TerminalPrompter),
    );

    let all = phases::all_install_phases();
    let selected = select(&all, opts, log.as_ref());
    super::run_phases_to_completion(selected, &ctx, log)
}

/// Apply the `--skip`/`--only` filters, keeping sequence order.
fn select<'a>(
    phases: &'a [Box<dyn Phase>],
    opts: &InstallOpts,
    log: &dyn Log,
) -> Vec<&'a dyn Phase> {
    phases
        .iter()
        .map(AsRef::as_ref)
        .filter(|phase| {
            let keep = opts.selects(phase.name());
            if !keep {
                log.debug(&format!("filtered out: {}", phase.name()));
            }
            keep
        })
        .collect()
}
