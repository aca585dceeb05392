//! Uninstall command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::phases;
use crate::prompt::TerminalPrompter;

/// Run the uninstall command.
///
/// Removes links that point into the dotfiles root. Packages and
/// directories are left in place.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or a link cannot be removed.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let setup = super::CommandSetup::init(global, log.as_ref(), executor.as_ref())?;
    let ctx = setup.context(
        global,
        Arc::clone(log) as Arc<dyn Log>,
        executor,
        Arc::new(TerminalPrompter),
    );
    let phases = phases::all_uninstall_phases();
    super::run_phases_to_completion(phases.iter().map(AsRef::as_ref), &ctx, log)
}
