//! Check command: validate the manifest without changing anything.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::resources::package::PackageManager;

/// Run the check command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or has any warnings.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let executor = SystemExecutor;
    let setup = super::CommandSetup::init(global, log, &executor)?;
    report(&setup, log, &executor)
}

/// Report what the manifest would do and fail on warnings.
///
/// # Errors
///
/// Returns an error if validation produced warnings, or packages are
/// declared and no package manager is available.
pub fn report(setup: &super::CommandSetup, log: &dyn Log, executor: &dyn Executor) -> Result<()> {
    let config = &setup.config;
    let mut problems = setup.warnings.len();

    log.stage("Checking package manager");
    if config.packages.is_empty() {
        log.info("no packages declared");
    } else {
        match PackageManager::detect(config.package_manager, &setup.platform, executor) {
            Ok(manager) => log.info(&format!("using {manager}")),
            Err(e) => {
                log.error(&e.to_string());
                problems += 1;
            }
        }
    }
    if let Some(gate) = &config.confirm {
        log.info(&format!(
            "packages gated by '{}' (default: {}{})",
            gate.name,
            if gate.default { "yes" } else { "no" },
            if gate.noprompt { ", never asked" } else { "" }
        ));
    }

    if problems > 0 {
        anyhow::bail!("{problems} problem(s) found in {}", config.manifest_path.display());
    }
    log.info("manifest ok");
    Ok(())
}
