//! Phase 1: install declared packages.
use anyhow::Result;

use super::{Context, Phase, PhaseResult, ProcessOpts, process_resource_states};
use crate::error::PhaseError;
use crate::prompt;
use crate::resources::package::{PackageManager, PackageResource, get_installed_packages};

/// Install declared packages, behind the optional confirmation gate.
///
/// The installed set is queried once; only missing packages are handed to
/// the package manager, one install call per package in declaration order.
#[derive(Debug)]
pub struct InstallPackages;

impl Phase for InstallPackages {
    fn name(&self) -> &'static str {
        "Install packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<PhaseResult> {
        if let Some(gate) = &ctx.config.confirm {
            let accepted = prompt::confirm(ctx.prompter.as_ref(), gate, ctx.non_interactive())?;
            ctx.log
                .debug(&format!("confirmation '{}': {accepted}", gate.name));
            if !accepted {
                return Ok(PhaseResult::Skipped(
                    PhaseError::Declined(gate.name.clone()).to_string(),
                ));
            }
        }

        let manager = PackageManager::detect(
            ctx.config.package_manager,
            &ctx.platform,
            ctx.executor.as_ref(),
        )?;
        ctx.log.debug(&format!("using {manager} package manager"));

        ctx.log.debug(&format!(
            "batch-checking {} packages with a single query",
            ctx.config.packages.len()
        ));
        let installed = get_installed_packages(manager, ctx.executor.as_ref())?;

        let resource_states = ctx.config.packages.iter().map(|pkg| {
            let resource = PackageResource::new(pkg.name.clone(), manager, ctx.executor.as_ref());
            let state = resource.state_from_installed(&installed);
            (resource, state)
        });

        process_resource_states(ctx, resource_states, &ProcessOpts::for_run("install", ctx))
    }
}
