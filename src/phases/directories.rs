//! Phase 2: ensure declared directories exist.
use anyhow::Result;

use super::{Context, Phase, PhaseResult, ProcessOpts, process_resources};
use crate::resources::directory::DirectoryResource;

/// Ensure every declared directory exists.
#[derive(Debug)]
pub struct CreateDirectories;

impl Phase for CreateDirectories {
    fn name(&self) -> &'static str {
        "Create directories"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.directories.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<PhaseResult> {
        let resources = ctx
            .config
            .directories
            .iter()
            .map(|dir| DirectoryResource::new(dir.path.clone()));
        process_resources(ctx, resources, &ProcessOpts::for_run("create", ctx))
    }
}
