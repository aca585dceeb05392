//! Phase 3: link config files from the dotfiles root, and the reverse for uninstall.
use anyhow::Result;

use super::{
    Context, Phase, PhaseResult, ProcessOpts, process_resources, process_resources_remove,
};
use crate::resources::symlink::SymlinkResource;

fn link_resources(ctx: &Context) -> impl Iterator<Item = SymlinkResource> + '_ {
    ctx.config.links.iter().map(|link| {
        SymlinkResource::new(
            link.source_path(ctx.root()),
            link.target.clone(),
            ctx.config.on_conflict,
        )
    })
}

/// Link every declared config file into place.
#[derive(Debug)]
pub struct LinkConfigFiles;

impl Phase for LinkConfigFiles {
    fn name(&self) -> &'static str {
        "Link config files"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.links.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<PhaseResult> {
        process_resources(ctx, link_resources(ctx), &ProcessOpts::for_run("link", ctx))
    }
}

/// Remove links that still point into the dotfiles root.
#[derive(Debug)]
pub struct UnlinkConfigFiles;

impl Phase for UnlinkConfigFiles {
    fn name(&self) -> &'static str {
        "Unlink config files"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.links.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<PhaseResult> {
        process_resources_remove(ctx, link_resources(ctx), "unlink")
    }
}
