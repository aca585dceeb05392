//! Generic resource processing loop: check state, apply or remove, collect stats.
use anyhow::Result;

use super::PhaseResult;
use super::context::Context;
use crate::resources::{Applicable, Resource, ResourceChange, ResourceState};

/// Counters for phases that process many items.
///
/// # Examples
///
/// ```
/// use provision_cli::phases::PhaseStats;
///
/// let stats = PhaseStats { changed: 1, already_ok: 2, skipped: 0 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok");
/// assert_eq!(stats.summary(true), "1 would change, 2 already ok");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
    /// Number of items skipped because they were invalid or failed.
    pub skipped: u32,
}

impl PhaseStats {
    /// Empty counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the appropriate [`PhaseResult`].
    #[must_use]
    pub fn finish(self, ctx: &Context) -> PhaseResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            PhaseResult::DryRun
        } else {
            PhaseResult::Ok
        }
    }
}

impl std::ops::AddAssign for PhaseStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// How the processing loop treats each item.
#[derive(Debug)]
pub struct ProcessOpts<'a> {
    /// Verb for log messages (e.g., "install", "link").
    pub verb: &'a str,
    /// Propagate item failures. If `false`, warn and count as skipped.
    pub bail_on_error: bool,
}

impl<'a> ProcessOpts<'a> {
    /// Fix missing and incorrect items; bail on failure unless the run keeps going.
    #[must_use]
    pub const fn for_run(verb: &'a str, ctx: &Context) -> Self {
        Self {
            verb,
            bail_on_error: !ctx.keep_going,
        }
    }
}

/// Process resources by checking each one's current state and applying as needed.
///
/// # Errors
///
/// Returns an error if a state check fails, or an item fails and
/// `opts.bail_on_error` is set.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<PhaseResult> {
    let mut stats = PhaseStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += process_single(ctx, &resource, current, opts)?;
    }
    Ok(stats.finish(ctx))
}

/// Process resources with pre-computed states (e.g. from one bulk package query).
///
/// # Errors
///
/// Returns an error if an item fails and `opts.bail_on_error` is set.
pub fn process_resource_states<R: Applicable>(
    ctx: &Context,
    resource_states: impl IntoIterator<Item = (R, ResourceState)>,
    opts: &ProcessOpts,
) -> Result<PhaseResult> {
    let mut stats = PhaseStats::new();
    for (resource, current) in resource_states {
        stats += process_single(ctx, &resource, current, opts)?;
    }
    Ok(stats.finish(ctx))
}

/// Process resources for removal.
///
/// Only resources in [`ResourceState::Correct`] are removed (they are "ours").
///
/// # Errors
///
/// Returns an error if a state check or a removal fails.
pub fn process_resources_remove<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<PhaseResult> {
    let mut stats = PhaseStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += remove_single(ctx, &resource, &current, verb)?;
    }
    Ok(stats.finish(ctx))
}

/// Process a single resource given its current state, returning a stats delta.
fn process_single<R: Applicable>(
    ctx: &Context,
    resource: &R,
    resource_state: ResourceState,
    opts: &ProcessOpts,
) -> Result<PhaseStats> {
    let desc = resource.description();
    let mut delta = PhaseStats::new();
    match resource_state {
        ResourceState::Correct => {
            ctx.log.note(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceState::Invalid { reason } => {
            if opts.bail_on_error {
                anyhow::bail!("cannot {} {desc}: {reason}", opts.verb);
            }
            ctx.log
                .warn(&format!("cannot {} {desc}: {reason}", opts.verb));
            delta.skipped += 1;
        }
        resource_state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if ctx.dry_run {
                let msg = if let ResourceState::Incorrect { ref current } = resource_state {
                    format!("would {} {desc} (currently {current})", opts.verb)
                } else {
                    format!("would {}: {desc}", opts.verb)
                };
                ctx.log.dry_run(&msg);
                delta.changed += 1;
                return Ok(delta);
            }
            delta += apply_resource(ctx, resource, opts)?;
        }
    }
    Ok(delta)
}

/// Apply a single resource change, returning a stats delta.
fn apply_resource<R: Applicable>(
    ctx: &Context,
    resource: &R,
    opts: &ProcessOpts,
) -> Result<PhaseStats> {
    let desc = resource.description();
    let mut delta = PhaseStats::new();
    let change = match resource.apply() {
        Ok(change) => change,
        Err(e) => {
            if opts.bail_on_error {
                return Err(e);
            }
            ctx.log.warn(&format!("failed to {} {desc}: {e:#}", opts.verb));
            delta.skipped += 1;
            return Ok(delta);
        }
    };

    match change {
        ResourceChange::Applied => {
            ctx.log.note(&format!("{}: {desc}", opts.verb));
            delta.changed += 1;
        }
        ResourceChange::AlreadyCorrect => {
            ctx.log.note(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceChange::Skipped { reason } => {
            if opts.bail_on_error {
                anyhow::bail!("failed to {} {desc}: {reason}", opts.verb);
            }
            ctx.log
                .warn(&format!("failed to {} {desc}: {reason}", opts.verb));
            delta.skipped += 1;
        }
    }
    Ok(delta)
}

/// Remove a single resource, returning a stats delta.
fn remove_single<R: Resource>(
    ctx: &Context,
    resource: &R,
    current: &ResourceState,
    verb: &str,
) -> Result<PhaseStats> {
    let desc = resource.description();
    let mut delta = PhaseStats::new();
    if *current != ResourceState::Correct {
        // not ours, or already gone
        delta.already_ok += 1;
        return Ok(delta);
    }
    if ctx.dry_run {
        ctx.log.dry_run(&format!("would {verb}: {desc}"));
        delta.changed += 1;
        return Ok(delta);
    }
    match resource.remove()? {
        ResourceChange::Applied => {
            ctx.log.note(&format!("{verb}: {desc}"));
            delta.changed += 1;
        }
        ResourceChange::AlreadyCorrect => delta.already_ok += 1,
        ResourceChange::Skipped { reason } => {
            ctx.log.debug(&format!("skipping {desc}: {reason}"));
            delta.skipped += 1;
        }
    }
    Ok(delta)
}
