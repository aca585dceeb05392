//! Machine provisioning engine.
//!
//! Reads a declarative `provision.toml` manifest and brings a machine in
//! line with it in a fixed order: install packages, ensure directories,
//! link config files from the dotfiles root, then run an optional
//! post-install command. Package installation can be gated behind a
//! yes/no confirmation.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load and validate the TOML manifest
//! - **[`resources`]**: idempotent `check + apply` primitives (packages, directories, links)
//! - **[`phases`]**: the ordered provisioning steps wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `uninstall`, `check`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod phases;
pub mod platform;
pub mod prompt;
pub mod resources;
