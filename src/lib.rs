//! Manifest-driven dotfile component installer.
//!
//! Each component is a directory holding a `manifest.toml` plus the files it
//! installs. The tool discovers components under a source root, validates
//! their manifests, orders and filters them, then runs their build commands
//! and places their config files by copy or symlink. Removal undoes the
//! placement and runs the component's cleanup commands.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: manifest schema, path expansion, resolution, catalog, selection, builds
//! - **[`resources`]**: idempotent `check + apply + remove` placement primitives
//! - **[`tasks`]**: per-component install and remove units of work
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `remove`, `list`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod resources;
pub mod tasks;
