//! Command-line definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SortBy;
use crate::platform::{MachineId, Tag};

/// Top-level CLI entry point for the component installer.
#[derive(Parser, Debug)]
#[command(
    name = "dotfiles",
    about = "Install dotfile components described by manifests",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Directory holding the component directories
    /// [default: $DOTFILES_SOURCE, else ./components]
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// Act as if running on this machine instead of the detected one
    #[arg(long, global = true, value_parser = parse_machine)]
    pub machine: Option<MachineId>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and place the selected components
    Install(ChangeOpts),
    /// Remove what the selected components placed and run their cleanup
    Remove(ChangeOpts),
    /// Show the selected components
    List(ListOpts),
    /// Print a shell completion script
    Completions {
        /// Shell to generate completions for.
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

/// Which components a command operates on.
#[derive(Parser, Debug, Clone, Default)]
pub struct SelectionOpts {
    /// Component directory names (default: every component)
    pub names: Vec<String>,

    /// Keep only components with a config entry carrying one of these tags
    #[arg(long, value_delimiter = ',', value_parser = parse_tag)]
    pub tags: Vec<Tag>,

    /// Drop components with these names
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Processing and display order
    #[arg(long, value_enum, default_value_t = SortBy::Priority)]
    pub sort: SortBy,
}

/// Options for the `install` and `remove` subcommands.
#[derive(Parser, Debug, Clone)]
pub struct ChangeOpts {
    /// Component selection.
    #[command(flatten)]
    pub selection: SelectionOpts,

    /// Overwrite or remove destinations this tool does not own
    #[arg(short, long)]
    pub force: bool,
}

/// Options for the `list` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ListOpts {
    /// Component selection.
    #[command(flatten)]
    pub selection: SelectionOpts,

    /// Print the manifests as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_machine(s: &str) -> Result<MachineId, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_tag(s: &str) -> Result<Tag, String> {
    s.parse().map_err(|e| format!("{e}"))
}
