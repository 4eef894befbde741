//! Command-line entry point for the `dotfiles` binary.
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};

use dotfiles_components::cli::{Cli, Command};
use dotfiles_components::commands;
use dotfiles_components::logging::{self, Logger};

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match args.command {
        Command::Install(opts) => {
            let log = init_logging(args.verbose, "install");
            commands::install::run(&args.global, &opts, &log)
        }
        Command::Remove(opts) => {
            let log = init_logging(args.verbose, "remove");
            commands::remove::run(&args.global, &opts, &log)
        }
        Command::List(opts) => {
            let log = init_logging(args.verbose, "list");
            commands::list::run(&args.global, &opts, &*log)
        }
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dotfiles", &mut std::io::stdout());
            Ok(())
        }
        Command::Version => {
            let version = option_env!("DOTFILES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("dotfiles {version}");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool, command: &str) -> Arc<Logger> {
    logging::init_subscriber(verbose, command);
    Arc::new(Logger::new(command))
}
