use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};
use std::sync::Arc;

use provision_cli::cli::{Cli, Command};
use provision_cli::commands;
use provision_cli::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    let start_logging = |name: &str| {
        init_subscriber(args.verbose, name);
        Arc::new(Logger::new(name))
    };

    match &args.command {
        Command::Install(opts) => {
            let log = start_logging(args.command.log_name());
            commands::install::run(&args.global, opts, &log)
        }
        Command::Uninstall => {
            let log = start_logging(args.command.log_name());
            commands::uninstall::run(&args.global, &log)
        }
        Command::Check => {
            let log = start_logging(args.command.log_name());
            commands::check::run(&args.global, log.as_ref())
        }
        Command::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "provision",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        Command::Version => {
            let version = option_env!("PROVISION_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("provision {version}");
            Ok(())
        }
    }
}
