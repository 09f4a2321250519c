use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use confit::commands::{self, RunStatus};
use confit::{cli, logging};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, args.command.name());
    let log = Arc::new(logging::Logger::new(args.command.name()));

    match commands::run(&args, &log) {
        Ok(RunStatus::Clean) => ExitCode::SUCCESS,
        Ok(RunStatus::Attention) => ExitCode::from(1),
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::from(2)
        }
    }
}
