//! Command-line interface for the `sieve` filter-expression tool.

use std::process::ExitCode;

use clap::Parser;
use sieve::cli::{args::Cli, commands, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    commands::run(cli.command)
}
