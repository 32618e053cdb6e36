//! Command implementations and dispatch.

pub mod config;
pub mod filter;
pub mod init;
pub mod mongo;
pub mod parse;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands) -> ExitCode {
    let loaded = match command {
        Commands::Init(_) => CommandContext::load_cwd_only(),
        _ => CommandContext::load(),
    };
    let ctx = match loaded {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    match command {
        Commands::Parse(cmd) => parse::run(&ctx, &cmd),
        Commands::Mongo(cmd) => mongo::run(&ctx, &cmd),
        Commands::Filter(cmd) => filter::run(&ctx, &cmd),
        Commands::Init(cmd) => init::run(&ctx, &cmd),
        Commands::Config => config::run(&ctx),
    }
}
