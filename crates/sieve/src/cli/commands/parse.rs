//! Implementation of `sieve parse`.

use std::process::ExitCode;

use crate::cli::{args::ParseCommand, context::CommandContext};

/// Prints the predicate tree for a filter expression.
pub fn run(ctx: &CommandContext, cmd: &ParseCommand) -> ExitCode {
    let tree = match ctx.parse_filter(&cmd.expr, &cmd.parser) {
        Ok(tree) => tree,
        Err(code) => return code,
    };

    if cmd.canonical {
        println!("{}", tree.to_filter_string());
    } else {
        print!("{tree}");
    }
    ExitCode::SUCCESS
}
