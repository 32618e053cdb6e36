//! Implementation of `sieve mongo`.

use std::process::ExitCode;

use serde_json::Value as JsonValue;

use crate::cli::{
    args::MongoCommand,
    context::CommandContext,
    output::{print_json, report_emit_error},
};

/// Prints the filter document (or `$match` pipeline) for a filter expression.
pub fn run(ctx: &CommandContext, cmd: &MongoCommand) -> ExitCode {
    let tree = match ctx.parse_filter(&cmd.expr, &cmd.parser) {
        Ok(tree) => tree,
        Err(code) => return code,
    };
    let emitter = ctx.emitter(cmd.nor);

    let result = if cmd.pipeline {
        emitter
            .match_stage(&tree)
            .map(|stage| JsonValue::Array(stage.into_iter().collect()))
    } else {
        emitter.emit(&tree)
    };

    match result {
        Ok(doc) => print_json(&doc, cmd.compact),
        Err(e) => {
            report_emit_error(&e);
            ExitCode::FAILURE
        }
    }
}
