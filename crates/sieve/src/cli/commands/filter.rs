//! Implementation of `sieve filter`.

use std::{
    fs,
    io::{self, Read},
    path::Path,
    process::ExitCode,
};

use serde_json::Value as JsonValue;
use sieve_emit::{Table, to_mask};
use tracing::debug;

use crate::cli::{
    args::FilterCommand,
    context::CommandContext,
    output::{print_json, report_emit_error, rows_table},
};

/// Evaluates a filter expression over JSON rows and prints the result.
pub fn run(ctx: &CommandContext, cmd: &FilterCommand) -> ExitCode {
    let tree = match ctx.parse_filter(&cmd.expr, &cmd.parser) {
        Ok(tree) => tree,
        Err(code) => return code,
    };

    let rows = match read_rows(&cmd.file) {
        Ok(rows) => rows,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let evaluated = Table::from_json_rows(&rows)
        .and_then(|table| to_mask(&tree, &table).map(|mask| (table, mask)));
    let (table, mask) = match evaluated {
        Ok(result) => result,
        Err(e) => {
            report_emit_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let matched = mask.iter().filter(|keep| **keep).count();
    debug!(rows = rows.len(), matched, "evaluated filter");

    if cmd.mask {
        for keep in &mask {
            println!("{keep}");
        }
        return ExitCode::SUCCESS;
    }

    if cmd.json {
        let selected = rows
            .into_iter()
            .zip(&mask)
            .filter_map(|(row, keep)| keep.then_some(row))
            .collect();
        return print_json(&JsonValue::Array(selected), false);
    }

    if matched > 0 {
        println!("{}", rows_table(&table, &mask));
    }
    println!("{matched} of {} rows match", mask.len());
    ExitCode::SUCCESS
}

/// Reads a JSON array of rows from a file, or stdin for `-`.
fn read_rows(path: &Path) -> Result<Vec<JsonValue>, String> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        text
    } else {
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?
    };

    match serde_json::from_str(&text) {
        Ok(JsonValue::Array(rows)) => Ok(rows),
        Ok(_) => Err(format!(
            "{}: expected a JSON array of row objects",
            display_name(path)
        )),
        Err(e) => Err(format!("{}: invalid JSON: {e}", display_name(path))),
    }
}

/// Names the input in messages.
fn display_name(path: &Path) -> String {
    if path == Path::new("-") {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}
