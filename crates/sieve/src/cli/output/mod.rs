//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use comfy_table::{Cell, Table as DisplayTable, presets::UTF8_FULL_CONDENSED};
use serde_json::Value as JsonValue;
use sieve_emit::{EmitError, RowSource, Table, Value};
use sieve_query::QueryError;

/// Prints a filter parse error and, when one applies, a hint.
pub fn report_query_error(err: &QueryError) {
    eprintln!("error: {err}");
    if let Some(hint) = err.hint() {
        eprintln!("hint: {hint}");
    }
}

/// Prints an emitter error.
pub fn report_emit_error(err: &EmitError) {
    eprintln!("error: {err}");
    if let EmitError::UnknownField { .. } = err {
        eprintln!("hint: field names are case-sensitive and must exist in at least one row");
    }
}

/// Prints a JSON value, pretty unless `compact`.
pub fn print_json(value: &JsonValue, compact: bool) -> ExitCode {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Renders the rows selected by `mask` as a table, one column per field.
pub fn rows_table(table: &Table, mask: &[bool]) -> DisplayTable {
    let names: Vec<&str> = table.column_names().collect();
    let mut display = DisplayTable::new();
    display.load_preset(UTF8_FULL_CONDENSED);
    display.set_header(names.iter().map(Cell::new));

    let columns: Vec<&[Value]> = names
        .iter()
        .map(|name| table.column(name).unwrap_or_default())
        .collect();
    for (row, _) in mask.iter().enumerate().filter(|(_, keep)| **keep) {
        display.add_row(
            columns
                .iter()
                .map(|cells| Cell::new(cells.get(row).map(format_value).unwrap_or_default())),
        );
    }
    display
}

/// Formats a cell for table display; nulls are blank.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(x) => x.to_string(),
        Value::String(s) => s.clone(),
        Value::Date(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
