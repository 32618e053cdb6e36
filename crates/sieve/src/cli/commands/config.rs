//! Implementation of `sieve config`.

use std::process::ExitCode;

use sieve_config::is_global_config;

use crate::cli::context::CommandContext;

/// Shows effective configuration settings, then any validation warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;

    match config.settings_to_toml() {
        Ok(toml) => print!("{toml}"),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    }

    if config.sources.is_empty() {
        eprintln!("note: no configuration files found, showing defaults");
    }
    for source in &config.sources {
        let scope = if is_global_config(source) { "global" } else { "local" };
        eprintln!("source: {} ({scope})", source.display());
    }
    for warning in config.validate() {
        eprintln!("warning: {warning}");
    }
    ExitCode::SUCCESS
}
