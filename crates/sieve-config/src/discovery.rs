//! Configuration file discovery.
//!
//! Discovers `.sieve.toml` files by walking up the directory tree from a starting point,
//! then appending the global `~/.sieve.toml` if present.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".sieve.toml";

/// Discovers all configuration files relevant to the given directory.
///
/// Returns paths in precedence order: closest to `cwd` first, global (`~/.sieve.toml`) last.
/// A file with `root = true` ends the walk, and the global file is then skipped.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if !candidate.is_file() {
            continue;
        }
        let stop = is_root_config(&candidate);
        configs.push(candidate);
        if stop {
            return configs;
        }
    }

    if let Some(global) = global_config_path().filter(|p| p.is_file() && !configs.contains(p)) {
        configs.push(global);
    }
    configs
}

/// Returns the path to the global configuration file (`~/.sieve.toml`).
///
/// Returns `None` if the home directory cannot be determined.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Checks if a path is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}
