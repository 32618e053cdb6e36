//! Implementation of `sieve init`.

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use sieve_config::{CONFIG_FILENAME, global_config_path, global_template, local_template};

use crate::cli::{args::InitCommand, context::CommandContext};

/// Where `sieve init` writes, and which template it uses.
#[derive(Debug, PartialEq, Eq)]
enum InitTarget {
    /// `.sieve.toml` in the working directory.
    Project(PathBuf),
    /// `~/.sieve.toml`.
    Global(PathBuf),
}

impl InitTarget {
    /// Picks the target; running in the home directory always means global.
    fn resolve(cwd: &Path, global: bool, home_config: Option<PathBuf>) -> Result<Self, String> {
        let in_home = home_config
            .as_deref()
            .and_then(Path::parent)
            .is_some_and(|home| home == cwd);

        if global || in_home {
            home_config
                .map(Self::Global)
                .ok_or_else(|| "could not determine home directory".to_string())
        } else {
            Ok(Self::Project(cwd.join(CONFIG_FILENAME)))
        }
    }

    /// The file to write.
    fn path(&self) -> &Path {
        match self {
            Self::Project(path) | Self::Global(path) => path,
        }
    }

    /// The commented template for this target.
    fn template(&self) -> String {
        match self {
            Self::Project(_) => local_template(),
            Self::Global(_) => global_template(),
        }
    }
}

/// Writes a commented `.sieve.toml` template.
pub fn run(ctx: &CommandContext, cmd: &InitCommand) -> ExitCode {
    let target = match InitTarget::resolve(&ctx.cwd, cmd.global, global_config_path()) {
        Ok(target) => target,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };
    let path = target.path();

    if path.exists() && !cmd.force {
        eprintln!("error: config file already exists: {}", path.display());
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    if let Err(e) = fs::write(path, target.template()) {
        eprintln!("error: failed to write {}: {e}", path.display());
        return ExitCode::FAILURE;
    }

    println!("Created {}", path.display());
    println!("Every setting is commented out; uncomment to change it, then run `sieve config`.");
    ExitCode::SUCCESS
}
