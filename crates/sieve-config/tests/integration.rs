//! Integration tests for sieve-config.
//!
//! Tests the full configuration loading pipeline: discovery -> parse -> merge -> validate.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use sieve_config::{
    CONFIG_FILENAME, Config, ConfigError, ConfigWarning, LikeMode, NegationMode, local_template,
};

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory and returns its path.
    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Writes a `.sieve.toml` into `rel_dir` and returns its path.
    fn create_config(&self, rel_dir: &str, content: &str) -> PathBuf {
        let path = self.create_dir(rel_dir).join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_root_config_alone() {
    let env = TestEnv::new();
    let file = env.create_config(
        "",
        r#"
root = true

[parser]
like = "sql"
"#,
    );

    let config = Config::load(env.path()).unwrap();

    assert_eq!(config.parser.like, LikeMode::Sql);
    assert_eq!(config.parser.max_depth, 64);
    assert_eq!(config.sources, vec![file]);
    assert_eq!(config.config_root.as_deref(), Some(env.path()));
}

#[test]
fn test_nested_configs_merge_by_setting() {
    let env = TestEnv::new();
    env.create_config(
        "",
        r#"
root = true

[parser]
max_depth = 10
quotes = ["'", "\""]

[document]
negation = "nor"
"#,
    );
    env.create_config("project", "[parser]\nmax_depth = 3\n");
    let work = env.create_dir("project/src");

    let config = Config::load(&work).unwrap();

    assert_eq!(config.parser.max_depth, 3);
    assert_eq!(config.parser.quotes, vec!['\'', '"']);
    assert_eq!(config.document.negation, NegationMode::Nor);
    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.config_root, Some(env.path().join("project")));
}

#[test]
fn test_root_config_hides_parents() {
    let env = TestEnv::new();
    env.create_config("", "[cache]\ncapacity = 1\n");
    env.create_config("project", "root = true\n");

    let config = Config::load(&env.create_dir("project/deep")).unwrap();

    assert_eq!(config.cache.capacity, 1024);
    assert_eq!(config.sources.len(), 1);
}

#[test]
fn test_parse_error_names_the_file() {
    let env = TestEnv::new();
    let file = env.create_config("", "root = true\n[parser]\nmax_depth = \"deep\"\n");

    let err = Config::load(env.path()).unwrap_err();

    match err {
        ConfigError::ParseToml { ref path, .. } => assert_eq!(path, &file),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_load_from_files_missing_file() {
    let env = TestEnv::new();
    let missing = env.path().join("nope.toml");

    let err = Config::load_from_files(&[missing]).unwrap_err();

    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_load_from_files_empty_is_default() {
    assert_eq!(Config::load_from_files(&[]).unwrap(), Config::default());
}

#[test]
fn test_validation_warnings_after_load() {
    let env = TestEnv::new();
    env.create_config(
        "",
        "root = true\n[parser]\nquotes = \"a\"\n[cache]\ncapacity = 0\n",
    );

    let warnings = Config::load(env.path()).unwrap().validate();

    assert_eq!(
        warnings,
        vec![
            ConfigWarning::UnusableQuote { quote: 'a' },
            ConfigWarning::ZeroCacheCapacity,
        ]
    );
}

#[test]
fn test_written_template_loads_as_defaults() {
    let env = TestEnv::new();
    env.create_config("", &format!("root = true\n{}", local_template()));

    let config = Config::load(env.path()).unwrap();

    assert_eq!(config.parser, Config::default().parser);
    assert!(config.validate().is_empty());
}

#[test]
fn test_effective_settings_reload_identically() {
    let env = TestEnv::new();
    env.create_config(
        "",
        "root = true\n[parser]\nlike = \"sql\"\nquotes = \"`\"\n[cache]\nenabled = false\n",
    );
    let config = Config::load(env.path()).unwrap();

    let other = TestEnv::new();
    let toml = config.settings_to_toml().unwrap();
    other.create_config("", &format!("root = true\n{toml}"));
    let reloaded = Config::load(other.path()).unwrap();

    assert_eq!(reloaded.parser, config.parser);
    assert_eq!(reloaded.cache, config.cache);
    assert_eq!(reloaded.document, config.document);
}
