//! CLI integration tests for sieve commands.
//!
//! These tests focus on exit codes and basic behavioral verification,
//! not specific output formatting which may change.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};

/// Helper to create a temp directory for tests.
fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to get a sieve command.
fn sieve() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("sieve").unwrap()
}

/// Helper to run `sieve` with HOME isolated to the provided directory.
fn sieve_with_home(home: &Path) -> Command {
    let mut cmd = sieve();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

/// Creates a temp directory holding a root config, and a command running in it.
fn isolated(config: &str) -> (tempfile::TempDir, Command) {
    let dir = temp_dir();
    fs::write(
        dir.path().join(".sieve.toml"),
        format!("root = true\n{config}"),
    )
    .unwrap();
    let mut cmd = sieve_with_home(dir.path());
    cmd.current_dir(dir.path());
    (dir, cmd)
}

/// Parses command stdout as JSON.
fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

mod init {
    use super::*;

    #[test]
    fn creates_config_file() {
        let dir = temp_dir();

        sieve_with_home(dir.path())
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Created"));

        let contents = fs::read_to_string(dir.path().join(".sieve.toml")).unwrap();
        assert!(contents.contains("# [parser]"));
    }

    #[test]
    fn fails_if_config_exists() {
        let dir = temp_dir();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(project.join(".sieve.toml"), "existing").unwrap();

        sieve_with_home(dir.path())
            .current_dir(&project)
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn force_overwrites_existing() {
        let dir = temp_dir();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(project.join(".sieve.toml"), "not [valid toml").unwrap();

        sieve_with_home(dir.path())
            .current_dir(&project)
            .args(["init", "--force"])
            .assert()
            .success();

        let contents = fs::read_to_string(project.join(".sieve.toml")).unwrap();
        assert!(contents.contains("# [parser]"));
    }

    #[test]
    fn global_writes_to_home() {
        let home = temp_dir();
        let work = temp_dir();

        sieve_with_home(home.path())
            .current_dir(work.path())
            .args(["init", "--global"])
            .assert()
            .success();

        assert!(home.path().join(".sieve.toml").exists());
        assert!(!work.path().join(".sieve.toml").exists());
    }
}

mod parse {
    use super::*;

    #[test]
    fn prints_tree() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["parse", "a = 1 and (b > 2 or c is null)"])
            .assert()
            .success()
            .stdout(predicate::str::contains("And"))
            .stdout(predicate::str::contains("Or"))
            .stdout(predicate::str::contains("a = 1"))
            .stdout(predicate::str::contains("c IS NULL"));
    }

    #[test]
    fn canonical_output() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["parse", "--canonical", "x in (1,2,3) and y != 'z'"])
            .assert()
            .success()
            .stdout("x IN (1, 2, 3) AND y != 'z'\n");
    }

    #[test]
    fn sql_like_from_flag() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["parse", "--canonical", "--like", "sql", "name LIKE 'ab%'"])
            .assert()
            .success()
            .stdout("name LIKE '^ab.*$'\n");
    }

    #[test]
    fn sql_like_from_config() {
        let (_dir, mut cmd) = isolated("[parser]\nlike = \"sql\"\n");

        cmd.args(["parse", "--canonical", "name LIKE 'a_c'"])
            .assert()
            .success()
            .stdout("name LIKE '^a.c$'\n");
    }

    #[test]
    fn syntax_error_prints_hint() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["parse", "(a = 1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("error:"))
            .stderr(predicate::str::contains("hint:"));
    }

    #[test]
    fn configured_max_depth_is_enforced() {
        let (_dir, mut cmd) = isolated("[parser]\nmax_depth = 1\n");

        cmd.args(["parse", "((a = 1))"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("nesting"));
    }

    #[test]
    fn fails_on_invalid_config() {
        let dir = temp_dir();
        fs::write(dir.path().join(".sieve.toml"), "root = true\n[parser\n").unwrap();

        sieve_with_home(dir.path())
            .current_dir(dir.path())
            .args(["parse", "a = 1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }
}

mod mongo {
    use super::*;

    #[test]
    fn prints_filter_document() {
        let (_dir, mut cmd) = isolated("");

        let output = cmd
            .args(["mongo", "a = 1 AND b IN (2, 3)"])
            .output()
            .unwrap();

        assert!(output.status.success());
        assert_eq!(
            stdout_json(&output.stdout),
            json!({"$and": [{"a": 1}, {"b": {"$in": [2, 3]}}]})
        );
    }

    #[test]
    fn pipeline_wraps_match_stage() {
        let (_dir, mut cmd) = isolated("");

        let output = cmd
            .args(["mongo", "--pipeline", "a >= 2"])
            .output()
            .unwrap();

        assert_eq!(
            stdout_json(&output.stdout),
            json!([{"$match": {"a": {"$gte": 2}}}])
        );
    }

    #[test]
    fn pipeline_for_empty_filter_is_empty() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["mongo", "--pipeline", "--compact", ""])
            .assert()
            .success()
            .stdout("[]\n");
    }

    #[test]
    fn compact_is_one_line() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["mongo", "--compact", "a = 'x'"])
            .assert()
            .success()
            .stdout("{\"a\":\"x\"}\n");
    }

    #[test]
    fn negation_style_from_config_and_flag() {
        let (_dir, mut cmd) = isolated("[document]\nnegation = \"nor\"\n");
        let output = cmd.args(["mongo", "NOT (a = 1)"]).output().unwrap();
        assert_eq!(stdout_json(&output.stdout), json!({"$nor": [{"a": 1}]}));

        let (_dir, mut cmd) = isolated("");
        let output = cmd
            .args(["mongo", "--nor", "NOT (a = 1)"])
            .output()
            .unwrap();
        assert_eq!(stdout_json(&output.stdout), json!({"$nor": [{"a": 1}]}));
    }

    #[test]
    fn ordering_against_null_fails() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["mongo", "a > NULL"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unsupported operator"));
    }
}

mod filter {
    use super::*;

    /// Writes sample rows and returns the file name.
    fn write_rows(dir: &Path) -> &'static str {
        let rows = json!([
            {"name": "ada", "age": 36, "team": "core"},
            {"name": "bob", "age": 17},
            {"name": "cy", "age": 52, "team": "ops"},
        ]);
        fs::write(dir.join("rows.json"), rows.to_string()).unwrap();
        "rows.json"
    }

    #[test]
    fn prints_mask() {
        let (dir, mut cmd) = isolated("");
        let file = write_rows(dir.path());

        cmd.args(["filter", "age >= 18", file, "--mask"])
            .assert()
            .success()
            .stdout("true\nfalse\ntrue\n");
    }

    #[test]
    fn missing_values_match_is_null() {
        let (dir, mut cmd) = isolated("");
        let file = write_rows(dir.path());

        cmd.args(["filter", "team IS NULL", file, "--mask"])
            .assert()
            .success()
            .stdout("false\ntrue\nfalse\n");
    }

    #[test]
    fn prints_matching_rows_as_json() {
        let (dir, mut cmd) = isolated("");
        let file = write_rows(dir.path());

        let output = cmd
            .args([
                "filter",
                "name LIKE '^[ab]' AND NOT (age < 18)",
                file,
                "--json",
            ])
            .output()
            .unwrap();

        assert!(output.status.success());
        assert_eq!(
            stdout_json(&output.stdout),
            json!([{"name": "ada", "age": 36, "team": "core"}])
        );
    }

    #[test]
    fn prints_table_and_summary() {
        let (dir, mut cmd) = isolated("");
        let file = write_rows(dir.path());

        cmd.args(["filter", "team IN ('ops', 'qa')", file])
            .assert()
            .success()
            .stdout(predicate::str::contains("cy"))
            .stdout(predicate::str::contains("ada").not())
            .stdout(predicate::str::contains("1 of 3 rows match"));
    }

    #[test]
    fn reads_stdin() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["filter", "x = 2", "-", "--mask"])
            .write_stdin(r#"[{"x": 1}, {"x": 2}]"#)
            .assert()
            .success()
            .stdout("false\ntrue\n");
    }

    #[test]
    fn unknown_field_fails() {
        let (dir, mut cmd) = isolated("");
        let file = write_rows(dir.path());

        cmd.args(["filter", "salary > 10", file])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown field `salary`"));
    }

    #[test]
    fn non_array_input_fails() {
        let (dir, mut cmd) = isolated("");
        fs::write(dir.path().join("one.json"), r#"{"a": 1}"#).unwrap();

        cmd.args(["filter", "a = 1", "one.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected a JSON array"));
    }

    #[test]
    fn missing_file_fails() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["filter", "a = 1", "nope.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to read"));
    }
}

mod config {
    use super::*;

    #[test]
    fn prints_effective_settings() {
        let (_dir, mut cmd) = isolated("[cache]\ncapacity = 8\n");

        cmd.arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("[parser]"))
            .stdout(predicate::str::contains("capacity = 8"))
            .stderr(predicate::str::contains("source:"));
    }

    #[test]
    fn reports_warnings() {
        let (_dir, mut cmd) = isolated("[parser]\nquotes = [\"'\", \"(\"]\n");

        cmd.arg("config")
            .assert()
            .success()
            .stderr(predicate::str::contains("warning:"));
    }

    #[test]
    fn invalid_quote_fails() {
        let (_dir, mut cmd) = isolated("[parser]\nquotes = \"ab\"\n");

        cmd.arg("config")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }
}

mod logging {
    use super::*;

    #[test]
    fn verbose_logs_go_to_stderr() {
        let (_dir, mut cmd) = isolated("");

        cmd.args(["-v", "parse", "--canonical", "a = 1"])
            .assert()
            .success()
            .stdout("a = 1\n")
            .stderr(predicate::str::contains("DEBUG"));
    }
}
