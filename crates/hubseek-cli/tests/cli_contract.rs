use std::process::{Command, Output};

use serde_json::Value;

fn run_cli(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hubseek-cli"));
    cmd.args(args);
    // Shield the contract from tokens present in the invoking environment.
    cmd.env_remove("HUBSEEK_TOKEN");
    cmd.env_remove("GITHUB_TOKEN");
    cmd.env_remove("GH_TOKEN");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("run hubseek-cli")
}

#[test]
fn empty_query_is_rejected_with_user_exit_code() {
    let output = run_cli(&["search-users", "--query", "   "], &[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("query must not be empty"),
        "stderr should carry the validation message"
    );
}

#[test]
fn unreachable_api_base_maps_to_runtime_exit_code_without_token_leak() {
    let secret = "hubseek-contract-secret";
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_cli(
        &["search-repos", "--query", "rust"],
        &[
            ("HUBSEEK_API_BASE", "http://127.0.0.1:1"),
            ("HUBSEEK_TOKEN", secret),
            ("HUBSEEK_DATA_DIR", &dir.path().to_string_lossy()),
        ],
    );

    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error:"), "stderr: {stderr}");
    assert!(!stdout.contains(secret));
    assert!(!stderr.contains(secret));
}

#[test]
fn history_starts_empty_and_reflects_failed_search_attempts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path().to_string_lossy().into_owned();

    let output = run_cli(
        &["history", "--scope", "repos"],
        &[("HUBSEEK_DATA_DIR", &data_dir)],
    );
    assert_eq!(output.status.code(), Some(0));

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(json.get("scope").and_then(Value::as_str), Some("repos"));
    assert_eq!(json.get("loaded").and_then(Value::as_bool), Some(true));
    assert_eq!(
        json.get("entries").and_then(Value::as_array).map(Vec::len),
        Some(0)
    );

    // The query is logged before the fetch, so even an unreachable API
    // leaves it in history.
    let search = run_cli(
        &["search-repos", "--query", "rust http"],
        &[
            ("HUBSEEK_API_BASE", "http://127.0.0.1:1"),
            ("HUBSEEK_DATA_DIR", &data_dir),
        ],
    );
    assert_eq!(search.status.code(), Some(1));

    let output = run_cli(
        &["history", "--scope", "repos"],
        &[("HUBSEEK_DATA_DIR", &data_dir)],
    );
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be json");
    let entries = json.get("entries").and_then(Value::as_array).expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].as_str(), Some("rust http"));
}

#[test]
fn help_flag_lists_subcommands() {
    let output = run_cli(&["--help"], &[]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("search-users"));
    assert!(stdout.contains("search-repos"));
    assert!(stdout.contains("contributors"));
    assert!(stdout.contains("history"));
}
