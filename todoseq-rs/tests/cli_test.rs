//! Integration tests for the todoseq CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn fixture_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .unwrap()
        .join("fixtures")
        .join("notes")
}

/// Run the todoseq binary with an isolated config and return (stdout, stderr, code).
fn run_todoseq(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let binary = env!("CARGO_BIN_EXE_todoseq");

    let output = Command::new(binary)
        .env("TODOSEQ_CONFIG", config_dir.join("config.toml"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute todoseq");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout should be JSON")
}

mod tasks_command {
    use super::*;

    #[test]
    fn scans_directory_recursively() {
        let config = TempDir::new().unwrap();
        let dir = fixture_dir();
        let (stdout, _, code) = run_todoseq(
            config.path(),
            &["tasks", dir.to_str().unwrap(), "--today", "2026-02-12"],
        );
        assert_eq!(code, 0);
        let value = json(&stdout);
        // agenda.org (3) + inbox.md (5) + journal (1); .trash is hidden
        assert_eq!(value["count"], 9);
        assert!(!stdout.contains("should be ignored"));
        assert!(!stdout.contains("example inside a block"));
    }

    #[test]
    fn sorts_by_urgency_with_limit() {
        let config = TempDir::new().unwrap();
        let inbox = fixture_dir().join("inbox.md");
        let (stdout, _, code) = run_todoseq(
            config.path(),
            &[
                "tasks",
                inbox.to_str().unwrap(),
                "--sort",
                "urgency",
                "--limit",
                "2",
                "--today",
                "2026-02-12",
            ],
        );
        assert_eq!(code, 0);
        let value = json(&stdout);
        assert_eq!(value["count"], 2);
        assert_eq!(value["tasks"][0]["text"], "Renew passport #admin");
        assert_eq!(value["tasks"][1]["state"], "DOING");
    }

    #[test]
    fn filters_by_state_priority_and_completion() {
        let config = TempDir::new().unwrap();
        let inbox = fixture_dir().join("inbox.md");
        let inbox = inbox.to_str().unwrap();

        let (stdout, _, _) = run_todoseq(config.path(), &["tasks", inbox, "--state", "WAITING"]);
        assert_eq!(json(&stdout)["count"], 1);

        let (stdout, _, _) = run_todoseq(config.path(), &["tasks", inbox, "--priority", "high"]);
        assert_eq!(json(&stdout)["count"], 2);

        let (stdout, _, _) = run_todoseq(
            config.path(),
            &["tasks", inbox, "--priority", "high", "--incomplete"],
        );
        assert_eq!(json(&stdout)["count"], 1);
    }

    #[test]
    fn org_files_use_org_parser() {
        let config = TempDir::new().unwrap();
        let agenda = fixture_dir().join("agenda.org");
        let (stdout, _, code) = run_todoseq(config.path(), &["tasks", agenda.to_str().unwrap()]);
        assert_eq!(code, 0);
        let value = json(&stdout);
        assert_eq!(value["tasks"][0]["priority"], "med");
        assert_eq!(value["tasks"][0]["tags"][0], "#phone");
        assert_eq!(value["tasks"][0]["scheduled_date"]["date"], "2026-02-12");
    }

    #[test]
    fn config_file_is_honored() {
        let config = TempDir::new().unwrap();
        fs::write(
            config.path().join("config.toml"),
            "[parser]\ninclude_comment_blocks = true\n",
        )
        .unwrap();
        let inbox = fixture_dir().join("inbox.md");
        let (stdout, _, code) = run_todoseq(config.path(), &["tasks", inbox.to_str().unwrap()]);
        assert_eq!(code, 0);
        assert!(stdout.contains("hidden in a comment"));
    }

    #[test]
    fn yaml_output() {
        let config = TempDir::new().unwrap();
        let agenda = fixture_dir().join("agenda.org");
        let (stdout, _, code) =
            run_todoseq(config.path(), &["--yaml", "tasks", agenda.to_str().unwrap()]);
        assert_eq!(code, 0);
        assert!(stdout.contains("count: 3"));
    }

    #[test]
    fn missing_path_exit_code() {
        let config = TempDir::new().unwrap();
        let (_, stderr, code) = run_todoseq(config.path(), &["tasks", "/no/such/notes"]);
        assert_eq!(code, 2);
        assert!(stderr.contains("File not found"));
    }

    #[test]
    fn empty_directory_exit_code() {
        let config = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();
        let (_, _, code) = run_todoseq(config.path(), &["tasks", empty.path().to_str().unwrap()]);
        assert_eq!(code, 2);
    }

    #[test]
    fn malformed_config_exit_code() {
        let config = TempDir::new().unwrap();
        fs::write(config.path().join("config.toml"), "[parser\n").unwrap();
        let inbox = fixture_dir().join("inbox.md");
        let (_, _, code) = run_todoseq(config.path(), &["tasks", inbox.to_str().unwrap()]);
        assert_eq!(code, 5);
    }
}

mod explain_command {
    use super::*;

    #[test]
    fn reports_skip_reasons() {
        let config = TempDir::new().unwrap();
        let inbox = fixture_dir().join("inbox.md");
        let (stdout, _, code) = run_todoseq(config.path(), &["explain", inbox.to_str().unwrap()]);
        assert_eq!(code, 0);
        let value = json(&stdout);
        assert_eq!(value["parser"], "markdown");
        let lines = value["lines"].as_array().unwrap();
        assert_eq!(lines[0]["line"], 1);
        assert_eq!(lines[0]["skipped"], "no-match");
        assert_eq!(lines[2]["task"]["state"], "TODO");
        assert_eq!(lines[14]["skipped"], "in-comment-block");
        assert_eq!(lines[18]["skipped"], "in-math-block");
    }
}

mod keywords_command {
    use super::*;

    #[test]
    fn lists_builtin_and_configured_keywords() {
        let config = TempDir::new().unwrap();
        fs::write(
            config.path().join("config.toml"),
            "[parser]\nadditional_task_keywords = [\"FIXME\"]\n",
        )
        .unwrap();
        let (stdout, _, code) = run_todoseq(config.path(), &["keywords"]);
        assert_eq!(code, 0);
        let value = json(&stdout);
        assert_eq!(value["pending"][0], "TODO");
        assert_eq!(value["additional"][0], "FIXME");
        assert_eq!(value["archived"][0], "ARCHIVED");
    }
}
