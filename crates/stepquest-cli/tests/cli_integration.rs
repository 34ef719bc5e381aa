//! CLI Integration Tests
//!
//! These tests run the `stepquest` binary against a throwaway database and
//! config file. No step source is configured, so nothing touches the
//! network.
//!
//! ```
//! cargo test --package stepquest-cli --test cli_integration
//! ```

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// A temp directory holding `config.toml` and `steps.db`.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("config.toml"), "[history]\ndays = 7\n")
            .expect("write config");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Run `stepquest` with the sandbox's config and database.
    fn run(&self, args: &[&str]) -> Output {
        self.run_with_stdin(args, None)
    }

    /// Like [`Sandbox::run`], but with info-level logging on stderr.
    fn run_logged(&self, args: &[&str]) -> Output {
        self.command(false)
            .args(args)
            .output()
            .expect("Failed to run stepquest binary")
    }

    fn run_with_stdin(&self, args: &[&str], stdin: Option<&Path>) -> Output {
        let mut cmd = self.command(true);
        cmd.args(args);
        if let Some(path) = stdin {
            cmd.stdin(std::fs::File::open(path).expect("open stdin file"));
        }
        cmd.output().expect("Failed to run stepquest binary")
    }

    fn command(&self, quiet: bool) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_stepquest"));
        cmd.arg("--config")
            .arg(self.path("config.toml"))
            .arg("--database")
            .arg(self.path("steps.db"))
            .arg("--no-color")
            .env_remove("NO_COLOR")
            .env_remove("STEPQUEST_CONFIG")
            .env_remove("STEPQUEST_DB")
            .env_remove("STEPQUEST_STYLE")
            .env_remove("RUST_LOG");
        if quiet {
            cmd.arg("--quiet");
        }
        cmd
    }

    fn write_csv(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("write csv");
        path
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        stderr(output)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// =============================================================================
// Help
// =============================================================================

#[test]
fn test_help_lists_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_stepquest"))
        .arg("--help")
        .output()
        .expect("Failed to run stepquest binary");
    assert!(output.status.success());

    let text = stdout(&output);
    for command in [
        "sync",
        "today",
        "import",
        "export",
        "dashboard",
        "pace",
        "list",
        "goal",
        "watch",
    ] {
        assert!(text.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_missing_config_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_stepquest"))
        .args(["--config", "/nonexistent/stepquest.toml", "pace"])
        .env_remove("STEPQUEST_DB")
        .output()
        .expect("Failed to run stepquest binary");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Config file not found"));
}

// =============================================================================
// Goal
// =============================================================================

#[test]
fn test_goal_defaults_and_updates() {
    let sandbox = Sandbox::new();

    let shown = json(&sandbox.run(&["--json", "goal", "show"]));
    assert_eq!(shown["yearly"], 3_000_000);
    assert_eq!(shown["derived"]["daily"], 8219);

    let set = sandbox.run(&["goal", "set", "3,650,000"]);
    assert!(set.status.success(), "{}", stderr(&set));
    assert!(stdout(&set).contains("Yearly goal set to 3650000 steps"));

    let shown = json(&sandbox.run(&["--json", "goal", "show"]));
    assert_eq!(shown["yearly"], 3_650_000);
    assert_eq!(shown["derived"]["daily"], 10_000);
    assert_eq!(shown["derived"]["last7"], 70_000);
}

#[test]
fn test_goal_set_logs_once() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_logged(&["goal", "set", "2500000"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stderr(&output).matches("Yearly goal set to 2500000").count(), 1);
}

#[test]
fn test_goal_rejects_zero() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["goal", "set", "0"]);
    assert!(!output.status.success());
}

// =============================================================================
// Import / Export
// =============================================================================

#[test]
fn test_import_then_export_newest_first() {
    let sandbox = Sandbox::new();
    let csv = sandbox.write_csv(
        "steps.csv",
        "date,steps\n2023-05-01,100\nnot-a-date,5\n2023-05-02,9000\n",
    );

    let report = json(&sandbox.run(&["--json", "import", csv.to_str().unwrap()]));
    assert_eq!(report["parsed"], 2);
    assert_eq!(report["imported"], 2);
    assert_eq!(report["skipped_existing"], 0);
    assert_eq!(report["rejected"].as_array().unwrap().len(), 1);
    assert_eq!(report["rejected"][0]["line"], 3);

    let export = sandbox.run(&["export"]);
    assert!(export.status.success());
    assert_eq!(
        stdout(&export),
        "date,steps\n2023-05-02,9000\n2023-05-01,100\n"
    );
}

#[test]
fn test_import_never_overwrites_recorded_days() {
    let sandbox = Sandbox::new();
    let first = sandbox.write_csv("a.csv", "2023-05-01,100\n2023-05-02,0\n");
    let second = sandbox.write_csv("b.csv", "2023-05-01,500\n2023-05-02,700\n");

    sandbox.run(&["import", first.to_str().unwrap()]);
    let report = json(&sandbox.run(&["--json", "import", second.to_str().unwrap()]));
    assert_eq!(report["imported"], 1);
    assert_eq!(report["skipped_existing"], 1);

    let export = sandbox.run(&["export"]);
    assert_eq!(
        stdout(&export),
        "date,steps\n2023-05-02,700\n2023-05-01,100\n"
    );
}

#[test]
fn test_import_from_stdin() {
    let sandbox = Sandbox::new();
    let csv = sandbox.write_csv("in.csv", "2023-07-04,4321\n");

    let output = sandbox.run_with_stdin(&["--json", "import", "-"], Some(&csv));
    assert_eq!(json(&output)["imported"], 1);
}

#[test]
fn test_export_empty_store_writes_nothing() {
    let sandbox = Sandbox::new();
    let target = sandbox.path("out.csv");

    let output = sandbox.run(&["export", "--output", target.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("No data to export"));
    assert!(!target.exists());
}

#[test]
fn test_export_json_to_file() {
    let sandbox = Sandbox::new();
    let csv = sandbox.write_csv("steps.csv", "2023-05-01,100\n2023-05-02,9000\n");
    sandbox.run(&["import", csv.to_str().unwrap()]);

    let target = sandbox.path("out.json");
    let output = sandbox.run(&["export", "--format", "json", "-o", target.to_str().unwrap()]);
    assert!(output.status.success());

    let content = std::fs::read_to_string(&target).unwrap();
    let records: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(records[0]["date"], "2023-05-02");
    assert_eq!(records[1]["steps"], 100);
}

// =============================================================================
// Lists and metrics
// =============================================================================

#[test]
fn test_list_groupings() {
    let sandbox = Sandbox::new();
    let csv = sandbox.write_csv(
        "steps.csv",
        "2023-04-30,1000\n2023-05-01,2000\n2023-05-02,3000\n",
    );
    sandbox.run(&["import", csv.to_str().unwrap()]);

    let days = json(&sandbox.run(&["--json", "list", "--by", "day", "--limit", "2"]));
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2023-05-02");

    let months = json(&sandbox.run(&["--json", "list", "--by", "month"]));
    assert_eq!(months[0]["total"], 5000);
    assert_eq!(months[1]["total"], 1000);

    // 2023-04-30 is a Sunday; the other two days start a new week
    let weeks = json(&sandbox.run(&["--json", "list", "--by", "week"]));
    assert_eq!(weeks[0]["week_start"], "2023-05-01");
    assert_eq!(weeks[0]["total"], 5000);
    assert_eq!(weeks[1]["total"], 1000);

    let text = sandbox.run(&["list", "--by", "month"]);
    assert!(stdout(&text).contains("3 days recorded, 2023-04-30 to 2023-05-02"));
}

#[test]
fn test_list_empty_store() {
    let sandbox = Sandbox::new();
    let text = sandbox.run(&["list"]);
    assert!(text.status.success());
    assert!(stdout(&text).contains("No step data recorded yet"));

    let empty = json(&sandbox.run(&["--json", "list"]));
    assert_eq!(empty, serde_json::json!([]));
}

#[test]
fn test_dashboard_json() {
    let sandbox = Sandbox::new();
    let snapshot = json(&sandbox.run(&["--json", "dashboard"]));
    assert_eq!(snapshot["yearly_goal"], 3_000_000);
    assert_eq!(snapshot["today"]["steps"], 0);
    assert_eq!(snapshot["today"]["goal"], 8219);
    assert!(snapshot["pace_steps"].as_i64().unwrap() < 0);
}

#[test]
fn test_pace_text() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["pace"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Year to date: 0 steps"));
    assert!(text.contains("steps behind"));
}

// =============================================================================
// Sync without a configured source
// =============================================================================

#[test]
fn test_sync_without_source_reports_unavailable() {
    let sandbox = Sandbox::new();
    let report = json(&sandbox.run(&["--json", "sync"]));
    assert_eq!(report["historical"]["status"], "source_unavailable");
    assert_eq!(report["live"]["status"], "source_unavailable");
    assert_eq!(report["snapshot"]["today"]["steps"], 0);

    let text = sandbox.run(&["sync"]);
    assert!(text.status.success());
    assert!(stdout(&text).contains("[!!] History:"));
}

#[test]
fn test_today_without_source() {
    let sandbox = Sandbox::new();
    let report = json(&sandbox.run(&["--json", "today"]));
    assert_eq!(report["live"]["status"], "source_unavailable");
}
