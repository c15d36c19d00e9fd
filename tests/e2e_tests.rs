//! End-to-end tests for the liftlog binary.
//!
//! These tests run the compiled CLI:
//! - help, version and shell completions
//! - `analyze` on a database snapshot
//! - error reporting when the daemon is not running
//! - a full daemon session driven by `liftlog timer`

use std::path::{Path, PathBuf};
use std::process::{Child, Command as StdCommand, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;

use liftlog::model::SetType;
use liftlog::store::Database;

// ============================================================================
// Test Helpers
// ============================================================================

fn liftlog() -> Command {
    Command::cargo_bin("liftlog").unwrap()
}

/// Writes a database with two templates and one unknown exercise.
fn write_database(dir: &Path) -> PathBuf {
    let db = Database::new();

    let push = db.create_template("Push", None, Some(120)).unwrap();
    let bench = db.add_template_exercise(push.id, "Bench Press", None).unwrap();
    db.add_template_set(bench.id, SetType::Warmup, Some(10), Some(40.0))
        .unwrap();
    db.add_template_set(bench.id, SetType::Regular, Some(5), Some(80.0))
        .unwrap();
    db.add_template_set(bench.id, SetType::Regular, Some(5), Some(80.0))
        .unwrap();
    let mystery = db.add_template_exercise(push.id, "Mystery Move", None).unwrap();
    db.add_template_set(mystery.id, SetType::Regular, None, None)
        .unwrap();

    let legs = db.create_template("Legs", None, None).unwrap();
    let squat = db.add_template_exercise(legs.id, "Squat", None).unwrap();
    db.add_template_set(squat.id, SetType::Regular, Some(5), Some(100.0))
        .unwrap();
    db.add_template_set(squat.id, SetType::DropSet, Some(8), Some(80.0))
        .unwrap();

    let path = dir.join("liftlog.json");
    db.save(&path).unwrap();
    path
}

/// Daemon child process, killed on drop.
struct Daemon {
    child: Child,
    socket: PathBuf,
}

impl Daemon {
    fn start(dir: &Path) -> Self {
        let socket = dir.join("liftlog.sock");
        let child = StdCommand::new(cargo_bin("liftlog"))
            .arg("daemon")
            .arg("--socket")
            .arg(&socket)
            .arg("--settings")
            .arg(dir.join("settings.json"))
            .env("HOME", dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        while !socket.exists() {
            assert!(Instant::now() < deadline, "daemon did not create its socket");
            thread::sleep(Duration::from_millis(50));
        }

        Self { child, socket }
    }

    fn timer(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        liftlog()
            .arg("timer")
            .args(args)
            .arg("--socket")
            .arg(&self.socket)
            .assert()
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// ============================================================================
// Help and Completions
// ============================================================================

#[test]
fn test_help_lists_commands() {
    liftlog()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("daemon"))
        .stdout(predicate::str::contains("timer"))
        .stdout(predicate::str::contains("analyze"));
}

#[test]
fn test_version() {
    liftlog()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("liftlog "));
}

#[test]
fn test_bash_completions() {
    liftlog()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("liftlog"));
}

#[test]
fn test_invalid_duration_is_rejected() {
    liftlog()
        .args(["timer", "start", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duration"));
}

// ============================================================================
// Analyze
// ============================================================================

#[test]
fn test_analyze_all_templates() {
    let dir = tempfile::tempdir().unwrap();
    let db = write_database(dir.path());

    liftlog()
        .arg("analyze")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("All templates (2)"))
        .stdout(predicate::str::contains("Chest"))
        .stdout(predicate::str::contains("2.0  (primary 2, auxiliary 0)"))
        .stdout(predicate::str::contains("Unmapped exercises: Mystery Move"));
}

#[test]
fn test_analyze_with_warmup_and_drop_sets() {
    let dir = tempfile::tempdir().unwrap();
    let db = write_database(dir.path());

    liftlog()
        .arg("analyze")
        .arg(&db)
        .args(["--include-warmup", "--include-drop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warm-up sets included, drop sets included"))
        .stdout(predicate::str::contains("3.0  (primary 3, auxiliary 0)"))
        .stdout(predicate::str::contains("2.0  (primary 2, auxiliary 0)"));
}

#[test]
fn test_analyze_single_template() {
    let dir = tempfile::tempdir().unwrap();
    let db = write_database(dir.path());

    liftlog()
        .arg("analyze")
        .arg(&db)
        .args(["--template", "legs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Template: Legs"))
        .stdout(predicate::str::contains("Quads"))
        .stdout(predicate::str::contains("Chest").not());
}

#[test]
fn test_analyze_missing_database() {
    let dir = tempfile::tempdir().unwrap();

    liftlog()
        .arg("analyze")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Failed to open database"));
}

// ============================================================================
// Daemon
// ============================================================================

#[test]
fn test_timer_without_daemon_fails() {
    let dir = tempfile::tempdir().unwrap();

    liftlog()
        .args(["timer", "status", "--socket"])
        .arg(dir.path().join("none.sock"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("liftlog daemon"));
}

#[test]
fn test_daemon_session() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = Daemon::start(dir.path());

    daemon
        .timer(&["status"])
        .success()
        .stdout(predicate::str::contains("State: Idle"));

    daemon
        .timer(&["start", "1m30s"])
        .success()
        .stdout(predicate::str::contains("Rest timer started"));

    daemon
        .timer(&["add", "30"])
        .success()
        .stdout(predicate::str::contains("of 2:00 left"));

    daemon
        .timer(&["pause"])
        .success()
        .stdout(predicate::str::contains("Rest timer paused"));

    daemon
        .timer(&["status"])
        .success()
        .stdout(predicate::str::contains("State: Paused"));

    daemon
        .timer(&["pause"])
        .failure()
        .stderr(predicate::str::contains("No running rest timer"));

    daemon
        .timer(&["skip"])
        .success()
        .stdout(predicate::str::contains("Rest timer skipped"));

    daemon
        .timer(&["status"])
        .success()
        .stdout(predicate::str::contains("State: Idle"));
}
