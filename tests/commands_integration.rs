//! End-to-end tests for the `lt` CLI against real git repositories.

use std::path::Path;
use std::process::Command;

use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use tempfile::TempDir;

fn lattice(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lt").unwrap();
    cmd.current_dir(dir).arg("--no-interactive");
    cmd
}

fn run_git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("run git");
    assert!(status.success(), "git {:?} failed", args);
}

fn write_commit(dir: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(dir.join(file), content).unwrap();
    run_git(dir, &["add", "."]);
    run_git(dir, &["commit", "-m", message]);
}

/// Set up a bare-bones repo with one commit on `main`, trunk initialized.
fn setup_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let path = dir.path();

    run_git(path, &["init", "-b", "main"]);
    run_git(path, &["config", "user.name", "Test User"]);
    run_git(path, &["config", "user.email", "test@example.com"]);
    write_commit(path, "README.md", "# repo\n", "initial commit");

    lattice(path)
        .args(["init", "--trunk", "main"])
        .assert()
        .success();

    dir
}

#[test]
fn init_creates_trunk_record() {
    let dir = setup_repo();

    lattice(dir.path())
        .args(["trunk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main"));
}

#[test]
fn init_twice_without_force_fails() {
    let dir = setup_repo();

    lattice(dir.path()).args(["init"]).assert().failure();
}

#[test]
fn track_and_log_show_branch() {
    let dir = setup_repo();
    let path = dir.path();

    run_git(path, &["checkout", "-b", "feature-a"]);
    write_commit(path, "a.txt", "a\n", "add a");

    lattice(path)
        .args(["branch", "track", "--parent", "main"])
        .assert()
        .success();

    lattice(path)
        .args(["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("feature-a"));
}

#[test]
fn untrack_removes_branch_from_log() {
    let dir = setup_repo();
    let path = dir.path();

    run_git(path, &["checkout", "-b", "feature-a"]);
    write_commit(path, "a.txt", "a\n", "add a");
    lattice(path)
        .args(["branch", "track", "--parent", "main"])
        .assert()
        .success();

    lattice(path)
        .args(["branch", "untrack"])
        .assert()
        .success();

    lattice(path)
        .args(["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("feature-a").not());
}

#[test]
fn restack_picks_up_new_trunk_commits() {
    let dir = setup_repo();
    let path = dir.path();

    run_git(path, &["checkout", "-b", "feature-a"]);
    write_commit(path, "a.txt", "a\n", "add a");
    lattice(path)
        .args(["branch", "track", "--parent", "main"])
        .assert()
        .success();

    run_git(path, &["checkout", "main"]);
    write_commit(path, "trunk.txt", "trunk\n", "advance trunk");

    run_git(path, &["checkout", "feature-a"]);
    lattice(path)
        .args(["branch", "restack"])
        .assert()
        .success();

    let merge_base = Command::new("git")
        .args(["merge-base", "main", "feature-a"])
        .current_dir(path)
        .output()
        .unwrap();
    let main_head = Command::new("git")
        .args(["rev-parse", "main"])
        .current_dir(path)
        .output()
        .unwrap();
    assert_eq!(
        String::from_utf8_lossy(&merge_base.stdout).trim(),
        String::from_utf8_lossy(&main_head.stdout).trim(),
        "feature-a should now be based on the latest trunk commit"
    );
}

#[test]
fn navigation_moves_between_tracked_branches() {
    let dir = setup_repo();
    let path = dir.path();

    run_git(path, &["checkout", "-b", "feature-a"]);
    write_commit(path, "a.txt", "a\n", "add a");
    lattice(path)
        .args(["branch", "track", "--parent", "main"])
        .assert()
        .success();

    run_git(path, &["checkout", "-b", "feature-b"]);
    write_commit(path, "b.txt", "b\n", "add b");
    lattice(path)
        .args(["branch", "track", "--parent", "feature-a"])
        .assert()
        .success();

    run_git(path, &["checkout", "main"]);
    lattice(path).args(["up", "2"]).assert().success();

    let current = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(path)
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&current.stdout).trim(), "feature-b");

    lattice(path).args(["bottom"]).assert().success();
    let current = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(path)
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&current.stdout).trim(), "main");
}

#[test]
fn commit_fixup_amends_and_restacks_descendants() {
    let dir = setup_repo();
    let path = dir.path();

    run_git(path, &["checkout", "-b", "feature-a"]);
    write_commit(path, "a.txt", "a\n", "add a");
    lattice(path)
        .args(["branch", "track", "--parent", "main"])
        .assert()
        .success();

    run_git(path, &["checkout", "-b", "feature-b"]);
    write_commit(path, "b.txt", "b\n", "add b");
    lattice(path)
        .args(["branch", "track", "--parent", "feature-a"])
        .assert()
        .success();

    run_git(path, &["checkout", "feature-a"]);
    std::fs::write(path.join("a.txt"), "a changed\n").unwrap();
    run_git(path, &["add", "."]);

    lattice(path)
        .args(["commit", "fixup"])
        .assert()
        .success();

    let merge_base = Command::new("git")
        .args(["merge-base", "feature-a", "feature-b"])
        .current_dir(path)
        .output()
        .unwrap();
    let feature_a_head = Command::new("git")
        .args(["rev-parse", "feature-a"])
        .current_dir(path)
        .output()
        .unwrap();
    assert_eq!(
        String::from_utf8_lossy(&merge_base.stdout).trim(),
        String::from_utf8_lossy(&feature_a_head.stdout).trim(),
        "feature-b should be restacked onto the amended feature-a"
    );
}

#[test]
fn config_get_set_list_round_trip() {
    let dir = setup_repo();
    let path = dir.path();

    lattice(path)
        .args(["config", "set", "remote", "upstream"])
        .assert()
        .success();

    lattice(path)
        .args(["config", "get", "remote"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upstream"));

    lattice(path)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("remote"));
}

#[test]
fn info_reports_parent_and_base() {
    let dir = setup_repo();
    let path = dir.path();

    run_git(path, &["checkout", "-b", "feature-a"]);
    write_commit(path, "a.txt", "a\n", "add a");
    lattice(path)
        .args(["branch", "track", "--parent", "main"])
        .assert()
        .success();

    lattice(path)
        .args(["info", "feature-a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main"));
}
