// tests/cli_process.rs
//
// Runs the real `envlaunch` binary against throwaway project directories.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_envlaunch");

static SERIAL: Mutex<()> = Mutex::new(());

/// Tests write executable scripts and then exec them. A fork from a
/// concurrent test while a script is still open for writing makes the exec
/// fail with ETXTBSY, so the tests in this file run one at a time.
fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

/// Project where the "server" records its argv, one per line, and the
/// setup script records that it ran and then creates the marker.
fn project(setup_exit: i32) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        &dir.path().join("server.sh"),
        r#"printf '%s\n' "$@" > server-args.txt"#,
    );
    write_script(
        &dir.path().join("install_requirements.sh"),
        &format!(
            "echo \"$1\" > setup-ran.txt\nmkdir -p runtime/envs/koboldai/bin\ntouch runtime/envs/koboldai/bin/python\nexit {setup_exit}"
        ),
    );
    fs::write(
        dir.path().join("Launch.toml"),
        "[environment]\nkind = \"direct\"\n\n[server]\nprogram = \"./server.sh\"\n",
    )
    .unwrap();
    dir
}

fn run_in(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(BIN);
    cmd.args(args)
        .current_dir(dir)
        .env_remove("ENVLAUNCH_CONFIG")
        .env_remove("ENVLAUNCH_PROVISION_POLICY")
        .env_remove("ENVLAUNCH_DRY_RUN")
        .env("ENVLAUNCH_LOG", "debug");
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd.output().unwrap()
}

fn server_args(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("server-args.txt"))
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn provisions_then_execs_server_with_forwarded_args() {
    let _serial = serial();
    let dir = project(0);
    let out = run_in(dir.path(), &["--foo", "bar baz"], &[]);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        fs::read_to_string(dir.path().join("setup-ran.txt")).unwrap().trim(),
        "cuda"
    );
    assert_eq!(
        server_args(dir.path()),
        vec![
            "--bind", "0.0.0.0:5000", "--workers", "1", "--threads", "1", "--timeout", "0",
            "aiserver:app", "--foo", "bar baz",
        ]
    );
}

#[test]
fn second_run_skips_provisioning() {
    let _serial = serial();
    let dir = project(0);
    assert!(run_in(dir.path(), &[], &[]).status.success());
    fs::remove_file(dir.path().join("setup-ran.txt")).unwrap();

    let out = run_in(dir.path(), &[], &[]);
    assert!(out.status.success());
    assert!(!dir.path().join("setup-ran.txt").exists());
    assert!(dir.path().join("server-args.txt").exists());
}

#[test]
fn failed_setup_still_launches_by_default() {
    let _serial = serial();
    let dir = project(5);
    let out = run_in(dir.path(), &[], &[]);

    assert!(out.status.success());
    assert!(dir.path().join("server-args.txt").exists());
}

#[test]
fn fail_fast_propagates_setup_exit_code() {
    let _serial = serial();
    let dir = project(5);
    let out = run_in(
        dir.path(),
        &[],
        &[("ENVLAUNCH_PROVISION_POLICY", "fail-fast")],
    );

    assert_eq!(out.status.code(), Some(5));
    assert!(!dir.path().join("server-args.txt").exists());
    assert!(String::from_utf8_lossy(&out.stderr).contains("provisioning failed"));
}

#[test]
fn missing_server_program_exits_127() {
    let _serial = serial();
    let dir = project(0);
    fs::remove_file(dir.path().join("server.sh")).unwrap();

    let out = run_in(dir.path(), &[], &[]);
    assert_eq!(out.status.code(), Some(127));
    assert!(String::from_utf8_lossy(&out.stderr).contains("envlaunch error"));
}

#[test]
fn unresolvable_environment_manager_exits_non_zero() {
    let _serial = serial();
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("runtime/envs/koboldai/bin")).unwrap();
    fs::write(dir.path().join("runtime/envs/koboldai/bin/python"), "").unwrap();

    // Defaults: bin/micromamba does not exist here.
    let out = run_in(dir.path(), &[], &[]);
    assert_ne!(out.status.code(), Some(0));
}

#[test]
fn dry_run_prints_plan_and_runs_nothing() {
    let _serial = serial();
    let dir = project(0);
    let out = run_in(dir.path(), &["--reload"], &[("ENVLAUNCH_DRY_RUN", "1")]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("envlaunch dry-run"));
    assert!(stdout.contains("(absent)"));
    assert!(stdout.contains("install_requirements.sh cuda"));
    assert!(stdout.contains("aiserver:app --reload"));
    assert!(!dir.path().join("setup-ran.txt").exists());
    assert!(!dir.path().join("server-args.txt").exists());
}

#[test]
fn explicit_config_path_roots_relative_paths() {
    let _serial = serial();
    let dir = project(0);
    let elsewhere = tempfile::tempdir().unwrap();
    let config = dir.path().join("Launch.toml");

    let out = run_in(
        elsewhere.path(),
        &["--x"],
        &[("ENVLAUNCH_CONFIG", config.to_str().unwrap())],
    );

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(server_args(dir.path()).last().map(String::as_str), Some("--x"));
}

#[test]
fn invalid_config_exits_2() {
    let _serial = serial();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Launch.toml"), "[server]\nworkers = 0\n").unwrap();

    let out = run_in(dir.path(), &[], &[]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("workers"));
}

#[test]
fn non_utf8_config_path_is_honoured() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let _serial = serial();
    let dir = tempfile::tempdir().unwrap();
    let missing = OsString::from_vec(b"/nonexistent/\xffLaunch.toml".to_vec());

    let out = Command::new(BIN)
        .current_dir(dir.path())
        .env("ENVLAUNCH_CONFIG", &missing)
        .env("ENVLAUNCH_DRY_RUN", "1")
        .env_remove("ENVLAUNCH_PROVISION_POLICY")
        .env_remove("ENVLAUNCH_LOG")
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not exist"));
    assert!(out.stdout.is_empty());
}

#[test]
fn non_utf8_setting_exits_2() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let _serial = serial();
    let dir = project(0);
    let out = Command::new(BIN)
        .current_dir(dir.path())
        .env_remove("ENVLAUNCH_CONFIG")
        .env_remove("ENVLAUNCH_DRY_RUN")
        .env_remove("ENVLAUNCH_LOG")
        .env("ENVLAUNCH_PROVISION_POLICY", OsString::from_vec(b"fail\xff".to_vec()))
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("ENVLAUNCH_PROVISION_POLICY"));
    assert!(!dir.path().join("setup-ran.txt").exists());
}

#[test]
fn deleted_working_directory_is_an_io_error() {
    let _serial = serial();
    let parent = tempfile::tempdir().unwrap();
    let gone = parent.path().join("gone");
    fs::create_dir(&gone).unwrap();

    // Enter the directory, remove it, then start the launcher from inside it.
    let out = Command::new("sh")
        .arg("-c")
        .arg(r#"cd "$1" && rmdir "$1" && exec "$0""#)
        .arg(BIN)
        .arg(&gone)
        .env_remove("ENVLAUNCH_CONFIG")
        .env_remove("ENVLAUNCH_DRY_RUN")
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("IO error"));
}
