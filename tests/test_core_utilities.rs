//! Integration tests for core utility scripts

use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Runs `cmd` with `input` on stdin and kills it after `limit`.
fn run_with_input(mut cmd: Command, input: &str, limit: Duration) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn binary");
    {
        let mut stdin = child.stdin.take().expect("stdin is piped");
        stdin.write_all(input.as_bytes()).expect("Failed to write stdin");
    }

    let started = Instant::now();
    while child.try_wait().expect("Failed to poll child").is_none() {
        if started.elapsed() > limit {
            child.kill().ok();
            panic!("binary still running after {:?}", limit);
        }
        thread::sleep(Duration::from_millis(50));
    }
    child.wait_with_output().expect("Failed to collect output")
}

/// Binary started in an empty directory without Binance variables.
fn bare_command(bin: &str, dir: &TempDir) -> Command {
    let mut cmd = Command::new(bin);
    cmd.current_dir(dir.path())
        .env_remove("BINANCE_API_KEY")
        .env_remove("BINANCE_API_SECRET");
    cmd
}

#[test]
fn test_help_binary() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "help", "--quiet"])
        .output()
        .expect("Failed to execute help binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SPOT AUTOTRADER") && stdout.contains("COMMANDS"));
}

#[test]
fn test_simulate_binary_is_reproducible() {
    let run = || {
        Command::new("cargo")
            .args(["run", "--bin", "simulate", "--quiet", "--", "--seed", "7", "--max-trades", "25"])
            .output()
            .expect("Failed to execute simulate binary")
    };
    let first = run();
    let second = run();

    assert!(first.status.success());
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("Trade #1"));
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_simulate_rejects_bad_target() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "simulate", "--quiet", "--", "--initial", "10", "--target", "5"])
        .output()
        .expect("Failed to execute simulate binary");

    assert!(!output.status.success());
}

#[test]
fn test_health_check_without_configuration_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_with_input(
        bare_command(env!("CARGO_BIN_EXE_health_check"), &dir),
        "",
        Duration::from_secs(30),
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("BINANCE_API_KEY"));
}

#[test]
fn test_setup_stops_when_stdin_closes() {
    let dir = TempDir::new().unwrap();
    let output = run_with_input(
        bare_command(env!("CARGO_BIN_EXE_setup"), &dir),
        "",
        Duration::from_secs(10),
    );

    assert!(!output.status.success());
    assert!(output.stdout.len() < 4096);
    assert!(String::from_utf8_lossy(&output.stderr).contains("stdin closed"));
    assert!(!dir.path().join(".env").exists());
}

#[test]
fn test_setup_gives_up_after_invalid_keys() {
    let dir = TempDir::new().unwrap();
    let output = run_with_input(
        bare_command(env!("CARGO_BIN_EXE_setup"), &dir),
        "bad\nshort\nno spaces allowed\nvalidKeyButTooLate123\n",
        Duration::from_secs(10),
    );

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Invalid BINANCE_API_KEY").count(), 3);
    assert!(String::from_utf8_lossy(&output.stderr).contains("No valid BINANCE_API_KEY after 3 attempts"));
    assert!(!dir.path().join(".env").exists());
}
