// e2e/cli_integration.rs — CLI integration tests.
//
// Drives the `chash-demo` binary as a black box via std::process::Command.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

fn chash_demo_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_chash-demo") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("chash-demo");
    p
}

fn make_config(dir: &TempDir, lines: &[&str]) -> PathBuf {
    let path = dir.path().join("reals.conf");
    let mut file = fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path
}

#[test]
fn runs_with_built_in_default_set_and_exits_zero() {
    let status = Command::new(chash_demo_bin())
        .status()
        .expect("failed to run chash-demo");
    assert!(status.success());
}

#[test]
fn prints_weights_and_clumps_sections() {
    let output = Command::new(chash_demo_bin())
        .output()
        .expect("failed to run chash-demo");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Init statistics"));
    assert!(stdout.contains("weights:"));
    assert!(stdout.contains("clumps:"));
    assert!(stdout.contains("Apply weights"));
}

#[test]
fn reads_config_file_and_lists_reals() {
    let dir = TempDir::new().unwrap();
    let config = make_config(&dir, &["alpha 1 100", "beta 2 50", "gamma 3 10"]);

    let output = Command::new(chash_demo_bin())
        .args(["--config", config.to_str().unwrap()])
        .output()
        .expect("failed to run chash-demo");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("alpha id=1 weight=100"));
    assert!(stdout.contains("beta id=2 weight=50"));
    assert!(stdout.contains("gamma id=3 weight=10"));
}

#[test]
fn adjust_flag_adds_a_third_report_section() {
    let dir = TempDir::new().unwrap();
    let config = make_config(&dir, &["alpha 1 100", "beta 2 1"]);

    let output = Command::new(chash_demo_bin())
        .args(["--config", config.to_str().unwrap(), "--adjust"])
        .output()
        .expect("failed to run chash-demo");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Adjust"));
}

#[test]
fn malformed_config_file_exits_non_zero_with_diagnostic() {
    let dir = TempDir::new().unwrap();
    let config = make_config(&dir, &["alpha 1 100 extra-field"]);

    let output = Command::new(chash_demo_bin())
        .args(["--config", config.to_str().unwrap()])
        .output()
        .expect("failed to run chash-demo");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.is_empty());
}

#[test]
fn missing_config_file_exits_non_zero() {
    let output = Command::new(chash_demo_bin())
        .args(["--config", "/nonexistent/path/reals.conf"])
        .output()
        .expect("failed to run chash-demo");
    assert!(!output.status.success());
}
