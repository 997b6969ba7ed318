//! Shared helpers for CLI specs.

use std::process::Output;

/// Run the smigrate binary with the given arguments.
pub fn smigrate(args: &[&str]) -> Output {
    assert_cmd::Command::cargo_bin("smigrate")
        .expect("smigrate binary")
        .args(args)
        .output()
        .expect("run smigrate")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
