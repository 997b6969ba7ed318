// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn captures_output_of_a_quick_command() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn reports_timeout_with_description() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let err = run_with_timeout(cmd, Duration::from_millis(50), "sleep test")
        .await
        .unwrap_err();
    assert!(err.contains("sleep test"));
    assert!(err.contains("timed out"));
}

#[tokio::test]
async fn missing_binary_is_an_error() {
    let cmd = Command::new("definitely-not-a-real-binary-xyz");
    assert!(run_with_timeout(cmd, Duration::from_secs(1), "probe")
        .await
        .is_err());
}
