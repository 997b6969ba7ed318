//! Specs: help and version output.

use crate::prelude::*;

#[test]
fn help_lists_the_migration_flags() {
    let output = smigrate(&["--help"]);
    assert!(output.status.success());

    let text = stdout(&output);
    for flag in [
        "--jobid",
        "--stepid",
        "--nodes",
        "--excluded-nodes",
        "--drain-node",
        "--partition",
        "--shared",
        "--spread",
        "--test",
    ] {
        assert!(text.contains(flag), "help is missing {flag}:\n{text}");
    }
}

#[test]
fn version_prints_the_crate_version() {
    let output = smigrate(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("smigrate"));
}
