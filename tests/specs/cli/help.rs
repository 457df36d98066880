// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn fr_help_shows_usage() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Browse recorded fleet commands")
        .stdout_has("Usage:")
        .stdout_has("history");
}

#[test]
fn fr_no_args_shows_usage_and_fails() {
    cli().fails().code(2).stderr_has("Usage:");
}

#[test]
fn fr_history_help_shows_subcommands() {
    cli()
        .args(&["history", "--help"])
        .passes()
        .stdout_has("list")
        .stdout_has("show")
        .stdout_has("export");
}

#[test]
fn fr_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}
