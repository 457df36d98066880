// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::exit_error::ExitError;

pub const HISTORY_FILE: &str = "history.jsonl";

/// Resolve state directory: FR_STATE_DIR > XDG_STATE_HOME/fr > ~/.local/state/fr
pub fn state_dir() -> Result<PathBuf, ExitError> {
    if let Some(dir) = non_empty("FR_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("fr"));
    }
    let home = non_empty("HOME")
        .ok_or_else(|| ExitError::new(2, "cannot locate state directory: HOME is not set"))?;
    Ok(PathBuf::from(home).join(".local/state/fr"))
}

pub fn history_path() -> Result<PathBuf, ExitError> {
    Ok(state_dir()?.join(HISTORY_FILE))
}

/// Log filter from `FR_LOG` (default `warn`).
pub fn log_filter() -> EnvFilter {
    non_empty("FR_LOG")
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
