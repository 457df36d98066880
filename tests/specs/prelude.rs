// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for driving the `fr` binary.

use std::path::{Path, PathBuf};
use std::process::Output;

pub use fr_core::{
    CommandId, CommandMetadata, CommandStatus, DocumentType, InstanceId, Invocation,
    InvocationSet, InvocationStatus, Payload,
};
use fr_storage::History;
use tempfile::TempDir;

/// `fr` with no state directory configured.
pub fn cli() -> Cmd {
    Cmd::new(None)
}

/// A throwaway state directory holding a history store.
pub struct StateDir {
    dir: TempDir,
}

impl StateDir {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.path().join("history.jsonl")
    }

    /// Write to the store the same way a poll session would.
    pub fn seed(&self, f: impl FnOnce(&mut Seeder)) {
        let mut seeder = Seeder { history: History::open(&self.history_path()).unwrap() };
        f(&mut seeder);
        seeder.history.flush().unwrap();
    }

    pub fn fr(&self) -> Cmd {
        Cmd::new(Some(self.dir.path()))
    }
}

pub struct Seeder {
    history: History,
}

impl Seeder {
    pub fn command(
        &mut self,
        id: &str,
        commands: &str,
        requested_at_ms: i64,
        invocations: &[(&str, InvocationStatus)],
    ) -> &mut Self {
        let command = CommandMetadata {
            command_id: CommandId::new(id),
            document: DocumentType::ShellScript,
            commands: commands.to_string(),
            targets: Vec::new(),
            timeout_secs: fr_core::DEFAULT_TIMEOUT_SECS,
            requested_at_ms,
            target_count: invocations.len(),
        };
        let set: InvocationSet = invocations
            .iter()
            .map(|(instance, status)| Invocation {
                instance_id: InstanceId::new(*instance),
                document: DocumentType::ShellScript,
                status: status.clone(),
                status_details: String::new(),
            })
            .collect();
        self.history.put_command(&CommandStatus::new(command, set)).unwrap();
        self
    }

    pub fn output(&mut self, id: &str, instance: &str, stdout: &str, stderr: &str) -> &mut Self {
        let payload = Payload {
            command_id: CommandId::new(id),
            instance_id: InstanceId::new(instance),
            stdout_chunk: stdout.to_string(),
            stderr_chunk: stderr.to_string(),
        };
        self.history.append_payload(&CommandId::new(id), &payload).unwrap();
        self
    }
}

/// Epoch ms `secs` seconds ago.
pub fn secs_ago(secs: i64) -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    now - secs * 1000
}

pub struct Cmd {
    inner: assert_cmd::Command,
}

impl Cmd {
    fn new(state_dir: Option<&Path>) -> Self {
        let mut inner = assert_cmd::Command::cargo_bin("fr").unwrap();
        inner.env("NO_COLOR", "1").env_remove("COLOR").env_remove("FR_LOG");
        match state_dir {
            Some(dir) => inner.env("FR_STATE_DIR", dir),
            None => inner.env_remove("FR_STATE_DIR"),
        };
        Self { inner }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.inner.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.inner.env(key, value);
        self
    }

    pub fn passes(mut self) -> Run {
        let output = self.inner.output().unwrap();
        let run = Run { output };
        assert!(run.output.status.success(), "expected success\n{}", run.describe());
        run
    }

    pub fn fails(mut self) -> Run {
        let output = self.inner.output().unwrap();
        let run = Run { output };
        assert!(!run.output.status.success(), "expected failure\n{}", run.describe());
        run
    }
}

pub struct Run {
    output: Output,
}

impl Run {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout lacks {needle:?}\n{}", self.describe());
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout().contains(needle), "stdout has {needle:?}\n{}", self.describe());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr lacks {needle:?}\n{}", self.describe());
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn code(self, expected: i32) -> Self {
        assert_eq!(self.output.status.code(), Some(expected), "{}", self.describe());
        self
    }

    fn describe(&self) -> String {
        format!("--- stdout ---\n{}\n--- stderr ---\n{}", self.stdout(), self.stderr())
    }
}
