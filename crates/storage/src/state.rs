// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized history built from journal replay.

use crate::journal::Entry;
use fr_core::{CommandId, CommandStatus, HistoryError, InstanceId, Payload};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Accumulated output of one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceOutput {
    pub stdout: String,
    pub stderr: String,
}

impl InstanceOutput {
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// A stored command: its latest snapshot and the output seen so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub status: CommandStatus,
    /// Keyed by instance in first-output order.
    pub outputs: IndexMap<InstanceId, InstanceOutput>,
}

impl CommandRecord {
    pub fn command_id(&self) -> &CommandId {
        self.status.command_id()
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    /// Keyed by command id in first-seen order.
    pub commands: IndexMap<CommandId, CommandRecord>,
}

impl MaterializedState {
    pub fn apply(&mut self, entry: &Entry) {
        match entry {
            Entry::PutCommand { status } => {
                let id = status.command_id().clone();
                match self.commands.get_mut(&id) {
                    Some(record) => record.status = status.clone(),
                    None => {
                        self.commands.insert(
                            id,
                            CommandRecord { status: status.clone(), outputs: IndexMap::new() },
                        );
                    }
                }
            }
            Entry::AppendPayload { payload } => {
                // Output for a command that was never put is kept under a
                // placeholder until its first snapshot arrives.
                let record = self
                    .commands
                    .entry(payload.command_id.clone())
                    .or_insert_with(|| placeholder(payload));
                let output = record.outputs.entry(payload.instance_id.clone()).or_default();
                output.stdout.push_str(&payload.stdout_chunk);
                output.stderr.push_str(&payload.stderr_chunk);
            }
        }
    }

    /// Look up a command by exact id or unique prefix.
    pub fn find(&self, id: &str) -> Result<&CommandRecord, HistoryError> {
        if let Some(record) = self.commands.get(id) {
            return Ok(record);
        }
        if id.is_empty() {
            return Err(HistoryError::UnknownCommand(String::new()));
        }
        let matches: Vec<_> =
            self.commands.values().filter(|r| r.command_id().starts_with(id)).collect();
        match matches.as_slice() {
            [record] => Ok(record),
            [] => Err(HistoryError::UnknownCommand(id.to_string())),
            _ => Err(HistoryError::AmbiguousPrefix { prefix: id.to_string(), count: matches.len() }),
        }
    }
}

fn placeholder(payload: &Payload) -> CommandRecord {
    let command = fr_core::CommandMetadata {
        command_id: payload.command_id.clone(),
        document: fr_core::DocumentType::ShellScript,
        commands: String::new(),
        targets: Vec::new(),
        timeout_secs: fr_core::DEFAULT_TIMEOUT_SECS,
        requested_at_ms: 0,
        target_count: 0,
    };
    CommandRecord {
        status: CommandStatus::new(command, fr_core::InvocationSet::new()),
        outputs: IndexMap::new(),
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
