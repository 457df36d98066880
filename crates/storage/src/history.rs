// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-disk command history.

use crate::journal::{Entry, Journal};
use crate::state::{CommandRecord, InstanceOutput, MaterializedState};
use fr_core::{CommandId, CommandStatus, HistoryError, HistorySink, InstanceId, Message, Payload};
use indexmap::IndexMap;
use std::path::Path;

/// Journal-backed history of commands and their output.
///
/// Payloads are buffered; snapshots and [`History::flush`] reach the disk.
pub struct History {
    journal: Journal,
    state: MaterializedState,
}

impl History {
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        let (journal, entries) = Journal::open(path)?;
        let mut state = MaterializedState::default();
        for record in &entries {
            state.apply(&record.entry);
        }
        tracing::debug!(
            path = %path.display(),
            entries = entries.len(),
            commands = state.commands.len(),
            "history opened"
        );
        Ok(Self { journal, state })
    }

    pub fn path(&self) -> &Path {
        self.journal.path()
    }

    pub fn put_command(&mut self, status: &CommandStatus) -> Result<(), HistoryError> {
        self.record(Entry::PutCommand { status: status.clone() })?;
        self.journal.flush()
    }

    pub fn append_payload(
        &mut self,
        command_id: &CommandId,
        payload: &Payload,
    ) -> Result<(), HistoryError> {
        if payload.command_id != *command_id {
            return Err(HistoryError::Rejected(format!(
                "payload for {} recorded under {}",
                payload.command_id, command_id
            )));
        }
        if payload.is_empty() {
            return Ok(());
        }
        self.record(Entry::AppendPayload { payload: payload.clone() })
    }

    /// Every stored command in the order first recorded.
    pub fn commands(
        &self,
    ) -> impl DoubleEndedIterator<Item = &CommandRecord> + ExactSizeIterator {
        self.state.commands.values()
    }

    /// Look up a command by exact id or unique prefix.
    pub fn command(&self, id: &str) -> Result<&CommandRecord, HistoryError> {
        self.state.find(id)
    }

    pub fn command_outputs(
        &self,
        id: &str,
    ) -> Result<&IndexMap<InstanceId, InstanceOutput>, HistoryError> {
        Ok(&self.state.find(id)?.outputs)
    }

    /// Rebuild what a poll session would have shown: one payload per
    /// instance with its full output, then the last snapshot.
    pub fn replay(&self, id: &str) -> Result<Vec<Message>, HistoryError> {
        let record = self.state.find(id)?;
        let mut messages: Vec<Message> = record
            .outputs
            .iter()
            .filter(|(_, output)| !output.is_empty())
            .map(|(instance_id, output)| {
                Message::Payload(Payload {
                    command_id: record.command_id().clone(),
                    instance_id: instance_id.clone(),
                    stdout_chunk: output.stdout.clone(),
                    stderr_chunk: output.stderr.clone(),
                })
            })
            .collect();
        messages.push(Message::Control { status: record.status.clone() });
        Ok(messages)
    }

    pub fn flush(&mut self) -> Result<(), HistoryError> {
        self.journal.flush()
    }

    fn record(&mut self, entry: Entry) -> Result<(), HistoryError> {
        let record = self.journal.append(entry)?;
        self.state.apply(&record.entry);
        Ok(())
    }
}

impl HistorySink for History {
    fn put_command(&mut self, status: &CommandStatus) -> Result<(), HistoryError> {
        History::put_command(self, status)
    }

    fn append_payload(&mut self, command_id: &CommandId, payload: &Payload) -> Result<(), HistoryError> {
        History::append_payload(self, command_id, payload)
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
