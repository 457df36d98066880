// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where a poll session records what it saw.

use crate::command::CommandStatus;
use crate::id::CommandId;
use crate::message::Payload;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no command matches '{0}'")]
    UnknownCommand(String),
    #[error("'{prefix}' matches {count} commands")]
    AmbiguousPrefix { prefix: String, count: usize },
    #[error("{0}")]
    Rejected(String),
}

/// Persistence collaborator for a poll session.
///
/// Every failure is fatal to the session that hit it.
pub trait HistorySink: Send + 'static {
    /// Upsert the command and its latest invocation snapshot.
    fn put_command(&mut self, status: &CommandStatus) -> Result<(), HistoryError>;

    /// Append one output chunk for an instance of `command_id`.
    fn append_payload(&mut self, command_id: &CommandId, payload: &Payload) -> Result<(), HistoryError>;
}

impl<T: HistorySink> HistorySink for Arc<parking_lot::Mutex<T>> {
    fn put_command(&mut self, status: &CommandStatus) -> Result<(), HistoryError> {
        self.lock().put_command(status)
    }

    fn append_payload(&mut self, command_id: &CommandId, payload: &Payload) -> Result<(), HistoryError> {
        self.lock().append_payload(command_id, payload)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistorySink for NoHistory {
    fn put_command(&mut self, _status: &CommandStatus) -> Result<(), HistoryError> {
        Ok(())
    }

    fn append_payload(&mut self, _command_id: &CommandId, _payload: &Payload) -> Result<(), HistoryError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod recording {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum HistoryCall {
        PutCommand(CommandStatus),
        AppendPayload(CommandId, Payload),
    }

    #[derive(Default)]
    struct RecordingState {
        calls: Vec<HistoryCall>,
        fail_with: Option<String>,
    }

    /// In-memory sink that records every call and can be told to fail.
    #[derive(Clone, Default)]
    pub struct RecordingHistory {
        inner: Arc<Mutex<RecordingState>>,
    }

    impl RecordingHistory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail every subsequent call with `message`.
        pub fn fail_with(&self, message: impl Into<String>) {
            self.inner.lock().fail_with = Some(message.into());
        }

        pub fn calls(&self) -> Vec<HistoryCall> {
            self.inner.lock().calls.clone()
        }

        pub fn put_count(&self) -> usize {
            self.inner
                .lock()
                .calls
                .iter()
                .filter(|c| matches!(c, HistoryCall::PutCommand(_)))
                .count()
        }

        pub fn payloads(&self) -> Vec<Payload> {
            self.inner
                .lock()
                .calls
                .iter()
                .filter_map(|c| match c {
                    HistoryCall::AppendPayload(_, p) => Some(p.clone()),
                    HistoryCall::PutCommand(_) => None,
                })
                .collect()
        }

        fn record(&self, call: HistoryCall) -> Result<(), HistoryError> {
            let mut state = self.inner.lock();
            if let Some(message) = &state.fail_with {
                return Err(HistoryError::Rejected(message.clone()));
            }
            state.calls.push(call);
            Ok(())
        }
    }

    impl HistorySink for RecordingHistory {
        fn put_command(&mut self, status: &CommandStatus) -> Result<(), HistoryError> {
            self.record(HistoryCall::PutCommand(status.clone()))
        }

        fn append_payload(&mut self, command_id: &CommandId, payload: &Payload) -> Result<(), HistoryError> {
            self.record(HistoryCall::AppendPayload(command_id.clone(), payload.clone()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use recording::{HistoryCall, RecordingHistory};

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
