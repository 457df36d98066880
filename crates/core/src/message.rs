// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages yielded by a poll session.

use crate::command::CommandStatus;
use crate::id::{CommandId, InstanceId};
use crate::log_event::{Channel, LogEvent, StreamName, StreamNameError};
use serde::{Deserialize, Serialize};

/// A chunk of output from one instance.
///
/// A payload built from a single log event fills exactly one of the two
/// chunks; stored payloads may carry both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub command_id: CommandId,
    pub instance_id: InstanceId,
    #[serde(default)]
    pub stdout_chunk: String,
    #[serde(default)]
    pub stderr_chunk: String,
}

impl Payload {
    pub fn from_log_event(event: &LogEvent) -> Result<Self, StreamNameError> {
        let stream = StreamName::parse(&event.stream_name)?;
        let (stdout_chunk, stderr_chunk) = match stream.channel {
            Channel::Stdout => (event.message.clone(), String::new()),
            Channel::Stderr => (String::new(), event.message.clone()),
        };
        Ok(Payload {
            command_id: stream.command_id,
            instance_id: stream.instance_id,
            stdout_chunk,
            stderr_chunk,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.stdout_chunk.is_empty() && self.stderr_chunk.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Payload(Payload),
    /// Full invocation snapshot, sent whenever some instance completed.
    Control { status: CommandStatus },
}

impl Message {
    pub fn as_payload(&self) -> Option<&Payload> {
        match self {
            Message::Payload(payload) => Some(payload),
            Message::Control { .. } => None,
        }
    }

    pub fn as_control(&self) -> Option<&CommandStatus> {
        match self {
            Message::Control { status } => Some(status),
            Message::Payload(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
