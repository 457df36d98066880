// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log events and the stream names the service writes them under.
//!
//! Stream names have the shape `{command_id}/{instance_id}/{document}/{channel}`,
//! e.g. `7017174d-.../i-02a6983afe9f00d21/aws-runShellScript/stdout`.

use crate::document::DocumentType;
use crate::id::{CommandId, InstanceId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One line of output as returned by the log store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub stream_name: String,
    /// Globally unique per emitted line; the dedup key.
    pub event_id: String,
    pub timestamp_ms: i64,
    pub message: String,
}

/// Which output of the instance a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Stdout,
    Stderr,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Stdout, Channel::Stderr];
}

crate::simple_display! {
    Channel {
        Stdout => "stdout",
        Stderr => "stderr",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed log stream name: {0}")]
pub struct StreamNameError(pub String);

/// Parsed form of a log stream name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamName {
    pub command_id: CommandId,
    pub instance_id: InstanceId,
    pub document_segment: String,
    pub channel: Channel,
}

impl StreamName {
    pub fn new(
        command_id: &CommandId,
        instance_id: &InstanceId,
        document: &DocumentType,
        channel: Channel,
    ) -> Self {
        Self {
            command_id: command_id.clone(),
            instance_id: instance_id.clone(),
            document_segment: document.stream_segment(),
            channel,
        }
    }

    pub fn parse(name: &str) -> Result<Self, StreamNameError> {
        let mut parts = name.split('/');
        let (Some(command), Some(instance), Some(segment), Some(channel), None) =
            (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(StreamNameError(name.to_string()));
        };
        if command.is_empty() || instance.is_empty() {
            return Err(StreamNameError(name.to_string()));
        }
        let channel = match channel {
            "stdout" => Channel::Stdout,
            "stderr" => Channel::Stderr,
            _ => return Err(StreamNameError(name.to_string())),
        };
        Ok(Self {
            command_id: CommandId::new(command),
            instance_id: InstanceId::new(instance),
            document_segment: segment.to_string(),
            channel,
        })
    }

    /// Every stream an instance could have written for a command: both
    /// channels under each supported document.
    pub fn candidates(command_id: &CommandId, instance_id: &InstanceId) -> Vec<String> {
        let mut names = Vec::with_capacity(4);
        for doc in DocumentType::SUPPORTED {
            for channel in Channel::ALL {
                names.push(StreamName::new(command_id, instance_id, &doc, channel).to_string());
            }
        }
        names
    }
}

impl std::fmt::Display for StreamName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.command_id, self.instance_id, self.document_segment, self.channel
        )
    }
}

#[cfg(test)]
#[path = "log_event_tests.rs"]
mod tests;
