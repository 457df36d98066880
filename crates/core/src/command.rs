// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command requests and the metadata the service keeps about them.

use crate::document::DocumentType;
use crate::id::CommandId;
use crate::invocation::InvocationSet;
use crate::target::Target;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// A command as the service knows it once it has been accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub command_id: CommandId,
    pub document: DocumentType,
    /// Script text passed to the document's `commands` parameter.
    pub commands: String,
    #[serde(default)]
    pub targets: Vec<Target>,
    pub timeout_secs: u64,
    /// Epoch ms at which the service accepted the command.
    pub requested_at_ms: i64,
    /// Instances the targets resolved to, as reported by the service.
    #[serde(default)]
    pub target_count: usize,
}

crate::builder! {
    pub struct CommandMetadataBuilder => CommandMetadata {
        into {
            command_id: CommandId = "cmd-test",
            commands: String = "uptime",
        }
        set {
            document: DocumentType = DocumentType::ShellScript,
            targets: Vec<Target> = Vec::new(),
            timeout_secs: u64 = DEFAULT_TIMEOUT_SECS,
            requested_at_ms: i64 = 0,
            target_count: usize = 0,
        }
    }
}

/// Everything needed to submit a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendCommandRequest {
    pub document: DocumentType,
    pub commands: String,
    pub targets: Vec<Target>,
    pub timeout_secs: u64,
    /// Ask the service to stream instance output to the log store.
    pub log_output: bool,
}

impl SendCommandRequest {
    pub fn new(document: DocumentType, commands: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            document,
            commands: commands.into(),
            targets,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_output: true,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Snapshot of a command and every invocation seen so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStatus {
    pub command: CommandMetadata,
    pub invocations: InvocationSet,
}

impl CommandStatus {
    pub fn new(command: CommandMetadata, invocations: InvocationSet) -> Self {
        Self { command, invocations }
    }

    pub fn command_id(&self) -> &CommandId {
        &self.command.command_id
    }
}
