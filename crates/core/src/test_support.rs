// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    CommandId, CommandMetadata, DocumentType, InstanceId, Invocation, InvocationSet,
    InvocationStatus, LogEvent,
};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for invocation and log types.
pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_status() -> impl Strategy<Value = InvocationStatus> {
        prop_oneof![
            Just(InvocationStatus::Pending),
            Just(InvocationStatus::InProgress),
            Just(InvocationStatus::Delayed),
            Just(InvocationStatus::Success),
            Just(InvocationStatus::Failed),
            Just(InvocationStatus::TimedOut),
            Just(InvocationStatus::Cancelled),
            Just(InvocationStatus::Cancelling),
        ]
    }

    /// Sets over a small pool of instance ids so two draws overlap often.
    pub fn arb_invocation_set() -> impl Strategy<Value = InvocationSet> {
        prop::collection::vec((0u8..6, arb_status()), 0..8).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(n, status)| invocation(&format!("i-{n}"), status))
                .collect()
        })
    }
}

// ── Factory functions ───────────────────────────────────────────────────

pub fn invocation(instance_id: &str, status: InvocationStatus) -> Invocation {
    Invocation {
        instance_id: InstanceId::new(instance_id),
        document: DocumentType::ShellScript,
        status,
        status_details: String::new(),
    }
}

pub fn invocation_set(entries: &[(&str, InvocationStatus)]) -> InvocationSet {
    entries.iter().map(|(id, status)| invocation(id, status.clone())).collect()
}

/// A stdout log event on the shell document's stream for `instance_id`.
pub fn stdout_event(
    command_id: &str,
    instance_id: &str,
    event_id: &str,
    timestamp_ms: i64,
) -> LogEvent {
    LogEvent {
        stream_name: format!("{command_id}/{instance_id}/aws-runShellScript/stdout"),
        event_id: event_id.to_string(),
        timestamp_ms,
        message: format!("{event_id}\n"),
    }
}

pub fn command_metadata(command_id: &str) -> CommandMetadata {
    CommandMetadata::builder().command_id(CommandId::new(command_id)).build()
}
