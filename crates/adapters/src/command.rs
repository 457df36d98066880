// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-execution service adapter.
//!
//! Covers the four calls the engine makes against the remote service:
//! submitting a command, reading it back, listing its per-instance
//! invocations, and describing the instances it resolved to. Listing and
//! describing are paginated; callers drive the `next_token` loop.

use async_trait::async_trait;
use fr_core::{CommandId, CommandMetadata, InstanceDescription, InstanceId, Invocation, SendCommandRequest};
use thiserror::Error;

/// Errors from the command-execution service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandServiceError {
    #[error("command not found: {0}")]
    CommandNotFound(CommandId),
    #[error("invalid pagination token: {0}")]
    InvalidToken(String),
    #[error("request throttled")]
    Throttled,
    #[error("service error: {0}")]
    Service(String),
}

/// One page of `list_invocations`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationPage {
    pub invocations: Vec<Invocation>,
    pub next_token: Option<String>,
}

/// One page of `describe_instances`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstancePage {
    pub instances: Vec<InstanceDescription>,
    pub next_token: Option<String>,
}

/// Adapter for the remote command-execution and compute services
#[async_trait]
pub trait CommandService: Clone + Send + Sync + 'static {
    /// Submit a command; the returned metadata carries the service-assigned id.
    async fn send_command(
        &self,
        request: &SendCommandRequest,
    ) -> Result<CommandMetadata, CommandServiceError>;

    async fn get_command(&self, command_id: &CommandId)
        -> Result<CommandMetadata, CommandServiceError>;

    /// Fetch one page of per-instance invocations. `None` asks for the first page.
    async fn list_invocations(
        &self,
        command_id: &CommandId,
        next_token: Option<String>,
    ) -> Result<InvocationPage, CommandServiceError>;

    /// Describe one page of the given instances. Unknown ids are omitted.
    async fn describe_instances(
        &self,
        instance_ids: &[InstanceId],
        next_token: Option<String>,
    ) -> Result<InstancePage, CommandServiceError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Which fake operation a recorded call or injected failure refers to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum CommandOp {
        Send,
        Get,
        ListInvocations,
        DescribeInstances,
    }

    /// Recorded call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum CommandCall {
        Send(SendCommandRequest),
        Get(CommandId),
        ListInvocations { command_id: CommandId, next_token: Option<String> },
        DescribeInstances { instance_ids: Vec<InstanceId>, next_token: Option<String> },
    }

    impl CommandCall {
        pub fn op(&self) -> CommandOp {
            match self {
                CommandCall::Send(_) => CommandOp::Send,
                CommandCall::Get(_) => CommandOp::Get,
                CommandCall::ListInvocations { .. } => CommandOp::ListInvocations,
                CommandCall::DescribeInstances { .. } => CommandOp::DescribeInstances,
            }
        }
    }

    struct FakeCommandState {
        commands: HashMap<CommandId, CommandMetadata>,
        invocation_pages: HashMap<CommandId, Vec<Vec<Invocation>>>,
        instances: Vec<InstanceDescription>,
        instance_page_size: usize,
        next_command_ids: Vec<CommandId>,
        /// (op, 1-based call number of that op) → error to return
        failures: HashMap<(CommandOp, usize), CommandServiceError>,
        op_counts: HashMap<CommandOp, usize>,
        calls: Vec<CommandCall>,
    }

    /// Fake command service for testing.
    ///
    /// Invocations are scripted per command as a list of pages; replacing
    /// them between polls simulates instances progressing. Instances are
    /// served from one table, paged by `instance_page_size`.
    #[derive(Clone)]
    pub struct FakeCommandService {
        inner: Arc<Mutex<FakeCommandState>>,
    }

    impl Default for FakeCommandService {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeCommandState {
                    commands: HashMap::new(),
                    invocation_pages: HashMap::new(),
                    instances: Vec::new(),
                    instance_page_size: 50,
                    next_command_ids: Vec::new(),
                    failures: HashMap::new(),
                    op_counts: HashMap::new(),
                    calls: Vec::new(),
                })),
            }
        }
    }

    impl FakeCommandService {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a command so `get_command` can find it.
        pub fn add_command(&self, metadata: CommandMetadata) {
            self.inner.lock().commands.insert(metadata.command_id.clone(), metadata);
        }

        /// Id the next `send_command` will assign (queued, first in first out).
        pub fn queue_command_id(&self, command_id: impl Into<CommandId>) {
            self.inner.lock().next_command_ids.push(command_id.into());
        }

        /// Serve `invocations` as a single page.
        pub fn set_invocations(&self, command_id: &CommandId, invocations: Vec<Invocation>) {
            self.set_invocation_pages(command_id, vec![invocations]);
        }

        pub fn set_invocation_pages(&self, command_id: &CommandId, pages: Vec<Vec<Invocation>>) {
            self.inner.lock().invocation_pages.insert(command_id.clone(), pages);
        }

        pub fn add_instance(&self, description: InstanceDescription) {
            self.inner.lock().instances.push(description);
        }

        pub fn set_instance_page_size(&self, page_size: usize) {
            self.inner.lock().instance_page_size = page_size.max(1);
        }

        /// Make the `nth` call (1-based, counted over the fake's lifetime)
        /// of `op` fail with `error`.
        pub fn fail_call(&self, op: CommandOp, nth: usize, error: CommandServiceError) {
            self.inner.lock().failures.insert((op, nth), error);
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<CommandCall> {
            self.inner.lock().calls.clone()
        }

        pub fn call_count(&self, op: CommandOp) -> usize {
            self.inner.lock().op_counts.get(&op).copied().unwrap_or(0)
        }

        fn record(&self, call: CommandCall) -> Result<(), CommandServiceError> {
            let mut state = self.inner.lock();
            let op = call.op();
            state.calls.push(call);
            let count = state.op_counts.entry(op).or_insert(0);
            *count += 1;
            let nth = *count;
            match state.failures.remove(&(op, nth)) {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    fn parse_token(token: Option<&str>) -> Result<usize, CommandServiceError> {
        match token {
            None => Ok(0),
            Some(t) => t.parse().map_err(|_| CommandServiceError::InvalidToken(t.to_string())),
        }
    }

    #[async_trait]
    impl CommandService for FakeCommandService {
        async fn send_command(
            &self,
            request: &SendCommandRequest,
        ) -> Result<CommandMetadata, CommandServiceError> {
            self.record(CommandCall::Send(request.clone()))?;
            let mut state = self.inner.lock();
            let command_id = if state.next_command_ids.is_empty() {
                CommandId::generate()
            } else {
                state.next_command_ids.remove(0)
            };
            let metadata = CommandMetadata {
                command_id: command_id.clone(),
                document: request.document.clone(),
                commands: request.commands.clone(),
                targets: request.targets.clone(),
                timeout_secs: request.timeout_secs,
                requested_at_ms: 0,
                target_count: 0,
            };
            state.commands.insert(command_id, metadata.clone());
            Ok(metadata)
        }

        async fn get_command(
            &self,
            command_id: &CommandId,
        ) -> Result<CommandMetadata, CommandServiceError> {
            self.record(CommandCall::Get(command_id.clone()))?;
            let state = self.inner.lock();
            let mut metadata = state
                .commands
                .get(command_id)
                .cloned()
                .ok_or_else(|| CommandServiceError::CommandNotFound(command_id.clone()))?;
            if let Some(pages) = state.invocation_pages.get(command_id) {
                metadata.target_count = pages.iter().map(Vec::len).sum();
            }
            Ok(metadata)
        }

        async fn list_invocations(
            &self,
            command_id: &CommandId,
            next_token: Option<String>,
        ) -> Result<InvocationPage, CommandServiceError> {
            self.record(CommandCall::ListInvocations {
                command_id: command_id.clone(),
                next_token: next_token.clone(),
            })?;
            let index = parse_token(next_token.as_deref())?;
            let state = self.inner.lock();
            let Some(pages) = state.invocation_pages.get(command_id) else {
                return Ok(InvocationPage::default());
            };
            let invocations = pages.get(index).cloned().unwrap_or_default();
            let next_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());
            Ok(InvocationPage { invocations, next_token })
        }

        async fn describe_instances(
            &self,
            instance_ids: &[InstanceId],
            next_token: Option<String>,
        ) -> Result<InstancePage, CommandServiceError> {
            self.record(CommandCall::DescribeInstances {
                instance_ids: instance_ids.to_vec(),
                next_token: next_token.clone(),
            })?;
            let offset = parse_token(next_token.as_deref())?;
            let state = self.inner.lock();
            let matching: Vec<_> = state
                .instances
                .iter()
                .filter(|d| instance_ids.contains(&d.instance_id))
                .cloned()
                .collect();
            let end = (offset + state.instance_page_size).min(matching.len());
            let instances = matching.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
            let next_token = (end < matching.len()).then(|| end.to_string());
            Ok(InstancePage { instances, next_token })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CommandCall, CommandOp, FakeCommandService};

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
