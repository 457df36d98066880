// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submit a command and poll it to completion.

use crate::config::PollConfig;
use crate::orchestrator::{PollError, PollOrchestrator, PollSession};
use crate::tracker::{InvocationTracker, TrackerError};
use fr_adapters::{CommandService, CommandServiceError, LogStore};
use fr_core::{
    Clock, CommandMetadata, HistorySink, InvocationSet, SendCommandRequest, TargetClassification,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("sending command failed: {0}")]
    Send(#[source] CommandServiceError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// What the service resolved a freshly sent command to.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub command: CommandMetadata,
    pub invocations: InvocationSet,
    pub classification: TargetClassification,
}

/// Front door for running a command across a fleet.
///
/// Each poll gets its own clone of the history sink.
#[derive(Clone)]
pub struct Client<S, L, H, C>
where
    S: CommandService,
    L: LogStore,
    H: HistorySink + Clone,
    C: Clock,
{
    service: S,
    logs: L,
    history: H,
    clock: C,
    config: PollConfig,
}

impl<S, L, H, C> Client<S, L, H, C>
where
    S: CommandService,
    L: LogStore,
    H: HistorySink + Clone,
    C: Clock,
{
    pub fn new(service: S, logs: L, history: H, clock: C, config: PollConfig) -> Self {
        Self { service, logs, history, clock, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Send the command, give the service `settle` to resolve its targets,
    /// then list and classify them.
    pub async fn dispatch(&self, request: &SendCommandRequest) -> Result<Dispatch, DispatchError> {
        let command = self.service.send_command(request).await.map_err(DispatchError::Send)?;
        tracing::info!(
            command_id = %command.command_id,
            document = %command.document,
            targets = request.targets.len(),
            "command sent"
        );

        tokio::time::sleep(self.config.settle).await;

        let mut tracker = InvocationTracker::new(self.service.clone(), command.command_id.clone());
        let invocations = tracker.refresh().await?;
        let classification = tracker.classify_targets().await?;
        Ok(Dispatch { command, invocations, classification })
    }

    pub async fn poll(
        &self,
        cancel: CancellationToken,
        dispatch: &Dispatch,
    ) -> Result<PollSession, PollError> {
        PollOrchestrator::new(
            self.service.clone(),
            self.logs.clone(),
            self.history.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
        .poll(cancel, &dispatch.command.command_id)
        .await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
