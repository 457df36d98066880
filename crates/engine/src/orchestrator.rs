// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll orchestration: one merged, terminating stream per command.
//!
//! A session runs three tasks. The tailer forwards new log events, the
//! status task refreshes invocations every `status_interval`, and the merge
//! task turns both into `Message`s, records them, and decides when the
//! session is over:
//!
//! - Running: forwarding output and status changes.
//! - Draining: every live instance finished; output is still forwarded
//!   until `drain_grace` elapses.
//! - Done: drain elapsed, the caller cancelled, or a fatal error.

use crate::config::PollConfig;
use crate::tailer::{LogQuery, LogTailer, TailError, TailHandle};
use crate::tracker::{InvocationTracker, TrackerError};
use fr_adapters::{CommandService, CommandServiceError, LogStore};
use fr_core::{
    Clock, CommandId, CommandMetadata, CommandStatus, HistoryError, HistorySink, InstanceId,
    InvocationSet, LogEvent, Message, Payload, StreamName, TargetClassification,
};
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("loading command {command_id} failed: {source}")]
    LoadCommand {
        command_id: CommandId,
        #[source]
        source: CommandServiceError,
    },
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Tail(#[from] TailError),
    #[error("recording history failed: {0}")]
    History(#[from] HistoryError),
    #[error("poll task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A running poll session.
///
/// Messages arrive on [`PollSession::recv`] until the session is done, at
/// which point the channel closes. [`PollSession::finish`] then reports
/// whether it ended normally.
pub struct PollSession {
    pub command: CommandMetadata,
    pub classification: TargetClassification,
    messages: mpsc::Receiver<Message>,
    task: JoinHandle<Result<(), PollError>>,
}

impl PollSession {
    pub async fn recv(&mut self) -> Option<Message> {
        self.messages.recv().await
    }

    /// Wait for the session to end. Undelivered messages are discarded.
    pub async fn finish(self) -> Result<(), PollError> {
        drop(self.messages);
        self.task.await?
    }

    /// Receive every remaining message, then finish.
    pub async fn collect(mut self) -> (Vec<Message>, Result<(), PollError>) {
        let mut messages = Vec::new();
        while let Some(message) = self.messages.recv().await {
            messages.push(message);
        }
        (messages, self.finish().await)
    }
}

pub struct PollOrchestrator<S, L, H, C>
where
    S: CommandService,
    L: LogStore,
    H: HistorySink,
    C: Clock,
{
    service: S,
    logs: L,
    history: H,
    clock: C,
    config: PollConfig,
}

impl<S, L, H, C> PollOrchestrator<S, L, H, C>
where
    S: CommandService,
    L: LogStore,
    H: HistorySink,
    C: Clock,
{
    pub fn new(service: S, logs: L, history: H, clock: C, config: PollConfig) -> Self {
        Self { service, logs, history, clock, config }
    }

    /// Start polling `command_id`.
    ///
    /// Loading the command, the first invocation refresh and target
    /// classification happen before this returns; their errors are returned
    /// directly. Everything after that is reported by the session.
    pub async fn poll(
        self,
        cancel: CancellationToken,
        command_id: &CommandId,
    ) -> Result<PollSession, PollError> {
        let span = tracing::info_span!("poll", command_id = %command_id);
        let command = self
            .service
            .get_command(command_id)
            .instrument(span.clone())
            .await
            .map_err(|source| PollError::LoadCommand { command_id: command_id.clone(), source })?;

        let mut tracker = InvocationTracker::new(self.service.clone(), command_id.clone());
        tracker.refresh().instrument(span.clone()).await?;
        let classification = tracker.classify_targets().instrument(span.clone()).await?;

        let capacity = self.config.channel_capacity.max(1);
        let (log_tx, log_rx) = mpsc::channel(capacity);
        let (status_tx, status_rx) = mpsc::channel(capacity);
        let (out_tx, out_rx) = mpsc::channel(capacity);
        let tasks = cancel.child_token();

        let tailer = LogTailer::new(self.logs, self.clock, self.config.log_interval);
        let tail = tailer.handle();
        let query = LogQuery::for_command(command_id, &command.document);
        tokio::spawn(tailer.stream(tasks.clone(), query, log_tx).instrument(span.clone()));

        tokio::spawn(
            status_loop(tracker, tasks.clone(), self.config.status_interval, status_tx)
                .instrument(span.clone()),
        );

        let merge = MergeLoop {
            command: command.clone(),
            excluded: classification.excluded(),
            history: self.history,
            tail,
            out: out_tx,
            config: self.config,
            cancel,
            tasks,
            prev: InvocationSet::new(),
        };
        tracing::info!(
            parent: &span,
            document = %command.document,
            targets = classification.total(),
            expected = classification.expected_responses(),
            "polling command"
        );
        let task = tokio::spawn(merge.run(log_rx, status_rx).instrument(span));

        Ok(PollSession { command, classification, messages: out_rx, task })
    }
}

/// Refresh invocations every `interval` until cancelled or the refresh fails.
async fn status_loop<S: CommandService>(
    mut tracker: InvocationTracker<S>,
    cancel: CancellationToken,
    interval: std::time::Duration,
    tx: mpsc::Sender<Result<InvocationSet, TrackerError>>,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
        let result = tracker.refresh().await;
        let failed = result.is_err();
        if tx.send(result).await.is_err() || failed {
            break;
        }
    }
}

struct MergeLoop<H: HistorySink> {
    command: CommandMetadata,
    /// Wrong-platform and faulty instances; never waited on.
    excluded: HashSet<InstanceId>,
    history: H,
    tail: TailHandle,
    out: mpsc::Sender<Message>,
    config: PollConfig,
    /// The caller's token.
    cancel: CancellationToken,
    /// Child of `cancel` shared by the background tasks.
    tasks: CancellationToken,
    prev: InvocationSet,
}

/// Whether the merge loop keeps going after handling one input.
enum Flow {
    Continue,
    Stop,
}

impl<H: HistorySink> MergeLoop<H> {
    async fn run(
        mut self,
        mut log_rx: mpsc::Receiver<Result<LogEvent, TailError>>,
        mut status_rx: mpsc::Receiver<Result<InvocationSet, TrackerError>>,
    ) -> Result<(), PollError> {
        let drain = tokio::time::sleep(self.config.drain_grace);
        tokio::pin!(drain);
        let mut draining = false;
        let mut status_open = true;

        let result = loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("poll cancelled");
                    break Ok(());
                }
                () = &mut drain, if draining => {
                    tracing::info!("drain grace elapsed");
                    break Ok(());
                }
                () = self.out.closed() => {
                    tracing::debug!("session receiver dropped");
                    break Ok(());
                }
                event = log_rx.recv() => match event {
                    Some(Ok(event)) => match self.forward(event).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Stop) => break Ok(()),
                        Err(e) => break Err(e),
                    },
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                },
                status = status_rx.recv(), if status_open => match status {
                    Some(Ok(set)) => {
                        match self.on_status(set).await {
                            Ok(Flow::Continue) => {}
                            Ok(Flow::Stop) => break Ok(()),
                            Err(e) => break Err(e),
                        }
                        if !draining && self.live_complete() {
                            tracing::info!(grace = ?self.config.drain_grace, "all live instances complete, draining");
                            drain.as_mut().reset(Instant::now() + self.config.drain_grace);
                            draining = true;
                        }
                    }
                    Some(Err(e)) => break Err(e.into()),
                    None => status_open = false,
                },
            }
        };

        self.tasks.cancel();
        if let Err(e) = &result {
            tracing::error!(error = %e, "poll session failed");
        }
        result
    }

    fn live_complete(&self) -> bool {
        self.prev.excluding(&self.excluded).all_complete()
    }

    async fn forward(&mut self, event: LogEvent) -> Result<Flow, PollError> {
        let payload = match Payload::from_log_event(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, event_id = %event.event_id, "skipping log event");
                return Ok(Flow::Continue);
            }
        };
        self.history.append_payload(&self.command.command_id, &payload)?;
        Ok(emit(&self.out, Message::Payload(payload)).await)
    }

    async fn on_status(&mut self, set: InvocationSet) -> Result<Flow, PollError> {
        let changed = set.completed_since(&self.prev);
        self.prev = set;
        if changed.is_empty() {
            return Ok(Flow::Continue);
        }

        for invocation in &changed {
            tracing::info!(
                instance_id = %invocation.instance_id,
                status = %invocation.status,
                "instance complete"
            );
            self.schedule_ignore(invocation.instance_id.clone());
        }

        let status = CommandStatus::new(self.command.clone(), self.prev.clone());
        self.history.put_command(&status)?;
        Ok(emit(&self.out, Message::Control { status }).await)
    }

    /// After `ignore_grace`, drop the instance's streams from the tailer's
    /// watermark so a finished instance stops holding the window back.
    fn schedule_ignore(&self, instance_id: InstanceId) {
        let tail = self.tail.clone();
        let cancel = self.tasks.clone();
        let grace = self.config.ignore_grace;
        let streams = StreamName::candidates(&self.command.command_id, &instance_id);
        tokio::spawn(
            async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(grace) => {
                        for stream in streams {
                            tail.ignore(stream);
                        }
                    }
                }
            }
            .in_current_span(),
        );
    }
}

async fn emit(out: &mpsc::Sender<Message>, message: Message) -> Flow {
    if out.send(message).await.is_err() {
        tracing::debug!("session receiver dropped");
        return Flow::Stop;
    }
    Flow::Continue
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
