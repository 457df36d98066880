// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental tailing of a command's log streams.
//!
//! Each cycle fetches every page of `[window_start, now]` for the command's
//! stream prefix, forwards events whose id has not been seen, then moves
//! the window up to the slowest stream that is not ignored. Overlapping
//! windows are expected; dedup by event id absorbs them.

mod state;

pub use state::TailState;

use fr_adapters::{FilterLogEventsRequest, LogStore, LogStoreError};
use fr_core::{Clock, CommandId, DocumentType, LogEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("fetching log events from {log_group} failed: {source}")]
    Fetch {
        log_group: String,
        #[source]
        source: LogStoreError,
    },
}

/// Which log streams to tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub log_group: String,
    pub stream_prefix: String,
}

impl LogQuery {
    /// Every stream of `command_id` in the document's log group.
    pub fn for_command(command_id: &CommandId, document: &DocumentType) -> Self {
        Self { log_group: document.log_group(), stream_prefix: command_id.to_string() }
    }
}

/// Cloneable handle for ignoring streams while the tailer runs.
#[derive(Clone)]
pub struct TailHandle {
    state: Arc<Mutex<TailState>>,
}

impl TailHandle {
    pub fn ignore(&self, stream_name: impl Into<String>) {
        let stream_name = stream_name.into();
        if self.state.lock().ignore(stream_name.clone()) {
            tracing::debug!(stream = %stream_name, "ignoring stream for watermark");
        }
    }

    pub fn window_start(&self) -> Option<i64> {
        self.state.lock().window_start()
    }
}

pub struct LogTailer<L: LogStore, C: Clock> {
    store: L,
    clock: C,
    interval: Duration,
    state: Arc<Mutex<TailState>>,
}

impl<L: LogStore, C: Clock> LogTailer<L, C> {
    pub fn new(store: L, clock: C, interval: Duration) -> Self {
        Self { store, clock, interval, state: Arc::new(Mutex::new(TailState::default())) }
    }

    pub fn handle(&self) -> TailHandle {
        TailHandle { state: Arc::clone(&self.state) }
    }

    pub fn ignore(&self, stream_name: impl Into<String>) {
        self.handle().ignore(stream_name);
    }

    /// Tail until cancelled, sending new events to `tx`.
    ///
    /// Waits one interval before every fetch cycle. A fetch error is sent as
    /// `Err` and ends the loop. Returning drops `tx`, which closes the
    /// channel.
    pub async fn stream(
        self,
        cancel: CancellationToken,
        query: LogQuery,
        tx: mpsc::Sender<Result<LogEvent, TailError>>,
    ) {
        tracing::debug!(log_group = %query.log_group, prefix = %query.stream_prefix, "tailer started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            match self.fetch_cycle(&query, &tx).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!("tailer receiver dropped");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "log fetch failed");
                    let _ = tx.send(Err(e)).await;
                    break;
                }
            }

            if cancel.is_cancelled() {
                break;
            }
        }
        tracing::debug!(log_group = %query.log_group, "tailer stopped");
    }

    /// One paginated fetch over the current window. Returns `Ok(false)` if
    /// the receiver has gone away.
    async fn fetch_cycle(
        &self,
        query: &LogQuery,
        tx: &mpsc::Sender<Result<LogEvent, TailError>>,
    ) -> Result<bool, TailError> {
        let mut request = FilterLogEventsRequest {
            log_group: query.log_group.clone(),
            stream_prefix: query.stream_prefix.clone(),
            start_time: self.state.lock().window_start(),
            end_time: Some(self.clock.epoch_ms()),
            next_token: None,
        };

        let mut emitted = 0usize;
        loop {
            let page = self.store.filter_log_events(&request).await.map_err(|source| {
                TailError::Fetch { log_group: query.log_group.clone(), source }
            })?;

            let fresh: Vec<LogEvent> = {
                let mut state = self.state.lock();
                page.events.into_iter().filter(|event| state.observe(event)).collect()
            };
            for event in fresh {
                emitted += 1;
                if tx.send(Ok(event)).await.is_err() {
                    return Ok(false);
                }
            }

            match page.next_token {
                Some(token) => request.next_token = Some(token),
                None => break,
            }
        }

        let (window_start, seen) = {
            let mut state = self.state.lock();
            (state.advance_window(), state.seen_count())
        };
        tracing::trace!(emitted, seen, ?window_start, "fetch cycle done");
        Ok(true)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
