// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dedup and watermark bookkeeping for the log tailer.

use fr_core::LogEvent;
use std::collections::{HashMap, HashSet};

/// What the tailer has seen so far, and where the next fetch window starts.
///
/// Invariants: an event id is reported new at most once; `window_start`
/// never decreases; the ignore set only grows.
#[derive(Debug, Default)]
pub struct TailState {
    seen: HashSet<String>,
    watermarks: HashMap<String, i64>,
    ignored: HashSet<String>,
    window_start: Option<i64>,
}

impl TailState {
    pub fn new(window_start: Option<i64>) -> Self {
        Self { window_start, ..Self::default() }
    }

    /// Inclusive lower bound of the next fetch; `None` until anything has
    /// been observed on a stream that is not ignored.
    pub fn window_start(&self) -> Option<i64> {
        self.window_start
    }

    /// Record a fetched event. Returns `true` the first time its id is seen.
    ///
    /// Duplicates still move their stream's watermark.
    pub fn observe(&mut self, event: &LogEvent) -> bool {
        self.watermarks.insert(event.stream_name.clone(), event.timestamp_ms);
        self.seen.insert(event.event_id.clone())
    }

    /// Exclude a stream from the watermark computation. Returns `false` if
    /// it was already ignored.
    pub fn ignore(&mut self, stream_name: impl Into<String>) -> bool {
        self.ignored.insert(stream_name.into())
    }

    pub fn is_ignored(&self, stream_name: &str) -> bool {
        self.ignored.contains(stream_name)
    }

    pub fn watermark(&self, stream_name: &str) -> Option<i64> {
        self.watermarks.get(stream_name).copied()
    }

    /// Move the window to one past the lowest watermark of any stream that
    /// is not ignored, clamped so it never moves backwards.
    pub fn advance_window(&mut self) -> Option<i64> {
        let lowest = self
            .watermarks
            .iter()
            .filter(|(stream, _)| !self.ignored.contains(*stream))
            .map(|(_, ts)| *ts)
            .min();
        if let Some(lowest) = lowest {
            let next = lowest.saturating_add(1);
            self.window_start = Some(self.window_start.map_or(next, |current| current.max(next)));
        }
        self.window_start
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
