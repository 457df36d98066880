// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log store adapter.
//!
//! The store is time-windowed, paginated and eventually consistent: an event
//! may first appear on a later fetch than its timestamp suggests, and the
//! same event may be returned by more than one fetch.

use async_trait::async_trait;
use fr_core::LogEvent;
use thiserror::Error;

/// Errors from the log store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LogStoreError {
    #[error("invalid pagination token: {0}")]
    InvalidToken(String),
    #[error("request throttled")]
    Throttled,
    #[error("log store error: {0}")]
    Service(String),
}

/// Filter for one page of log events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterLogEventsRequest {
    pub log_group: String,
    pub stream_prefix: String,
    /// Inclusive lower bound in epoch ms; `None` means from the beginning.
    pub start_time: Option<i64>,
    /// Inclusive upper bound in epoch ms.
    pub end_time: Option<i64>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEventPage {
    pub events: Vec<LogEvent>,
    pub next_token: Option<String>,
}

/// Adapter for the remote log store
#[async_trait]
pub trait LogStore: Clone + Send + Sync + 'static {
    async fn filter_log_events(
        &self,
        request: &FilterLogEventsRequest,
    ) -> Result<LogEventPage, LogStoreError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;

    /// Called with the 1-based call number before each fake fetch is answered.
    pub type OnCall = Arc<dyn Fn(usize, &FilterLogEventsRequest) + Send + Sync>;

    struct FakeLogState {
        /// Scripted fetch cycles; each is a list of pages.
        cycles: VecDeque<Vec<Vec<LogEvent>>>,
        current: Option<Vec<Vec<LogEvent>>>,
        /// Stored events per log group, served when no script remains.
        events: HashMap<String, Vec<LogEvent>>,
        page_size: usize,
        failures: HashMap<usize, LogStoreError>,
        requests: Vec<FilterLogEventsRequest>,
    }

    /// Fake log store for testing.
    ///
    /// Two modes: scripted cycles answer each fetch cycle (a first-page
    /// request starts the next cycle) with fixed pages regardless of the
    /// filter; once the script runs out, stored events are filtered by
    /// group, stream prefix and time window and paged by `page_size`.
    #[derive(Clone)]
    pub struct FakeLogStore {
        inner: Arc<Mutex<FakeLogState>>,
        on_call: Arc<Mutex<Option<OnCall>>>,
    }

    impl Default for FakeLogStore {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeLogState {
                    cycles: VecDeque::new(),
                    current: None,
                    events: HashMap::new(),
                    page_size: 100,
                    failures: HashMap::new(),
                    requests: Vec::new(),
                })),
                on_call: Arc::new(Mutex::new(None)),
            }
        }
    }

    impl FakeLogStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue one fetch cycle answered with `pages`.
        pub fn push_cycle(&self, pages: Vec<Vec<LogEvent>>) {
            self.inner.lock().cycles.push_back(pages);
        }

        /// Store an event so window-filtered fetches can return it.
        pub fn put_event(&self, log_group: &str, event: LogEvent) {
            self.inner.lock().events.entry(log_group.to_string()).or_default().push(event);
        }

        pub fn set_page_size(&self, page_size: usize) {
            self.inner.lock().page_size = page_size.max(1);
        }

        /// Make the `nth` fetch (1-based) fail with `error`.
        pub fn fail_call(&self, nth: usize, error: LogStoreError) {
            self.inner.lock().failures.insert(nth, error);
        }

        pub fn on_call(&self, hook: impl Fn(usize, &FilterLogEventsRequest) + Send + Sync + 'static) {
            *self.on_call.lock() = Some(Arc::new(hook));
        }

        /// Get all recorded requests
        pub fn requests(&self) -> Vec<FilterLogEventsRequest> {
            self.inner.lock().requests.clone()
        }

        pub fn call_count(&self) -> usize {
            self.inner.lock().requests.len()
        }
    }

    fn parse_token(token: Option<&str>) -> Result<usize, LogStoreError> {
        match token {
            None => Ok(0),
            Some(t) => t.parse().map_err(|_| LogStoreError::InvalidToken(t.to_string())),
        }
    }

    fn in_window(event: &LogEvent, request: &FilterLogEventsRequest) -> bool {
        event.stream_name.starts_with(&request.stream_prefix)
            && request.start_time.is_none_or(|start| event.timestamp_ms >= start)
            && request.end_time.is_none_or(|end| event.timestamp_ms <= end)
    }

    #[async_trait]
    impl LogStore for FakeLogStore {
        async fn filter_log_events(
            &self,
            request: &FilterLogEventsRequest,
        ) -> Result<LogEventPage, LogStoreError> {
            let nth = {
                let mut state = self.inner.lock();
                state.requests.push(request.clone());
                state.requests.len()
            };
            // Hook runs outside the state lock so it may call back into the fake.
            let hook = self.on_call.lock().clone();
            if let Some(hook) = hook {
                hook(nth, request);
            }

            let mut state = self.inner.lock();
            if let Some(error) = state.failures.remove(&nth) {
                return Err(error);
            }
            let index = parse_token(request.next_token.as_deref())?;

            if index == 0 {
                state.current = state.cycles.pop_front();
            }
            if let Some(pages) = &state.current {
                let events = pages.get(index).cloned().unwrap_or_default();
                let next_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());
                return Ok(LogEventPage { events, next_token });
            }

            let matching: Vec<LogEvent> = state
                .events
                .get(&request.log_group)
                .map(|events| events.iter().filter(|e| in_window(e, request)).cloned().collect())
                .unwrap_or_default();
            let end = (index + state.page_size).min(matching.len());
            let events = matching.get(index..end).map(<[_]>::to_vec).unwrap_or_default();
            let next_token = (end < matching.len()).then(|| end.to_string());
            Ok(LogEventPage { events, next_token })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLogStore, OnCall};

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
