// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fr-engine: invocation tracking, log tailing, and poll orchestration

mod client;
mod config;
mod orchestrator;
pub mod tailer;
mod tracker;

pub use client::{Client, Dispatch, DispatchError};
pub use config::PollConfig;
pub use orchestrator::{PollError, PollOrchestrator, PollSession};
pub use tailer::{LogQuery, LogTailer, TailError, TailHandle, TailState};
pub use tracker::{InvocationTracker, TrackerError};
