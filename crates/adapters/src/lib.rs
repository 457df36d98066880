// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fr-adapters: remote service boundaries for the fleetrun engine

pub mod command;
pub mod logs;

pub use command::{CommandService, CommandServiceError, InstancePage, InvocationPage};
pub use logs::{FilterLogEventsRequest, LogEventPage, LogStore, LogStoreError};

#[cfg(any(test, feature = "test-support"))]
pub use command::{CommandCall, CommandOp, FakeCommandService};
#[cfg(any(test, feature = "test-support"))]
pub use logs::{FakeLogStore, OnCall};
