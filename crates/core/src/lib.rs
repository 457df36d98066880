// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fr-core: domain types for tracking a command across a fleet of instances

pub mod macros;

pub mod classify;
pub mod clock;
pub mod command;
pub mod document;
pub mod history;
pub mod id;
pub mod instance;
pub mod invocation;
pub mod log_event;
pub mod message;
pub mod target;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use classify::TargetClassification;
pub use clock::{Clock, FakeClock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use command::CommandMetadataBuilder;
pub use command::{CommandMetadata, CommandStatus, SendCommandRequest, DEFAULT_TIMEOUT_SECS};
pub use document::DocumentType;
#[cfg(any(test, feature = "test-support"))]
pub use history::{HistoryCall, RecordingHistory};
pub use history::{HistoryError, HistorySink, NoHistory};
pub use id::{short, CommandId, InstanceId};
pub use instance::{InstanceDescription, InstanceState, Platform};
#[cfg(any(test, feature = "test-support"))]
pub use invocation::InvocationBuilder;
pub use invocation::{Invocation, InvocationSet, InvocationStatus};
pub use log_event::{Channel, LogEvent, StreamName, StreamNameError};
pub use message::{Message, Payload};
pub use target::{Target, TargetError};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
