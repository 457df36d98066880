// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{command_metadata, invocation_set, stdout_event};
use crate::InvocationStatus;

fn status() -> CommandStatus {
    CommandStatus::new(
        command_metadata("cmd-1"),
        invocation_set(&[("i-1", InvocationStatus::Success)]),
    )
}

#[test]
fn recording_history_records_in_order() {
    let mut history = RecordingHistory::new();
    let payload = Payload::from_log_event(&stdout_event("cmd-1", "i-1", "ev1", 1)).unwrap();

    history.put_command(&status()).unwrap();
    history.append_payload(&CommandId::new("cmd-1"), &payload).unwrap();

    let calls = history.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], HistoryCall::PutCommand(_)));
    assert_eq!(history.payloads(), vec![payload]);
    assert_eq!(history.put_count(), 1);
}

#[test]
fn recording_history_fails_after_fail_with() {
    let mut history = RecordingHistory::new();
    history.fail_with("disk full");

    let err = history.put_command(&status()).unwrap_err();
    assert_eq!(err.to_string(), "disk full");
    assert!(history.calls().is_empty());
}

#[test]
fn shared_mutex_forwards_to_inner_sink() {
    let recording = RecordingHistory::new();
    let mut shared = Arc::new(parking_lot::Mutex::new(recording.clone()));

    shared.put_command(&status()).unwrap();
    assert_eq!(recording.put_count(), 1);
}

#[test]
fn no_history_accepts_everything() {
    let mut sink = NoHistory;
    assert!(sink.put_command(&status()).is_ok());
}
