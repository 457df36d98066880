// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fr_adapters::{CommandOp, FakeCommandService, FakeLogStore, LogStoreError};
use fr_core::test_support::{command_metadata, invocation, stdout_event};
use fr_core::{FakeClock, InstanceDescription, InstanceState, InvocationStatus, Platform, RecordingHistory};
use std::time::Duration;

const CMD: &str = "cmd-1";
const GROUP: &str = "/aws/ssm/AWS-RunShellScript";

struct Fixture {
    service: FakeCommandService,
    logs: FakeLogStore,
    history: RecordingHistory,
    clock: FakeClock,
}

impl Fixture {
    fn new() -> Self {
        let service = FakeCommandService::new();
        service.add_command(command_metadata(CMD));
        Self {
            service,
            logs: FakeLogStore::new(),
            history: RecordingHistory::new(),
            clock: FakeClock::new(),
        }
    }

    fn instance(&self, id: &str, platform: Platform, state: InstanceState) {
        self.service.add_instance(InstanceDescription::new(id, platform, state));
    }

    fn linux(&self, id: &str) {
        self.instance(id, Platform::Linux, InstanceState::Running);
    }

    fn statuses(&self, entries: &[(&str, InvocationStatus)]) {
        set_statuses(&self.service, entries);
    }

    /// Change invocation statuses once `after` has elapsed.
    fn statuses_after(&self, after: Duration, entries: &[(&str, InvocationStatus)]) {
        let service = self.service.clone();
        let entries: Vec<(String, InvocationStatus)> =
            entries.iter().map(|(id, s)| (id.to_string(), s.clone())).collect();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let borrowed: Vec<(&str, InvocationStatus)> =
                entries.iter().map(|(id, s)| (id.as_str(), s.clone())).collect();
            set_statuses(&service, &borrowed);
        });
    }

    fn output(&self, instance: &str, event_id: &str, ts: i64) {
        self.logs.put_event(GROUP, stdout_event(CMD, instance, event_id, ts));
    }

    async fn poll(&self, cancel: CancellationToken) -> Result<PollSession, PollError> {
        PollOrchestrator::new(
            self.service.clone(),
            self.logs.clone(),
            self.history.clone(),
            self.clock.clone(),
            PollConfig::default(),
        )
        .poll(cancel, &CommandId::new(CMD))
        .await
    }
}

fn set_statuses(service: &FakeCommandService, entries: &[(&str, InvocationStatus)]) {
    let invocations = entries.iter().map(|(id, status)| invocation(id, status.clone())).collect();
    service.set_invocations(&CommandId::new(CMD), invocations);
}

fn controls(messages: &[Message]) -> Vec<&CommandStatus> {
    messages.iter().filter_map(Message::as_control).collect()
}

fn payloads(messages: &[Message]) -> Vec<&Payload> {
    messages.iter().filter_map(Message::as_payload).collect()
}

#[tokio::test(start_paused = true)]
async fn finishes_within_drain_grace_after_all_complete() {
    let f = Fixture::new();
    f.linux("i-1");
    f.statuses(&[("i-1", InvocationStatus::Success)]);
    f.output("i-1", "ev1", 100);

    let start = Instant::now();
    let session = f.poll(CancellationToken::new()).await.unwrap();
    let (messages, result) = session.collect().await;
    let elapsed = start.elapsed();

    result.unwrap();
    let config = PollConfig::default();
    assert!(elapsed >= config.status_interval + config.drain_grace);
    assert!(elapsed < config.status_interval + config.drain_grace + Duration::from_secs(1));

    assert_eq!(controls(&messages).len(), 1);
    let output = payloads(&messages);
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].instance_id, "i-1");
    assert_eq!(output[0].stdout_chunk, "ev1\n");
}

#[tokio::test(start_paused = true)]
async fn control_is_emitted_only_when_something_completes() {
    let f = Fixture::new();
    f.linux("i-1");
    f.linux("i-2");
    f.statuses(&[("i-1", InvocationStatus::InProgress), ("i-2", InvocationStatus::InProgress)]);
    f.statuses_after(
        Duration::from_secs(4),
        &[("i-1", InvocationStatus::Success), ("i-2", InvocationStatus::InProgress)],
    );
    f.statuses_after(
        Duration::from_secs(10),
        &[("i-1", InvocationStatus::Success), ("i-2", InvocationStatus::Failed)],
    );

    let session = f.poll(CancellationToken::new()).await.unwrap();
    let (messages, result) = session.collect().await;
    result.unwrap();

    let controls = controls(&messages);
    assert_eq!(controls.len(), 2);
    assert_eq!(controls[0].invocations.get("i-1").unwrap().status, InvocationStatus::Success);
    assert_eq!(controls[0].invocations.get("i-2").unwrap().status, InvocationStatus::InProgress);
    assert_eq!(controls[1].invocations.get("i-2").unwrap().status, InvocationStatus::Failed);
    assert_eq!(f.history.put_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn terminal_status_correction_emits_another_control() {
    let f = Fixture::new();
    f.linux("i-1");
    f.statuses(&[("i-1", InvocationStatus::InProgress)]);
    // Polled at 3s, which starts the drain; the correction lands at the 6s poll.
    f.statuses_after(Duration::from_secs(1), &[("i-1", InvocationStatus::TimedOut)]);
    f.statuses_after(Duration::from_secs(4), &[("i-1", InvocationStatus::Failed)]);

    let session = f.poll(CancellationToken::new()).await.unwrap();
    let (messages, result) = session.collect().await;
    result.unwrap();

    let controls = controls(&messages);
    assert_eq!(controls.len(), 2);
    assert_eq!(controls[0].invocations.get("i-1").unwrap().status, InvocationStatus::TimedOut);
    assert_eq!(controls[1].invocations.get("i-1").unwrap().status, InvocationStatus::Failed);
    assert_eq!(f.history.put_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_ends_the_session_immediately() {
    let f = Fixture::new();
    f.linux("i-1");
    f.statuses(&[("i-1", InvocationStatus::InProgress)]);
    f.output("i-1", "ev1", 100);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let session = f.poll(cancel).await.unwrap();
    let (messages, result) = session.collect().await;

    result.unwrap();
    assert!(start.elapsed() < Duration::from_secs(3));
    assert!(controls(&messages).is_empty());
    assert_eq!(payloads(&messages).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn wrong_platform_instance_does_not_hold_the_session_open() {
    let f = Fixture::new();
    f.linux("i-linux");
    f.instance("i-windows", Platform::Windows, InstanceState::Running);
    // The Windows instance never reports back for a shell document.
    f.statuses(&[
        ("i-linux", InvocationStatus::InProgress),
        ("i-windows", InvocationStatus::InProgress),
    ]);
    f.statuses_after(
        Duration::from_secs(4),
        &[("i-linux", InvocationStatus::Success), ("i-windows", InvocationStatus::InProgress)],
    );

    let start = Instant::now();
    let session = f.poll(CancellationToken::new()).await.unwrap();
    assert_eq!(session.classification.wrong_platform, vec![InstanceId::new("i-windows")]);
    assert_eq!(session.classification.expected_responses(), 1);

    let (messages, result) = session.collect().await;
    result.unwrap();
    assert_eq!(controls(&messages).len(), 1);
    assert!(start.elapsed() < Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn only_faulty_instances_drains_after_first_status() {
    let f = Fixture::new();
    f.instance("i-gone", Platform::Linux, InstanceState::Terminated);
    f.statuses(&[("i-gone", InvocationStatus::InProgress)]);

    let session = f.poll(CancellationToken::new()).await.unwrap();
    assert_eq!(session.classification.faulty.len(), 1);
    let (messages, result) = session.collect().await;

    result.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn completed_instance_streams_stop_holding_the_window() {
    let f = Fixture::new();
    f.linux("i-1");
    f.linux("i-2");
    f.statuses(&[("i-1", InvocationStatus::Success), ("i-2", InvocationStatus::InProgress)]);
    f.output("i-1", "ev1", 100);
    f.output("i-2", "ev2", 200);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(12)).await;
        trigger.cancel();
    });

    let session = f.poll(cancel).await.unwrap();
    let (_, result) = session.collect().await;
    result.unwrap();

    let starts: Vec<Option<i64>> = f.logs.requests().iter().map(|r| r.start_time).collect();
    // i-1 completes on the first status poll (3s); its streams are ignored
    // after the grace (8s), which frees the window to follow i-2.
    assert_eq!(starts[0], None);
    assert_eq!(starts[1], Some(101));
    assert_eq!(starts.last().copied().flatten(), Some(201));
    assert!(starts.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(start_paused = true)]
async fn payloads_are_recorded_before_delivery() {
    let f = Fixture::new();
    f.linux("i-1");
    f.statuses(&[("i-1", InvocationStatus::Success)]);
    f.output("i-1", "ev1", 100);
    f.output("i-1", "ev2", 101);

    let session = f.poll(CancellationToken::new()).await.unwrap();
    let (messages, result) = session.collect().await;
    result.unwrap();

    let delivered: Vec<Payload> = payloads(&messages).into_iter().cloned().collect();
    assert_eq!(f.history.payloads(), delivered);
    assert_eq!(delivered.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn malformed_stream_names_are_skipped() {
    let f = Fixture::new();
    f.linux("i-1");
    f.statuses(&[("i-1", InvocationStatus::Success)]);
    let mut odd = stdout_event(CMD, "i-1", "odd", 100);
    odd.stream_name = format!("{CMD}/garbage");
    f.logs.put_event(GROUP, odd);
    f.output("i-1", "ev1", 101);

    let session = f.poll(CancellationToken::new()).await.unwrap();
    let (messages, result) = session.collect().await;
    result.unwrap();

    let output = payloads(&messages);
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].stdout_chunk, "ev1\n");
}

#[tokio::test(start_paused = true)]
async fn history_failure_is_fatal() {
    let f = Fixture::new();
    f.linux("i-1");
    f.statuses(&[("i-1", InvocationStatus::InProgress)]);
    f.output("i-1", "ev1", 100);
    f.history.fail_with("disk full");

    let session = f.poll(CancellationToken::new()).await.unwrap();
    let (messages, result) = session.collect().await;

    assert!(messages.is_empty());
    assert!(matches!(result, Err(PollError::History(_))));
}

#[tokio::test(start_paused = true)]
async fn log_fetch_failure_is_fatal() {
    let f = Fixture::new();
    f.linux("i-1");
    f.statuses(&[("i-1", InvocationStatus::InProgress)]);
    f.logs.fail_call(2, LogStoreError::Throttled);

    let session = f.poll(CancellationToken::new()).await.unwrap();
    let (_, result) = session.collect().await;

    assert!(matches!(result, Err(PollError::Tail(_))));
}

#[tokio::test(start_paused = true)]
async fn status_refresh_failure_is_fatal() {
    let f = Fixture::new();
    f.linux("i-1");
    f.statuses(&[("i-1", InvocationStatus::InProgress)]);
    // Call 1 is the refresh inside `poll`; call 2 is the first status poll.
    f.service.fail_call(CommandOp::ListInvocations, 2, CommandServiceError::Throttled);

    let session = f.poll(CancellationToken::new()).await.unwrap();
    let (_, result) = session.collect().await;

    assert!(matches!(result, Err(PollError::Tracker(_))));
}

#[tokio::test(start_paused = true)]
async fn unknown_command_fails_before_the_session_starts() {
    let f = Fixture::new();
    let result = PollOrchestrator::new(
        f.service.clone(),
        f.logs.clone(),
        f.history.clone(),
        f.clock.clone(),
        PollConfig::default(),
    )
    .poll(CancellationToken::new(), &CommandId::new("missing"))
    .await;

    assert!(matches!(result, Err(PollError::LoadCommand { .. })));
    assert_eq!(f.logs.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn finish_without_reading_does_not_block() {
    let f = Fixture::new();
    f.linux("i-1");
    f.statuses(&[("i-1", InvocationStatus::InProgress)]);
    for n in 0..10 {
        f.output("i-1", &format!("ev{n}"), 100 + n);
    }

    let session = f.poll(CancellationToken::new()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    session.finish().await.unwrap();
}
