// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fr_core::test_support::invocation_set;
use fr_core::{
    CommandId, CommandMetadata, CommandStatus, FakeClock, InstanceId, InvocationStatus, Payload,
};
use serial_test::serial;
use tempfile::TempDir;

const NOW_MS: i64 = 10_000_000;

fn record(
    history: &mut History,
    id: &str,
    requested_at_ms: i64,
    entries: &[(&str, InvocationStatus)],
) {
    let command = CommandMetadata::builder()
        .command_id(id)
        .commands(format!("echo {id}\nuptime"))
        .requested_at_ms(requested_at_ms)
        .target_count(entries.len())
        .build();
    history.put_command(&CommandStatus::new(command, invocation_set(entries))).unwrap();
}

fn output(history: &mut History, id: &str, instance: &str, stdout: &str, stderr: &str) {
    let payload = Payload {
        command_id: CommandId::new(id),
        instance_id: InstanceId::new(instance),
        stdout_chunk: stdout.to_string(),
        stderr_chunk: stderr.to_string(),
    };
    history.append_payload(&CommandId::new(id), &payload).unwrap();
}

fn store() -> (TempDir, History) {
    let dir = tempfile::tempdir().unwrap();
    let history = History::open(&dir.path().join("history.jsonl")).unwrap();
    (dir, history)
}

fn clock() -> FakeClock {
    let clock = FakeClock::new();
    clock.set_epoch_ms(NOW_MS);
    clock
}

fn list_text(history: &History, format: OutputFormat) -> String {
    let mut out = Vec::new();
    list(history, format, &clock(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
#[serial]
fn list_empty_store() {
    std::env::set_var("NO_COLOR", "1");
    let (_dir, history) = store();
    assert_eq!(list_text(&history, OutputFormat::Text), "No commands\n");
}

#[test]
#[serial]
fn list_is_newest_first_with_status_icons() {
    std::env::set_var("NO_COLOR", "1");
    let (_dir, mut history) = store();
    record(&mut history, "cmd-old", NOW_MS - 7_200_000, &[("i-1", InvocationStatus::Failed)]);
    record(
        &mut history,
        "cmd-mid",
        NOW_MS - 120_000,
        &[("i-1", InvocationStatus::Success), ("i-2", InvocationStatus::TimedOut)],
    );
    record(&mut history, "cmd-new", NOW_MS - 5_000, &[("i-1", InvocationStatus::Success)]);

    let text = list_text(&history, OutputFormat::Text);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("AGE"));
    assert!(lines[1].starts_with("5s "), "{}", lines[1]);
    assert!(lines[1].contains("cmd-new") && lines[1].contains("✔ (1/1)"));
    assert!(lines[2].starts_with("2m ") && lines[2].contains("! (1/2)"));
    assert!(lines[3].starts_with("2h ") && lines[3].contains("✗ (0/1)"));
    assert!(lines[3].ends_with("echo cmd-old"), "only the first command line is shown");
}

#[test]
#[serial]
fn list_columns_line_up() {
    std::env::set_var("NO_COLOR", "1");
    let (_dir, mut history) = store();
    record(&mut history, "a", NOW_MS - 1_000, &[("i-1", InvocationStatus::Success)]);
    record(&mut history, "much-longer-id", NOW_MS - 1_000, &[("i-1", InvocationStatus::Success)]);

    let text = list_text(&history, OutputFormat::Text);
    let status_col: Vec<usize> =
        text.lines().skip(1).map(|l| l.find('✔').unwrap_or_default()).collect();
    assert_eq!(status_col[0], status_col[1]);
}

#[test]
fn list_json_has_counts() {
    let (_dir, mut history) = store();
    record(&mut history, "cmd-1", 0, &[("i-1", InvocationStatus::Success)]);

    let value: serde_json::Value =
        serde_json::from_str(&list_text(&history, OutputFormat::Json)).unwrap();
    assert_eq!(value[0]["command_id"], "cmd-1");
    assert_eq!(value[0]["success"], 1);
    assert_eq!(value[0]["total"], 1);
}

#[test]
fn show_prints_info_then_prefixed_output() {
    let (_dir, mut history) = store();
    record(&mut history, "cmd-1", 0, &[("i-1", InvocationStatus::Success)]);
    output(&mut history, "cmd-1", "i-1", "hello\n", "warn\n");

    let mut out = Vec::new();
    let mut err = Vec::new();
    {
        let mut printer = Printer::new(&mut out, &mut err, false, false);
        let record = history.command("cmd").unwrap();
        show(&history, record, &mut printer).unwrap();
    }

    assert_eq!(String::from_utf8(out).unwrap(), "[i-1] hello\n\n");
    let err = String::from_utf8(err).unwrap();
    assert!(err.starts_with("Command: echo cmd-1\nuptime\n"), "{err}");
    assert!(err.contains("[i-1] warn\n"));
    assert!(err.ends_with("Completed: 1/1 succeeded\n"));
}

#[test]
fn export_writes_stdout_then_stderr_per_instance() {
    let (dir, mut history) = store();
    record(&mut history, "cmd-1", 0, &[("i-1", InvocationStatus::Success)]);
    output(&mut history, "cmd-1", "i-1", "out\n", "err\n");
    output(&mut history, "cmd-1", "i-2", "two\n", "");

    let export_dir = dir.path().join("export");
    let written = export(history.command("cmd-1").unwrap(), &export_dir).unwrap();

    assert_eq!(written, 2);
    let read = |name: &str| std::fs::read_to_string(export_dir.join("cmd-1").join(name)).unwrap();
    assert_eq!(read("i-1.txt"), "out\nerr\n");
    assert_eq!(read("i-2.txt"), "two\n");
}

#[test]
fn lookup_maps_missing_and_ambiguous_to_exit_errors() {
    let (_dir, mut history) = store();
    record(&mut history, "cmd-1", 0, &[]);
    record(&mut history, "cmd-2", 0, &[]);

    for id in ["nope", "cmd"] {
        let err = lookup(&history, id).unwrap_err();
        let exit = err.downcast_ref::<ExitError>().unwrap();
        assert_eq!(exit.code, 3);
    }
    assert!(lookup(&history, "cmd-2").is_ok());
}
