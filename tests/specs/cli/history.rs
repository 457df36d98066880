// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fr history` specs against a seeded store.

use crate::prelude::*;

fn seeded() -> StateDir {
    let state = StateDir::empty();
    state.seed(|s| {
        s.command(
            "11111111-aaaa",
            "uptime",
            secs_ago(7200),
            &[("i-web1", InvocationStatus::Success), ("i-web2", InvocationStatus::Failed)],
        )
        .output("11111111-aaaa", "i-web1", "up 3 days\n", "")
        .output("11111111-aaaa", "i-web2", "", "uptime: not found\n");
        s.command(
            "22222222-bbbb",
            "df -h\nfree -m",
            secs_ago(30),
            &[("i-web1", InvocationStatus::Success)],
        )
        .output("22222222-bbbb", "i-web1", "Filesystem Size\n/dev/sda1 20G\n", "");
    });
    state
}

#[test]
fn list_on_fresh_state_dir_says_no_commands() {
    let state = StateDir::empty();
    state.fr().args(&["history", "list"]).passes().stdout_eq("No commands\n");
}

#[test]
fn list_shows_newest_first() {
    let run = seeded().fr().args(&["history", "list"]).passes();
    let stdout = run.stdout();
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 3, "{stdout}");
    assert!(lines[1].contains("22222222-bbbb"));
    assert!(lines[1].contains("✔ (1/1)"));
    assert!(lines[1].ends_with("df -h"));
    assert!(lines[2].contains("11111111-aaaa"));
    assert!(lines[2].contains("! (1/2)"));
    assert!(lines[2].starts_with("2h"));
}

#[test]
fn list_json_is_machine_readable() {
    let run = seeded().fr().args(&["history", "list", "-o", "json"]).passes();
    let value: serde_json::Value = serde_json::from_str(&run.stdout()).unwrap();

    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[0]["command_id"], "22222222-bbbb");
    assert_eq!(value[1]["success"], 1);
    assert_eq!(value[1]["total"], 2);
}

#[test]
fn show_prefixes_each_line_with_instance() {
    seeded()
        .fr()
        .args(&["history", "show", "2222"])
        .passes()
        .stdout_has("[i-web1] Filesystem Size\n[i-web1] /dev/sda1 20G\n")
        .stderr_has("Command ID: 22222222-bbbb")
        .stderr_has("Running command on 1 instances: [i-web1]")
        .stderr_has("Completed: 1/1 succeeded");
}

#[test]
fn show_sends_stderr_chunks_to_stderr() {
    seeded()
        .fr()
        .args(&["history", "show", "11111111-aaaa"])
        .passes()
        .stdout_has("[i-web1] up 3 days")
        .stdout_lacks("not found")
        .stderr_has("[i-web2] uptime: not found");
}

#[test]
fn show_quiet_prints_raw_output() {
    seeded()
        .fr()
        .args(&["history", "show", "--quiet", "2222"])
        .passes()
        .stdout_eq("Filesystem Size\n/dev/sda1 20G\n\n");
}

#[test]
fn show_unknown_command_exits_3() {
    seeded()
        .fr()
        .args(&["history", "show", "nope"])
        .fails()
        .code(3)
        .stderr_has("no command matches 'nope'");
}

#[test]
fn export_writes_one_file_per_instance() {
    let state = seeded();
    let out = state.path().join("out");

    state
        .fr()
        .args(&["history", "export", "1111", "--dir", out.to_str().unwrap()])
        .passes()
        .stdout_has("Exported 2 instances");

    let dir = out.join("11111111-aaaa");
    assert_eq!(std::fs::read_to_string(dir.join("i-web1.txt")).unwrap(), "up 3 days\n");
    assert_eq!(std::fs::read_to_string(dir.join("i-web2.txt")).unwrap(), "uptime: not found\n");
}

#[test]
fn torn_history_tail_is_recovered() {
    let state = seeded();
    let mut bytes = std::fs::read(state.history_path()).unwrap();
    bytes.extend_from_slice(br#"{"seq":99,"recorded"#);
    std::fs::write(state.history_path(), bytes).unwrap();

    state.fr().args(&["history", "list"]).passes().stdout_has("22222222-bbbb");
    assert!(state.history_path().with_extension("bak").exists());
}
