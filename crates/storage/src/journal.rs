// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSON-lines journal.
//!
//! Each line is one [`JournalEntry`]. Sequence numbers start at 1 and are
//! dense. On open, everything after the first unreadable line is dropped:
//! the original file is kept as a `.bak` and the journal is rewritten with
//! the readable prefix.

use chrono::{DateTime, Utc};
use fr_core::{CommandStatus, HistoryError, Payload};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Entry {
    PutCommand { status: CommandStatus },
    AppendPayload { payload: Payload },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    pub entry: Entry,
}

pub struct Journal {
    path: PathBuf,
    writer: BufWriter<File>,
    write_seq: u64,
}

impl Journal {
    /// Open or create the journal at `path`, returning it with every
    /// readable entry.
    pub fn open(path: &Path) -> Result<(Self, Vec<JournalEntry>), HistoryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries = if path.exists() { read_entries(path)? } else { Vec::new() };
        let write_seq = entries.last().map_or(0, |e| e.seq);

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let journal = Self { path: path.to_path_buf(), writer: BufWriter::new(file), write_seq };
        Ok((journal, entries))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    /// Buffer one entry; returns its sequence number.
    pub fn append(&mut self, entry: Entry) -> Result<JournalEntry, HistoryError> {
        let record = JournalEntry { seq: self.write_seq + 1, recorded_at: Utc::now(), entry };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.write_seq = record.seq;
        Ok(record)
    }

    pub fn flush(&mut self) -> Result<(), HistoryError> {
        self.writer.flush()?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<Vec<JournalEntry>, HistoryError> {
    let bytes = fs::read(path)?;
    let mut entries = Vec::new();
    let mut valid_len = 0;
    let mut corrupt = false;

    for line in bytes.split_inclusive(|b| *b == b'\n') {
        let body = line.strip_suffix(b"\n").unwrap_or(line);
        if body.iter().all(u8::is_ascii_whitespace) {
            valid_len += line.len();
            continue;
        }
        match serde_json::from_slice::<JournalEntry>(body) {
            Ok(entry) if line.ends_with(b"\n") => {
                entries.push(entry);
                valid_len += line.len();
            }
            _ => {
                corrupt = true;
                break;
            }
        }
    }

    if corrupt {
        let bak = rotate_bak_path(path);
        tracing::warn!(
            path = %path.display(),
            backup = %bak.display(),
            kept = entries.len(),
            "history journal has an unreadable tail, truncating"
        );
        fs::copy(path, &bak)?;
        fs::write(path, bytes.get(..valid_len).unwrap_or_default())?;
    }
    Ok(entries)
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, shifting older backups up and
/// dropping the oldest beyond [`MAX_BAK_FILES`].
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
