// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! History command handlers

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use fr_core::{Clock, HistoryError, SystemClock};
use fr_storage::{CommandRecord, History};
use serde::Serialize;

use crate::color;
use crate::exit_error::ExitError;
use crate::output::{format_time_ago, handle_list, write_table, OutputFormat};
use crate::printer::Printer;

#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List recorded commands, newest first
    List {
        #[arg(short = 'o', long = "output", value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Print a command's recorded output
    Show {
        /// Command ID (or prefix)
        id: String,
        /// Print raw output without instance prefixes or framing
        #[arg(short, long)]
        quiet: bool,
    },
    /// Write each instance's output to `<dir>/<command-id>/<instance>.txt`
    Export {
        /// Command ID (or prefix)
        id: String,
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

pub fn handle(command: HistoryCommand, path: &Path) -> Result<()> {
    let history =
        History::open(path).with_context(|| format!("opening history at {}", path.display()))?;
    let mut stdout = std::io::stdout();

    match command {
        HistoryCommand::List { format } => list(&history, format, &SystemClock, &mut stdout),
        HistoryCommand::Show { id, quiet } => {
            let record = lookup(&history, &id)?;
            let mut printer = Printer::stdio(quiet);
            show(&history, record, &mut printer)
        }
        HistoryCommand::Export { id, dir } => {
            let record = lookup(&history, &id)?;
            let written = export(record, &dir)?;
            let target = dir.join(record.command_id().as_str());
            writeln!(
                stdout,
                "Exported {} instance{} to {}",
                written,
                if written == 1 { "" } else { "s" },
                target.display()
            )?;
            Ok(())
        }
    }
}

/// One row of `history list`.
#[derive(Debug, Serialize)]
pub struct CommandSummary {
    pub command_id: String,
    pub document: String,
    pub commands: String,
    pub requested_at_ms: i64,
    pub success: usize,
    pub total: usize,
}

impl CommandSummary {
    fn from_record(record: &CommandRecord) -> Self {
        let status = &record.status;
        Self {
            command_id: status.command_id().to_string(),
            document: status.command.document.to_string(),
            commands: status.command.commands.clone(),
            requested_at_ms: status.command.requested_at_ms,
            success: status.invocations.success_count(),
            total: status.command.target_count.max(status.invocations.len()),
        }
    }

    /// `✔` when every target succeeded, `✗` when none did, `!` otherwise.
    fn icon(&self) -> String {
        if self.success == 0 {
            color::bad("✗")
        } else if self.success < self.total {
            color::partial("!")
        } else {
            color::good("✔")
        }
    }
}

pub(crate) fn list(
    history: &History,
    format: OutputFormat,
    clock: &impl Clock,
    out: &mut dyn Write,
) -> Result<()> {
    let summaries: Vec<CommandSummary> =
        history.commands().rev().map(CommandSummary::from_record).collect();

    handle_list(format, &summaries, "No commands", out, |items, out| {
        let rows: Vec<Vec<String>> = items
            .iter()
            .map(|s| {
                vec![
                    format_time_ago(s.requested_at_ms, clock),
                    s.command_id.clone(),
                    format!("{} ({}/{})", s.icon(), s.success, s.total),
                    first_line(&s.commands).to_string(),
                ]
            })
            .collect();
        write_table(out, &["AGE", "COMMAND ID", "STATUS", "COMMAND"], &rows)
    })
}

pub(crate) fn show<O: Write, E: Write>(
    history: &History,
    record: &CommandRecord,
    printer: &mut Printer<O, E>,
) -> Result<()> {
    printer.print_info(&record.status)?;
    for message in history.replay(record.command_id().as_str())? {
        printer.print(&message)?;
    }
    Ok(())
}

/// Returns how many instance files were written.
pub(crate) fn export(record: &CommandRecord, dir: &Path) -> Result<usize> {
    let target = dir.join(record.command_id().as_str());
    std::fs::create_dir_all(&target)
        .with_context(|| format!("creating {}", target.display()))?;

    let mut written = 0;
    for (instance_id, output) in &record.outputs {
        let file = target.join(format!("{instance_id}.txt"));
        let mut contents = String::with_capacity(output.stdout.len() + output.stderr.len());
        contents.push_str(&output.stdout);
        contents.push_str(&output.stderr);
        std::fs::write(&file, contents).with_context(|| format!("writing {}", file.display()))?;
        tracing::debug!(path = %file.display(), "exported instance output");
        written += 1;
    }
    Ok(written)
}

fn lookup<'a>(history: &'a History, id: &str) -> Result<&'a CommandRecord> {
    history.command(id).map_err(|e| match e {
        HistoryError::UnknownCommand(_) | HistoryError::AmbiguousPrefix { .. } => {
            ExitError::not_found(e.to_string()).into()
        }
        other => anyhow::Error::from(other),
    })
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
