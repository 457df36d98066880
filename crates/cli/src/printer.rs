// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renders poll messages for a terminal.

use std::io::{self, Write};

use fr_core::{CommandStatus, Message, Payload};

use crate::color::{self, codes};

/// Writes payload chunks to `out`/`err` with an `[instance-id] ` prefix on
/// every line. Quiet mode prints chunks as-is and skips all framing.
///
/// With a `width`, lines are word-wrapped so each wrapped piece keeps its
/// prefix and fits the terminal.
pub struct Printer<O: Write, E: Write> {
    out: O,
    err: E,
    quiet: bool,
    colorize: bool,
    width: Option<usize>,
}

impl Printer<io::Stdout, io::Stderr> {
    pub fn stdio(quiet: bool) -> Self {
        let width = terminal_size::terminal_size().map(|(w, _)| usize::from(w.0));
        Self::new(io::stdout(), io::stderr(), quiet, color::should_colorize()).with_width(width)
    }
}

impl<O: Write, E: Write> Printer<O, E> {
    pub fn new(out: O, err: E, quiet: bool, colorize: bool) -> Self {
        Self { out, err, quiet, colorize, width: None }
    }

    pub fn with_width(mut self, width: Option<usize>) -> Self {
        self.width = width;
        self
    }

    /// Describe the command on `err` before its output.
    pub fn print_info(&mut self, status: &CommandStatus) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let ids: Vec<&str> = status.invocations.iter().map(|i| i.instance_id.as_str()).collect();
        self.info("Command: ", &status.command.commands)?;
        self.info("Command ID: ", status.command_id().as_str())?;
        self.info(
            &format!("Running command on {} instances: ", ids.len()),
            &format!("[{}]", ids.join(", ")),
        )
    }

    pub fn print(&mut self, message: &Message) -> io::Result<()> {
        match message {
            Message::Payload(payload) => self.print_payload(payload),
            Message::Control { status } => self.print_summary(status),
        }
    }

    fn print_payload(&mut self, payload: &Payload) -> io::Result<()> {
        let style = ChunkStyle { quiet: self.quiet, colorize: self.colorize, width: self.width };
        if !payload.stdout_chunk.is_empty() {
            write_chunk(&mut self.out, style, codes::GOOD, payload, &payload.stdout_chunk)?;
        }
        if !payload.stderr_chunk.is_empty() {
            write_chunk(&mut self.err, style, codes::BAD, payload, &payload.stderr_chunk)?;
        }
        if !self.quiet {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn print_summary(&mut self, status: &CommandStatus) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let total = status.command.target_count.max(status.invocations.len());
        self.info(
            "Completed: ",
            &format!("{}/{} succeeded", status.invocations.success_count(), total),
        )
    }

    fn info(&mut self, label: &str, value: &str) -> io::Result<()> {
        writeln!(
            self.err,
            "{}{}",
            color::paint(self.colorize, codes::HEADER, label),
            color::paint(self.colorize, codes::CONTEXT, value)
        )
    }
}

#[derive(Clone, Copy)]
struct ChunkStyle {
    quiet: bool,
    colorize: bool,
    width: Option<usize>,
}

fn write_chunk(
    w: &mut impl Write,
    style: ChunkStyle,
    code: u8,
    payload: &Payload,
    chunk: &str,
) -> io::Result<()> {
    if style.quiet {
        return writeln!(w, "{chunk}");
    }
    let label = format!("[{}] ", payload.instance_id);
    // At least one column is left for text on very narrow terminals.
    let room = style.width.map(|width| width.saturating_sub(label.chars().count()).max(1));
    let prefix = color::paint(style.colorize, code, &label);
    let chunk = chunk.strip_suffix('\n').unwrap_or(chunk);
    for line in chunk.split('\n') {
        match room {
            Some(room) => {
                for piece in textwrap::wrap(line, room) {
                    writeln!(w, "{prefix}{piece}")?;
                }
            }
            None => writeln!(w, "{prefix}{line}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
