// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers and info labels: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Descriptions and context: medium grey
    pub const CONTEXT: u8 = 245;
    /// Muted / secondary text: darker grey
    pub const MUTED: u8 = 240;
    /// Stdout prefixes and full success
    pub const GOOD: u8 = 114;
    /// Stderr prefixes and total failure
    pub const BAD: u8 = 174;
    /// Partial success
    pub const PARTIAL: u8 = 80;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

const RESET: &str = "\x1b[0m";

/// Wrap `text` in a 256-color foreground when `enabled`.
pub fn paint(enabled: bool, code: u8, text: &str) -> String {
    if enabled {
        format!("\x1b[38;5;{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(should_colorize(), codes::HEADER, text)
}

pub fn muted(text: &str) -> String {
    paint(should_colorize(), codes::MUTED, text)
}

pub fn good(text: &str) -> String {
    paint(should_colorize(), codes::GOOD, text)
}

pub fn bad(text: &str) -> String {
    paint(should_colorize(), codes::BAD, text)
}

pub fn partial(text: &str) -> String {
    paint(should_colorize(), codes::PARTIAL, text)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
