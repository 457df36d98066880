// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fr: browse commands run across a fleet

mod color;
mod commands;
mod env;
mod exit_error;
mod output;
mod printer;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use tracing_subscriber::{fmt, prelude::*};

#[derive(Parser)]
#[command(
    name = "fr",
    version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")),
    about = "Browse recorded fleet commands and their output",
    styles = color::styles(),
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Previously run commands and their recorded output
    History(commands::history::HistoryArgs),
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(env::log_filter())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            if !exit.message.is_empty() {
                eprintln!("{}", exit.message);
            }
            std::process::exit(exit.code);
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::History(args) => {
            let path = env::history_path()?;
            commands::history::handle(args.command, &path)
        }
    }
}
