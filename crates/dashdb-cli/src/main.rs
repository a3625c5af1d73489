//! DashDB CLI - inspect and edit newline-delimited JSON collections
//!
//! This is the command-line interface for DashDB. Every invocation opens one
//! collection through the core library, runs one operation, and persists
//! mutations before exiting.

mod app;
mod cli;
mod commands;
mod config;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(err) = commands::run(&cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("DASHDB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
