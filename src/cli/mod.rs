//! CLI for the CDP support agent
//!
//! Provides subcommands for the two entry points:
//! - `ingest`: harvest documentation for one or all platforms
//! - `chat`: answer a single query against the local backend

pub mod chat;
pub mod ingest;

use clap::{Parser, Subcommand};

/// CDP Support Agent - documentation-grounded support for CDP platforms
#[derive(Parser)]
#[command(name = "cdp-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Harvest documentation into the local store
    Ingest(ingest::IngestArgs),

    /// Ask a single question
    Chat(chat::ChatArgs),
}
