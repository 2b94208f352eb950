use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for the `attest` binary.
#[derive(Debug, Parser)]
#[command(name = "attest", version, about = "Attest - tamper-evident audit ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Append one event to an organization's chain
    Append(AppendArgs),

    /// Spot-check one event: recompute its hash, walk bounded ancestors
    VerifyEvent {
        /// Organization (tenant) id
        #[arg(long)]
        org: String,
        /// Event id (e.g. evt-a3f8b2c1)
        event_id: String,
    },

    /// Replay an organization's full chain and report integrity status
    VerifyChain {
        /// Organization (tenant) id
        org: String,
    },

    /// Executive compliance summary for a trailing window
    Report {
        /// Organization (tenant) id
        org: String,
        /// Window length in days, ending now
        #[arg(long, default_value_t = 7)]
        days: i64,
    },

    /// Export an organization's chain to a JSONL file
    Export {
        /// Organization (tenant) id
        org: String,
        /// Output path
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct AppendArgs {
    /// Organization (tenant) id
    #[arg(long)]
    pub org: String,

    /// Acting user id; omit for system-originated events
    #[arg(long)]
    pub actor: Option<String>,

    /// Dot-namespaced event name (e.g. job.created)
    pub event_name: String,

    /// Entity class the event concerns
    #[arg(long, default_value = "job")]
    pub target_type: String,

    /// Entity id the event concerns
    #[arg(long)]
    pub target_id: Option<String>,

    /// Inline JSON metadata document
    #[arg(long, default_value = "{}")]
    pub metadata: String,
}
