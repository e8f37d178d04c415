use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::history::Category;

/// Sanus medicine verification CLI
#[derive(Debug, Parser)]
#[command(name = "sanus", about = "Verify medicine QR codes against the ledger", disable_help_subcommand = true)]
#[command(version)]
pub struct Cli {
    /// Config file (overrides CONFIG_PATH)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Verify a scanned payload and record the result
    Scan {
        /// Raw QR payload (the encrypted asset identifier)
        payload: String,
        #[arg(long = "scan-type")]
        scan_type: Option<String>,
    },
    /// Show recorded scans, newest first
    History {
        #[arg(long)]
        category: Option<Category>,
        /// Case-insensitive search over name, manufacturer, serial and batch
        #[arg(long)]
        search: Option<String>,
        /// Only the N most recent scans
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Show the active wallet address
    Wallet,
    /// Forget the wallet session
    Disconnect,
    /// Delete every recorded scan
    ClearHistory,
}
