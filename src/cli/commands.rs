//! CLI commands and argument parsing.

use clap::{Parser, Subcommand};

/// Partition Lister CLI
#[derive(Parser, Debug)]
#[command(name = "partition-lister")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON); falls back to built-in defaults for any
    /// field it omits.
    #[arg(short = 'C', long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server, aggregating a demo in-memory partition set.
    Serve {
        /// Address to bind.
        #[arg(short, long)]
        listen_addr: Option<String>,
    },

    /// Run one list call against a demo in-memory partition set and print
    /// the resulting page.
    List {
        /// Continue token from a prior page, empty for the first page.
        #[arg(long, default_value = "")]
        continue_token: String,

        /// Page size; `0` uses the configured default.
        #[arg(long, default_value = "0")]
        limit: u64,
    },
}
