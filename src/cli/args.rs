//! CLI argument definitions using clap
//!
//! Commands:
//! - objquery query --store <snapshot> [--config <path>]
//! - objquery explain --store <snapshot> [--config <path>]
//! - objquery lookup --store <snapshot> --relation <key> --ids <a,b,c> [--config <path>]
//!
//! Every command reads a query JSON object from stdin.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// objquery - filter, sort and look up objects in a store snapshot
#[derive(Parser, Debug)]
#[command(name = "objquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Path to the store snapshot (JSON)
    #[arg(long)]
    pub store: PathBuf,

    /// Path to the engine configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a query and print the matching records
    Query {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print the compiled filter tree and sort order of a query
    Explain {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Execute a query restricted to the given relation values
    Lookup {
        #[command(flatten)]
        store: StoreArgs,

        /// Relation the identifiers are matched against
        #[arg(long, default_value = "id")]
        relation: String,

        /// Comma separated identifiers
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
