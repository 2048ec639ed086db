//! CLI module for objquery
//!
//! Provides command-line interface for:
//! - query: Execute a query against a store snapshot
//! - explain: Print the compiled filters and order of a query
//! - lookup: Execute a query restricted to a list of identifiers

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, StoreArgs};
pub use commands::{execute_command, explain, lookup, query, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
