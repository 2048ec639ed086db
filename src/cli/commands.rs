//! CLI command implementations
//!
//! Each command loads the snapshot and optional config, reads one query
//! from the input, and writes one response. Query failures are reported as
//! an error response and returned as `CliError`.

use std::io::{self, Read, Write};

use crate::config::EngineConfig;
use crate::error::QueryError;
use crate::executor::{CancellationToken, QueryExecutor};
use crate::observability::Logger;
use crate::store::MemoryStore;

use super::args::{Cli, Command, StoreArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Parse arguments and run the selected command against stdin/stdout
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a command against stdin/stdout
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    execute_command(cmd, &mut stdin.lock(), &mut stdout.lock())
}

/// Run a command against the given input and output
pub fn execute_command<R: Read, W: Write>(cmd: Command, input: &mut R, out: &mut W) -> CliResult<()> {
    match cmd {
        Command::Query { store } => query(&store, input, out),
        Command::Explain { store } => explain(&store, input, out),
        Command::Lookup {
            store,
            relation,
            ids,
        } => lookup(&store, &relation, &ids, input, out),
    }
}

/// Execute a query and print its records
pub fn query<R: Read, W: Write>(args: &StoreArgs, input: &mut R, out: &mut W) -> CliResult<()> {
    let (store, config) = load(args)?;
    let request = read_request(input)?;

    let executor = QueryExecutor::new(&store).with_config(config);
    match executor.execute(&request, &CancellationToken::new()) {
        Ok(result) => write_response(out, serde_json::to_value(&result)?),
        Err(err) => fail(out, err),
    }
}

/// Print the compiled form of a query
pub fn explain<R: Read, W: Write>(args: &StoreArgs, input: &mut R, out: &mut W) -> CliResult<()> {
    let (store, config) = load(args)?;
    let request = read_request(input)?;

    let executor = QueryExecutor::new(&store).with_config(config);
    match executor.explain(&request) {
        Ok(filters) => write_response(out, filters.to_json()),
        Err(err) => fail(out, err),
    }
}

/// Execute a query restricted to `ids` on `relation`
pub fn lookup<R: Read, W: Write>(
    args: &StoreArgs,
    relation: &str,
    ids: &[String],
    input: &mut R,
    out: &mut W,
) -> CliResult<()> {
    let (store, config) = load(args)?;
    let request = read_request(input)?;

    let executor = QueryExecutor::new(&store).with_config(config);
    match executor.execute_by_relation(&request, relation, ids, &CancellationToken::new()) {
        Ok(result) => write_response(out, serde_json::to_value(&result)?),
        Err(err) => fail(out, err),
    }
}

fn load(args: &StoreArgs) -> CliResult<(MemoryStore, EngineConfig)> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    Logger::set_min_severity(config.severity());

    let store = MemoryStore::load(&args.store)?;
    Ok((store, config))
}

/// Reports a failed query on `out` and as the command's error
fn fail<W: Write>(out: &mut W, err: QueryError) -> CliResult<()> {
    write_error(out, err.code(), &err.to_string())?;
    Err(CliError::from(err))
}
