//! JSON I/O handling for CLI
//!
//! - Input: one query JSON object
//! - Output: one response JSON object per line
//! - UTF-8 only

use std::io::{Read, Write};

use serde_json::Value;

use crate::query::Query;

use super::errors::{CliError, CliResult};

/// Read a query document from `input`
pub fn read_request<R: Read>(input: &mut R) -> CliResult<Query> {
    let mut raw = String::new();
    input.read_to_string(&mut raw)?;

    if raw.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let query: Query = serde_json::from_str(&raw)?;
    Ok(query)
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
