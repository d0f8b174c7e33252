//! Parsing `<id> <seconds>` burst records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::error::InputReadError;

/// One simulated process: an id and how long it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    /// Process identifier as written in the input.
    pub pid: i64,
    /// Burst length in burst seconds.
    pub burst: u64,
}

/// Parse every record from `reader`.
///
/// Blank lines are skipped and fields after the second are ignored. The
/// first bad line aborts parsing, so callers never see a partial list.
pub fn parse_records<R: BufRead>(
    reader: R,
    source: &Path,
) -> Result<Vec<ProcessRecord>, InputReadError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source_err| InputReadError::Io {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(index + 1, &line)?);
    }
    Ok(records)
}

/// Open `path` and parse its records.
pub fn load_records(path: &Path) -> Result<Vec<ProcessRecord>, InputReadError> {
    let file = File::open(path).map_err(|source| InputReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(BufReader::new(file), path)
}

fn parse_line(line: usize, content: &str) -> Result<ProcessRecord, InputReadError> {
    let malformed = |reason: String| InputReadError::Malformed {
        line,
        content: content.to_string(),
        reason,
    };

    let mut fields = content.split_whitespace();
    let pid = fields
        .next()
        .ok_or_else(|| malformed("missing process id".to_string()))?;
    let burst = fields
        .next()
        .ok_or_else(|| malformed("missing burst time".to_string()))?;

    let pid = pid
        .parse::<i64>()
        .map_err(|e| malformed(format!("invalid process id {:?}: {}", pid, e)))?;
    let burst = burst
        .parse::<u64>()
        .map_err(|e| malformed(format!("invalid burst time {:?}: {}", burst, e)))?;

    Ok(ProcessRecord { pid, burst })
}
