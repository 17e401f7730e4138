//! Score log parser for DungeonBell.
//!
//! The game server appends one line per completed game to its score log:
//!
//! ```text
//! <16 whitespace-separated fields>,<result description>
//! ```
//!
//! # Field Order
//!
//! | # | Field | Type |
//! |---|-------|------|
//! | 0 | game version | string |
//! | 1 | score | integer |
//! | 2 | dungeon id | integer |
//! | 3 | dungeon level | integer |
//! | 4 | max dungeon level | integer |
//! | 5 | hp | integer |
//! | 6 | max hp | integer |
//! | 7 | reserved | integer |
//! | 8 | end date | integer |
//! | 9 | start date | integer |
//! | 10 | reserved | integer |
//! | 11 | class | string |
//! | 12 | race | string |
//! | 13 | gender | string |
//! | 14 | alignment | string |
//! | 15 | player name | string |
//!
//! Lines that do not have exactly 16 fields, or that do not split into exactly
//! two comma-separated parts, are skipped. Integer fields that fail to parse
//! become zero instead of rejecting the line.
//!
//! # Example
//!
//! ```
//! use dungeonbell_monitor::parser::parse_line;
//!
//! let line = "3.4.3 1200 5 10 10 8 8 0 20240101 20240101 0 Fighter Human Male Neutral Bob, died of starvation";
//! let record = parse_line(line).unwrap();
//! assert_eq!(record.name, "Bob");
//! assert_eq!(record.score, 1200);
//! assert_eq!(record.result, "died of starvation");
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::types::SessionRecord;

/// Number of whitespace-separated fields before the comma.
pub const FIELD_COUNT: usize = 16;

/// Reasons a single log line is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line did not split into exactly two comma-separated parts.
    #[error("expected 2 comma-separated parts, found {0}")]
    PartCount(usize),

    /// The fixed segment did not contain exactly 16 fields.
    #[error("expected 16 fields, found {0}")]
    FieldCount(usize),
}

/// Parses one score log line into a [`SessionRecord`].
///
/// # Errors
///
/// Returns a [`ParseError`] when the line's shape is wrong. Malformed integer
/// fields are not errors; they parse as `0`.
pub fn parse_line(line: &str) -> Result<SessionRecord, ParseError> {
    let parts: Vec<&str> = line.split(',').collect();
    let fields: Vec<&str> = parts[0].split_whitespace().collect();

    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount(fields.len()));
    }
    if parts.len() != 2 {
        return Err(ParseError::PartCount(parts.len()));
    }

    Ok(SessionRecord {
        game_version: fields[0].to_string(),
        score: lenient_int(fields[1]),
        dungeon_id: lenient_int(fields[2]),
        dungeon_level: lenient_int(fields[3]),
        max_dungeon_level: lenient_int(fields[4]),
        hp: lenient_int(fields[5]),
        max_hp: lenient_int(fields[6]),
        unused1: lenient_int(fields[7]),
        end_date: lenient_int(fields[8]),
        start_date: lenient_int(fields[9]),
        unused2: lenient_int(fields[10]),
        class: fields[11].to_string(),
        race: fields[12].to_string(),
        gender: fields[13].to_string(),
        alignment: fields[14].to_string(),
        name: fields[15].to_string(),
        result: parts[1].trim().to_string(),
    })
}

/// Reads the whole score log and returns every well-formed record in file order.
///
/// Each call is independent of previous calls; diffing against earlier
/// results is the caller's job.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read. Malformed lines
/// are logged and skipped.
pub fn parse_log(path: &Path) -> io::Result<Vec<SessionRecord>> {
    let file = File::open(path)?;
    parse_reader(BufReader::new(file))
}

/// Parses records from any buffered reader.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the read.
///
/// # Errors
///
/// Returns an I/O error if reading a line fails.
pub fn parse_reader<R: BufRead>(reader: R) -> io::Result<Vec<SessionRecord>> {
    let mut records = Vec::new();

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        match parse_line(line.trim_end_matches('\r')) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(line_number = index + 1, error = %e, "Skipping invalid record");
            }
        }
    }

    debug!(record_count = records.len(), "Parsed score log");

    Ok(records)
}

/// Parses a decimal integer, substituting zero on failure.
fn lenient_int(token: &str) -> i64 {
    token.parse().unwrap_or(0)
}
