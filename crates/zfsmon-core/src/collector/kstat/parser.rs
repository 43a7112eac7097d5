//! Parsers for ZFS kstat files.
//!
//! These are pure functions that parse the content of kstat pseudo-files
//! into field maps. They are designed to be easily testable with string inputs.

use std::path::{Path, PathBuf};

use crate::metrics::Fields;

/// Counter categories whose raw keys already carry their own namespace.
///
/// Keys from these files are emitted as-is; every other category prefixes
/// its keys with `<category>_`.
pub const UNPREFIXED_CATEGORIES: &[&str] = &["zil", "dmu_tx", "dnodestats"];

/// Number of metadata lines at the top of every counter file.
const COUNTER_HEADER_LINES: usize = 2;

/// Error type for kstat parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A pool `io` table did not have exactly three lines.
    MalformedTable { path: PathBuf, line_count: usize },
    /// Header and value lines of a pool `io` table differ in width.
    ColumnMismatch {
        keys: Vec<String>,
        values: Vec<String>,
    },
    /// A value in a pool `io` table is not a valid 64-bit integer.
    InvalidValue { key: String, value: String },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MalformedTable { path, line_count } => write!(
                f,
                "malformed kstat table {}: expected 3 lines, got {}",
                path.display(),
                line_count
            ),
            ParseError::ColumnMismatch { keys, values } => write!(
                f,
                "key and value count don't match keys:{:?} values:{:?}",
                keys, values
            ),
            ParseError::InvalidValue { key, value } => {
                write!(f, "invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a pool `io` kstat table.
///
/// Format: a kstat header line, a line of column names and a line of values.
/// ```text
/// 12 3 0x00 1 80 2225326830828 32953917237762
/// nread    nwritten   reads    writes   wtime    wlentime ...
/// 1884160  3206144    22       37       130737   1765845  ...
/// ```
///
/// Every value must parse; a single bad column rejects the whole table.
pub fn parse_pool_io(path: &Path, content: &str) -> Result<Fields, ParseError> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() != 3 {
        return Err(ParseError::MalformedTable {
            path: path.to_path_buf(),
            line_count: lines.len(),
        });
    }

    let keys: Vec<&str> = lines[1].split_whitespace().collect();
    let values: Vec<&str> = lines[2].split_whitespace().collect();

    if keys.len() != values.len() {
        return Err(ParseError::ColumnMismatch {
            keys: keys.iter().map(|s| s.to_string()).collect(),
            values: values.iter().map(|s| s.to_string()).collect(),
        });
    }

    let mut fields = Fields::new();
    for (key, value) in keys.into_iter().zip(values) {
        let parsed: i64 = value.parse().map_err(|_| ParseError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        fields.insert(key.to_string(), parsed);
    }

    Ok(fields)
}

/// Returns the field name a raw counter key is emitted under.
pub fn counter_field_key(category: &str, key: &str) -> String {
    if UNPREFIXED_CATEGORIES.contains(&category) {
        key.to_string()
    } else {
        format!("{}_{}", category, key)
    }
}

/// Parses a named counter kstat file and merges its counters into `fields`.
///
/// Format: two header lines, then one counter per line with the name in the
/// first column and the value in the last.
/// ```text
/// 6 1 0x01 91 4368 1886271585 29474335538473
/// name                            type data
/// hits                            4    123456
/// ```
///
/// Never fails: values that are not valid integers are recorded as `0`.
pub fn parse_counter_category(category: &str, content: &str, fields: &mut Fields) {
    for line in content.lines().skip(COUNTER_HEADER_LINES) {
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            continue;
        };
        let raw_value = tokens.next_back().unwrap_or(key);
        let value: i64 = raw_value.parse().unwrap_or(0);
        fields.insert(counter_field_key(category, key), value);
    }
}
