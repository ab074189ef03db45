//! Path grammar parser.
//!
//! Paths address nodes with dot notation for object keys and bracket
//! notation for array indices: `server.hosts[2].name`. Keys match
//! `[A-Za-z_][A-Za-z0-9_]*`; no quoting or escaping is supported. A leading
//! (or doubled) `.` is tolerated as a no-op so `.key` works after a
//! bracket; a leading `[` is permitted.

use crate::error::{StoreError, StoreResult};

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Object key lookup.
    Key(String),
    /// Array index lookup.
    Index(u64),
}

/// Validates a key against the key grammar.
///
/// # Errors
///
/// Returns [`StoreError::PathSyntax`] if `key` is empty or does not match
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let mut chars = key.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::path_syntax(format!("invalid key '{key}'")))
    }
}

/// Parses a path string into steps.
///
/// An empty path parses to no steps.
///
/// # Errors
///
/// Returns [`StoreError::PathSyntax`] for malformed input and
/// [`StoreError::IndexOutOfRange`] for a bracketed index whose digits
/// overflow.
pub fn parse_path(path: &str) -> StoreResult<Vec<PathStep>> {
    let bytes = path.as_bytes();
    let mut steps = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'.' => i += 1,
            b'[' => {
                i += 1;
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if i == start {
                    return Err(StoreError::path_syntax(format!(
                        "expected digits after '[' in '{path}'"
                    )));
                }
                if i >= bytes.len() || bytes[i] != b']' {
                    return Err(StoreError::path_syntax(format!(
                        "unterminated index in '{path}'"
                    )));
                }
                let digits = &path[start..i];
                let index: u64 = digits
                    .parse()
                    .map_err(|_| StoreError::index_overflow(digits))?;
                steps.push(PathStep::Index(index));
                i += 1;
            }
            _ => {
                let start = i;
                while i < bytes.len() && bytes[i] != b'.' && bytes[i] != b'[' {
                    i += 1;
                }
                let segment = &path[start..i];
                validate_key(segment)?;
                steps.push(PathStep::Key(segment.to_string()));
            }
        }
    }

    Ok(steps)
}
