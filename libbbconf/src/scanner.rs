//! Phase 1: Scanner
//!
//! The scanner converts raw source text into scan lines. It performs:
//! - Line splitting on `\n` (a trailing `\r` is ordinary whitespace)
//! - Blank line filtering
//! - Indentation counting
//!
//! It also owns the key/value split of a single line.

use crate::error::{ParseError, Result};

/// A single non-blank line after the scanning phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLine<'a> {
    /// Content after the indent, trailing whitespace removed.
    pub content: &'a str,
    /// Number of leading whitespace characters.
    pub indent: usize,
    /// Zero-based line number for error reporting.
    pub line_num: usize,
}

/// Scan source text into its non-blank lines.
pub fn scan(source: &str) -> Vec<ScanLine<'_>> {
    source
        .split('\n')
        .enumerate()
        .filter_map(|(line_num, line)| {
            let content = line.trim();
            if content.is_empty() {
                return None;
            }
            Some(ScanLine {
                content,
                indent: count_indent(line),
                line_num,
            })
        })
        .collect()
}

/// Count the number of leading whitespace characters in a line.
fn count_indent(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Split a dedented line into its key and raw value.
///
/// The split happens at the first colon. The key loses trailing whitespace
/// and the value loses surrounding whitespace, so `key:` and `key:   ` both
/// yield an empty value.
pub fn split_line(line: &str) -> Result<(&str, &str)> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| ParseError::LineSyntax(String::new()))?;

    Ok((key.trim_end(), value.trim()))
}
