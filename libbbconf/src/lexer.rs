//! Phase 2: Indentation Tracker
//!
//! Converts the indentation width of each scan line into a structural depth.
//! The first indented line fixes the indentation unit for the whole document;
//! every later indentation must be a whole multiple of it.

use crate::error::{ParseError, Result};

/// Running indentation state for one document.
#[derive(Debug, Default)]
pub struct IndentTracker {
    unit: Option<usize>,
    lines_seen: usize,
}

impl IndentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The indentation unit, once an indented line has been seen.
    pub fn unit(&self) -> Option<usize> {
        self.unit
    }

    /// Compute the depth of the next line from its indentation width.
    ///
    /// Errors carry no location; the caller attaches it.
    pub fn depth(&mut self, width: usize) -> Result<usize> {
        let first = self.lines_seen == 0;
        self.lines_seen += 1;

        if width == 0 {
            return Ok(0);
        }
        if first {
            return Err(ParseError::RootIndentation(String::new()));
        }

        let unit = *self.unit.get_or_insert(width);
        if width % unit != 0 {
            return Err(ParseError::InconsistentIndentation {
                width,
                unit,
                loc: String::new(),
            });
        }

        Ok(width / unit)
    }
}
