//! Error types for bbconf parsing.

use thiserror::Error;

/// Result type for bbconf parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    ///
    /// `line` and `col` are zero-based; the rendered suffix is one-based.
    pub fn loc_suffix(&self, line: usize, col: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", line + 1, col + 1, name),
            None => format!(" at line {}", line + 1),
        }
    }
}

/// Error type for bbconf parsing.
///
/// Every variant aborts the parse. Location suffixes are empty when an error
/// is first raised and filled in by [`ParseError::with_location`].
#[derive(Error, Debug)]
pub enum ParseError {
    /// The first line of a document is indented.
    #[error("Root cannot start indented{0}")]
    RootIndentation(String),

    /// An indentation width is not a multiple of the document's unit.
    #[error("Indentation of {width} is not a multiple of the indentation unit {unit}{loc}")]
    InconsistentIndentation {
        width: usize,
        unit: usize,
        loc: String,
    },

    /// A key without an inline value was followed by a sibling instead of a
    /// deeper child.
    #[error("Key \"{key}\" has no value{loc}")]
    DanglingKey { key: String, loc: String },

    /// A line is not of the form `key: value`.
    #[error("Expected \"key: value\"{0}")]
    LineSyntax(String),

    /// Reading the document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, line: usize, col: usize) -> Self {
        let suffix = ctx.loc_suffix(line, col);
        match self {
            ParseError::RootIndentation(_) => ParseError::RootIndentation(suffix),
            ParseError::InconsistentIndentation { width, unit, .. } => {
                ParseError::InconsistentIndentation {
                    width,
                    unit,
                    loc: suffix,
                }
            }
            ParseError::DanglingKey { key, .. } => ParseError::DanglingKey { key, loc: suffix },
            ParseError::LineSyntax(_) => ParseError::LineSyntax(suffix),
            ParseError::Io(e) => ParseError::Io(e),
        }
    }
}
