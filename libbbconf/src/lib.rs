//! bbconf parser implementation.
//!
//! bbconf is the indentation-sensitive format used for environment and test
//! definitions of the bb network test harness:
//!
//! ```text
//! connection: python-server
//! data:
//!     path:
//!         type: constant value
//!         value: /demo/endpoint
//! test:
//!     validation:
//!         error rate: 1/1000
//!         response time: <= 5ms
//! ```
//!
//! # Parsing Pipeline
//!
//! The parser operates in three phases:
//!
//! 1. **Scanner**: Splits source text into non-blank lines with their
//!    indentation width, and splits each line into key and raw value.
//!
//! 2. **Indentation Tracker**: Converts indentation widths into depths,
//!    enforcing a single indentation unit per document.
//!
//! 3. **Tree Builder**: Classifies raw values and writes them into a nested
//!    [`Mapping`], opening and closing branches as depth changes.

mod classify;
mod error;
mod lexer;
mod parser;
mod scanner;
mod value;

use std::fs;
use std::io::Read;
use std::path::Path;

pub use classify::classify;
pub use error::{ParseContext, ParseError, Result};
pub use lexer::IndentTracker;
pub use parser::TreeBuilder;
pub use scanner::split_line;
pub use value::{lookup, Mapping, Op, Value};

/// Parse a bbconf document from a string.
///
/// # Example
///
/// ```
/// use libbbconf::{parse, Value};
///
/// let tree = parse("connection: python-server").unwrap();
/// assert_eq!(tree["connection"], Value::Text("python-server".into()));
/// ```
pub fn parse(input: &str) -> Result<Mapping> {
    parse_with_filename(input, None)
}

/// Parse a bbconf document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Mapping> {
    let ctx = ParseContext::new(filename);
    parser::parse_document(input, &ctx)
}

/// Read a whole document from `reader`, then parse it.
pub fn load<R: Read>(mut reader: R) -> Result<Mapping> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse(&input)
}

/// Read and parse a document file. Errors name the file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Mapping> {
    let path = path.as_ref();
    let input = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    parse_with_filename(&input, filename.as_deref())
}
