//! TOML transcoding: render bbconf trees as TOML text.
//!
//! Branches become TOML tables. The small maps produced for percentages,
//! named numbers and comparators become inline tables, so a threshold stays
//! on one line:
//!
//! ```toml
//! [test.validation]
//! cpu = { op = "<=", value = { percentage = 50.0 } }
//! ```
//!
//! Lossy edges:
//!   - TOML floats cannot carry NaN payloads; every NaN renders as `nan`.

use super::{lower, Plain};
use libbbconf::{Mapping, Value};
use toml_edit::{DocumentMut, Formatted, InlineTable, Item, Table};

/// Encode a parsed document as TOML.
pub fn encode(tree: &Mapping) -> Result<String, String> {
    let mut doc = DocumentMut::new();
    for (key, item) in mapping_to_table(tree).iter() {
        doc[key] = item.clone();
    }
    Ok(doc.to_string())
}

/// Build a table, keeping branches as sub-tables and leaves inline.
fn mapping_to_table(mapping: &Mapping) -> Table {
    let mut table = Table::new();
    for (key, plain) in lower(mapping) {
        let item = match mapping.get(key) {
            Some(Value::Mapping(children)) => Item::Table(mapping_to_table(children)),
            _ => Item::Value(plain_to_toml(&plain)),
        };
        table.insert(key, item);
    }
    table
}

fn plain_to_toml(value: &Plain<'_>) -> toml_edit::Value {
    match value {
        Plain::Float(f) => toml_edit::Value::Float(Formatted::new(*f)),
        Plain::Text(s) => toml_edit::Value::String(Formatted::new(s.to_string())),
        Plain::Map(entries) => {
            let mut inline = InlineTable::new();
            for (key, value) in entries {
                inline.insert(*key, plain_to_toml(value));
            }
            toml_edit::Value::InlineTable(inline)
        }
    }
}
