//! Transcoding of parsed bbconf trees into other data formats.
//!
//! Every target lacks bbconf's typed leaves, so values are first lowered to
//! a plain tree of floats, strings and maps:
//!
//!   - Value::Number            -> float
//!   - Value::Text              -> string
//!   - Value::Percentage(p)     -> { percentage: p }
//!   - Value::NamedNumber(n, v) -> { name: n, value: v }
//!   - Value::Comparator(op, v) -> { op: "<=", value: <lowered v> }
//!   - Value::Mapping           -> map
//!
//! Map keys are sorted so output is stable across runs.

use libbbconf::{Mapping, Value};

pub mod cbor;
pub mod json;
pub mod toml;
pub mod yaml;

/// A lowered value.
#[derive(Debug, Clone, PartialEq)]
pub enum Plain<'a> {
    Float(f64),
    Text(&'a str),
    Map(Vec<(&'a str, Plain<'a>)>),
}

/// Lower a whole document.
pub fn lower(tree: &Mapping) -> Vec<(&str, Plain<'_>)> {
    let mut entries: Vec<(&str, Plain<'_>)> = tree
        .iter()
        .map(|(key, value)| (key.as_str(), lower_value(value)))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn lower_value(value: &Value) -> Plain<'_> {
    match value {
        Value::Number(n) => Plain::Float(*n),
        Value::Text(s) => Plain::Text(s),
        Value::Percentage(p) => Plain::Map(vec![("percentage", Plain::Float(*p))]),
        Value::NamedNumber(name, n) => Plain::Map(vec![
            ("name", Plain::Text(name)),
            ("value", Plain::Float(*n)),
        ]),
        Value::Comparator(op, inner) => Plain::Map(vec![
            ("op", Plain::Text(op.symbol())),
            ("value", lower_value(inner)),
        ]),
        Value::Mapping(m) => Plain::Map(lower(m)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_sorts_keys() {
        let tree = libbbconf::parse("protocol: http\nconnection: fib").unwrap();
        let keys: Vec<&str> = lower(&tree).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["connection", "protocol"]);
    }

    #[test]
    fn test_lower_tagged_values() {
        let tree = libbbconf::parse("cpu: <=50%\nthroughput: 5000 rps").unwrap();
        let lowered = lower(&tree);
        assert_eq!(
            lowered[0],
            (
                "cpu",
                Plain::Map(vec![
                    ("op", Plain::Text("<=")),
                    ("value", Plain::Map(vec![("percentage", Plain::Float(50.0))])),
                ])
            )
        );
        assert_eq!(
            lowered[1],
            (
                "throughput",
                Plain::Map(vec![
                    ("name", Plain::Text("rps")),
                    ("value", Plain::Float(5000.0)),
                ])
            )
        );
    }
}
