//! JSON transcoding: render bbconf trees as JSON text.
//!
//! Floats are written as JSON numbers. JSON has no representation for NaN
//! or the infinities, so a document containing one cannot be converted.

use super::{lower, Plain};
use libbbconf::Mapping;
use serde_json::{Map, Number};

/// Encode a parsed document as pretty-printed JSON.
pub fn encode(tree: &Mapping) -> Result<String, String> {
    let json = entries_to_json(&lower(tree))?;
    serde_json::to_string_pretty(&json).map_err(|e| format!("JSON encode error: {}", e))
}

fn entries_to_json(entries: &[(&str, Plain<'_>)]) -> Result<serde_json::Value, String> {
    let mut obj = Map::new();
    for (key, value) in entries {
        obj.insert(key.to_string(), plain_to_json(value)?);
    }
    Ok(serde_json::Value::Object(obj))
}

fn plain_to_json(value: &Plain<'_>) -> Result<serde_json::Value, String> {
    match value {
        Plain::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| format!("JSON cannot represent the number {}", f)),
        Plain::Text(s) => Ok(serde_json::Value::String(s.to_string())),
        Plain::Map(entries) => entries_to_json(entries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_nested() {
        let tree = libbbconf::parse("protocol:\n  type: http\n  port: 5000").unwrap();
        let json: serde_json::Value = serde_json::from_str(&encode(&tree).unwrap()).unwrap();
        assert_eq!(json["protocol"]["type"], "http");
        assert_eq!(json["protocol"]["port"].as_f64(), Some(5000.0));
    }

    #[test]
    fn test_encode_comparator() {
        let tree = libbbconf::parse("response time: <= 5ms").unwrap();
        let json: serde_json::Value = serde_json::from_str(&encode(&tree).unwrap()).unwrap();
        let threshold = &json["response time"];
        assert_eq!(threshold["op"], "<=");
        assert_eq!(threshold["value"]["name"], "ms");
        assert_eq!(threshold["value"]["value"].as_f64(), Some(5.0));
    }

    #[test]
    fn test_encode_rejects_infinity() {
        let huge = format!("n: 1{}", "0".repeat(400));
        let tree = libbbconf::parse(&huge).unwrap();
        assert!(encode(&tree).is_err());
    }
}
