//! YAML transcoding: render bbconf trees as YAML text.
//!
//! Floats become YAML floats (including .nan, .inf and -.inf), text becomes
//! YAML strings and maps become YAML mappings with sorted keys.

use super::{lower, Plain};
use libbbconf::Mapping;

/// Encode a parsed document as YAML.
pub fn encode(tree: &Mapping) -> Result<String, String> {
    let yaml_value = entries_to_yaml(&lower(tree));
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn entries_to_yaml(entries: &[(&str, Plain<'_>)]) -> serde_yaml::Value {
    let mut map = serde_yaml::Mapping::new();
    for (key, value) in entries {
        map.insert(
            serde_yaml::Value::String(key.to_string()),
            plain_to_yaml(value),
        );
    }
    serde_yaml::Value::Mapping(map)
}

fn plain_to_yaml(value: &Plain<'_>) -> serde_yaml::Value {
    match value {
        Plain::Float(f) => serde_yaml::Value::Number(serde_yaml::Number::from(*f)),
        Plain::Text(s) => serde_yaml::Value::String(s.to_string()),
        Plain::Map(entries) => entries_to_yaml(entries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_round_trips_through_serde_yaml() {
        let tree = libbbconf::parse("data:\n  path:\n    type: constant value\ncpu: <=50%").unwrap();
        let yaml: serde_yaml::Value = serde_yaml::from_str(&encode(&tree).unwrap()).unwrap();
        assert_eq!(yaml["data"]["path"]["type"].as_str(), Some("constant value"));
        assert_eq!(yaml["cpu"]["op"].as_str(), Some("<="));
        assert_eq!(yaml["cpu"]["value"]["percentage"].as_f64(), Some(50.0));
    }

    #[test]
    fn test_encode_keeps_numeric_looking_text_quoted() {
        let tree = libbbconf::parse("ip: 127.0.0.1\nversion: 1.0.0").unwrap();
        let yaml: serde_yaml::Value = serde_yaml::from_str(&encode(&tree).unwrap()).unwrap();
        assert_eq!(yaml["ip"].as_str(), Some("127.0.0.1"));
        assert_eq!(yaml["version"].as_str(), Some("1.0.0"));
    }
}
