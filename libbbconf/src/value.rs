//! bbconf value representation.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// A branch of the configuration tree.
pub type Mapping = HashMap<String, Value>;

/// Relational operator of a comparator value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// `<=`
    Le,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `=`
    Eq,
    /// `!=`
    Ne,
}

impl Op {
    /// The operator as written in a document.
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Le => "<=",
            Op::Lt => "<",
            Op::Ge => ">=",
            Op::Gt => ">",
            Op::Eq => "=",
            Op::Ne => "!=",
        }
    }

    /// Returns `true` if `lhs <op> rhs`.
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Op::Le => lhs <= rhs,
            Op::Lt => lhs < rhs,
            Op::Ge => lhs >= rhs,
            Op::Gt => lhs > rhs,
            Op::Eq => lhs == rhs,
            Op::Ne => lhs != rhs,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A bbconf value.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Plain number or fraction, reduced to a float.
    Number(f64),
    /// Percentage in `0..=100`.
    Percentage(f64),
    /// Relational operator applied to another classified value.
    Comparator(Op, Box<Value>),
    /// Number with a unit or label suffix, e.g. `5ms` or `5000 rps`.
    NamedNumber(String, f64),
    /// Raw text that matched no other rule.
    Text(String),
    /// Branch node.
    Mapping(Mapping),
}

impl Value {
    /// Returns the float value if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the percentage if this is a `Percentage`.
    pub fn as_percentage(&self) -> Option<f64> {
        match self {
            Value::Percentage(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the operator and operand if this is a `Comparator`.
    pub fn as_comparator(&self) -> Option<(Op, &Value)> {
        match self {
            Value::Comparator(op, inner) => Some((*op, inner)),
            _ => None,
        }
    }

    /// Returns the suffix and number if this is a `NamedNumber`.
    pub fn as_named_number(&self) -> Option<(&str, f64)> {
        match self {
            Value::NamedNumber(name, value) => Some((name, *value)),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a reference to the children if this is a `Mapping`.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Returns `true` if this value is a branch.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// The numeric quantity carried by a number, percentage or named number.
    pub fn magnitude(&self) -> Option<f64> {
        match self {
            Value::Number(n) | Value::Percentage(n) | Value::NamedNumber(_, n) => Some(*n),
            _ => None,
        }
    }

    /// Checks a measurement against a comparator threshold.
    ///
    /// `cpu: <=50%` is satisfied by a measured `42.0`. Returns `None` when
    /// this value is not a comparator over a numeric quantity.
    pub fn is_satisfied_by(&self, measured: f64) -> Option<bool> {
        let (op, threshold) = self.as_comparator()?;
        Some(op.holds(measured, threshold.magnitude()?))
    }

    /// Look up a direct child of a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping()?.get(key)
    }

    /// Follow a key path through nested mappings.
    ///
    /// An empty path returns `self`.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.get(first)?.get_path(rest),
        }
    }

    /// Name of the variant, for consumer error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Percentage(_) => "percentage",
            Value::Comparator(..) => "comparator",
            Value::NamedNumber(..) => "named number",
            Value::Text(_) => "text",
            Value::Mapping(_) => "mapping",
        }
    }
}

/// Follow a key path from the root of a parsed document.
pub fn lookup<'a>(tree: &'a Mapping, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    tree.get(*first)?.get_path(rest)
}

impl Index<&str> for Value {
    type Output = Value;

    /// Panics if `self` is not a mapping or has no such key.
    fn index(&self, key: &str) -> &Value {
        match self.get(key) {
            Some(v) => v,
            None => panic!("no entry found for key {:?} in {} value", key, self.kind()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Percentage(p) => write!(f, "{}%", p),
            Value::Comparator(op, inner) => write!(f, "{}{:?}", op, inner),
            Value::NamedNumber(name, n) => write!(f, "{} {}", n, name),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Mapping(m) => f.debug_map().entries(m).finish(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let path = Mapping::from([
            ("type".to_string(), Value::from("constant value")),
            ("value".to_string(), Value::from("/demo/endpoint")),
        ]);
        let data = Mapping::from([("path".to_string(), Value::Mapping(path))]);
        Value::Mapping(Mapping::from([("data".to_string(), Value::Mapping(data))]))
    }

    #[test]
    fn test_get_path() {
        let v = sample();
        assert_eq!(
            v.get_path(&["data", "path", "type"]).and_then(Value::as_text),
            Some("constant value")
        );
        assert_eq!(v.get_path(&[]), Some(&v));
        assert!(v.get_path(&["data", "missing"]).is_none());
        assert!(v.get_path(&["data", "path", "type", "deeper"]).is_none());
    }

    #[test]
    fn test_index() {
        let v = sample();
        assert_eq!(v["data"]["path"]["value"], Value::from("/demo/endpoint"));
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn test_index_missing_panics() {
        let v = sample();
        let _ = &v["connection"];
    }

    #[test]
    fn test_lookup_from_root() {
        let Value::Mapping(root) = sample() else {
            unreachable!()
        };
        assert!(lookup(&root, &["data", "path"]).unwrap().is_mapping());
        assert!(lookup(&root, &[]).is_none());
    }

    #[test]
    fn test_comparator_threshold() {
        let cpu = Value::Comparator(Op::Le, Box::new(Value::Percentage(50.0)));
        assert_eq!(cpu.is_satisfied_by(42.0), Some(true));
        assert_eq!(cpu.is_satisfied_by(50.0), Some(true));
        assert_eq!(cpu.is_satisfied_by(50.5), Some(false));

        let throughput = Value::Comparator(
            Op::Gt,
            Box::new(Value::NamedNumber("rps".into(), 5000.0)),
        );
        assert_eq!(throughput.is_satisfied_by(5000.0), Some(false));
        assert_eq!(Value::Number(1.0).is_satisfied_by(1.0), None);
    }

    #[test]
    fn test_op_holds() {
        assert!(Op::Ne.holds(1.0, 2.0));
        assert!(Op::Eq.holds(2.0, 2.0));
        assert!(Op::Ge.holds(3.0, 2.0));
        assert!(!Op::Lt.holds(2.0, 2.0));
    }

    #[test]
    fn test_debug_format() {
        let v = Value::Comparator(Op::Le, Box::new(Value::NamedNumber("ms".into(), 5.0)));
        assert_eq!(format!("{:?}", v), "<=5 ms");
        assert_eq!(format!("{:?}", Value::Percentage(50.0)), "50%");
        assert_eq!(format!("{:?}", Value::from("GET")), "\"GET\"");
    }
}
