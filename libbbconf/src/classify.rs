//! Value classification.
//!
//! Turns the raw text after a key's colon into a typed [`Value`]. Rules are
//! tried in order and the first match wins:
//!
//! 1. Numbers and fractions: `5000`, `-1.5`, `1/1000`
//! 2. Percentages: `50%`
//! 3. Comparators over another classified value: `<=50%`, `<= 5ms`
//! 4. Named numbers: `5ms`, `5000 rps`
//! 5. Anything else is kept verbatim as text.
//!
//! Classification never fails; malformed-looking values become text and
//! the consumer decides whether that is acceptable.

use crate::value::{Op, Value};

/// Comparator prefixes, two-character operators first.
const OPERATORS: [(&str, Op); 6] = [
    ("<=", Op::Le),
    (">=", Op::Ge),
    ("!=", Op::Ne),
    ("<", Op::Lt),
    (">", Op::Gt),
    ("=", Op::Eq),
];

/// Classify a raw value string.
pub fn classify(raw: &str) -> Value {
    if let Some(n) = parse_fraction(raw) {
        return Value::Number(n);
    }

    if let Some(p) = parse_percentage(raw) {
        return Value::Percentage(p);
    }

    if let Some((op, inner)) = parse_comparator(raw) {
        return Value::Comparator(op, Box::new(inner));
    }

    if let Some((name, n)) = parse_named_number(raw) {
        return Value::NamedNumber(name, n);
    }

    Value::Text(raw.to_string())
}

// ============================================================================
// Numbers and fractions
// ============================================================================

/// Parse `-?d+([.,]d*)?` optionally followed by `/d+([.,]d*)?` segments.
/// Fractions fold left. A zero divisor is not a number.
fn parse_fraction(s: &str) -> Option<f64> {
    let mut parts = s.split('/');
    let first = parse_decimal(parts.next()?, true)?;
    parts.try_fold(first, |acc, part| {
        let divisor = parse_decimal(part, false)?;
        if divisor == 0.0 {
            None
        } else {
            Some(acc / divisor)
        }
    })
}

/// Parse a decimal with at least one integer digit. `,` is read as `.`.
fn parse_decimal(s: &str, signed: bool) -> Option<f64> {
    let unsigned = if signed {
        s.strip_prefix('-').unwrap_or(s)
    } else {
        s
    };

    let (int, frac) = match unsigned.find(['.', ',']) {
        Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        None => (unsigned, None),
    };
    if !is_digits(int) || !frac.map_or(true, |f| f.is_empty() || is_digits(f)) {
        return None;
    }

    s.replace(',', ".").parse().ok()
}

/// Check for a non-empty run of ASCII digits.
fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// Percentages
// ============================================================================

/// Parse `100%` or a one-to-two digit number with optional decimals
/// followed by `%`.
fn parse_percentage(s: &str) -> Option<f64> {
    let number = s.strip_suffix('%')?;
    if number == "100" {
        return Some(100.0);
    }

    let (int, frac) = match number.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (number, None),
    };
    if !is_digits(int) || int.len() > 2 {
        return None;
    }
    if let Some(frac) = frac {
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    number.parse().ok()
}

// ============================================================================
// Comparators
// ============================================================================

/// Split off a relational operator and classify what follows it.
///
/// Whitespace is ignored anywhere in the token, so `<= 5 ms` reads as
/// `<=5ms`. An operator over text is not a comparator.
fn parse_comparator(s: &str) -> Option<(Op, Value)> {
    let stripped: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let (op, rest) = OPERATORS
        .iter()
        .find_map(|(symbol, op)| stripped.strip_prefix(symbol).map(|rest| (*op, rest)))?;

    match classify(rest) {
        Value::Text(_) => None,
        inner => Some((op, inner)),
    }
}

// ============================================================================
// Named numbers
// ============================================================================

/// Parse a number followed by an alphabetic suffix, with at most one
/// whitespace character between them.
fn parse_named_number(s: &str) -> Option<(String, f64)> {
    let end = numeric_prefix_len(s)?;
    let (number, rest) = s.split_at(end);
    let suffix = rest
        .strip_prefix(|c: char| c.is_whitespace())
        .unwrap_or(rest);

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    Some((suffix.to_string(), number.parse().ok()?))
}

/// Length of the leading `[+-]?(d+(.d*)?|.d+)([eE][+-]?d+)?` match.
fn numeric_prefix_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;

    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = count_digits(&bytes[i + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&bytes[j.min(bytes.len())..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    Some(i)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
